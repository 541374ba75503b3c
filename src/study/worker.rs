use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::pipeline::{Fetcher, PipelineState, PrefetchPipeline, RetireHandle};
use crate::session::{Generation, Progress};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Advance,
}

/// What the UI thread sees of a pipeline after each step.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<T> {
    pub state: PipelineState<T>,
    /// A command is being processed; the next-item affordance is disabled.
    pub busy: bool,
    pub progress: Progress,
    /// Session generation when the snapshot was taken.
    pub generation: Generation,
}

impl<T> Snapshot<T> {
    /// False for snapshots taken before a reset, or still showing content
    /// drawn from a previous deck.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
            && self
                .state
                .shown()
                .is_none_or(|shown| shown.generation == generation)
    }
}

/// Owner side of a pipeline running on the runtime.
///
/// Dropping the handle retires the pipeline: results that land afterwards are
/// never published, and the worker exits once its current command returns.
pub struct ModeHandle {
    commands: mpsc::UnboundedSender<Command>,
    retire: RetireHandle,
}

impl ModeHandle {
    pub fn spawn<F, P>(runtime: &Handle, pipeline: PrefetchPipeline<F>, publish: P) -> Self
    where
        F: Fetcher,
        F::Item: Clone,
        P: Fn(Snapshot<F::Item>) + Send + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let retire = pipeline.retire_handle();
        runtime.spawn(run(pipeline, receiver, publish));
        Self { commands, retire }
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn advance(&self) -> bool {
        self.send(Command::Advance)
    }

    fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn is_retired(&self) -> bool {
        self.retire.is_retired()
    }
}

impl Drop for ModeHandle {
    fn drop(&mut self) {
        self.retire.retire();
    }
}

async fn run<F, P>(
    mut pipeline: PrefetchPipeline<F>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    publish: P,
) where
    F: Fetcher,
    F::Item: Clone,
    P: Fn(Snapshot<F::Item>),
{
    while let Some(command) = commands.recv().await {
        if pipeline.is_retired() {
            break;
        }
        publish(snapshot(&pipeline, true));
        match command {
            Command::Start => pipeline.start().await,
            Command::Advance => pipeline.advance().await,
        };
        if pipeline.is_retired() {
            break;
        }
        tracing::debug!(command = ?command, state = pipeline.state().label(), "mode step done");
        publish(snapshot(&pipeline, false));
    }
    pipeline.retire();
}

fn snapshot<F>(pipeline: &PrefetchPipeline<F>, busy: bool) -> Snapshot<F::Item>
where
    F: Fetcher,
    F::Item: Clone,
{
    let session = pipeline.session();
    Snapshot {
        state: pipeline.state().clone(),
        busy,
        progress: session.progress(),
        generation: session.generation(),
    }
}
