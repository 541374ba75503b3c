pub mod flashcard;
pub mod lookup;
pub mod quiz;
pub mod worker;

use crate::pipeline::{PipelineState, Shown};
use crate::session::{Generation, Progress};
use worker::{ModeHandle, Snapshot};

/// UI-side view of one study mode: the worker handle plus the latest
/// snapshot it published.
pub struct StudyScreen<T> {
    handle: Option<ModeHandle>,
    snapshot: Option<Snapshot<T>>,
}

impl<T> Default for StudyScreen<T> {
    fn default() -> Self {
        Self {
            handle: None,
            snapshot: None,
        }
    }
}

impl<T> StudyScreen<T> {
    /// Replaces any running worker and asks the new one for its first item.
    pub fn attach(&mut self, handle: ModeHandle) {
        self.detach();
        handle.start();
        self.handle = Some(handle);
    }

    /// Tears the mode down. Late results from the old worker are never shown.
    pub fn detach(&mut self) {
        self.handle = None;
        self.snapshot = None;
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Re-runs start on the same worker, e.g. after a session reset.
    pub fn restart(&mut self) {
        self.snapshot = None;
        if let Some(handle) = &self.handle {
            handle.start();
        }
    }

    /// Stores a published snapshot unless it predates the current generation.
    /// Returns true when it carries a different item than the one on screen.
    pub fn apply(&mut self, snapshot: Snapshot<T>, current: Generation) -> bool {
        if !self.is_attached() || !snapshot.is_current(current) {
            return false;
        }
        let changed = match (self.shown(), snapshot.state.shown()) {
            (Some(old), Some(new)) => {
                old.identifier != new.identifier || old.generation != new.generation
            }
            (None, Some(_)) => true,
            _ => false,
        };
        self.snapshot = Some(snapshot);
        changed
    }

    pub fn state(&self) -> &PipelineState<T> {
        self.snapshot
            .as_ref()
            .map_or(&PipelineState::Loading, |snap| &snap.state)
    }

    pub fn shown(&self) -> Option<&Shown<T>> {
        self.snapshot.as_ref().and_then(|snap| snap.state.shown())
    }

    pub fn progress(&self) -> Option<Progress> {
        self.snapshot.as_ref().map(|snap| snap.progress)
    }

    /// True until the first snapshot arrives and while a command is running.
    pub fn is_busy(&self) -> bool {
        self.snapshot.as_ref().is_none_or(|snap| snap.busy)
    }

    /// Asks for the next item. Ignored while busy or once finished.
    pub fn advance(&mut self) -> bool {
        if self.is_busy() || self.state().is_finished() {
            return false;
        }
        let Some(handle) = &self.handle else {
            return false;
        };
        if !handle.advance() {
            return false;
        }
        if let Some(snap) = &mut self.snapshot {
            snap.busy = true;
        }
        true
    }
}
