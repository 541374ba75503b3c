use crate::content::QuizQuestion;
use crate::pipeline::PipelineState;
use crate::session::Generation;
use crate::study::StudyScreen;
use crate::study::worker::Snapshot;

/// Outcome of picking an option on the current question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect,
}

#[derive(Default)]
pub struct QuizStudy {
    pub screen: StudyScreen<QuizQuestion>,
    selected: Option<usize>,
    streak: u32,
    best_streak: u32,
}

impl QuizStudy {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Locks in an option. The first pick on a question counts; later picks
    /// and out-of-range indices return `None`.
    pub fn select(&mut self, index: usize) -> Option<Answer> {
        if self.selected.is_some() {
            return None;
        }
        let question = &self.screen.shown()?.content;
        if index >= question.options.len() {
            return None;
        }
        self.selected = Some(index);
        if question.is_correct(index) {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            Some(Answer::Correct)
        } else {
            self.streak = 0;
            Some(Answer::Incorrect)
        }
    }

    /// Next question. Needs an answer first unless the mode is showing an
    /// error, where it doubles as retry.
    pub fn next(&mut self) -> bool {
        let error_showing = matches!(self.screen.state(), PipelineState::Error(_));
        if !self.is_answered() && !error_showing {
            return false;
        }
        self.screen.advance()
    }

    pub fn apply(&mut self, snapshot: Snapshot<QuizQuestion>, current: Generation) {
        if self.screen.apply(snapshot, current) {
            self.selected = None;
        }
    }

    /// Session reset: the streak counts within one deck only.
    pub fn restart(&mut self) {
        self.selected = None;
        self.streak = 0;
        self.screen.restart();
    }

    pub fn detach(&mut self) {
        self.selected = None;
        self.screen.detach();
    }
}
