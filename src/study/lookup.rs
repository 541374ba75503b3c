use crossterm::event::KeyEvent;

use crate::content::{ContentError, DetailSheet};
use crate::ui::line_input::{InputResult, LineInput};

#[derive(Clone, Debug, PartialEq)]
pub enum LookupStatus {
    Idle,
    Searching { query: String },
    Found(DetailSheet),
    Failed { query: String, message: String },
}

/// What a key press in the lookup box asks the app to do.
#[derive(Debug, PartialEq, Eq)]
pub enum LookupAction {
    None,
    /// Issue `detail_sheet(query)` tagged with `seq`.
    Search { seq: u64, query: String },
    Leave,
}

/// Drug Lookup screen. Each submitted query gets a fresh sequence number and
/// only the result for the latest one is kept.
pub struct LookupState {
    pub input: LineInput,
    status: LookupStatus,
    seq: u64,
}

impl Default for LookupState {
    fn default() -> Self {
        Self {
            input: LineInput::default(),
            status: LookupStatus::Idle,
            seq: 0,
        }
    }
}

impl LookupState {
    pub fn status(&self) -> &LookupStatus {
        &self.status
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.status, LookupStatus::Searching { .. })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LookupAction {
        match self.input.handle(key) {
            InputResult::Continue => LookupAction::None,
            InputResult::Cancel => LookupAction::Leave,
            InputResult::Submit => match self.submit() {
                Some((seq, query)) => LookupAction::Search { seq, query },
                None => LookupAction::None,
            },
        }
    }

    /// Starts a search for the current input. Blank input is ignored.
    pub fn submit(&mut self) -> Option<(u64, String)> {
        let query = self.input.query()?.to_string();
        self.seq += 1;
        self.status = LookupStatus::Searching {
            query: query.clone(),
        };
        tracing::debug!(seq = self.seq, query = %query, "lookup submitted");
        Some((self.seq, query))
    }

    /// Applies a finished lookup. Returns false for results of superseded
    /// queries, which are dropped.
    pub fn complete(&mut self, seq: u64, result: Result<DetailSheet, ContentError>) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "dropping superseded lookup");
            return false;
        }
        let LookupStatus::Searching { query } = &self.status else {
            return false;
        };
        self.status = match result {
            Ok(sheet) => LookupStatus::Found(sheet),
            Err(err) => LookupStatus::Failed {
                query: query.clone(),
                message: err.to_string(),
            },
        };
        true
    }

    /// Leaving the screen forgets the result; in-flight searches are ignored
    /// when they land.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.status = LookupStatus::Idle;
        self.input.clear();
    }
}
