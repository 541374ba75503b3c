use crate::content::Flashcard;
use crate::session::Generation;
use crate::study::StudyScreen;
use crate::study::worker::Snapshot;

#[derive(Default)]
pub struct FlashcardStudy {
    pub screen: StudyScreen<Flashcard>,
    flipped: bool,
}

impl FlashcardStudy {
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Turns the card over. Only a card on screen can be flipped.
    pub fn flip(&mut self) {
        if self.screen.shown().is_some() {
            self.flipped = !self.flipped;
        }
    }

    pub fn apply(&mut self, snapshot: Snapshot<Flashcard>, current: Generation) {
        if self.screen.apply(snapshot, current) {
            self.flipped = false;
        }
    }

    pub fn next(&mut self) -> bool {
        self.screen.advance()
    }

    pub fn restart(&mut self) {
        self.flipped = false;
        self.screen.restart();
    }

    pub fn detach(&mut self) {
        self.flipped = false;
        self.screen.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Side;
    use crate::study::testing;
    use crate::pipeline::{PipelineState, Shown};
    use crate::session::Progress;

    fn card(term: &str, generation: Generation) -> Snapshot<Flashcard> {
        Snapshot {
            state: PipelineState::Displaying(Shown {
                identifier: term.to_string(),
                generation,
                content: Flashcard {
                    term: term.to_string(),
                    side: Side::Generic,
                    answer: "Brand".to_string(),
                    drug_class: "Class".to_string(),
                    indication: "Use".to_string(),
                    generic_name: term.to_string(),
                },
            }),
            busy: false,
            progress: Progress { taken: 2, total: 5 },
            generation,
        }
    }

    fn attached() -> (FlashcardStudy, Generation, tokio::runtime::Runtime) {
        let (handle, session, runtime) = testing::idle_handle(&["a", "b", "c"]);
        let mut study = FlashcardStudy::default();
        study.screen.attach(handle);
        (study, session.generation(), runtime)
    }

    #[test]
    fn flip_needs_a_card() {
        let (mut study, _, _rt) = attached();
        study.flip();
        assert!(!study.is_flipped());
    }

    #[test]
    fn flip_toggles_and_new_card_shows_front() {
        let (mut study, generation, _rt) = attached();
        study.apply(card("Lisinopril", generation), generation);
        study.flip();
        assert!(study.is_flipped());
        study.flip();
        assert!(!study.is_flipped());

        study.flip();
        // Same card republished after a step keeps its side.
        study.apply(card("Lisinopril", generation), generation);
        assert!(study.is_flipped());

        study.apply(card("Metformin", generation), generation);
        assert!(!study.is_flipped());
    }

    #[test]
    fn restart_shows_front_and_clears_card() {
        let (mut study, generation, _rt) = attached();
        study.apply(card("Lisinopril", generation), generation);
        study.flip();
        study.restart();
        assert!(!study.is_flipped());
        assert!(study.screen.shown().is_none());
    }

    #[test]
    fn detached_screen_never_flips() {
        let mut study = FlashcardStudy::default();
        let generation = Generation::default();
        study.apply(card("Lisinopril", generation), generation);
        study.flip();
        assert!(!study.is_flipped());
        assert!(!study.next());
    }
}
