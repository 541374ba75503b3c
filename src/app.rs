use std::sync::Arc;
use std::sync::mpsc::Sender;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::runtime::{Builder, Runtime};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::content::{ContentProvider, provider_from_config};
use crate::event::AppEvent;
use crate::pipeline::{FlashcardFetcher, PrefetchPipeline, QuizFetcher};
use crate::session::{SessionController, SharedSession};
use crate::study::flashcard::FlashcardStudy;
use crate::study::lookup::{LookupAction, LookupState};
use crate::study::quiz::QuizStudy;
use crate::study::worker::ModeHandle;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Flashcards,
    Quiz,
    Lookup,
}

impl AppScreen {
    pub fn title(self) -> &'static str {
        match self {
            AppScreen::Menu => "Home",
            AppScreen::Flashcards => "Flashcards",
            AppScreen::Quiz => "Practice Quiz",
            AppScreen::Lookup => "Drug Lookup",
        }
    }
}

/// Start-up knobs that don't belong in the config file.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub seed: Option<u64>,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub flashcards: FlashcardStudy,
    pub quiz: QuizStudy,
    pub lookup: LookupState,
    pub confirm_reset: bool,
    pub should_quit: bool,
    pub tick: usize,
    session: SharedSession,
    provider: Arc<dyn ContentProvider>,
    events: Sender<AppEvent>,
    // Declared last so study workers are dropped before the runtime.
    runtime: Runtime,
}

impl App {
    pub fn new(config: Config, options: Options, events: Sender<AppEvent>) -> Result<Self> {
        let catalog = Catalog::load(config.catalog_path().as_deref())?;
        let provider = provider_from_config(&config)?;
        Self::with_parts(config, Arc::new(catalog), provider, options, events)
    }

    pub fn with_parts(
        config: Config,
        catalog: Arc<Catalog>,
        provider: Arc<dyn ContentProvider>,
        options: Options,
        events: Sender<AppEvent>,
    ) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pharmtutor-io")
            .enable_all()
            .build()
            .context("starting async runtime")?;

        let controller = match options.seed {
            Some(seed) => SessionController::with_rng(catalog, SmallRng::seed_from_u64(seed)),
            None => SessionController::new(catalog),
        };
        let session = SharedSession::new(controller);

        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let mut menu = Menu::new(theme);
        menu.subtitle = progress_line(&session);

        tracing::info!(
            drugs = session.progress().total,
            theme = %theme.name,
            "app ready"
        );

        Ok(Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            flashcards: FlashcardStudy::default(),
            quiz: QuizStudy::default(),
            lookup: LookupState::default(),
            confirm_reset: false,
            should_quit: false,
            tick: 0,
            session,
            provider,
            events,
            runtime,
        })
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
    }

    /// Steps through bundled themes and remembers the choice.
    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) => themes.get((idx + 1) % themes.len()),
            None => themes.first(),
        };
        let Some(name) = next.cloned() else {
            return;
        };
        if let Some(theme) = Theme::load(&name) {
            self.config.theme = name;
            self.set_theme(theme);
            if let Err(err) = self.config.save() {
                tracing::warn!(error = %err, "could not save config");
            }
        }
    }

    pub fn open(&mut self, action: MenuAction) {
        match action {
            MenuAction::Flashcards => self.open_flashcards(),
            MenuAction::Quiz => self.open_quiz(),
            MenuAction::Lookup => {
                self.lookup.reset();
                self.screen = AppScreen::Lookup;
            }
            MenuAction::ResetSession => self.confirm_reset = true,
            MenuAction::Quit => self.should_quit = true,
        }
    }

    fn open_flashcards(&mut self) {
        let fetcher = Arc::new(FlashcardFetcher::new(Arc::clone(&self.provider)));
        let pipeline = PrefetchPipeline::new(self.session.clone(), fetcher);
        let events = self.events.clone();
        let handle = ModeHandle::spawn(self.runtime.handle(), pipeline, move |snapshot| {
            let _ = events.send(AppEvent::Flashcards(snapshot));
        });
        self.flashcards.detach();
        self.flashcards.screen.attach(handle);
        self.screen = AppScreen::Flashcards;
    }

    fn open_quiz(&mut self) {
        let fetcher = Arc::new(QuizFetcher::new(Arc::clone(&self.provider)));
        let pipeline = PrefetchPipeline::new(self.session.clone(), fetcher);
        let events = self.events.clone();
        let handle = ModeHandle::spawn(self.runtime.handle(), pipeline, move |snapshot| {
            let _ = events.send(AppEvent::Quiz(snapshot));
        });
        self.quiz.detach();
        self.quiz.screen.attach(handle);
        self.screen = AppScreen::Quiz;
    }

    /// Back to the menu. The mode being left is torn down; anything it still
    /// has in flight is ignored when it lands.
    pub fn go_to_menu(&mut self) {
        match self.screen {
            AppScreen::Flashcards => self.flashcards.detach(),
            AppScreen::Quiz => self.quiz.detach(),
            AppScreen::Lookup => self.lookup.reset(),
            AppScreen::Menu => {}
        }
        self.menu.subtitle = progress_line(&self.session);
        self.screen = AppScreen::Menu;
    }

    /// Reshuffles the deck. A study mode on screen starts over from the new
    /// deck; its pending results are discarded.
    pub fn reset_session(&mut self) {
        self.confirm_reset = false;
        self.session.reset();
        match self.screen {
            AppScreen::Flashcards => self.flashcards.restart(),
            AppScreen::Quiz => self.quiz.restart(),
            AppScreen::Menu | AppScreen::Lookup => {}
        }
        self.menu.subtitle = progress_line(&self.session);
    }

    pub fn handle_lookup_action(&mut self, action: LookupAction) {
        match action {
            LookupAction::None => {}
            LookupAction::Leave => self.go_to_menu(),
            LookupAction::Search { seq, query } => self.spawn_lookup(seq, query),
        }
    }

    fn spawn_lookup(&self, seq: u64, query: String) {
        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = provider.detail_sheet(&query).await;
            if let Err(err) = &result {
                tracing::warn!(seq, query = %query, error = %err, "lookup failed");
            }
            let _ = events.send(AppEvent::Lookup { seq, result });
        });
    }

    /// Applies results posted by the runtime and advances the spinner.
    pub fn handle_background(&mut self, event: AppEvent) {
        let current = self.session.generation();
        match event {
            AppEvent::Flashcards(snapshot) => self.flashcards.apply(snapshot, current),
            AppEvent::Quiz(snapshot) => self.quiz.apply(snapshot, current),
            AppEvent::Lookup { seq, result } => {
                self.lookup.complete(seq, result);
            }
            AppEvent::Tick => self.tick = self.tick.wrapping_add(1),
            AppEvent::Key(_) | AppEvent::Resize(_, _) => {}
        }
    }
}

fn progress_line(session: &SharedSession) -> String {
    let progress = session.progress();
    format!("{} / {} drugs drawn this session", progress.taken, progress.total)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::content::{ContentError, DetailSheet, Flashcard, QuizQuestion, Side};
    use crate::study::lookup::LookupStatus;

    struct Canned;

    #[async_trait]
    impl ContentProvider for Canned {
        async fn flashcard(&self, identifier: &str) -> Result<Flashcard, ContentError> {
            Ok(Flashcard {
                term: identifier.to_string(),
                side: Side::Generic,
                answer: format!("{identifier} brand"),
                drug_class: "Class".to_string(),
                indication: "Use".to_string(),
                generic_name: identifier.to_string(),
            })
        }

        async fn quiz_question(&self, identifier: &str) -> Result<QuizQuestion, ContentError> {
            Ok(QuizQuestion {
                question: format!("About {identifier}?"),
                options: vec!["w".into(), "x".into(), "y".into(), "z".into()],
                correct_answer: "w".to_string(),
                explanation: "Because.".to_string(),
                subject_drug: identifier.to_string(),
            })
        }

        async fn detail_sheet(&self, query: &str) -> Result<DetailSheet, ContentError> {
            if query == "unknown" {
                return Err(ContentError::EmptyResponse);
            }
            Ok(DetailSheet {
                brand_name: "Brand".to_string(),
                generic_name: query.to_string(),
                drug_class: "Class".to_string(),
                indication: "Use".to_string(),
                side_effects: Vec::new(),
                schedule: "Legend/Rx Only".to_string(),
            })
        }
    }

    fn app(names: &[&str]) -> (App, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let app = App::with_parts(
            Config::default(),
            Arc::new(Catalog::new(names.iter().copied())),
            Arc::new(Canned),
            Options { seed: Some(3) },
            tx,
        )
        .unwrap();
        (app, rx)
    }

    /// Feeds background events to the app until `done` holds.
    fn pump(app: &mut App, rx: &Receiver<AppEvent>, done: impl Fn(&App) -> bool) {
        while !done(app) {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            app.handle_background(event);
        }
    }

    #[test]
    fn flashcards_show_a_card_and_advance() {
        let (mut app, rx) = app(&["a", "b", "c"]);
        app.open(MenuAction::Flashcards);
        assert_eq!(app.screen, AppScreen::Flashcards);

        pump(&mut app, &rx, |app| {
            app.flashcards.screen.shown().is_some() && !app.flashcards.screen.is_busy()
        });
        let first = app.flashcards.screen.shown().unwrap().identifier.clone();
        app.flashcards.flip();
        assert!(app.flashcards.is_flipped());

        assert!(app.flashcards.next());
        pump(&mut app, &rx, |app| {
            !app.flashcards.screen.is_busy()
                && app
                    .flashcards
                    .screen
                    .shown()
                    .is_some_and(|shown| shown.identifier != first)
        });
        assert!(!app.flashcards.is_flipped());
    }

    #[test]
    fn reset_restarts_the_open_mode_on_a_new_generation() {
        let (mut app, rx) = app(&["a", "b", "c", "d"]);
        app.open(MenuAction::Quiz);
        pump(&mut app, &rx, |app| app.quiz.screen.shown().is_some());

        let before = app.session().generation();
        app.open(MenuAction::ResetSession);
        assert!(app.confirm_reset);
        app.reset_session();
        assert!(!app.confirm_reset);
        let after = app.session().generation();
        assert_ne!(before, after);

        pump(&mut app, &rx, |app| app.quiz.screen.shown().is_some());
        assert_eq!(app.quiz.screen.shown().unwrap().generation, after);
    }

    #[test]
    fn leaving_a_mode_drops_its_results() {
        let (mut app, rx) = app(&["a", "b", "c"]);
        app.open(MenuAction::Flashcards);
        app.go_to_menu();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(!app.flashcards.screen.is_attached());

        while let Ok(event) = rx.recv_timeout(Duration::from_millis(200)) {
            app.handle_background(event);
        }
        assert!(app.flashcards.screen.shown().is_none());
    }

    #[test]
    fn lookup_round_trip() {
        let (mut app, rx) = app(&["a"]);
        app.open(MenuAction::Lookup);
        assert_eq!(app.screen, AppScreen::Lookup);

        for ch in "warfarin".chars() {
            let action = app
                .lookup
                .handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
            app.handle_lookup_action(action);
        }
        let action = app
            .lookup
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        app.handle_lookup_action(action);

        pump(&mut app, &rx, |app| !app.lookup.is_searching());
        match app.lookup.status() {
            LookupStatus::Found(sheet) => {
                assert_eq!(sheet.generic_name, "warfarin");
            }
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn failed_lookup_is_reported() {
        let (mut app, rx) = app(&["a"]);
        app.open(MenuAction::Lookup);
        for ch in "unknown".chars() {
            app.lookup
                .handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        let (seq, query) = app.lookup.submit().unwrap();
        app.handle_lookup_action(LookupAction::Search { seq, query });
        pump(&mut app, &rx, |app| !app.lookup.is_searching());
        assert!(matches!(app.lookup.status(), LookupStatus::Failed { .. }));
    }

    #[test]
    fn menu_actions() {
        let (mut app, _rx) = app(&["a"]);
        app.open(MenuAction::Quit);
        assert!(app.should_quit);
        assert_eq!(app.menu.subtitle, "0 / 1 drugs drawn this session");
    }
}
