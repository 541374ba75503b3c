use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use pharmtutor::app::{App, AppScreen, Options};
use pharmtutor::config::Config;
use pharmtutor::event::{AppEvent, EventHandler};
use pharmtutor::logging;
use pharmtutor::pipeline::PipelineState;
use pharmtutor::study::StudyScreen;
use pharmtutor::ui;
use pharmtutor::ui::components::detail_sheet_view::DetailSheetView;
use pharmtutor::ui::components::flashcard_view::FlashcardView;
use pharmtutor::ui::components::menu::MenuAction;
use pharmtutor::ui::components::progress_bar::ProgressBar;
use pharmtutor::ui::components::quiz_view::{QuizView, option_index};
use pharmtutor::ui::components::status_panel::{Status, StatusPanel};
use pharmtutor::ui::layout::{AppLayout, pack_hint_lines};
use pharmtutor::ui::theme::Theme;

const DISCLAIMER: &str = "For educational purposes only. Not for clinical use.";

#[derive(Parser)]
#[command(
    name = "pharmtutor",
    version,
    about = "Terminal study tool for pharmacy technician drug names"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Model used to generate study content")]
    model: Option<String>,

    #[arg(short, long, help = "Drug list to study instead of the bundled one")]
    catalog: Option<String>,

    #[arg(long, help = "Seed for a reproducible deck order")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }

    if let Err(err) = logging::init(&config) {
        eprintln!("Warning: logging disabled: {err:#}");
    }

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, Options { seed: cli.seed }, events.sender())?;

    if let Some(theme_name) = cli.theme {
        if let Some(theme) = Theme::load(&theme_name) {
            app.set_theme(theme);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting on error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Resize(_, _) => {}
            other => app.handle_background(other),
        }

        if app.should_quit {
            tracing::info!("quit requested");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Confirmation dialog takes priority
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.reset_session(),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_reset = false,
            _ => {}
        }
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Flashcards => handle_flashcard_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Lookup => {
            let action = app.lookup.handle_key(key);
            app.handle_lookup_action(action);
        }
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.open(app.menu.selected_action()),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for(ch) {
                app.open(action);
            }
        }
        _ => {}
    }
}

fn handle_flashcard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('f') => app.flashcards.flip(),
        KeyCode::Char('n') | KeyCode::Right => {
            app.flashcards.next();
        }
        KeyCode::Char('r') => app.open(MenuAction::ResetSession),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('n') | KeyCode::Enter | KeyCode::Right => {
            app.quiz.next();
        }
        KeyCode::Char('r') => app.open(MenuAction::ResetSession),
        KeyCode::Char(ch) => {
            if let Some(index) = option_index(ch) {
                if let Some(answer) = app.quiz.select(index) {
                    tracing::debug!(?answer, streak = app.quiz.streak(), "quiz answered");
                }
            }
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let hints = hints_for(app);
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16 + 1);

    render_header(frame, app, layout.header);

    match app.screen {
        AppScreen::Menu => {
            let menu_area = ui::layout::centered_rect(50, 90, layout.main);
            frame.render_widget(&app.menu, menu_area);
        }
        AppScreen::Flashcards => render_flashcards(frame, app, layout.main),
        AppScreen::Quiz => render_quiz(frame, app, layout.main),
        AppScreen::Lookup => {
            frame.render_widget(DetailSheetView::new(&app.lookup, app.theme, app.tick), layout.main)
        }
    }

    render_footer(frame, app, layout.footer, hint_lines);

    if app.confirm_reset {
        render_confirm_reset(frame, app);
    }
}

fn hints_for(app: &App) -> Vec<&'static str> {
    match app.screen {
        AppScreen::Menu => vec!["[1-3] Study", "[r] Reset", "[t] Theme", "[q] Quit"],
        AppScreen::Flashcards => vec!["[Space] Flip", "[n] Next card", "[r] Reset", "[Esc] Menu"],
        AppScreen::Quiz if app.quiz.is_answered() => {
            vec!["[n] Next question", "[r] Reset", "[Esc] Menu"]
        }
        AppScreen::Quiz => vec!["[a-d] Answer", "[r] Reset", "[Esc] Menu"],
        AppScreen::Lookup => vec!["[Enter] Search", "[Ctrl+U] Clear", "[Esc] Menu"],
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " pharmtutor ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", app.screen.title()),
            Style::default().fg(colors.accent()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, rows[0]);

    frame.render_widget(ProgressBar::new(app.session().progress(), app.theme), rows[1]);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hint_lines: Vec<String>) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|hint| Line::from(Span::styled(hint, Style::default().fg(colors.text_muted()))))
        .collect();
    lines.push(
        Line::from(Span::styled(
            DISCLAIMER,
            Style::default()
                .fg(colors.warning())
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    );
    frame.render_widget(Paragraph::new(lines), area);
}

/// Shared by both study modes for everything except an item on screen.
fn status_for<'a, T>(
    screen: &'a StudyScreen<T>,
    noun: &'a str,
    headline: &'a str,
    total: usize,
) -> Option<Status<'a>> {
    match screen.state() {
        PipelineState::Loading => Some(Status::Loading { noun }),
        PipelineState::Error(error) => Some(Status::Failed { headline, error }),
        PipelineState::Finished => Some(Status::Finished { total }),
        PipelineState::Displaying(_) => None,
    }
}

fn render_flashcards(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let screen = &app.flashcards.screen;
    let total = app.session().progress().total;
    let status = status_for(screen, "flashcard", "Failed to load flashcard.", total);
    match (status, screen.shown()) {
        (None, Some(shown)) => {
            let view = FlashcardView::new(&shown.content, app.flashcards.is_flipped(), app.theme);
            frame.render_widget(view, area);
        }
        (status, _) => {
            let status = status.unwrap_or(Status::Loading { noun: "flashcard" });
            frame.render_widget(StatusPanel::new(status, app.theme, app.tick), area);
        }
    }
    render_busy_marker(frame, app, area, screen.is_busy() && screen.shown().is_some());
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let screen = &app.quiz.screen;
    let total = app.session().progress().total;
    let status = status_for(screen, "question", "Unable to generate quiz question.", total);
    match (status, screen.shown()) {
        (None, Some(shown)) => {
            let view = QuizView::new(
                &shown.content,
                app.quiz.selected(),
                app.quiz.streak(),
                app.quiz.best_streak(),
                app.theme,
            );
            frame.render_widget(view, area);
        }
        (status, _) => {
            let status = status.unwrap_or(Status::Loading { noun: "question" });
            frame.render_widget(StatusPanel::new(status, app.theme, app.tick), area);
        }
    }
    render_busy_marker(frame, app, area, screen.is_busy() && screen.shown().is_some());
}

/// Marks the panel while the next item is on its way.
fn render_busy_marker(frame: &mut ratatui::Frame, app: &App, area: Rect, busy: bool) {
    if !busy || area.width < 16 || area.height == 0 {
        return;
    }
    let label = " loading… ";
    let width = label.chars().count() as u16;
    let marker = Rect::new(area.x + area.width - width - 2, area.y, width, 1);
    frame.render_widget(
        Paragraph::new(Span::styled(
            label,
            Style::default().fg(app.theme.colors.accent()),
        )),
        marker,
    );
}

fn render_confirm_reset(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = ui::layout::centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Reset Session ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Reshuffle every drug and start a new session?",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Reset   [n] Cancel",
            Style::default().fg(colors.text_muted()),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}
