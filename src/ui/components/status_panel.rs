use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::content::ContentError;
use crate::ui::components::detail_sheet_view::spinner;
use crate::ui::theme::Theme;

/// Everything a study mode shows when it has no item on screen.
#[derive(Clone, Copy, Debug)]
pub enum Status<'a> {
    Loading { noun: &'a str },
    Failed { headline: &'a str, error: &'a ContentError },
    Finished { total: usize },
}

pub struct StatusPanel<'a> {
    status: Status<'a>,
    theme: &'a Theme,
    tick: usize,
}

impl<'a> StatusPanel<'a> {
    pub fn new(status: Status<'a>, theme: &'a Theme, tick: usize) -> Self {
        Self {
            status,
            theme,
            tick,
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let muted = Style::default().fg(colors.text_muted());
        match self.status {
            Status::Loading { noun } => vec![Line::from(Span::styled(
                format!("{} Generating {noun}…", spinner(self.tick)),
                Style::default().fg(colors.accent()),
            ))],
            Status::Failed { headline, error } => vec![
                Line::from(Span::styled(
                    headline,
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(error.to_string(), muted)),
                Line::from(""),
                Line::from(Span::styled("[n] Try another drug", muted)),
            ],
            Status::Finished { total } => vec![
                Line::from(Span::styled(
                    "Deck complete",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("You have seen all {total} drugs in this session."),
                    Style::default().fg(colors.fg()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Reset the session from the menu to reshuffle.",
                    muted,
                )),
            ],
        }
    }
}

impl Widget for StatusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = match self.status {
            Status::Failed { .. } => colors.error(),
            _ => colors.border(),
        };
        let block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()))
            .padding(Padding::new(1, 1, 1, 0));
        Paragraph::new(self.lines())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
