use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Flashcards,
    Quiz,
    Lookup,
    ResetSession,
    Quit,
}

pub struct MenuItem {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

static ITEMS: [MenuItem; 5] = [
    MenuItem {
        key: '1',
        label: "Flashcards",
        description: "Brand and generic names, class and indication",
        action: MenuAction::Flashcards,
    },
    MenuItem {
        key: '2',
        label: "Practice Quiz",
        description: "Multiple-choice questions with explanations",
        action: MenuAction::Quiz,
    },
    MenuItem {
        key: '3',
        label: "Drug Lookup",
        description: "Study sheet for any drug name",
        action: MenuAction::Lookup,
    },
    MenuItem {
        key: 'r',
        label: "Reset Session",
        description: "Reshuffle the deck and start over",
        action: MenuAction::ResetSession,
    },
    MenuItem {
        key: 'q',
        label: "Quit",
        description: "Leave pharmtutor",
        action: MenuAction::Quit,
    },
];

pub struct Menu<'a> {
    pub items: &'static [MenuItem],
    pub selected: usize,
    pub theme: &'a Theme,
    /// Drawn under the title, e.g. "42 / 188 drugs drawn".
    pub subtitle: String,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            items: &ITEMS,
            selected: 0,
            theme,
            subtitle: String::new(),
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> MenuAction {
        self.items[self.selected].action
    }

    /// Action bound to a shortcut key, if any.
    pub fn action_for(&self, key: char) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "pharmtutor",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Pharmacy Technician Drug Study",
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                self.subtitle.as_str(),
                Style::default().fg(colors.text_muted()),
            )),
        ];

        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, (item, row)) in self.items.iter().zip(menu_layout.iter()).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };

            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} [{}] {}", item.key, item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_muted()),
                )),
            ];
            Paragraph::new(lines).render(*row, buf);
        }
    }
}
