use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::content::QuizQuestion;
use crate::ui::theme::Theme;

const OPTION_KEYS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Key that selects option `index`, shown next to it.
pub fn option_key(index: usize) -> Option<char> {
    OPTION_KEYS.get(index).copied()
}

/// Inverse of [`option_key`]; digits 1-4 work too.
pub fn option_index(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    OPTION_KEYS
        .iter()
        .position(|k| *k == key)
        .or_else(|| match key {
            '1'..='4' => Some(key as usize - '1' as usize),
            _ => None,
        })
}

pub struct QuizView<'a> {
    question: &'a QuizQuestion,
    selected: Option<usize>,
    streak: u32,
    best_streak: u32,
    theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(
        question: &'a QuizQuestion,
        selected: Option<usize>,
        streak: u32,
        best_streak: u32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            question,
            selected,
            streak,
            best_streak,
            theme,
        }
    }

    fn option_style(&self, index: usize) -> Style {
        let colors = &self.theme.colors;
        let Some(selected) = self.selected else {
            return Style::default().fg(colors.fg());
        };
        if self.question.is_correct(index) {
            Style::default()
                .fg(colors.success())
                .add_modifier(Modifier::BOLD)
        } else if index == selected {
            Style::default()
                .fg(colors.error())
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(colors.text_muted())
        }
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines = vec![
            Line::from(Span::styled(
                self.question.question.as_str(),
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (index, option) in self.question.options.iter().enumerate() {
            let key = option_key(index).unwrap_or(' ');
            let marker = if self.selected == Some(index) { ">" } else { " " };
            lines.push(Line::from(Span::styled(
                format!("{marker} [{key}] {option}"),
                self.option_style(index),
            )));
        }

        if let Some(selected) = self.selected {
            let (verdict, style) = if self.question.is_correct(selected) {
                ("Correct!", Style::default().fg(colors.success()))
            } else {
                ("Incorrect", Style::default().fg(colors.error()))
            };
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                verdict,
                style.add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                self.question.explanation.as_str(),
                Style::default().fg(colors.fg()),
            )));
        }

        let title = format!(" Streak {}  Best {} ", self.streak, self.best_streak);
        let block = Block::bordered()
            .title(" Practice Quiz ")
            .title_bottom(Line::from(title).right_aligned())
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()))
            .padding(Padding::horizontal(1));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
