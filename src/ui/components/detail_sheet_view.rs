use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::content::DetailSheet;
use crate::study::lookup::{LookupState, LookupStatus};
use crate::ui::theme::Theme;

/// Search box on top, study sheet (or search status) underneath.
pub struct DetailSheetView<'a> {
    lookup: &'a LookupState,
    theme: &'a Theme,
    /// Drives the spinner while a search is running.
    tick: usize,
}

impl<'a> DetailSheetView<'a> {
    pub fn new(lookup: &'a LookupState, theme: &'a Theme, tick: usize) -> Self {
        Self {
            lookup,
            theme,
            tick,
        }
    }

    fn input_line(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let (before, cursor, after) = self.lookup.input.render_parts();
        let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
        let text = Style::default().fg(colors.fg());
        let cursor_text = cursor.map_or_else(|| " ".to_string(), String::from);
        Line::from(vec![
            Span::styled(before, text),
            Span::styled(cursor_text, cursor_style),
            Span::styled(after, text),
        ])
    }

    fn sheet_lines(&self, sheet: &'a DetailSheet) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.text_muted());
        let value = Style::default().fg(colors.fg());
        let field = |name: &'static str, text: &'a str| {
            Line::from(vec![
                Span::styled(format!("{name:<12}"), label),
                Span::styled(text, value),
            ])
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} ({})", sheet.brand_name, sheet.generic_name),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Class", &sheet.drug_class),
            field("Indication", &sheet.indication),
            field("Schedule", &sheet.schedule),
            Line::from(""),
            Line::from(Span::styled("Common side effects", label)),
        ];
        lines.extend(
            sheet
                .side_effects
                .iter()
                .map(|effect| Line::from(Span::styled(format!("  • {effect}"), value))),
        );
        lines
    }

    fn body_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        match self.lookup.status() {
            LookupStatus::Idle => vec![Line::from(Span::styled(
                "Type a brand or generic name and press Enter.",
                Style::default().fg(colors.text_muted()),
            ))],
            LookupStatus::Searching { query } => vec![Line::from(Span::styled(
                format!("{} Looking up {query}…", spinner(self.tick)),
                Style::default().fg(colors.accent()),
            ))],
            LookupStatus::Found(sheet) => self.sheet_lines(sheet),
            LookupStatus::Failed { query, message } => vec![
                Line::from(Span::styled(
                    format!("Could not look up {query}."),
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(colors.text_muted()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Enter to try again.",
                    Style::default().fg(colors.fg()),
                )),
            ],
        }
    }
}

pub fn spinner(tick: usize) -> char {
    const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
    FRAMES[tick % FRAMES.len()]
}

impl Widget for DetailSheetView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let search = Block::bordered()
            .title(" Drug Lookup ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(self.input_line())
            .block(search)
            .render(rows[0], buf);

        let sheet = Block::bordered()
            .title(" Study Sheet ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()))
            .padding(Padding::horizontal(1));
        Paragraph::new(self.body_lines())
            .block(sheet)
            .wrap(Wrap { trim: false })
            .render(rows[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::ui::components::buffer_text;

    fn draw(lookup: &LookupState) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 18);
        let mut buf = Buffer::empty(area);
        DetailSheetView::new(lookup, &theme, 0).render(area, &mut buf);
        buffer_text(&buf)
    }

    fn searching(query: &str) -> (LookupState, u64) {
        let mut lookup = LookupState::default();
        for ch in query.chars() {
            lookup.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        let (seq, _) = lookup.submit().unwrap();
        (lookup, seq)
    }

    #[test]
    fn idle_prompts_for_a_name() {
        assert!(draw(&LookupState::default()).contains("Type a brand or generic name"));
    }

    #[test]
    fn searching_echoes_the_query() {
        let (lookup, _) = searching("warfarin");
        let text = draw(&lookup);
        assert!(text.contains("warfarin"));
        assert!(text.contains("Looking up warfarin"));
    }

    #[test]
    fn found_sheet_lists_every_field() {
        let (mut lookup, seq) = searching("coumadin");
        lookup.complete(
            seq,
            Ok(DetailSheet {
                brand_name: "Coumadin".to_string(),
                generic_name: "Warfarin".to_string(),
                drug_class: "Anticoagulant".to_string(),
                indication: "Thromboembolism".to_string(),
                side_effects: vec!["Bleeding".to_string(), "Bruising".to_string()],
                schedule: "Legend/Rx Only".to_string(),
            }),
        );
        let text = draw(&lookup);
        for expected in [
            "Coumadin (Warfarin)",
            "Anticoagulant",
            "Thromboembolism",
            "Legend/Rx Only",
            "• Bleeding",
            "• Bruising",
        ] {
            assert!(text.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner(0), '|');
        assert_eq!(spinner(5), '/');
    }
}
