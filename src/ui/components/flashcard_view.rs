use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::content::Flashcard;
use crate::ui::theme::Theme;

pub struct FlashcardView<'a> {
    card: &'a Flashcard,
    flipped: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardView<'a> {
    pub fn new(card: &'a Flashcard, flipped: bool, theme: &'a Theme) -> Self {
        Self {
            card,
            flipped,
            theme,
        }
    }

    fn front(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        vec![
            Line::from(Span::styled(
                format!("{} Name", self.card.side),
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                self.card.term.as_str(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "press space to reveal",
                Style::default().fg(colors.text_muted()),
            )),
        ]
    }

    fn back(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.text_muted());
        let value = Style::default().fg(colors.fg());
        vec![
            Line::from(Span::styled(self.card.side.answer_label(), label)),
            Line::from(Span::styled(
                self.card.answer.as_str(),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Class", label)),
            Line::from(Span::styled(self.card.drug_class.as_str(), value)),
            Line::from(""),
            Line::from(Span::styled("Indication", label)),
            Line::from(Span::styled(self.card.indication.as_str(), value)),
        ]
    }
}

impl Widget for FlashcardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (lines, bg, title) = if self.flipped {
            (self.back(), colors.card_back_bg(), " Back ")
        } else {
            (self.front(), colors.bg(), " Front ")
        };

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(bg))
            .padding(Padding::vertical(1));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Side;
    use crate::ui::components::buffer_text;

    fn card() -> Flashcard {
        Flashcard {
            term: "Zestril".to_string(),
            side: Side::Brand,
            answer: "Lisinopril".to_string(),
            drug_class: "ACE inhibitor".to_string(),
            indication: "Hypertension".to_string(),
            generic_name: "Lisinopril".to_string(),
        }
    }

    fn draw(flipped: bool) -> String {
        let theme = Theme::default();
        let card = card();
        let area = Rect::new(0, 0, 50, 14);
        let mut buf = Buffer::empty(area);
        FlashcardView::new(&card, flipped, &theme).render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn front_hides_the_answer() {
        let text = draw(false);
        assert!(text.contains("Brand Name"));
        assert!(text.contains("Zestril"));
        assert!(!text.contains("Lisinopril"));
    }

    #[test]
    fn back_shows_answer_class_and_indication() {
        let text = draw(true);
        assert!(text.contains("Generic Name"));
        assert!(text.contains("Lisinopril"));
        assert!(text.contains("ACE inhibitor"));
        assert!(text.contains("Hypertension"));
    }
}
