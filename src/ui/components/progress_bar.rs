use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::session::Progress;
use crate::ui::theme::Theme;

/// One-row deck progress: filled cells for drawn cards, `taken / total` text.
pub struct ProgressBar<'a> {
    pub progress: Progress,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(progress: Progress, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }

    fn label(&self) -> String {
        format!("{} / {}", self.progress.taken, self.progress.total)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;
        let ratio = self.progress.ratio().clamp(0.0, 1.0);
        let filled_width = (ratio * area.width as f64) as u16;

        for x in area.x..area.x + area.width {
            let style = if x < area.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, area.y)].set_style(style);
        }

        let label = self.label();
        let label_x = area.x + (area.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, area.y, &label, Style::default());
    }
}
