use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: study panel centred at a readable width
    Narrow, // <90 cols: study panel uses the full width
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    /// `footer_lines` is the number of hint and disclaimer rows below the panel.
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(footer_lines),
            ])
            .split(area);

        let main = match tier {
            LayoutTier::Wide => centered_column(vertical[1], 80),
            LayoutTier::Narrow => vertical[1],
        };

        Self {
            header: vertical[0],
            main,
            footer: vertical[2],
            tier,
        }
    }
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    let left = area.x + (area.width - width) / 2;
    Rect::new(left, area.y, width, area.height)
}

pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let chars = text.chars().count().max(1);
    chars.div_ceil(width)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|hint| !hint.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 44;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminals_centre_the_panel() {
        let layout = AppLayout::new(Rect::new(0, 0, 120, 40), 2);
        assert_eq!(layout.tier, LayoutTier::Wide);
        assert_eq!(layout.main.width, 80);
        assert_eq!(layout.main.x, 20);
        assert_eq!(layout.footer.height, 2);
    }

    #[test]
    fn narrow_terminals_use_full_width() {
        let layout = AppLayout::new(Rect::new(0, 0, 60, 30), 2);
        assert_eq!(layout.tier, LayoutTier::Narrow);
        assert_eq!(layout.main.width, 60);
    }

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[Space] Flip", "[n] Next", "", "[Esc] Menu"], 24);
        assert_eq!(lines, vec!["  [Space] Flip  [n] Next", "  [Esc] Menu"]);
        assert!(pack_hint_lines(&[], 80).is_empty());
    }

    #[test]
    fn wrapped_count() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("abcdefghijk", 10), 2);
        assert_eq!(wrapped_line_count("abc", 0), 0);
    }

    #[test]
    fn popup_is_clamped_to_area() {
        let area = Rect::new(0, 0, 30, 5);
        assert_eq!(centered_rect(50, 50, area), area);
    }
}
