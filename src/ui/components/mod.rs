pub mod detail_sheet_view;
pub mod flashcard_view;
pub mod menu;
pub mod progress_bar;
pub mod quiz_view;
pub mod status_panel;

/// Flattens a rendered buffer into newline-separated rows.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
