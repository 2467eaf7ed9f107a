//! Clipped drawing surface for the preview.
//!
//! Rows are placed from page coordinates and often land partly off a small
//! terminal. `ratatui::Buffer` panics on out-of-range writes, so components
//! only ever draw through `UiFrame`, which clips each call to the frame and
//! to the caller's own rectangle.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        Self::from_parts(area, frame.buffer_mut())
    }

    /// Draw into an offscreen buffer, as tests do.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        let area = area.intersection(buffer.area);
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn visible(&self, rect: Rect) -> Option<Rect> {
        let rect = rect.intersection(self.area);
        (!rect.is_empty()).then_some(rect)
    }

    pub fn render_widget<W: Widget>(&mut self, widget: W, area: Rect) {
        if let Some(rect) = self.visible(area) {
            widget.render(rect, self.buffer);
        }
    }

    /// Patch `style` onto every cell of `area`, keeping the symbols.
    pub fn patch_style(&mut self, area: Rect, style: Style) {
        if let Some(rect) = self.visible(area) {
            self.buffer.set_style(rect, style);
        }
    }

    /// Write `text` at (`x`, `y`), cut at the right edge of `within`.
    /// Nothing is drawn when the start cell falls outside `within`.
    /// Returns the number of cells written.
    pub fn put_str(&mut self, within: Rect, x: u16, y: u16, text: &str, style: Style) -> usize {
        let Some(rect) = self.visible(within) else {
            return 0;
        };
        if !rect.contains((x, y).into()) {
            return 0;
        }
        let room = usize::from(rect.right() - x);
        let text = truncate_to_width(text, room);
        let written = text.chars().count();
        self.buffer.set_string(x, y, text, style);
        written
    }
}

/// Keep at most `width` characters of `value`.
pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("ab\u{e9}def", 3), "ab\u{e9}");
    }

    #[test]
    fn put_str_stops_at_the_rect_edge() {
        let area = Rect::new(0, 0, 8, 2);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        let written = ui.put_str(Rect::new(0, 0, 4, 2), 1, 0, "hello", Style::default());
        assert_eq!(written, 3);
        assert_eq!(ui.put_str(area, 30, 0, "x", Style::default()), 0);
        assert_eq!(ui.put_str(area, 0, 9, "x", Style::default()), 0);
        assert_eq!(row(&buf, 0), " hel    ");
    }

    #[test]
    fn widgets_are_clipped_to_the_frame() {
        struct Fill;
        impl Widget for Fill {
            fn render(self, area: Rect, buf: &mut Buffer) {
                for x in area.x..area.right() {
                    buf[(x, area.y)].set_symbol("A");
                }
            }
        }
        let area = Rect::new(0, 0, 5, 3);
        let mut buf = Buffer::empty(area);
        UiFrame::from_parts(area, &mut buf).render_widget(Fill, Rect::new(3, 1, 5, 2));
        assert_eq!(row(&buf, 1), "   AA");
    }

    #[test]
    fn patch_style_keeps_symbols() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::with_lines(["xxx"]);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        ui.patch_style(Rect::new(1, 0, 10, 1), Style::default().add_modifier(Modifier::DIM));
        assert_eq!(buf[(2, 0)].symbol(), "x");
        assert!(buf[(2, 0)].modifier.contains(Modifier::DIM));
        assert!(!buf[(0, 0)].modifier.contains(Modifier::DIM));
    }
}
