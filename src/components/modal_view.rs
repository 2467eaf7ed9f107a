use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear};

use super::document_view::{DocRow, flatten};
use super::{Component, ComponentContext};
use crate::dom::{Document, NodeId};
use crate::modal::ModalManager;
use crate::ui::UiFrame;

/// Centered box showing the modal surface's content while it is open.
#[derive(Debug, Clone)]
pub struct ModalView {
    title: String,
    rows: Vec<DocRow>,
    focused: Option<NodeId>,
    visible: bool,
    width: u16,
    height: u16,
    rect: Rect,
}

impl ModalView {
    pub fn new() -> Self {
        Self {
            title: "Details".to_string(),
            rows: Vec::new(),
            focused: None,
            visible: false,
            width: 64,
            height: 14,
            rect: Rect::default(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn rows(&self) -> &[DocRow] {
        &self.rows
    }

    pub fn sync(&mut self, doc: &Document, modal: &ModalManager) {
        self.visible = modal.is_open();
        self.rows = match modal.surface(doc) {
            Some(surface) if self.visible => flatten(doc, surface, &[]),
            _ => Vec::new(),
        };
        self.focused = doc.active_element();
    }

    /// Clamp the box to `area` so small terminals never draw outside the
    /// buffer.
    pub fn rect_for(&self, area: Rect) -> Rect {
        let mut width = area.width.min(self.width).max(1);
        let mut height = area.height.min(self.height).max(1);
        if area.width >= 24 {
            width = width.max(24);
        }
        if area.height >= 5 {
            height = height.max(5);
        }
        let x = area.x.saturating_add(area.width.saturating_sub(width) / 2);
        let y = area
            .y
            .saturating_add(area.height.saturating_sub(height) / 2);
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Node drawn at terminal cell (`x`, `y`) by the last render.
    pub fn node_at(&self, x: u16, y: u16) -> Option<NodeId> {
        let inner = self.inner();
        if !self.visible || !inner.contains((x, y).into()) {
            return None;
        }
        self.rows.get((y - inner.y) as usize).map(|r| r.node)
    }

    /// Whether (`x`, `y`) lies inside the last rendered box.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.visible && self.rect.contains((x, y).into())
    }

    fn inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.rect)
    }
}

impl Default for ModalView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ModalView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if !self.visible || area.width == 0 || area.height == 0 {
            self.rect = Rect::default();
            return;
        }
        let palette = ctx.palette();
        self.rect = self.rect_for(area);
        frame.render_widget(Clear, self.rect);
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .style(palette.dialog());
        frame.render_widget(block, self.rect);

        let inner = self.inner();
        for (line, row) in self.rows.iter().take(inner.height as usize).enumerate() {
            let style = if Some(row.node) == self.focused {
                palette.focused()
            } else {
                palette.dialog()
            };
            let x = inner.x.saturating_add((row.depth * 2) as u16);
            frame.put_str(inner, x, inner.y + line as u16, &row.text, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::ModalConfig;
    use ratatui::buffer::Buffer;
    use std::time::Instant;

    #[test]
    fn rect_for_clamps_sizes() {
        let view = ModalView::new();
        let r = view.rect_for(Rect::new(0, 0, 10, 2));
        assert!(r.width >= 1 && r.width <= 10);
        assert!(r.height >= 1 && r.height <= 2);

        let r2 = view.rect_for(Rect::new(0, 0, 80, 10));
        assert!(r2.width >= 24);
        assert!(r2.height >= 5);
        assert_eq!(r2.x, (80 - r2.width) / 2);
    }

    #[test]
    fn shows_surface_rows_only_while_open() {
        let mut doc = Document::from_markup(
            r#"<button data-modal="<p>Hi</p><button>OK</button>">Open</button><div class="modal" hidden><div class="modal-content"></div></div>"#,
        );
        let mut modal = ModalManager::new(ModalConfig::default()).unwrap();
        let mut view = ModalView::new();
        view.sync(&doc, &modal);
        assert!(!view.visible());

        let trigger = doc.query_str("button").unwrap().unwrap();
        modal.open_from_trigger(&mut doc, trigger, Instant::now());
        view.sync(&doc, &modal);
        assert!(view.visible());
        let texts: Vec<&str> = view.rows().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "[OK]"]);

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        view.render(
            &mut UiFrame::from_parts(area, &mut buf),
            area,
            &ComponentContext::default(),
        );
        let inner = view.inner();
        assert_eq!(view.node_at(inner.x, inner.y + 1), view.rows().get(1).map(|r| r.node));
        assert!(view.contains(inner.x, inner.y));
        assert!(!view.contains(0, 0));
    }
}
