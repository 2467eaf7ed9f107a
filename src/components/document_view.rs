//! Flattened, scrollable rendering of the page document.
//!
//! The document has no real layout engine. Each visible text run or control
//! becomes one terminal row, and `assign_layout` writes those rows back as
//! `LayoutBox`es so scroll-driven behaviors see consistent geometry.

use std::collections::HashMap;

use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{Component, ComponentContext};
use crate::dom::{Document, LayoutBox, NodeId};
use crate::focus;
use crate::ui::UiFrame;

const SKIPPED_TAGS: &[&str] = &["script", "style", "template", "head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Heading,
    Text,
    Control,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocRow {
    pub node: NodeId,
    pub depth: usize,
    pub kind: RowKind,
    pub text: String,
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn control_label(doc: &Document, node: NodeId) -> String {
    match doc.tag(node) {
        Some("input") | Some("textarea") | Some("select") => {
            let name = doc
                .attr(node, "placeholder")
                .or_else(|| doc.attr(node, "name"))
                .unwrap_or("field");
            let value = if doc.tag(node) == Some("textarea") {
                doc.text_content(node)
            } else {
                doc.attr(node, "value").unwrap_or_default().to_string()
            };
            format!("[{name}: {}]", collapse_ws(&value))
        }
        Some("a") => format!("<{}>", collapse_ws(&doc.text_content(node))),
        _ => {
            let label = collapse_ws(&doc.text_content(node));
            let label = if label.is_empty() {
                doc.attr(node, "aria-label").unwrap_or("button").to_string()
            } else {
                label
            };
            if doc.has_attr(node, "disabled") {
                format!("[{label}] (disabled)")
            } else {
                format!("[{label}]")
            }
        }
    }
}

fn own_text(doc: &Document, node: NodeId) -> String {
    let joined: Vec<&str> = doc
        .children(node)
        .iter()
        .filter_map(|c| doc.text(*c))
        .collect();
    collapse_ws(&joined.join(" "))
}

/// Rows for the rendered part of `scope`, skipping hidden subtrees and any
/// node in `skip`.
pub fn flatten(doc: &Document, scope: NodeId, skip: &[NodeId]) -> Vec<DocRow> {
    let mut rows = Vec::new();
    walk(doc, scope, 0, skip, &mut rows);
    rows
}

fn walk(doc: &Document, node: NodeId, depth: usize, skip: &[NodeId], rows: &mut Vec<DocRow>) {
    for child in doc.child_elements(node) {
        if skip.contains(&child) || doc.has_attr(child, "hidden") {
            continue;
        }
        let tag = doc.tag(child).unwrap_or_default();
        if SKIPPED_TAGS.contains(&tag) {
            continue;
        }
        if focus::is_focusable(doc, child) {
            rows.push(DocRow {
                node: child,
                depth,
                kind: RowKind::Control,
                text: control_label(doc, child),
            });
            continue;
        }
        if tag == "img" {
            let alt = doc.attr(child, "alt").unwrap_or("image");
            let state = match doc.attr(child, "src") {
                Some(src) => src.to_string(),
                None => "loading".to_string(),
            };
            rows.push(DocRow {
                node: child,
                depth,
                kind: RowKind::Image,
                text: format!("(img: {alt}, {state})"),
            });
            continue;
        }
        let text = own_text(doc, child);
        let next_depth = if text.is_empty() {
            depth
        } else {
            let kind = if matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
                RowKind::Heading
            } else {
                RowKind::Text
            };
            rows.push(DocRow {
                node: child,
                depth,
                kind,
                text,
            });
            depth + 1
        };
        walk(doc, child, next_depth, skip, rows);
    }
}

/// Give every row node, and every ancestor up to the root, a `LayoutBox`
/// spanning its rows.
pub fn assign_layout(doc: &mut Document, rows: &[DocRow], row_height: f64) {
    let mut spans: HashMap<NodeId, (usize, usize)> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let mut cur = Some(row.node);
        while let Some(id) = cur {
            spans
                .entry(id)
                .and_modify(|(first, last)| {
                    *first = (*first).min(idx);
                    *last = (*last).max(idx);
                })
                .or_insert((idx, idx));
            cur = doc.parent(id);
        }
    }
    for (id, (first, last)) in spans {
        let top = first as f64 * row_height;
        let height = (last - first + 1) as f64 * row_height;
        doc.set_layout(id, LayoutBox::new(top, height));
    }
}

#[derive(Debug, Default)]
pub struct DocumentView {
    rows: Vec<DocRow>,
    focused: Option<NodeId>,
    first_row: usize,
    area: Rect,
}

impl DocumentView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild rows from `doc`, write their geometry back, and follow the
    /// viewport. `skip` removes subtrees rendered elsewhere.
    pub fn sync(&mut self, doc: &mut Document, skip: &[NodeId], row_height: f64) {
        self.rows = flatten(doc, doc.body(), skip);
        assign_layout(doc, &self.rows, row_height);
        self.focused = doc.active_element();
        let y = doc.viewport().scroll_y.max(0.0);
        self.first_row = (y / row_height).round() as usize;
    }

    pub fn rows(&self) -> &[DocRow] {
        &self.rows
    }

    /// Node drawn at terminal row `y` by the last render.
    pub fn node_at(&self, y: u16) -> Option<NodeId> {
        if y < self.area.y || y >= self.area.y.saturating_add(self.area.height) {
            return None;
        }
        let idx = self.first_row + (y - self.area.y) as usize;
        self.rows.get(idx).map(|r| r.node)
    }
}

impl Component for DocumentView {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let palette = ctx.palette();
        frame.patch_style(area, palette.base());
        for (line, row) in self
            .rows
            .iter()
            .skip(self.first_row)
            .take(area.height as usize)
            .enumerate()
        {
            let style = if Some(row.node) == self.focused {
                palette.focused()
            } else {
                match row.kind {
                    RowKind::Heading => palette
                        .base()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                    RowKind::Control => palette.base().fg(palette.link),
                    RowKind::Image => palette.base().fg(palette.muted),
                    RowKind::Text => palette.base(),
                }
            };
            let x = area.x.saturating_add((row.depth * 2) as u16);
            let y = area.y + line as u16;
            frame.put_str(area, x, y, &row.text, style);
        }
        if ctx.overlay() {
            frame.patch_style(area, palette.backdrop());
        }
    }
}
