//! Keyboard focus helpers.
//!
//! `focusable_descendants` answers "what can receive Tab focus inside this
//! container", and `FocusTrap` keeps Tab/Shift+Tab cycling inside it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::dom::{Document, NodeId};

const FOCUSABLE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDirection {
    Forward,
    Backward,
}

impl TabDirection {
    /// Classify a key press as a Tab traversal. Terminals report Shift+Tab
    /// either as `BackTab` or as `Tab` with the shift modifier.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::BackTab => Some(Self::Backward),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Self::Backward),
            KeyCode::Tab => Some(Self::Forward),
            _ => None,
        }
    }
}

/// `button`, anything with `href`, `input`, `select`, `textarea`, or an
/// explicit non-negative `tabindex`.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    if FOCUSABLE_TAGS.contains(&tag) || doc.has_attr(node, "href") {
        return true;
    }
    doc.attr(node, "tabindex")
        .and_then(|v| v.trim().parse::<i32>().ok())
        .is_some_and(|idx| idx >= 0)
}

/// Focusable elements under `container` in document order.
pub fn focusable_descendants(doc: &Document, container: NodeId) -> Vec<NodeId> {
    doc.descendants(container)
        .into_iter()
        .filter(|id| is_focusable(doc, *id))
        .collect()
}

/// Focusable elements of the whole page that are currently rendered.
pub fn tab_order(doc: &Document) -> Vec<NodeId> {
    focusable_descendants(doc, doc.root())
        .into_iter()
        .filter(|id| !doc.is_hidden(*id))
        .collect()
}

/// Default Tab traversal: step to the next/previous rendered focusable
/// element, wrapping at either end. Returns the newly focused element.
pub fn advance_focus(doc: &mut Document, direction: TabDirection) -> Option<NodeId> {
    let order = tab_order(doc);
    if order.is_empty() {
        return None;
    }
    let next = match doc.active_element().and_then(|a| order.iter().position(|n| *n == a)) {
        Some(idx) => {
            let step = match direction {
                TabDirection::Forward => 1isize,
                TabDirection::Backward => -1isize,
            };
            order[((idx as isize + step).rem_euclid(order.len() as isize)) as usize]
        }
        None => match direction {
            TabDirection::Forward => order[0],
            TabDirection::Backward => order[order.len() - 1],
        },
    };
    doc.focus(next).then_some(next)
}

/// Confines Tab traversal to the focusable descendants of one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrap {
    container: NodeId,
}

impl FocusTrap {
    pub const fn new(container: NodeId) -> Self {
        Self { container }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Focus the first focusable descendant. Focus is left alone when the
    /// container has none.
    pub fn focus_first(&self, doc: &mut Document) -> Option<NodeId> {
        let first = focusable_descendants(doc, self.container).into_iter().next()?;
        doc.focus(first).then_some(first)
    }

    /// Wrap focus at the edges of the container. Returns `true` when the Tab
    /// press was redirected; every other press is left to default traversal.
    pub fn handle_tab(&self, doc: &mut Document, direction: TabDirection) -> bool {
        let items = focusable_descendants(doc, self.container);
        let (Some(first), Some(last)) = (items.first().copied(), items.last().copied()) else {
            return false;
        };
        let active = doc.active_element();
        let target = match direction {
            TabDirection::Forward if active == Some(last) => first,
            TabDirection::Backward if active == Some(first) => last,
            _ => return false,
        };
        debug!(from = ?active, to = %target, ?direction, "focus trap wrapped");
        doc.focus(target);
        true
    }
}
