//! Modal dialog manager.
//!
//! Owns the open/closed state of the page's single modal surface, keeps the
//! overlay element in step with that state, suppresses page scroll while
//! open and traps keyboard focus inside the surface.
//!
//! # Invariants
//!
//! - At most one modal is open; `open` while open is ignored.
//! - An overlay element exists exactly when the modal is open.
//! - While open the body's `overflow` is `hidden`; `close` restores the value
//!   that was there before `open`, including "no value".
//!
//! # Failure Modes
//!
//! None are surfaced. Without a surface element in the document every
//! operation is inert.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use tracing::{debug, trace, warn};

use crate::constants::MODAL_FOCUS_DELAY;
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::focus::{FocusTrap, TabDirection};
use crate::keybindings::{Action, KeyBindings};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    /// The modal surface.
    pub surface_selector: String,
    /// Node inside the surface that receives injected content. The surface
    /// itself is used when no such node exists.
    pub content_selector: String,
    /// Elements that open the modal when clicked.
    pub trigger_selector: String,
    /// Attribute on a trigger carrying the content reference.
    pub trigger_attribute: String,
    /// Controls inside the surface that close it.
    pub close_selector: String,
    pub overlay_class: String,
    pub active_class: String,
    pub focus_delay: Duration,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            surface_selector: ".modal".to_string(),
            content_selector: ".modal-content".to_string(),
            trigger_selector: "[data-modal]".to_string(),
            trigger_attribute: "data-modal".to_string(),
            close_selector: ".modal-close".to_string(),
            overlay_class: "modal-overlay".to_string(),
            active_class: "active".to_string(),
            focus_delay: MODAL_FOCUS_DELAY,
        }
    }
}

/// Snapshot of the manager's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub is_open: bool,
    pub content: String,
    pub previously_focused_trigger: Option<NodeId>,
    saved_overflow: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredFocus {
    FirstFocusable(NodeId),
}

#[derive(Debug)]
pub struct ModalManager {
    config: ModalConfig,
    surface: Selector,
    content: Selector,
    trigger: Selector,
    close: Selector,
    overlay: Selector,
    state: ModalState,
    deferred: Scheduler<DeferredFocus>,
}

impl ModalManager {
    pub fn new(config: ModalConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            surface: Selector::parse(&config.surface_selector)?,
            content: Selector::parse(&config.content_selector)?,
            trigger: Selector::parse(&config.trigger_selector)?,
            close: Selector::parse(&config.close_selector)?,
            overlay: Selector::class(&config.overlay_class)?,
            config,
            state: ModalState::default(),
            deferred: Scheduler::new(),
        })
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn trigger_selector(&self) -> &Selector {
        &self.trigger
    }

    pub fn close_selector(&self) -> &Selector {
        &self.close
    }

    pub fn overlay_selector(&self) -> &Selector {
        &self.overlay
    }

    pub fn surface(&self, doc: &Document) -> Option<NodeId> {
        doc.query(&self.surface)
    }

    pub fn overlay(&self, doc: &Document) -> Option<NodeId> {
        doc.query(&self.overlay)
    }

    pub fn overlay_present(&self, doc: &Document) -> bool {
        self.overlay(doc).is_some()
    }

    /// Whether a deferred focus move is still waiting to run.
    pub fn focus_pending(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn next_deferred(&self) -> Option<Instant> {
        self.deferred.next_due()
    }

    /// Show `content` in the modal surface.
    pub fn open(&mut self, doc: &mut Document, content: &str, now: Instant) {
        if self.state.is_open {
            trace!("modal already open; ignoring open");
            return;
        }
        let Some(surface) = self.surface(doc) else {
            warn!(selector = %self.surface, "modal surface not found");
            return;
        };
        let target = doc
            .query_selector(surface, &self.content)
            .unwrap_or(surface);
        doc.set_inner_html(target, content);
        doc.remove_attr(surface, "hidden");
        doc.add_class(surface, &self.config.active_class);

        if self.overlay(doc).is_none() {
            let overlay = doc.create_element("div");
            doc.add_class(overlay, &self.config.overlay_class);
            let body = doc.body();
            doc.append_child(body, overlay);
        }

        let body = doc.body();
        self.state.saved_overflow = doc.style(body, "overflow").map(str::to_string);
        doc.set_style(body, "overflow", "hidden");

        self.state.is_open = true;
        self.state.content = content.to_string();
        self.deferred.schedule(
            now,
            self.config.focus_delay,
            DeferredFocus::FirstFocusable(surface),
        );
        debug!(surface = %surface, bytes = content.len(), "modal opened");
    }

    /// Open with the content referenced by `trigger`, remembering it as the
    /// element to return focus to.
    pub fn open_from_trigger(&mut self, doc: &mut Document, trigger: NodeId, now: Instant) {
        if self.state.is_open {
            trace!(trigger = %trigger, "modal already open; ignoring trigger");
            return;
        }
        let Some(content) = self.resolve_content(doc, trigger) else {
            warn!(trigger = %trigger, "trigger carries no content reference");
            return;
        };
        self.state.previously_focused_trigger = Some(trigger);
        self.open(doc, &content, now);
    }

    /// A `#id` reference naming an element resolves to that element's inner
    /// markup; any other value is used as inline content.
    pub fn resolve_content(&self, doc: &Document, trigger: NodeId) -> Option<String> {
        let reference = doc.attr(trigger, &self.config.trigger_attribute)?;
        if let Some(id) = reference.strip_prefix('#')
            && let Some(source) = doc.element_by_id(id)
        {
            return Some(doc.inner_html(source));
        }
        Some(reference.to_string())
    }

    pub fn close(&mut self, doc: &mut Document) {
        if !self.state.is_open {
            trace!("modal not open; ignoring close");
            return;
        }
        if let Some(surface) = self.surface(doc) {
            doc.remove_class(surface, &self.config.active_class);
            doc.set_attr(surface, "hidden", "");
        }
        for overlay in doc.query_all(&self.overlay) {
            doc.remove(overlay);
        }
        let body = doc.body();
        match self.state.saved_overflow.take() {
            Some(value) => doc.set_style(body, "overflow", &value),
            None => doc.remove_style(body, "overflow"),
        }
        self.state.is_open = false;

        let restore = self
            .state
            .previously_focused_trigger
            .filter(|t| doc.is_connected(*t))
            .or_else(|| doc.query(&self.trigger));
        if let Some(target) = restore {
            doc.focus(target);
        }
        debug!(restore = ?restore, "modal closed");
    }

    /// Keep Tab/Shift+Tab inside the surface. Returns whether the key press
    /// was consumed.
    pub fn trap_focus(&self, doc: &mut Document, key: &KeyEvent) -> bool {
        if !self.state.is_open {
            return false;
        }
        let Some(direction) = TabDirection::from_key(key) else {
            return false;
        };
        let Some(surface) = self.surface(doc) else {
            return false;
        };
        FocusTrap::new(surface).handle_tab(doc, direction)
    }

    /// Keyboard handling while open: the `CloseModal` keys close, Tab is
    /// trapped.
    pub fn handle_key(&mut self, doc: &mut Document, key: &KeyEvent, bindings: &KeyBindings) -> bool {
        if !self.state.is_open {
            return false;
        }
        if bindings.matches(Action::CloseModal, key) {
            self.close(doc);
            return true;
        }
        self.trap_focus(doc, key)
    }

    /// Run deferred focus moves that are due. A move scheduled by an `open`
    /// that has since been closed does nothing.
    pub fn run_deferred(&mut self, doc: &mut Document, now: Instant) {
        for task in self.deferred.take_due(now) {
            let DeferredFocus::FirstFocusable(surface) = task;
            if !self.state.is_open {
                trace!("modal closed before deferred focus ran");
                continue;
            }
            match FocusTrap::new(surface).focus_first(doc) {
                Some(node) => debug!(node = %node, "focused first modal control"),
                None => trace!("modal has no focusable content"),
            }
        }
    }
}
