//! Page runtime: owns the document and every behavior, and routes input
//! through a `Dispatcher`.
//!
//! `PageState` is what handlers see; `Page` pairs it with the dispatcher so
//! routes can borrow the state mutably while the dispatcher walks its table.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::ajax::Transport;
use crate::contact_form::{ContactForm, ContactFormConfig};
use crate::dispatch::{Dispatcher, DomEvent, EventKind, HasDocument, Propagation};
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::focus::{self, TabDirection};
use crate::header::{Header, HeaderConfig};
use crate::keybindings::{Action, KeyBindings};
use crate::lazy_images::{LazyImageConfig, LazyImages};
use crate::load_more::{LoadMore, LoadMoreConfig};
use crate::modal::{ModalConfig, ModalManager};
use crate::smooth_scroll::SmoothScroll;
use crate::storage::Storage;
use crate::theme_toggle::{Theme, ThemeConfig, ThemeToggle};

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub modal: ModalConfig,
    pub theme: ThemeConfig,
    pub contact: ContactFormConfig,
    pub load_more: LoadMoreConfig,
    pub header: HeaderConfig,
    pub lazy_images: LazyImageConfig,
    pub smooth_scroll_duration: Duration,
    /// Theme used when storage holds no choice.
    pub system_theme: Theme,
    /// Distance moved by a single scroll step.
    pub scroll_step: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            modal: ModalConfig::default(),
            theme: ThemeConfig::default(),
            contact: ContactFormConfig::default(),
            load_more: LoadMoreConfig::default(),
            header: HeaderConfig::default(),
            lazy_images: LazyImageConfig::default(),
            smooth_scroll_duration: crate::constants::SMOOTH_SCROLL_DURATION,
            system_theme: Theme::Light,
            scroll_step: crate::constants::PREVIEW_ROW_HEIGHT,
        }
    }
}

pub struct PageState {
    pub doc: Document,
    pub modal: ModalManager,
    pub theme: ThemeToggle,
    pub contact: ContactForm,
    pub load_more: LoadMore,
    pub header: Header,
    pub smooth: SmoothScroll,
    pub lazy: LazyImages,
    pub storage: Box<dyn Storage>,
    pub transport: Box<dyn Transport>,
    bindings: KeyBindings,
    scroll_step: f64,
    now: Instant,
}

impl HasDocument for PageState {
    fn document(&self) -> &Document {
        &self.doc
    }
}

impl PageState {
    pub fn now(&self) -> Instant {
        self.now
    }

    fn scroll_locked(&self) -> bool {
        self.doc.style(self.doc.body(), "overflow") == Some("hidden")
    }
}

/// Result of feeding one key press to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Quit,
}

pub struct Page {
    state: PageState,
    dispatcher: Dispatcher<PageState>,
}

impl Page {
    pub fn new(
        mut doc: Document,
        storage: Box<dyn Storage>,
        transport: Box<dyn Transport>,
        config: PageConfig,
        now: Instant,
    ) -> Result<Self, SelectorError> {
        let theme = ThemeToggle::init(&mut doc, storage.as_ref(), config.system_theme, config.theme)?;
        let mut state = PageState {
            modal: ModalManager::new(config.modal)?,
            theme,
            contact: ContactForm::new(config.contact)?,
            load_more: LoadMore::new(config.load_more)?,
            header: Header::new(config.header)?,
            smooth: SmoothScroll::new(config.smooth_scroll_duration)?,
            lazy: LazyImages::new(config.lazy_images)?,
            doc,
            storage,
            transport,
            bindings: KeyBindings::default(),
            scroll_step: config.scroll_step,
            now,
        };
        state.header.update(&mut state.doc);
        state.lazy.scan(&mut state.doc);

        let mut dispatcher = Dispatcher::new();
        wire(&mut dispatcher, &state);
        debug!(routes = dispatcher.len(), "page wired");
        Ok(Self { state, dispatcher })
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    pub fn document(&self) -> &Document {
        &self.state.doc
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.state.bindings
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.state.bindings = bindings;
    }

    pub fn dispatch(&mut self, event: &DomEvent, now: Instant) -> Propagation {
        self.state.now = now;
        self.dispatcher.dispatch(&mut self.state, event)
    }

    /// Click `target`. Focusable targets take focus first, as a pointer press
    /// would; submit buttons submit their form unless a route stopped the click.
    pub fn click(&mut self, target: NodeId, now: Instant) -> Propagation {
        if focus::is_focusable(&self.state.doc, target) {
            self.state.doc.focus(target);
        }
        let result = self.dispatch(&DomEvent::Click { target }, now);
        if result == Propagation::Continue && self.is_submit_button(target) {
            let form = Selector::parse("form")
                .ok()
                .and_then(|sel| self.state.doc.closest(target, &sel));
            if let Some(form) = form {
                return self.dispatch(&DomEvent::Submit { target: form }, now);
            }
        }
        result
    }

    fn is_submit_button(&self, node: NodeId) -> bool {
        let doc = &self.state.doc;
        doc.tag(node) == Some("button") && doc.attr(node, "type").is_none_or(|t| t == "submit")
    }

    /// Activate the focused element, as Enter/Space would.
    pub fn activate_focused(&mut self, now: Instant) -> bool {
        match self.state.doc.active_element() {
            Some(active) => {
                self.click(active, now);
                true
            }
            None => false,
        }
    }

    pub fn key(&mut self, key: &KeyEvent, now: Instant) -> KeyOutcome {
        if self.dispatch(&DomEvent::KeyDown(*key), now) == Propagation::Stop {
            return KeyOutcome::Handled;
        }
        if self.edit_field(key, now) {
            return KeyOutcome::Handled;
        }
        let kb = &self.state.bindings;
        let action = [
            Action::Quit,
            Action::FocusNext,
            Action::FocusPrev,
            Action::Activate,
            Action::ToggleTheme,
            Action::ScrollUp,
            Action::ScrollDown,
            Action::ScrollPageUp,
            Action::ScrollPageDown,
            Action::ScrollHome,
            Action::ScrollEnd,
        ]
        .into_iter()
        .find(|a| kb.matches(*a, key));
        let Some(action) = action else {
            return KeyOutcome::Ignored;
        };
        let step = self.state.scroll_step;
        let page = self.state.doc.viewport().height;
        match action {
            Action::Quit => return KeyOutcome::Quit,
            Action::FocusNext => {
                focus::advance_focus(&mut self.state.doc, TabDirection::Forward);
            }
            Action::FocusPrev => {
                focus::advance_focus(&mut self.state.doc, TabDirection::Backward);
            }
            Action::Activate => {
                if !self.activate_focused(now) {
                    return KeyOutcome::Ignored;
                }
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::ScrollUp => self.scroll_by(-step, now),
            Action::ScrollDown => self.scroll_by(step, now),
            Action::ScrollPageUp => self.scroll_by(-page, now),
            Action::ScrollPageDown => self.scroll_by(page, now),
            Action::ScrollHome => self.scroll_to(0.0, now),
            Action::ScrollEnd => self.scroll_to(self.max_scroll(), now),
            // an open modal consumes its close keys during dispatch
            Action::CloseModal => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    /// Text entry into a focused `input` or `textarea`. Enter in a single-line
    /// input submits its form.
    fn edit_field(&mut self, key: &KeyEvent, now: Instant) -> bool {
        let Some(field) = self.state.doc.active_element() else {
            return false;
        };
        let multiline = match self.state.doc.tag(field) {
            Some("input") => false,
            Some("textarea") => true,
            _ => return false,
        };
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        let doc = &mut self.state.doc;
        let mut value = if multiline {
            doc.text_content(field)
        } else {
            doc.attr(field, "value").unwrap_or_default().to_string()
        };
        match key.code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter if multiline => value.push('\n'),
            KeyCode::Enter => {
                let form = Selector::parse("form")
                    .ok()
                    .and_then(|sel| doc.closest(field, &sel));
                if let Some(form) = form {
                    self.dispatch(&DomEvent::Submit { target: form }, now);
                }
                return true;
            }
            _ => return false,
        }
        if multiline {
            doc.set_text(field, &value);
        } else {
            doc.set_attr(field, "value", &value);
        }
        true
    }

    pub fn toggle_theme(&mut self) {
        let s = &mut self.state;
        if let Err(err) = s.theme.toggle(&mut s.doc, s.storage.as_mut()) {
            warn!(%err, "theme choice not stored");
        }
    }

    fn max_scroll(&self) -> f64 {
        let doc = &self.state.doc;
        let bottom = doc
            .descendants(doc.body())
            .into_iter()
            .map(|n| doc.layout(n).bottom())
            .fold(0.0, f64::max);
        (bottom - doc.viewport().height).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f64, now: Instant) {
        let y = self.state.doc.viewport().scroll_y + delta;
        self.scroll_to(y.min(self.max_scroll()), now);
    }

    /// Move the viewport and notify scroll listeners. Ignored while page
    /// scroll is suppressed.
    pub fn scroll_to(&mut self, y: f64, now: Instant) {
        if self.state.scroll_locked() {
            return;
        }
        self.state.doc.set_scroll_y(y);
        self.dispatch(&DomEvent::Scroll, now);
    }

    /// Advance time: deferred focus, running scroll animation, and the
    /// trailing edges of throttled/debounced scroll work.
    pub fn tick(&mut self, now: Instant) {
        self.state.now = now;
        let s = &mut self.state;
        s.modal.run_deferred(&mut s.doc, now);
        if s.smooth.tick(&mut s.doc, now) {
            self.dispatch(&DomEvent::Scroll, now);
        }
        let s = &mut self.state;
        s.header.flush(&mut s.doc, now);
        s.lazy.tick(&mut s.doc, now);
    }

    /// Earliest instant at which `tick` has work to do: the next animation
    /// frame, a deferred focus move, a held-back header update or a settled
    /// lazy-image scan. `None` when the page is idle.
    pub fn next_wake(&self) -> Option<Instant> {
        let s = &self.state;
        let frame = s
            .smooth
            .animating()
            .then(|| s.now + crate::constants::ANIMATION_FRAME);
        [
            frame,
            s.modal.next_deferred(),
            s.header.next_flush(),
            s.lazy.next_scan(),
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

fn wire(dispatcher: &mut Dispatcher<PageState>, state: &PageState) {
    // Modal: close controls and the overlay are checked before triggers so
    // a trigger rendered inside modal content cannot reopen over itself.
    dispatcher.on(
        EventKind::Click,
        Some(state.modal.close_selector().clone()),
        |s: &mut PageState, _, _| {
            if !s.modal.is_open() {
                return Propagation::Continue;
            }
            s.modal.close(&mut s.doc);
            Propagation::Stop
        },
    );
    dispatcher.on(
        EventKind::Click,
        Some(state.modal.overlay_selector().clone()),
        |s: &mut PageState, _, _| {
            s.modal.close(&mut s.doc);
            Propagation::Stop
        },
    );
    dispatcher.on(
        EventKind::Click,
        Some(state.modal.trigger_selector().clone()),
        |s: &mut PageState, _, hit| {
            if let Some(trigger) = hit {
                let now = s.now;
                s.modal.open_from_trigger(&mut s.doc, trigger, now);
            }
            Propagation::Stop
        },
    );
    dispatcher.on(EventKind::KeyDown, None, |s: &mut PageState, event, _| {
        let DomEvent::KeyDown(key) = event else {
            return Propagation::Continue;
        };
        if s.modal.handle_key(&mut s.doc, key, &s.bindings) {
            Propagation::Stop
        } else {
            Propagation::Continue
        }
    });

    dispatcher.on(
        EventKind::Click,
        Some(state.theme.button_selector().clone()),
        |s: &mut PageState, _, _| {
            if let Err(err) = s.theme.toggle(&mut s.doc, s.storage.as_mut()) {
                warn!(%err, "theme choice not stored");
            }
            Propagation::Stop
        },
    );

    dispatcher.on(
        EventKind::Click,
        Some(state.load_more.button_selector().clone()),
        |s: &mut PageState, _, hit| {
            if let Some(button) = hit {
                s.load_more.load(&mut s.doc, button, s.transport.as_mut());
                s.lazy.scan(&mut s.doc);
            }
            Propagation::Stop
        },
    );

    dispatcher.on(
        EventKind::Submit,
        Some(state.contact.form_selector().clone()),
        |s: &mut PageState, _, _| {
            s.contact.submit(&mut s.doc, s.transport.as_mut());
            Propagation::Stop
        },
    );

    dispatcher.on(
        EventKind::Click,
        Some(state.smooth.anchor_selector().clone()),
        |s: &mut PageState, _, hit| {
            let Some(anchor) = hit else {
                return Propagation::Continue;
            };
            let offset = s.header.height(&s.doc);
            if s.smooth.start(&s.doc, anchor, offset, s.now) {
                Propagation::Stop
            } else {
                Propagation::Continue
            }
        },
    );

    dispatcher.on(EventKind::Scroll, None, |s: &mut PageState, _, _| {
        let now = s.now;
        s.header.on_scroll(&mut s.doc, now);
        s.lazy.on_scroll(now);
        Propagation::Continue
    });
}

/// Read a page markup file into a fresh document.
pub fn load_document(path: &Path) -> io::Result<Document> {
    let markup = fs::read_to_string(path)?;
    Ok(Document::from_markup(&markup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ajax::CannedTransport;
    use crate::constants::{HEADER_THROTTLE, LAZY_IMAGE_DEBOUNCE};
    use crate::storage::MemoryStorage;

    const PAGE: &str = r##"<header><button class="theme-toggle">theme</button></header>
<button id="open" data-modal="#tpl">Details</button>
<div id="tpl" hidden><button id="ok">OK</button><a id="more" href="/more">More</a></div>
<div class="modal" hidden><div class="modal-content"></div><button class="modal-close">Close</button></div>"##;

    fn page() -> (Page, Instant) {
        let now = Instant::now();
        let page = Page::new(
            Document::from_markup(PAGE),
            Box::new(MemoryStorage::new()),
            Box::new(CannedTransport::new()),
            PageConfig::default(),
            now,
        )
        .unwrap();
        (page, now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn trigger_click_opens_and_escape_closes() {
        let (mut page, t0) = page();
        let open = page.document().element_by_id("open").unwrap();
        assert_eq!(page.click(open, t0), Propagation::Stop);
        assert!(page.state().modal.is_open());
        assert_eq!(page.document().active_element(), Some(open));

        page.tick(t0 + crate::constants::MODAL_FOCUS_DELAY);
        let focused = page.document().active_element().unwrap();
        assert_eq!(page.document().text_content(focused), "OK");

        assert_eq!(page.key(&key(KeyCode::Esc), t0), KeyOutcome::Handled);
        assert!(!page.state().modal.is_open());
        assert_eq!(page.document().active_element(), Some(open));
    }

    #[test]
    fn close_control_and_overlay_close_the_modal() {
        let (mut page, t0) = page();
        let open = page.document().element_by_id("open").unwrap();
        page.click(open, t0);
        let close = page.document().query_str(".modal-close").unwrap().unwrap();
        page.click(close, t0);
        assert!(!page.state().modal.is_open());

        page.click(open, t0);
        let overlay = page.state().modal.overlay(page.document()).unwrap();
        page.click(overlay, t0);
        assert!(!page.state().modal.is_open());
        assert!(!page.state().modal.overlay_present(page.document()));
    }

    #[test]
    fn escape_while_closed_is_not_consumed_by_modal() {
        let (mut page, t0) = page();
        assert_eq!(page.key(&key(KeyCode::Esc), t0), KeyOutcome::Ignored);
    }

    #[test]
    fn scrolling_is_suppressed_while_open() {
        let (mut page, t0) = page();
        page.state_mut().doc.set_viewport_height(100.0);
        let body = page.document().body();
        page.state_mut()
            .doc
            .set_layout(body, crate::dom::LayoutBox::new(0.0, 2000.0));
        page.scroll_to(300.0, t0);
        assert_eq!(page.document().viewport().scroll_y, 300.0);

        let open = page.document().element_by_id("open").unwrap();
        page.click(open, t0);
        page.scroll_to(0.0, t0);
        assert_eq!(page.document().viewport().scroll_y, 300.0);
    }

    #[test]
    fn theme_button_and_key_toggle() {
        let (mut page, t0) = page();
        assert_eq!(page.state().theme.current(), Theme::Light);
        let button = page.document().query_str(".theme-toggle").unwrap().unwrap();
        page.click(button, t0);
        assert_eq!(page.state().theme.current(), Theme::Dark);
        assert_eq!(page.key(&key(KeyCode::Char('t')), t0), KeyOutcome::Handled);
        assert_eq!(page.state().theme.current(), Theme::Light);
        assert_eq!(page.state().storage.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn typing_into_a_focused_input_is_not_a_shortcut() {
        let (mut page, t0) = page();
        let body = page.document().body();
        page.state_mut()
            .doc
            .append_html(body, r#"<input name="name" value="J">"#);
        let input = page.document().query_str("input").unwrap().unwrap();
        page.click(input, t0);
        page.key(&key(KeyCode::Char('t')), t0);
        page.key(&key(KeyCode::Char('o')), t0);
        page.key(&key(KeyCode::Backspace), t0);
        assert_eq!(page.document().attr(input, "value"), Some("Jt"));
        assert_eq!(page.state().theme.current(), Theme::Light);
    }

    #[test]
    fn next_wake_covers_every_pending_deadline() {
        let (mut page, t0) = page();
        assert_eq!(page.next_wake(), None);
        let ms = Duration::from_millis;

        page.scroll_to(100.0, t0);
        page.scroll_to(200.0, t0 + ms(10));
        // the debounced image scan settles before the throttled header update
        assert_eq!(page.next_wake(), Some(t0 + ms(10) + LAZY_IMAGE_DEBOUNCE));
        page.tick(t0 + ms(10) + LAZY_IMAGE_DEBOUNCE);
        assert_eq!(page.next_wake(), Some(t0 + HEADER_THROTTLE));
        page.tick(t0 + HEADER_THROTTLE);
        assert_eq!(page.next_wake(), None);

        let open = page.document().element_by_id("open").unwrap();
        let t1 = t0 + ms(500);
        page.click(open, t1);
        assert_eq!(page.next_wake(), Some(t1 + crate::constants::MODAL_FOCUS_DELAY));
    }

    #[test]
    fn ctrl_q_quits() {
        let (mut page, t0) = page();
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(page.key(&quit, t0), KeyOutcome::Quit);
    }
}
