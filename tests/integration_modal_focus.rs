use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use folio_ui::ajax::CannedTransport;
use folio_ui::constants::MODAL_FOCUS_DELAY;
use folio_ui::dom::{Document, NodeId};
use folio_ui::keybindings::{Action, KeyBindings, KeyCombo};
use folio_ui::page::{KeyOutcome, Page, PageConfig};
use folio_ui::storage::MemoryStorage;

const PAGE: &str = r##"<button id="before">Before</button>
<button id="trigger" data-modal="#abc">Open</button>
<div id="abc" hidden><button id="a">A</button><a id="b" href="/b">B</a><span id="c" tabindex="0">C</span></div>
<div class="modal" hidden><div class="modal-content"></div></div>"##;

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

fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, mods)
}

fn focused_text(page: &Page) -> String {
    let active = page.document().active_element().expect("something focused");
    page.document().text_content(active)
}

fn trigger(page: &Page) -> NodeId {
    page.document().element_by_id("trigger").unwrap()
}

#[test]
fn abc_scenario_through_the_page() {
    let (mut page, t0) = page();
    let trigger = trigger(&page);
    page.click(trigger, t0);
    page.tick(t0 + MODAL_FOCUS_DELAY);
    assert_eq!(focused_text(&page), "A");

    // Tab inside the surface is default traversal until the last element.
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    assert_eq!(focused_text(&page), "C");
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    assert_eq!(focused_text(&page), "A");

    page.key(&key(KeyCode::BackTab, KeyModifiers::SHIFT), t0);
    assert_eq!(focused_text(&page), "C");
    page.key(&key(KeyCode::Tab, KeyModifiers::SHIFT), t0);
    assert_eq!(focused_text(&page), "B");

    assert_eq!(
        page.key(&key(KeyCode::Esc, KeyModifiers::NONE), t0),
        KeyOutcome::Handled
    );
    assert_eq!(page.document().active_element(), Some(trigger));
}

#[test]
fn open_open_close_leaves_page_as_it_was() {
    let (mut page, t0) = page();
    let trigger = trigger(&page);
    let body = page.document().body();
    page.state_mut().doc.set_style(body, "overflow", "auto");

    page.click(trigger, t0);
    page.click(trigger, t0);
    let surface = page.state().modal.surface(page.document()).unwrap();
    let content = page.document().query_str(".modal-content").unwrap().unwrap();
    assert_eq!(page.document().child_elements(content).len(), 3);
    assert_eq!(page.document().style(body, "overflow"), Some("hidden"));

    page.key(&key(KeyCode::Esc, KeyModifiers::NONE), t0);
    assert!(!page.state().modal.is_open());
    assert!(page.document().has_attr(surface, "hidden"));
    assert!(page.document().query_str(".modal-overlay").unwrap().is_none());
    assert_eq!(page.document().style(body, "overflow"), Some("auto"));
}

#[test]
fn late_deferred_focus_after_close_is_inert() {
    let (mut page, t0) = page();
    let trigger = trigger(&page);
    page.click(trigger, t0);
    page.key(&key(KeyCode::Esc, KeyModifiers::NONE), t0 + Duration::from_millis(10));
    assert_eq!(page.document().active_element(), Some(trigger));
    page.tick(t0 + MODAL_FOCUS_DELAY * 2);
    assert_eq!(page.document().active_element(), Some(trigger));
}

#[test]
fn tab_while_closed_walks_the_page() {
    let (mut page, t0) = page();
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    assert_eq!(focused_text(&page), "Before");
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    assert_eq!(focused_text(&page), "Open");
    // hidden template content is skipped, so traversal wraps
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    assert_eq!(focused_text(&page), "Before");
}

#[test]
fn enter_on_focused_trigger_opens() {
    let (mut page, t0) = page();
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    page.key(&key(KeyCode::Tab, KeyModifiers::NONE), t0);
    page.key(&key(KeyCode::Enter, KeyModifiers::NONE), t0);
    assert!(page.state().modal.is_open());
}

#[test]
fn rebound_close_key_is_the_one_that_closes() {
    let (mut page, t0) = page();
    let mut kb = KeyBindings::default();
    kb.clear(Action::CloseModal);
    kb.add(Action::CloseModal, KeyCombo::plain(KeyCode::F(10)));
    page.set_bindings(kb);
    assert_eq!(page.bindings().hint_line(&[Action::CloseModal]), "F10 close");

    let trigger = trigger(&page);
    page.click(trigger, t0);
    assert_eq!(
        page.key(&key(KeyCode::Esc, KeyModifiers::NONE), t0),
        KeyOutcome::Ignored
    );
    assert!(page.state().modal.is_open());
    assert_eq!(
        page.key(&key(KeyCode::F(10), KeyModifiers::NONE), t0),
        KeyOutcome::Handled
    );
    assert!(!page.state().modal.is_open());
    assert_eq!(page.document().active_element(), Some(trigger));
}
