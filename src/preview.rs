//! Terminal preview: draws a `Page` with ratatui and feeds crossterm input
//! back into it.

use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use tracing::trace;

use crate::components::{Component, ComponentContext, DocumentView, ModalView, StatusBar};
use crate::constants::PREVIEW_ROW_HEIGHT;
use crate::event_loop::ControlFlow;
use crate::keybindings::Action;
use crate::log_buffer::LogBuffer;
use crate::page::{KeyOutcome, Page};
use crate::palette::Palette;
use crate::ui::UiFrame;

const PAGE_HINTS: &[Action] = &[
    Action::FocusNext,
    Action::Activate,
    Action::ToggleTheme,
    Action::ScrollDown,
    Action::Quit,
];
const MODAL_HINTS: &[Action] = &[Action::FocusNext, Action::CloseModal, Action::Quit];

pub struct PreviewApp {
    page: Page,
    doc_view: DocumentView,
    modal_view: ModalView,
    status: StatusBar,
    log: Option<LogBuffer>,
}

impl PreviewApp {
    pub fn new(page: Page, log: Option<LogBuffer>) -> Self {
        Self {
            page,
            doc_view: DocumentView::new(),
            modal_view: ModalView::new(),
            status: StatusBar::new(),
            log,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn tick(&mut self, now: Instant) {
        self.page.tick(now);
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> ControlFlow {
        match event {
            Event::Key(key) => {
                if self.page.key(key, now) == KeyOutcome::Quit {
                    return ControlFlow::Quit;
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => self.click_at(mouse.column, mouse.row, now),
                MouseEventKind::ScrollDown => self.page.scroll_by(PREVIEW_ROW_HEIGHT, now),
                MouseEventKind::ScrollUp => self.page.scroll_by(-PREVIEW_ROW_HEIGHT, now),
                _ => {}
            },
            _ => {}
        }
        ControlFlow::Continue
    }

    fn click_at(&mut self, x: u16, y: u16, now: Instant) {
        let target = if self.modal_view.visible() {
            if self.modal_view.contains(x, y) {
                self.modal_view.node_at(x, y)
            } else {
                let state = self.page.state();
                state.modal.overlay(&state.doc)
            }
        } else {
            self.doc_view.node_at(y)
        };
        trace!(x, y, target = ?target, "pointer click");
        if let Some(target) = target {
            self.page.click(target, now);
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area.height == 0 {
            return;
        }
        let body = Rect {
            height: area.height - 1,
            ..area
        };
        let bar = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };

        let state = self.page.state_mut();
        state
            .doc
            .set_viewport_height(f64::from(body.height) * PREVIEW_ROW_HEIGHT);
        let skip: Vec<_> = [state.modal.surface(&state.doc), state.modal.overlay(&state.doc)]
            .into_iter()
            .flatten()
            .collect();
        self.doc_view
            .sync(&mut state.doc, &skip, PREVIEW_ROW_HEIGHT);
        self.modal_view.sync(&state.doc, &state.modal);

        let palette = Palette::for_theme(state.theme.current());
        let ctx = ComponentContext::new(palette).with_overlay(state.modal.overlay_present(&state.doc));
        let hints = if state.modal.is_open() {
            MODAL_HINTS
        } else {
            PAGE_HINTS
        };
        self.status.set_left(self.page.bindings().hint_line(hints));
        if let Some(line) = self.log.as_ref().and_then(LogBuffer::last_line) {
            self.status.set_right(line);
        }

        self.doc_view.render(frame, body, &ctx);
        self.modal_view.render(frame, body, &ctx);
        self.status.render(frame, bar, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ajax::CannedTransport;
    use crate::dom::Document;
    use crate::page::PageConfig;
    use crate::storage::MemoryStorage;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    const PAGE: &str = r##"<p>Intro</p><button data-modal="<p>Body</p><button>OK</button>">Open</button>
<div class="modal" hidden><div class="modal-content"></div><button class="modal-close">Close</button></div>"##;

    fn app() -> (PreviewApp, Instant) {
        let now = Instant::now();
        let page = Page::new(
            Document::from_markup(PAGE),
            Box::new(MemoryStorage::new()),
            Box::new(CannedTransport::new()),
            PageConfig::default(),
            now,
        )
        .unwrap();
        (PreviewApp::new(page, Some(LogBuffer::new(10))), now)
    }

    fn draw(app: &mut PreviewApp) -> Buffer {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        app.render(&mut UiFrame::from_parts(area, &mut buf));
        buf
    }

    fn left_click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn mouse_opens_modal_and_clicking_backdrop_closes_it() {
        let (mut app, t0) = app();
        draw(&mut app);
        app.handle_event(&left_click(0, 1), t0);
        assert!(app.page().state().modal.is_open());

        draw(&mut app);
        assert!(app.modal_view.visible());
        app.handle_event(&left_click(0, 0), t0);
        assert!(!app.page().state().modal.is_open());
    }

    #[test]
    fn status_bar_switches_hints_while_open() {
        let (mut app, t0) = app();
        draw(&mut app);
        assert!(app.status.left().contains("quit"));
        assert!(!app.status.left().contains("close"));
        app.handle_event(&left_click(0, 1), t0);
        draw(&mut app);
        assert!(app.status.left().contains("Esc close"));
    }

    #[test]
    fn ctrl_q_quits_the_loop() {
        let (mut app, t0) = app();
        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(&quit, t0), ControlFlow::Quit);
    }
}
