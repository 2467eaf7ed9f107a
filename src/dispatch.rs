//! Delegated event dispatch.
//!
//! Behaviors register `(event kind, selector)` routes instead of attaching
//! listeners to individual elements. For every incoming event the dispatcher
//! walks its routes in registration order; a route with a selector fires when
//! the event target or one of its ancestors matches, which is how elements
//! injected after registration (modal content, "load more" pages) are picked
//! up without re-wiring.

use crossterm::event::KeyEvent;
use tracing::trace;

use crate::dom::{Document, NodeId, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    Scroll,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    Click { target: NodeId },
    KeyDown(KeyEvent),
    Scroll,
    Submit { target: NodeId },
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Click { .. } => EventKind::Click,
            DomEvent::KeyDown(_) => EventKind::KeyDown,
            DomEvent::Scroll => EventKind::Scroll,
            DomEvent::Submit { .. } => EventKind::Submit,
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            DomEvent::Click { target } | DomEvent::Submit { target } => Some(*target),
            DomEvent::KeyDown(_) | DomEvent::Scroll => None,
        }
    }
}

/// What a handler wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Keep offering the event to later routes and to default handling.
    Continue,
    /// Handled; later routes and the default action are skipped.
    Stop,
}

/// Access to the document that selector routes are evaluated against.
pub trait HasDocument {
    fn document(&self) -> &Document;
}

pub type Handler<S> = Box<dyn FnMut(&mut S, &DomEvent, Option<NodeId>) -> Propagation>;

struct Route<S> {
    kind: EventKind,
    selector: Option<Selector>,
    handler: Handler<S>,
}

pub struct Dispatcher<S> {
    routes: Vec<Route<S>>,
}

impl<S: HasDocument> Default for Dispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl<S: HasDocument> Dispatcher<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a route. With a selector, the handler receives the matched
    /// element (the target or its nearest matching ancestor); without one it
    /// fires for every event of `kind` and receives the raw target.
    pub fn on<F>(&mut self, kind: EventKind, selector: Option<Selector>, handler: F)
    where
        F: FnMut(&mut S, &DomEvent, Option<NodeId>) -> Propagation + 'static,
    {
        self.routes.push(Route {
            kind,
            selector,
            handler: Box::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn dispatch(&mut self, state: &mut S, event: &DomEvent) -> Propagation {
        let kind = event.kind();
        for route in self.routes.iter_mut().filter(|r| r.kind == kind) {
            let matched = match (&route.selector, event.target()) {
                (None, target) => target,
                (Some(selector), Some(target)) => {
                    match state.document().closest(target, selector) {
                        Some(hit) => Some(hit),
                        None => continue,
                    }
                }
                (Some(_), None) => continue,
            };
            if let (Some(selector), Some(hit)) = (&route.selector, matched) {
                trace!(%selector, node = %hit, ?kind, "route matched");
            }
            if (route.handler)(state, event, matched) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct State {
        doc: Document,
        log: Vec<String>,
    }

    impl HasDocument for State {
        fn document(&self) -> &Document {
            &self.doc
        }
    }

    fn state() -> State {
        State {
            doc: Document::from_markup(
                r#"<div class="card"><span id="inner">x</span></div><p id="plain">p</p>"#,
            ),
            log: Vec::new(),
        }
    }

    #[test]
    fn delegated_routes_match_ancestors() {
        let mut s = state();
        let mut d = Dispatcher::new();
        d.on(
            EventKind::Click,
            Some(Selector::parse(".card").unwrap()),
            |s: &mut State, _, hit| {
                let tag = hit.and_then(|h| s.doc.tag(h)).unwrap_or("").to_string();
                s.log.push(tag);
                Propagation::Continue
            },
        );
        let inner = s.doc.element_by_id("inner").unwrap();
        let plain = s.doc.element_by_id("plain").unwrap();
        d.dispatch(&mut s, &DomEvent::Click { target: inner });
        d.dispatch(&mut s, &DomEvent::Click { target: plain });
        assert_eq!(s.log, vec!["div"]);
    }

    #[test]
    fn stop_short_circuits_later_routes() {
        let mut s = state();
        let mut d = Dispatcher::new();
        d.on(EventKind::Scroll, None, |s: &mut State, _, _| {
            s.log.push("first".into());
            Propagation::Stop
        });
        d.on(EventKind::Scroll, None, |s: &mut State, _, _| {
            s.log.push("second".into());
            Propagation::Continue
        });
        assert_eq!(d.dispatch(&mut s, &DomEvent::Scroll), Propagation::Stop);
        assert_eq!(s.log, vec!["first"]);
    }

    #[test]
    fn selector_routes_skip_targetless_events() {
        let mut s = state();
        let mut d = Dispatcher::new();
        d.on(
            EventKind::Scroll,
            Some(Selector::parse("p").unwrap()),
            |s: &mut State, _, _| {
                s.log.push("hit".into());
                Propagation::Continue
            },
        );
        assert_eq!(d.dispatch(&mut s, &DomEvent::Scroll), Propagation::Continue);
        assert!(s.log.is_empty());
    }
}
