//! Animated scrolling to in-page anchors.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::constants::SMOOTH_SCROLL_DURATION;
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::easing::ease_in_out_quad;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    start: Instant,
    from: f64,
    to: f64,
    duration: Duration,
}

impl ScrollAnimation {
    pub fn new(start: Instant, from: f64, to: f64, duration: Duration) -> Self {
        Self {
            start,
            from,
            to,
            duration,
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn sample(&self, now: Instant) -> f64 {
        if self.finished(now) {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        ease_in_out_quad(
            elapsed,
            self.from,
            self.to - self.from,
            self.duration.as_secs_f64(),
        )
    }

    pub fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    anchors: Selector,
    duration: Duration,
    active: Option<ScrollAnimation>,
}

impl SmoothScroll {
    pub fn new(duration: Duration) -> Result<Self, SelectorError> {
        Ok(Self {
            anchors: Selector::parse("a[href^=\"#\"]")?,
            duration,
            active: None,
        })
    }

    pub fn with_default_duration() -> Result<Self, SelectorError> {
        Self::new(SMOOTH_SCROLL_DURATION)
    }

    pub fn anchor_selector(&self) -> &Selector {
        &self.anchors
    }

    pub fn animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.active.as_ref()
    }

    /// Element named by an anchor's `#fragment`. A bare `#` names nothing.
    pub fn target_of(doc: &Document, anchor: NodeId) -> Option<NodeId> {
        let fragment = doc.attr(anchor, "href")?.strip_prefix('#')?;
        if fragment.is_empty() {
            return None;
        }
        doc.element_by_id(fragment)
    }

    /// Start scrolling toward the anchor's target, leaving room for a fixed
    /// header of `header_offset`. Returns `false` when there is no target.
    pub fn start(
        &mut self,
        doc: &Document,
        anchor: NodeId,
        header_offset: f64,
        now: Instant,
    ) -> bool {
        let Some(target) = Self::target_of(doc, anchor) else {
            return false;
        };
        let to = (doc.layout(target).top - header_offset).max(0.0);
        let from = doc.viewport().scroll_y;
        debug!(from, to, target = %target, "smooth scroll started");
        self.active = Some(ScrollAnimation::new(now, from, to, self.duration));
        true
    }

    /// Advance the running animation. Returns whether the viewport moved.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> bool {
        let Some(anim) = self.active else {
            return false;
        };
        doc.set_scroll_y(anim.sample(now));
        if anim.finished(now) {
            self.active = None;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::LayoutBox;

    fn setup() -> (Document, NodeId, NodeId) {
        let mut doc = Document::from_markup(
            r##"<a id="go" href="#about">About</a><a id="bare" href="#">Top</a><section id="about">...</section>"##,
        );
        let about = doc.element_by_id("about").unwrap();
        doc.set_layout(about, LayoutBox::new(1000.0, 400.0));
        let go = doc.element_by_id("go").unwrap();
        let bare = doc.element_by_id("bare").unwrap();
        (doc, go, bare)
    }

    #[test]
    fn animation_lands_on_target_minus_header() {
        let (mut doc, go, _) = setup();
        let mut s = SmoothScroll::with_default_duration().unwrap();
        let t0 = Instant::now();
        assert!(s.start(&doc, go, 80.0, t0));

        s.tick(&mut doc, t0 + Duration::from_millis(400));
        let mid = doc.viewport().scroll_y;
        assert!((mid - 460.0).abs() < 1e-6);

        s.tick(&mut doc, t0 + SMOOTH_SCROLL_DURATION + Duration::from_millis(5));
        assert_eq!(doc.viewport().scroll_y, 920.0);
        assert!(!s.animating());
        assert!(!s.tick(&mut doc, t0 + Duration::from_secs(2)));
    }

    #[test]
    fn bare_hash_and_missing_targets_do_nothing() {
        let (mut doc, _, bare) = setup();
        let mut s = SmoothScroll::with_default_duration().unwrap();
        assert!(!s.start(&doc, bare, 0.0, Instant::now()));
        let missing = doc.create_element("a");
        doc.set_attr(missing, "href", "#nowhere");
        assert!(!s.start(&doc, missing, 0.0, Instant::now()));
        assert!(!s.animating());
    }

    #[test]
    fn target_above_header_clamps_to_top() {
        let (doc, go, _) = setup();
        let mut s = SmoothScroll::with_default_duration().unwrap();
        assert!(s.start(&doc, go, 5000.0, Instant::now()));
        assert_eq!(s.animation().map(|a| a.target()), Some(0.0));
    }
}
