//! Scroll-driven page header: shrinks once the page is scrolled and slides
//! away while scrolling down, coming back on any upward scroll.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::constants::{HEADER_SCROLLED_THRESHOLD, HEADER_THROTTLE};
use crate::dom::{Document, NodeId, Selector, SelectorError};
use crate::rate_limit::Throttle;

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderConfig {
    pub selector: String,
    pub scrolled_threshold: f64,
    pub scrolled_class: String,
    pub hidden_class: String,
    pub throttle: Duration,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            selector: "header".to_string(),
            scrolled_threshold: HEADER_SCROLLED_THRESHOLD,
            scrolled_class: "scrolled".to_string(),
            hidden_class: "header-hidden".to_string(),
            throttle: HEADER_THROTTLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Header {
    selector: Selector,
    config: HeaderConfig,
    last_scroll_y: f64,
    throttle: Throttle,
}

impl Header {
    pub fn new(config: HeaderConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            selector: Selector::parse(&config.selector)?,
            throttle: Throttle::new(config.throttle),
            config,
            last_scroll_y: 0.0,
        })
    }

    pub fn element(&self, doc: &Document) -> Option<NodeId> {
        doc.query(&self.selector)
    }

    /// Height of the header box, used to offset anchor scrolling.
    pub fn height(&self, doc: &Document) -> f64 {
        self.element(doc).map(|h| doc.layout(h).height).unwrap_or(0.0)
    }

    /// Throttled scroll handler.
    pub fn on_scroll(&mut self, doc: &mut Document, now: Instant) {
        if self.throttle.hit(now) {
            self.update(doc);
        }
    }

    /// Apply a scroll update that the throttle held back, once allowed.
    pub fn flush(&mut self, doc: &mut Document, now: Instant) {
        if self.throttle.take_trailing(now) {
            self.update(doc);
        }
    }

    /// When `flush` has a held-back update to apply.
    pub fn next_flush(&self) -> Option<Instant> {
        self.throttle.next_due()
    }

    /// Recompute header classes from the current scroll offset.
    pub fn update(&mut self, doc: &mut Document) {
        let Some(header) = self.element(doc) else {
            return;
        };
        let y = doc.viewport().scroll_y;
        let height = doc.layout(header).height;
        doc.toggle_class(
            header,
            &self.config.scrolled_class,
            y > self.config.scrolled_threshold,
        );
        if y > self.last_scroll_y && y > height {
            doc.add_class(header, &self.config.hidden_class);
        } else if y < self.last_scroll_y {
            doc.remove_class(header, &self.config.hidden_class);
        }
        trace!(y, last = self.last_scroll_y, "header updated");
        self.last_scroll_y = y;
    }
}
