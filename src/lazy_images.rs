use std::time::{Duration, Instant};

use tracing::debug;

use crate::constants::{LAZY_IMAGE_DEBOUNCE, LAZY_IMAGE_MARGIN};
use crate::dom::{Document, Selector, SelectorError};
use crate::rate_limit::Debouncer;

#[derive(Debug, Clone, PartialEq)]
pub struct LazyImageConfig {
    pub selector: String,
    pub margin: f64,
    pub loaded_class: String,
    pub debounce: Duration,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            selector: "img[data-src]".to_string(),
            margin: LAZY_IMAGE_MARGIN,
            loaded_class: "loaded".to_string(),
            debounce: LAZY_IMAGE_DEBOUNCE,
        }
    }
}

/// Swaps `data-src` into `src` for images near the viewport.
#[derive(Debug, Clone)]
pub struct LazyImages {
    selector: Selector,
    config: LazyImageConfig,
    debounce: Debouncer,
}

impl LazyImages {
    pub fn new(config: LazyImageConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            selector: Selector::parse(&config.selector)?,
            debounce: Debouncer::new(config.debounce),
            config,
        })
    }

    /// Load every pending image within the margin of the viewport. Returns
    /// the number of images swapped.
    pub fn scan(&self, doc: &mut Document) -> usize {
        let view = doc.viewport();
        let top = view.scroll_y - self.config.margin;
        let bottom = view.scroll_y + view.height + self.config.margin;
        let mut loaded = 0;
        for img in doc.query_all(&self.selector) {
            let b = doc.layout(img);
            if b.top >= bottom || b.bottom() <= top {
                continue;
            }
            let Some(src) = doc.attr(img, "data-src").map(str::to_string) else {
                continue;
            };
            doc.set_attr(img, "src", &src);
            doc.remove_attr(img, "data-src");
            doc.add_class(img, &self.config.loaded_class);
            loaded += 1;
        }
        if loaded > 0 {
            debug!(loaded, "lazy images swapped in");
        }
        loaded
    }

    pub fn on_scroll(&mut self, now: Instant) {
        self.debounce.trigger(now);
    }

    /// When the pending debounced scan becomes due.
    pub fn next_scan(&self) -> Option<Instant> {
        self.debounce.next_due()
    }

    /// Scan once the scroll burst has settled.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> usize {
        if self.debounce.ready(now) {
            self.scan(doc)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::LayoutBox;

    fn setup() -> Document {
        let mut doc = Document::from_markup(
            r#"<img id="near" data-src="a.png"><img id="far" data-src="b.png"><img id="done" src="c.png">"#,
        );
        doc.set_viewport_height(600.0);
        for (id, top) in [("near", 700.0), ("far", 3000.0), ("done", 100.0)] {
            let n = doc.element_by_id(id).unwrap();
            doc.set_layout(n, LayoutBox::new(top, 100.0));
        }
        doc
    }

    #[test]
    fn swaps_only_images_within_margin() {
        let mut doc = setup();
        let lazy = LazyImages::new(LazyImageConfig::default()).unwrap();
        assert_eq!(lazy.scan(&mut doc), 1);
        let near = doc.element_by_id("near").unwrap();
        assert_eq!(doc.attr(near, "src"), Some("a.png"));
        assert!(!doc.has_attr(near, "data-src"));
        assert!(doc.has_class(near, "loaded"));
        let far = doc.element_by_id("far").unwrap();
        assert_eq!(doc.attr(far, "src"), None);
        assert_eq!(lazy.scan(&mut doc), 0);
    }

    #[test]
    fn scroll_scan_is_debounced() {
        let mut doc = setup();
        let mut lazy = LazyImages::new(LazyImageConfig::default()).unwrap();
        let t0 = Instant::now();
        doc.set_scroll_y(2500.0);
        lazy.on_scroll(t0);
        assert_eq!(lazy.tick(&mut doc, t0 + Duration::from_millis(10)), 0);
        assert_eq!(lazy.tick(&mut doc, t0 + LAZY_IMAGE_DEBOUNCE), 1);
        let far = doc.element_by_id("far").unwrap();
        assert_eq!(doc.attr(far, "src"), Some("b.png"));
    }
}
