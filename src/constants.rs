//! Shared crate-wide constants.

use std::time::Duration;

/// Delay between opening a modal and moving focus into it, giving the
/// surface a chance to render before it receives focus.
pub const MODAL_FOCUS_DELAY: Duration = Duration::from_millis(100);

/// Scroll offset (page units) past which the header is marked `scrolled`.
pub const HEADER_SCROLLED_THRESHOLD: f64 = 50.0;

/// Minimum spacing between header updates while scrolling.
pub const HEADER_THROTTLE: Duration = Duration::from_millis(100);

/// Length of an anchor-link scroll animation.
pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(800);

/// Frame spacing requested while a scroll animation is running.
pub const ANIMATION_FRAME: Duration = Duration::from_millis(16);

/// Distance outside the viewport at which lazy images start loading.
///
/// Units: page units, the same as `LayoutBox` and `Viewport`. A positive
/// margin loads images slightly before they scroll into view so the swap is
/// not visible.
pub const LAZY_IMAGE_MARGIN: f64 = 200.0;

/// Quiet period after the last scroll event before lazy images are scanned.
pub const LAZY_IMAGE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Timeout handed to the transport for form and pagination requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Storage key holding the user's theme choice.
pub const THEME_STORAGE_KEY: &str = "theme";

/// Height of one rendered text row in page units, used by the terminal
/// preview to map rows onto `LayoutBox` coordinates.
pub const PREVIEW_ROW_HEIGHT: f64 = 20.0;
