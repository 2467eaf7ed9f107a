//! Shared component rendering context
//!
//! `ComponentContext` carries what every preview component needs to draw:
//! the palette for the page's current theme and whether a modal overlay is
//! covering the page.

use crate::palette::Palette;

#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentContext {
    palette: Palette,
    overlay: bool,
}

impl ComponentContext {
    pub const fn new(palette: Palette) -> Self {
        Self {
            palette,
            overlay: false,
        }
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Whether a modal overlay sits on top of the page.
    pub const fn overlay(&self) -> bool {
        self.overlay
    }

    pub const fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}
