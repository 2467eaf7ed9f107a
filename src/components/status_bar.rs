use ratatui::layout::Rect;

use super::{Component, ComponentContext};
use crate::ui::{UiFrame, truncate_to_width};

/// One-line bar: key hints on the left, the latest log line on the right.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    left: String,
    right: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let style = ctx.palette().status();
        frame.patch_style(Rect { height: 1, ..area }, style);
        let (x, y) = (area.x, area.y);
        let width = area.width as usize;
        let left_width = frame.put_str(area, x, y, &self.left, style);

        // The right side only gets what the hints leave free.
        let room = width.saturating_sub(left_width + 2);
        if !self.right.is_empty() && room > 0 {
            let right = truncate_to_width(&self.right, room);
            let start_x = x.saturating_add((width - right.chars().count()) as u16);
            frame.put_str(area, start_x, y, &right, style);
        }
    }
}
