use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod document_view;
pub mod modal_view;
pub mod status_bar;

pub use document_view::{DocRow, DocumentView, RowKind, assign_layout, flatten};
pub use modal_view::ModalView;
pub use status_bar::StatusBar;

pub use crate::component_context::ComponentContext;

pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);
}
