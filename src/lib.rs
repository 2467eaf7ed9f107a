pub mod ajax;
pub mod component_context;
pub mod components;
pub mod constants;
pub mod contact_form;
pub mod demo;
pub mod dispatch;
pub mod dom;
pub mod drivers;
pub mod easing;
pub mod event_loop;
pub mod focus;
pub mod header;
pub mod keybindings;
pub mod lazy_images;
pub mod load_more;
pub mod log_buffer;
pub mod modal;
pub mod page;
pub mod palette;
pub mod preview;
pub mod rate_limit;
pub mod scheduler;
pub mod smooth_scroll;
pub mod storage;
pub mod theme_toggle;
pub mod tracing_sub;
pub mod ui;
