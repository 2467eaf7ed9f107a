use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;

use folio_ui::demo::{DEMO_PAGE, demo_transport};
use folio_ui::dom::Document;
use folio_ui::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use folio_ui::drivers::{InputDriver, OutputDriver};
use folio_ui::event_loop::{ControlFlow, EventLoop};
use folio_ui::log_buffer::{LogBuffer, set_global_log};
use folio_ui::page::{Page, PageConfig, load_document};
use folio_ui::preview::PreviewApp;
use folio_ui::storage::MemoryStorage;
use folio_ui::theme_toggle::Theme;
use folio_ui::tracing_sub;

/// Interactive terminal preview of a portfolio page.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Page markup to load. Defaults to the built-in demo page.
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,

    /// Theme used until one is chosen with the toggle.
    #[arg(long, default_value_t = Theme::Light)]
    theme: Theme,

    /// Delay before focus moves into an opened modal.
    #[arg(long, default_value_t = 100)]
    focus_delay_ms: u64,

    /// Input poll interval; also the animation frame period.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let log = LogBuffer::default();
    set_global_log(log.clone());
    tracing_sub::init_default();

    let doc = match &args.page {
        Some(path) => load_document(path)?,
        None => Document::from_markup(DEMO_PAGE),
    };
    let config = PageConfig {
        system_theme: args.theme,
        modal: folio_ui::modal::ModalConfig {
            focus_delay: Duration::from_millis(args.focus_delay_ms),
            ..Default::default()
        },
        ..Default::default()
    };
    let page = Page::new(
        doc,
        Box::new(MemoryStorage::new()),
        Box::new(demo_transport()),
        config,
        Instant::now(),
    )
    .map_err(io::Error::other)?;
    info!(page = ?args.page, "preview started");
    let mut app = PreviewApp::new(page, Some(log));

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;

    let mut event_loop = EventLoop::new(input, Duration::from_millis(args.tick_ms.max(1)));
    let result = event_loop.run(|_, event| {
        let now = Instant::now();
        match event {
            Some(event) => Ok(app.handle_event(&event, now)),
            None => {
                app.tick(now);
                output.draw(|mut frame| app.render(&mut frame))?;
                Ok(match app.page().next_wake() {
                    Some(at) => ControlFlow::Sleep(at.saturating_duration_since(now)),
                    None => ControlFlow::Continue,
                })
            }
        }
    });

    output.exit()?;
    result
}
