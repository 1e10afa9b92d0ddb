use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use color_eyre::Result;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use queueboard::app::App;
use queueboard::args::Args;
use queueboard::event::{Event, EventHandler};
use queueboard::handler::{handle_key_events, handle_mouse_events};
use queueboard::tui::Tui;
use queueboard::ui::UI;

/// Logs to `path`; the terminal is owned by the UI, so nothing is logged without a file
fn init_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queueboard=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    if args.version {
        println!("queueboard v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let events = EventHandler::new(250);
    let mut app = App::new(args, events.sender());
    app.refresh();
    let mut ui = UI::new(&app);

    // Initialize the terminal user interface
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    let mut tui = Tui::new(terminal, events);
    tui.init()?;
    tui.draw(&mut ui)?;

    // Main loop
    while app.running {
        let redraw = match tui.events.next()? {
            Event::Tick => {
                if app.tick() {
                    ui.update(&app);
                    true
                } else {
                    false
                }
            }
            Event::Key(key_event) => handle_key_events(key_event, &mut app, &mut ui)?,
            Event::Mouse(mouse_event) => handle_mouse_events(mouse_event, &mut app, &mut ui)?,
            Event::Resize(_, _) => true,
            Event::Fetched(result) => {
                app.fetched(*result);
                ui.update(&app);
                true
            }
        };

        if redraw {
            tui.draw(&mut ui)?;
        }
    }

    tui.exit()?;
    Ok(())
}
