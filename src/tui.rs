use std::io;
use std::panic;

use color_eyre::{config::HookBuilder, eyre, Result};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::Backend;
use ratatui::Terminal;

use crate::event::EventHandler;
use crate::ui::UI;

/// Representation of a terminal user interface.
///
/// It is responsible for setting up the terminal,
/// initializing the interface and handling the draw events.
#[derive(Debug)]
pub struct Tui<B: Backend>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    /// Interface to the Terminal.
    terminal: Terminal<B>,
    /// Terminal events and fetch results.
    pub events: EventHandler,
}

impl<B: Backend> Tui<B>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    /// Constructs a new instance of [`Tui`].
    pub fn new(terminal: Terminal<B>, events: EventHandler) -> Self {
        Self { terminal, events }
    }

    /// Initializes the terminal interface.
    ///
    /// It enables the raw mode and sets terminal properties.
    pub fn init(&mut self) -> Result<()> {
        // Restore the terminal before panics and errors are reported
        let (panic_hook, eyre_hook) = HookBuilder::default().into_hooks();
        let panic_hook = panic_hook.into_panic_hook();
        panic::set_hook(Box::new(move |panic| {
            // Nothing more can be done if the terminal cannot be reset
            let _ = reset_terminal();
            panic_hook(panic);
        }));

        let eyre_hook = eyre_hook.into_eyre_hook();
        eyre::set_hook(Box::new(
            move |error: &(dyn std::error::Error + 'static)| {
                let _ = reset_terminal();
                eyre_hook(error)
            },
        ))?;

        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    /// [`Draw`] the terminal interface by [`rendering`] the widgets.
    ///
    /// [`Draw`]: ratatui::Terminal::draw
    /// [`rendering`]: crate::ui::UI::render
    pub fn draw(&mut self, ui: &mut UI) -> Result<()> {
        self.terminal
            .draw(|frame| ui.render(frame.area(), frame.buffer_mut()))?;

        Ok(())
    }

    /// Exits the terminal interface.
    ///
    /// It disables the raw mode and reverts back the terminal properties.
    pub fn exit(&mut self) -> Result<()> {
        reset_terminal()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Leaves raw mode and the alternate screen; also used by the panic and error hooks
fn reset_terminal() -> Result<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
