use color_eyre::Result;

use crate::{app::App, ui::UI, view::SortKey};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Handles the key events and updates the state of [`App`].
pub fn handle_key_events(key_event: KeyEvent, app: &mut App, ui: &mut UI) -> Result<bool> {
    // Exit application on `Ctrl-C`, even while editing the filter
    if key_event.modifiers == KeyModifiers::CONTROL
        && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        app.quit();
        return Ok(true);
    }

    if ui.editing_filter() {
        return Ok(handle_filter_keys(key_event, app, ui));
    }

    let mut processed = true;

    match key_event.code {
        // Exit application on `ESC` or `q`
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.quit();
        }
        // Force refresh of Slurm state
        KeyCode::Char('r') | KeyCode::Char('R') => {
            if app.update(1) {
                ui.update(app);
            } else {
                processed = false;
            }
        }
        KeyCode::Char('/') => ui.start_filter(),
        // Scrolling
        KeyCode::Home => ui.scroll(isize::MIN),
        KeyCode::PageUp => ui.scroll(-10),
        KeyCode::Up => ui.scroll(-1),
        KeyCode::Down => ui.scroll(1),
        KeyCode::PageDown => ui.scroll(10),
        KeyCode::End => ui.scroll(isize::MAX),
        // Sorting
        KeyCode::Char(c @ '1'..='8') => {
            let idx = c as usize - '1' as usize;
            app.dashboard.set_sort(SortKey::ALL[idx]);
            ui.update(app);
        }
        KeyCode::Left => processed = move_sort_column(app, ui, -1),
        KeyCode::Right => processed = move_sort_column(app, ui, 1),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.dashboard.toggle_sort_direction();
            ui.update(app);
        }
        // Switch top-user list between cluster and partitions
        KeyCode::Char('p') | KeyCode::Char('P') => ui.cycle_user_scope(),
        // Switch focus between partitions / jobs
        KeyCode::Tab | KeyCode::BackTab => ui.toggle_focus(),
        _ => processed = false,
    }

    Ok(processed)
}

fn handle_filter_keys(key_event: KeyEvent, app: &mut App, ui: &mut UI) -> bool {
    match key_event.code {
        KeyCode::Enter | KeyCode::Esc => {
            ui.stop_filter();
            return true;
        }
        KeyCode::Backspace => app.dashboard.pop_filter_char(),
        KeyCode::Char('u') if key_event.modifiers == KeyModifiers::CONTROL => {
            app.dashboard.clear_filter()
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.dashboard.push_filter_char(c)
        }
        _ => return false,
    }

    ui.update(app);
    true
}

/// Selects the neighbouring sort column; the direction is left unchanged
fn move_sort_column(app: &mut App, ui: &mut UI, delta: isize) -> bool {
    let current = app.dashboard.controls().sort_key;
    let key = current.offset(delta);
    if key == current {
        return false;
    }

    app.dashboard.set_sort(key);
    ui.update(app);
    true
}

pub fn handle_mouse_events(event: MouseEvent, app: &mut App, ui: &mut UI) -> Result<bool> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(key) = ui.mouse_click(event.column, event.row) {
                app.dashboard.set_sort(key);
                ui.update(app);
            }
        }
        MouseEventKind::ScrollUp => ui.mouse_wheel(event.column, event.row, -1),
        MouseEventKind::ScrollDown => ui.mouse_wheel(event.column, event.row, 1),
        _ => return Ok(false),
    }

    Ok(true)
}
