use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::ScrollUp => app.scroll_up(),
        AppEvent::ScrollDown => app.scroll_down(),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Keys that work even while a reply is pending
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Up => return app.scroll_up(),
        KeyCode::Down => return app.scroll_down(),
        KeyCode::PageUp => return app.scroll_page_up(),
        KeyCode::PageDown => return app.scroll_page_down(),
        _ => {}
    }

    // The input box is disabled while waiting for a reply
    if app.is_waiting() {
        return;
    }

    handle_input_key(app, key);
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit();
        return;
    }

    let session = &mut app.session;
    match key.code {
        KeyCode::Backspace => {
            if session.input_cursor > 0 {
                session.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&session.pending_input, session.input_cursor);
                session.pending_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = session.pending_input.chars().count();
            if session.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&session.pending_input, session.input_cursor);
                session.pending_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            session.input_cursor = session.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = session.pending_input.chars().count();
            session.input_cursor = (session.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            session.input_cursor = 0;
        }
        KeyCode::End => {
            session.input_cursor = session.pending_input.chars().count();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let byte_pos = char_to_byte_index(&session.pending_input, session.input_cursor);
            session.pending_input.insert(byte_pos, c);
            session.input_cursor += 1;
        }
        _ => {}
    }
}
