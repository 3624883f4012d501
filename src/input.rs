use crossterm::event::{KeyCode, KeyEvent};

use crate::app::Screen;
use crate::messages::UiEvent;

/// Map keyboard input to UiEvent based on the current screen
pub fn handle_key(key: KeyEvent, screen: Screen, recording_done: bool) -> Option<UiEvent> {
    match screen {
        Screen::Browser => handle_browser_key(key),
        Screen::Normalizing => handle_normalizing_key(key),
        Screen::Summary => handle_summary_key(key),
        Screen::Recording => handle_recording_key(key, recording_done),
    }
}

fn handle_browser_key(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
        KeyCode::Char(' ') => Some(UiEvent::ToggleSelect),
        KeyCode::Char('a') => Some(UiEvent::SelectAll),
        KeyCode::Char('c') => Some(UiEvent::ClearSelection),
        KeyCode::Char('p') => Some(UiEvent::Preview),
        KeyCode::Char('x') => Some(UiEvent::StopPreview),
        KeyCode::Enter => Some(UiEvent::BeginRecording),
        KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
        _ => None,
    }
}

fn handle_normalizing_key(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
        _ => None,
    }
}

fn handle_summary_key(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Enter => Some(UiEvent::Confirm),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => Some(UiEvent::Back),
        _ => None,
    }
}

fn handle_recording_key(key: KeyEvent, recording_done: bool) -> Option<UiEvent> {
    if recording_done {
        // The side is finished; any key returns to the browser.
        return Some(UiEvent::Back);
    }
    match key.code {
        // Abort the take; the tape keeps whatever was already laid down.
        KeyCode::Esc | KeyCode::Char('q') => Some(UiEvent::Back),
        _ => None,
    }
}

/// Key labels for the hint bar
pub fn key_hints(screen: Screen, recording_done: bool) -> Vec<(&'static str, &'static str)> {
    match screen {
        Screen::Browser => vec![
            ("↑/↓", "Move"),
            ("Space", "Select"),
            ("A", "All"),
            ("C", "Clear"),
            ("P", "Preview"),
            ("X", "Stop"),
            ("Enter", "Record"),
            ("Q", "Quit"),
        ],
        Screen::Normalizing => vec![("Q", "Quit")],
        Screen::Summary => vec![("Enter", "Start Recording"), ("Q/Esc", "Back")],
        Screen::Recording if recording_done => vec![("Any Key", "Back to Browser")],
        Screen::Recording => vec![("Q/Esc", "Abort")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn browser_keys_cover_selection_and_launch() {
        assert_eq!(
            handle_key(press(KeyCode::Char('k')), Screen::Browser, false),
            Some(UiEvent::CursorUp)
        );
        assert_eq!(
            handle_key(press(KeyCode::Char(' ')), Screen::Browser, false),
            Some(UiEvent::ToggleSelect)
        );
        assert_eq!(
            handle_key(press(KeyCode::Enter), Screen::Browser, false),
            Some(UiEvent::BeginRecording)
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('z')), Screen::Browser, false),
            None
        );
    }

    #[test]
    fn recording_aborts_on_q_or_esc_never_quits() {
        for code in [KeyCode::Esc, KeyCode::Char('q')] {
            assert_eq!(
                handle_key(press(code), Screen::Recording, false),
                Some(UiEvent::Back)
            );
        }
        assert_eq!(
            handle_key(press(KeyCode::Enter), Screen::Recording, false),
            None
        );
    }

    #[test]
    fn any_key_leaves_a_finished_recording() {
        for code in [
            KeyCode::Enter,
            KeyCode::Esc,
            KeyCode::Char('q'),
            KeyCode::Char('z'),
        ] {
            assert_eq!(
                handle_key(press(code), Screen::Recording, true),
                Some(UiEvent::Back)
            );
        }
    }

    #[test]
    fn summary_confirms_on_enter_and_backs_out_on_q() {
        assert_eq!(
            handle_key(press(KeyCode::Enter), Screen::Summary, false),
            Some(UiEvent::Confirm)
        );
        for code in [KeyCode::Char('q'), KeyCode::Esc, KeyCode::Char('b')] {
            assert_eq!(
                handle_key(press(code), Screen::Summary, false),
                Some(UiEvent::Back)
            );
        }
    }
}
