use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use dynaview::navigation::Input;

/// Terminal key to session input. Unbound keys map to `None`.
pub fn to_input(key: &KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Input::Quit),
            KeyCode::Char('q') => Some(Input::QueryMode),
            KeyCode::Char('s') => Some(Input::ScanMode),
            KeyCode::Char('n') => Some(Input::NextPage),
            KeyCode::Char('b') => Some(Input::PrevPage),
            KeyCode::Char('d') => Some(Input::Export),
            KeyCode::Char('r') => Some(Input::Refresh),
            _ => None,
        };
    }
    let input = match key.code {
        KeyCode::Up => Input::Up,
        KeyCode::Down => Input::Down,
        KeyCode::PageUp => Input::PageUp,
        KeyCode::PageDown => Input::PageDown,
        KeyCode::Left => Input::Left,
        KeyCode::Right => Input::Right,
        KeyCode::Tab => Input::NextField,
        KeyCode::BackTab => Input::PrevField,
        KeyCode::Enter => Input::Submit,
        KeyCode::Esc => Input::Back,
        KeyCode::Backspace => Input::Backspace,
        KeyCode::F(1) => Input::Help,
        KeyCode::Char(c) => Input::Char(c),
        _ => return None,
    };
    Some(input)
}
