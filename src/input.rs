use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    CycleFocus,
    Digit(char),
    Backspace,
    Commit,
    Cancel,
    AdjustTradesSize(isize),
    AdjustBidsSize(isize),
    AdjustAsksSize(isize),
}

/// Maps a key to a command. While a threshold field is being edited only
/// editing keys are live, so `q` or `+` never leak out of the field.
pub fn parse_key(key_code: &KeyCode, editing: bool) -> Option<UiCommand> {
    match key_code {
        KeyCode::Tab => Some(UiCommand::CycleFocus),
        KeyCode::Enter if editing => Some(UiCommand::Commit),
        KeyCode::Esc if editing => Some(UiCommand::Cancel),
        KeyCode::Backspace if editing => Some(UiCommand::Backspace),
        KeyCode::Char(c) if editing => c.is_ascii_digit().then_some(UiCommand::Digit(*c)),
        KeyCode::Char(c) => match c {
            'q' | 'Q' => Some(UiCommand::Quit),
            '+' | '=' => Some(UiCommand::AdjustTradesSize(1)),
            '-' | '_' => Some(UiCommand::AdjustTradesSize(-1)),
            ']' => Some(UiCommand::AdjustBidsSize(1)),
            '[' => Some(UiCommand::AdjustBidsSize(-1)),
            '}' => Some(UiCommand::AdjustAsksSize(1)),
            '{' => Some(UiCommand::AdjustAsksSize(-1)),
            _ => None,
        },
        _ => None,
    }
}
