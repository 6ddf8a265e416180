use crossterm::event::KeyCode;
use stpc_dashboard::input::{parse_key, UiCommand};

#[test]
fn parse_key_maps_case_insensitive_quit() {
    assert_eq!(parse_key(&KeyCode::Char('q'), false), Some(UiCommand::Quit));
    assert_eq!(parse_key(&KeyCode::Char('Q'), false), Some(UiCommand::Quit));
}

#[test]
fn parse_key_maps_panel_size_keys() {
    assert_eq!(
        parse_key(&KeyCode::Char('+'), false),
        Some(UiCommand::AdjustTradesSize(1))
    );
    assert_eq!(
        parse_key(&KeyCode::Char('-'), false),
        Some(UiCommand::AdjustTradesSize(-1))
    );
    assert_eq!(
        parse_key(&KeyCode::Char(']'), false),
        Some(UiCommand::AdjustBidsSize(1))
    );
    assert_eq!(
        parse_key(&KeyCode::Char('['), false),
        Some(UiCommand::AdjustBidsSize(-1))
    );
    assert_eq!(
        parse_key(&KeyCode::Char('}'), false),
        Some(UiCommand::AdjustAsksSize(1))
    );
    assert_eq!(
        parse_key(&KeyCode::Char('{'), false),
        Some(UiCommand::AdjustAsksSize(-1))
    );
}

#[test]
fn tab_cycles_focus_in_both_modes() {
    assert_eq!(parse_key(&KeyCode::Tab, false), Some(UiCommand::CycleFocus));
    assert_eq!(parse_key(&KeyCode::Tab, true), Some(UiCommand::CycleFocus));
}

#[test]
fn editing_mode_only_accepts_editing_keys() {
    assert_eq!(parse_key(&KeyCode::Char('7'), true), Some(UiCommand::Digit('7')));
    assert_eq!(parse_key(&KeyCode::Enter, true), Some(UiCommand::Commit));
    assert_eq!(parse_key(&KeyCode::Esc, true), Some(UiCommand::Cancel));
    assert_eq!(parse_key(&KeyCode::Backspace, true), Some(UiCommand::Backspace));
    assert_eq!(parse_key(&KeyCode::Char('q'), true), None);
    assert_eq!(parse_key(&KeyCode::Char('+'), true), None);
}

#[test]
fn editing_keys_are_inert_outside_editing() {
    assert_eq!(parse_key(&KeyCode::Enter, false), None);
    assert_eq!(parse_key(&KeyCode::Esc, false), None);
    assert_eq!(parse_key(&KeyCode::Char('7'), false), None);
    assert_eq!(parse_key(&KeyCode::F(1), false), None);
}
