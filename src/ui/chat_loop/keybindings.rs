//! Key handling for the chat screen.
//!
//! Editing keys change the input box directly; anything that touches
//! sessions, study items or preferences becomes an [`AppAction`].

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::{App, AppAction, View};
use crate::utils::line_editor::{map_key_event_to_action, LineEditAction};

#[derive(Debug, PartialEq)]
pub enum KeyResult {
    /// Local state changed; redraw.
    Handled,
    Dispatch(AppAction),
    Ignored,
}

/// Rows to move for PageUp/PageDown given the terminal height.
fn page_size(app: &App) -> i32 {
    i32::from(app.ui.last_term_size.height.saturating_sub(8)).max(1)
}

/// Scroll so that positive `lines` moves the view up the screen.
fn scroll_up(app: &App, lines: i32) -> AppAction {
    // Chat offsets count from the bottom, list offsets from the top.
    let lines = match app.ui.view {
        View::Chat => lines,
        View::Study | View::Devotional => -lines,
    };
    AppAction::ScrollBy { lines }
}

pub fn handle_key(app: &mut App, key: &KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && key.code == KeyCode::Char('c') {
        return KeyResult::Dispatch(AppAction::Quit);
    }

    if app.ui.show_help {
        return match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter | KeyCode::Char('q') => {
                KeyResult::Dispatch(AppAction::ToggleHelp)
            }
            _ => KeyResult::Ignored,
        };
    }

    if app.ui.confirmation.is_some() {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => KeyResult::Dispatch(AppAction::ConfirmPending),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                KeyResult::Dispatch(AppAction::CancelPending)
            }
            _ => KeyResult::Ignored,
        };
    }

    match key.code {
        KeyCode::F(1) => return KeyResult::Dispatch(AppAction::ToggleHelp),
        KeyCode::Tab => return KeyResult::Dispatch(AppAction::CycleView { forward: true }),
        KeyCode::BackTab => return KeyResult::Dispatch(AppAction::CycleView { forward: false }),
        KeyCode::Up if alt => {
            return KeyResult::Dispatch(AppAction::SelectRelativeSession { delta: -1 })
        }
        KeyCode::Down if alt => {
            return KeyResult::Dispatch(AppAction::SelectRelativeSession { delta: 1 })
        }
        KeyCode::Up => return KeyResult::Dispatch(scroll_up(app, 1)),
        KeyCode::Down => return KeyResult::Dispatch(scroll_up(app, -1)),
        KeyCode::PageUp => return KeyResult::Dispatch(scroll_up(app, page_size(app))),
        KeyCode::PageDown => return KeyResult::Dispatch(scroll_up(app, -page_size(app))),
        KeyCode::Char('n') if ctrl => return KeyResult::Dispatch(AppAction::NewChat),
        KeyCode::Char('g') if ctrl => return KeyResult::Dispatch(AppAction::RequestDevotional),
        KeyCode::Char('t') if ctrl => return KeyResult::Dispatch(AppAction::ToggleTheme),
        KeyCode::Char('s') if ctrl => {
            let note = app.ui.take_input().trim().to_string();
            return KeyResult::Dispatch(AppAction::SaveReply { note, reply: None });
        }
        KeyCode::Esc => {
            return if app.ui.input.is_empty() {
                KeyResult::Ignored
            } else {
                app.ui.edit_input(LineEditAction::ClearAll);
                KeyResult::Handled
            };
        }
        KeyCode::Enter => return submit_input(app),
        _ => {}
    }

    match map_key_event_to_action(key) {
        Some(action) => {
            if app.ui.edit_input(action) {
                KeyResult::Handled
            } else {
                KeyResult::Ignored
            }
        }
        None => KeyResult::Ignored,
    }
}

fn submit_input(app: &mut App) -> KeyResult {
    let text = app.ui.input_text().trim();
    if text.is_empty() {
        return KeyResult::Ignored;
    }
    // Commands stay available while a reply streams; questions wait.
    if app.is_streaming() && !text.starts_with('/') {
        app.ui.info("Wait for the reply to finish before asking again");
        return KeyResult::Handled;
    }
    let input = app.ui.take_input();
    KeyResult::Dispatch(AppAction::ProcessCommand { input })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::apply_action;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(app, &key(KeyCode::Char(c))), KeyResult::Handled);
        }
    }

    #[test]
    fn enter_submits_and_clears_input() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        type_text(&mut app, "Who was Ruth?");

        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Enter)),
            KeyResult::Dispatch(AppAction::ProcessCommand {
                input: "Who was Ruth?".into()
            })
        );
        assert!(app.ui.input.is_empty());
        assert_eq!(handle_key(&mut app, &key(KeyCode::Enter)), KeyResult::Ignored);
    }

    #[test]
    fn questions_wait_while_streaming_but_commands_do_not() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        apply_action(&mut app, AppAction::SubmitMessage { text: "Psalm 1".into() });

        type_text(&mut app, "next");
        assert_eq!(handle_key(&mut app, &key(KeyCode::Enter)), KeyResult::Handled);
        assert_eq!(app.ui.input_text(), "next");

        app.ui.set_input_text("/study");
        assert!(matches!(
            handle_key(&mut app, &key(KeyCode::Enter)),
            KeyResult::Dispatch(AppAction::ProcessCommand { .. })
        ));
    }

    #[test]
    fn confirmation_captures_y_and_n() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        apply_action(&mut app, AppAction::RequestDeleteSession { index: None });
        assert!(app.ui.confirmation.is_some());

        assert_eq!(handle_key(&mut app, &key(KeyCode::Char('x'))), KeyResult::Ignored);
        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Char('y'))),
            KeyResult::Dispatch(AppAction::ConfirmPending)
        );
        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Esc)),
            KeyResult::Dispatch(AppAction::CancelPending)
        );
    }

    #[test]
    fn ctrl_s_uses_input_as_note() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        app.ui.set_input_text(" memorize ");
        assert_eq!(
            handle_key(&mut app, &ctrl('s')),
            KeyResult::Dispatch(AppAction::SaveReply {
                note: "memorize".into(),
                reply: None,
            })
        );
        assert!(app.ui.input.is_empty());
    }

    #[test]
    fn scrolling_direction_depends_on_view() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Up)),
            KeyResult::Dispatch(AppAction::ScrollBy { lines: 1 })
        );
        app.ui.set_view(View::Study);
        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Up)),
            KeyResult::Dispatch(AppAction::ScrollBy { lines: -1 })
        );
    }

    #[test]
    fn help_swallows_other_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        app.ui.show_help = true;
        assert_eq!(handle_key(&mut app, &key(KeyCode::Char('a'))), KeyResult::Ignored);
        assert_eq!(
            handle_key(&mut app, &key(KeyCode::Esc)),
            KeyResult::Dispatch(AppAction::ToggleHelp)
        );
        assert_eq!(
            handle_key(&mut app, &ctrl('c')),
            KeyResult::Dispatch(AppAction::Quit)
        );
    }

    #[test]
    fn escape_clears_input() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new_test_app(dir.path());
        type_text(&mut app, "abc");
        assert_eq!(handle_key(&mut app, &key(KeyCode::Esc)), KeyResult::Handled);
        assert!(app.ui.input.is_empty());
        assert_eq!(handle_key(&mut app, &key(KeyCode::Esc)), KeyResult::Ignored);
    }
}
