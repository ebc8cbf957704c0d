//! Single-line text editing shared by the chat input box and terminal prompts.

use crate::utils::input::sanitize_single_line;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Text plus a cursor measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditorState {
    pub text: String,
    pub cursor: usize,
}

impl LineEditorState {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the editor empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Display columns between the start of the text and the cursor.
    pub fn cursor_columns(&self) -> usize {
        let prefix: String = self.text.chars().take(self.cursor).collect();
        UnicodeWidthStr::width(prefix.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditAction {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    DeleteToEnd,
    DeleteWord,
    ClearAll,
}

/// Map a key to an edit. Enter, Esc and other control keys return `None`
/// so the caller can bind them.
pub fn map_key_event_to_action(key: &KeyEvent) -> Option<LineEditAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Backspace => Some(LineEditAction::Backspace),
        KeyCode::Delete => Some(LineEditAction::Delete),
        KeyCode::Left => Some(LineEditAction::MoveLeft),
        KeyCode::Right => Some(LineEditAction::MoveRight),
        KeyCode::Home => Some(LineEditAction::MoveStart),
        KeyCode::End => Some(LineEditAction::MoveEnd),
        KeyCode::Char('a') if ctrl => Some(LineEditAction::MoveStart),
        KeyCode::Char('e') if ctrl => Some(LineEditAction::MoveEnd),
        KeyCode::Char('k') if ctrl => Some(LineEditAction::DeleteToEnd),
        KeyCode::Char('w') if ctrl => Some(LineEditAction::DeleteWord),
        KeyCode::Char('u') if ctrl => Some(LineEditAction::ClearAll),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(LineEditAction::Insert(c))
        }
        _ => None,
    }
}

/// Apply an edit. Returns whether anything changed.
pub fn apply_line_edit_action(state: &mut LineEditorState, action: LineEditAction) -> bool {
    match action {
        LineEditAction::Insert(c) => {
            let byte_idx = char_to_byte_index(&state.text, state.cursor);
            state.text.insert(byte_idx, c);
            state.cursor += 1;
            true
        }
        LineEditAction::Paste(text) => {
            let flattened = sanitize_single_line(&text);
            if flattened.is_empty() {
                return false;
            }
            let byte_idx = char_to_byte_index(&state.text, state.cursor);
            state.text.insert_str(byte_idx, &flattened);
            state.cursor += flattened.chars().count();
            true
        }
        LineEditAction::Backspace => {
            if state.cursor == 0 {
                return false;
            }
            let end = char_to_byte_index(&state.text, state.cursor);
            let start = char_to_byte_index(&state.text, state.cursor - 1);
            state.text.replace_range(start..end, "");
            state.cursor -= 1;
            true
        }
        LineEditAction::Delete => {
            let start = char_to_byte_index(&state.text, state.cursor);
            if start >= state.text.len() {
                return false;
            }
            let end = char_to_byte_index(&state.text, state.cursor + 1);
            state.text.replace_range(start..end, "");
            true
        }
        LineEditAction::MoveLeft => {
            if state.cursor == 0 {
                return false;
            }
            state.cursor -= 1;
            true
        }
        LineEditAction::MoveRight => {
            if state.cursor >= state.text.chars().count() {
                return false;
            }
            state.cursor += 1;
            true
        }
        LineEditAction::MoveStart => std::mem::replace(&mut state.cursor, 0) != 0,
        LineEditAction::MoveEnd => {
            let end = state.text.chars().count();
            std::mem::replace(&mut state.cursor, end) != end
        }
        LineEditAction::DeleteToEnd => {
            let byte_idx = char_to_byte_index(&state.text, state.cursor);
            if byte_idx >= state.text.len() {
                return false;
            }
            state.text.truncate(byte_idx);
            true
        }
        LineEditAction::DeleteWord => {
            if state.cursor == 0 {
                return false;
            }
            state.cursor = delete_word_before_cursor(&mut state.text, state.cursor);
            true
        }
        LineEditAction::ClearAll => {
            if state.text.is_empty() {
                return false;
            }
            state.clear();
            true
        }
    }
}

fn delete_word_before_cursor(input: &mut String, cursor: usize) -> usize {
    let mut chars: Vec<char> = input.chars().collect();
    let end = cursor.min(chars.len());
    let mut idx = end;
    while idx > 0 && chars[idx - 1] == ' ' {
        idx -= 1;
    }
    while idx > 0 && chars[idx - 1] != ' ' {
        idx -= 1;
    }
    chars.drain(idx..end);
    *input = chars.into_iter().collect();
    idx
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[derive(Debug, Clone)]
pub struct LineEditorError {
    message: String,
}

impl LineEditorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LineEditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LineEditorError {}

impl From<io::Error> for LineEditorError {
    fn from(err: io::Error) -> Self {
        LineEditorError::new(err.to_string())
    }
}

/// Read a secret from the terminal, echoing `*` for each character.
pub fn prompt_masked(prompt: &str) -> Result<String, LineEditorError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, event::EnableBracketedPaste)?;

    let result = (|| -> Result<String, LineEditorError> {
        let mut state = LineEditorState::default();
        redraw_masked(prompt, &state)?;
        loop {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            let changed = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Enter => return Ok(state.text.trim().to_string()),
                    KeyCode::Esc => return Err(LineEditorError::new("Cancelled by user")),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err(LineEditorError::new("Cancelled by user"));
                    }
                    _ => map_key_event_to_action(&key)
                        .map(|action| apply_line_edit_action(&mut state, action))
                        .unwrap_or(false),
                },
                Event::Paste(text) => {
                    apply_line_edit_action(&mut state, LineEditAction::Paste(text))
                }
                _ => false,
            };
            if changed {
                redraw_masked(prompt, &state)?;
            }
        }
    })();

    let restore = disable_raw_mode().and_then(|_| execute!(stdout, event::DisableBracketedPaste));
    println!();
    let value = result?;
    restore?;
    Ok(value)
}

fn redraw_masked(prompt: &str, state: &LineEditorState) -> io::Result<()> {
    let masked = "*".repeat(state.text.chars().count());
    print!("\r\x1b[K{prompt}{masked}");
    let columns = UnicodeWidthStr::width(prompt) + state.cursor;
    if columns > 0 {
        print!("\r\x1b[{columns}C");
    }
    io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_move_cursor() {
        let mut state = LineEditorState::default();
        assert!(apply_line_edit_action(&mut state, LineEditAction::Insert('a')));
        assert_eq!(state.text, "a");
        assert_eq!(state.cursor, 1);

        apply_line_edit_action(&mut state, LineEditAction::MoveLeft);
        apply_line_edit_action(&mut state, LineEditAction::Insert('b'));
        assert_eq!(state.text, "ba");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn multibyte_text_edits_by_character() {
        let mut state = LineEditorState::with_text("Ésaïe");
        apply_line_edit_action(&mut state, LineEditAction::Backspace);
        assert_eq!(state.text, "Ésaï");
        apply_line_edit_action(&mut state, LineEditAction::MoveStart);
        apply_line_edit_action(&mut state, LineEditAction::Delete);
        assert_eq!(state.text, "saï");
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut state = LineEditorState::with_text("verses about  peace");
        assert!(apply_line_edit_action(&mut state, LineEditAction::DeleteWord));
        assert_eq!(state.text, "verses about  ");
        assert!(apply_line_edit_action(&mut state, LineEditAction::DeleteWord));
        assert_eq!(state.text, "verses ");
        assert_eq!(state.cursor, 7);
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut state = LineEditorState::default();
        apply_line_edit_action(&mut state, LineEditAction::Paste("John 3:16\r\nJohn 3:17".into()));
        assert_eq!(state.text, "John 3:16 John 3:17");
        assert_eq!(state.cursor, state.text.chars().count());
    }

    #[test]
    fn control_keys_are_left_to_caller() {
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(map_key_event_to_action(&enter), None);
        assert_eq!(map_key_event_to_action(&ctrl_n), None);
        assert_eq!(map_key_event_to_action(&ctrl_u), Some(LineEditAction::ClearAll));
    }

    #[test]
    fn take_empties_the_editor() {
        let mut state = LineEditorState::with_text("/help");
        assert_eq!(state.take(), "/help");
        assert!(state.is_empty());
        assert_eq!(state.cursor, 0);
    }
}
