//! Keyboard input for the terminal driver
//!
//! The terminal runs in raw mode so Ctrl-C arrives as a key event and goes
//! through `Command::Quit` (and its save flush) instead of killing the
//! process. Typed text is collected into a line and parsed on Enter.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::game::Command;

/// Keeps the terminal in raw mode for its lifetime
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to restore terminal: {}", e);
        }
    }
}

/// Result of feeding one key into a [`LineInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// The pending line changed
    Edited,
    /// A complete command
    Command(Command),
    /// Enter on a line that does not parse
    Rejected(String),
    Ignored,
}

/// Pending command line
#[derive(Debug, Default)]
pub struct LineInput {
    buffer: String,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn feed(&mut self, key: KeyEvent) -> KeyAction {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return KeyAction::Ignored;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c' | 'd') if ctrl => {
                self.buffer.clear();
                KeyAction::Command(Command::Quit)
            }
            KeyCode::Esc => {
                self.buffer.clear();
                KeyAction::Command(Command::Quit)
            }
            KeyCode::Char(_) if ctrl => KeyAction::Ignored,
            KeyCode::Char(c) => {
                self.buffer.push(c);
                KeyAction::Edited
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    KeyAction::Edited
                } else {
                    KeyAction::Ignored
                }
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.buffer);
                if line.trim().is_empty() {
                    return KeyAction::Edited;
                }
                match line.parse() {
                    Ok(command) => KeyAction::Command(command),
                    Err(e) => KeyAction::Rejected(e),
                }
            }
            _ => KeyAction::Ignored,
        }
    }
}

/// Drain every key event already queued, without blocking
pub fn poll_keys() -> Result<Vec<KeyEvent>> {
    let mut keys = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MenuOption;
    use crate::sim::Item;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_line(input: &mut LineInput, text: &str) -> KeyAction {
        for c in text.chars() {
            assert_eq!(input.feed(key(KeyCode::Char(c))), KeyAction::Edited);
        }
        input.feed(key(KeyCode::Enter))
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut input = LineInput::new();
        input.feed(key(KeyCode::Char('4')));
        let action = input.feed(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, KeyAction::Command(Command::Quit));
        assert_eq!(input.pending(), "");
    }

    #[test]
    fn test_escape_and_ctrl_d_quit() {
        let mut input = LineInput::new();
        assert_eq!(input.feed(key(KeyCode::Esc)), KeyAction::Command(Command::Quit));
        let action = input.feed(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(action, KeyAction::Command(Command::Quit));
    }

    #[test]
    fn test_typed_lines_parse_on_enter() {
        let mut input = LineInput::new();
        assert_eq!(
            type_line(&mut input, "buy skip"),
            KeyAction::Command(Command::Buy(Item::Skip))
        );
        assert_eq!(
            type_line(&mut input, "play"),
            KeyAction::Command(Command::SelectMenu(MenuOption::Play))
        );
        assert_eq!(type_line(&mut input, "-3"), KeyAction::Command(Command::SubmitAnswer(-3)));
        assert!(matches!(type_line(&mut input, "dance"), KeyAction::Rejected(_)));
        assert_eq!(input.pending(), "");
    }

    #[test]
    fn test_backspace_edits_line() {
        let mut input = LineInput::new();
        assert_eq!(input.feed(key(KeyCode::Backspace)), KeyAction::Ignored);
        input.feed(key(KeyCode::Char('1')));
        input.feed(key(KeyCode::Char('9')));
        assert_eq!(input.feed(key(KeyCode::Backspace)), KeyAction::Edited);
        assert_eq!(input.feed(key(KeyCode::Enter)), KeyAction::Command(Command::SubmitAnswer(1)));
    }

    #[test]
    fn test_key_release_ignored() {
        let mut input = LineInput::new();
        let mut release = key(KeyCode::Char('c'));
        release.modifiers = KeyModifiers::CONTROL;
        release.kind = KeyEventKind::Release;
        assert_eq!(input.feed(release), KeyAction::Ignored);
    }
}
