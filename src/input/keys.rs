//! Keyboard keys and keyboard actions.

use std::str::FromStr;

/// A key typed into the focused element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A regular character key.
    Char(char),
    /// Backspace. Typed as `'\u{8}'`.
    Delete,
    /// Return key.
    Return,
}

impl Key {
    /// Character sent to the application for this key.
    pub fn as_char(self) -> char {
        match self {
            Key::Char(c) => c,
            Key::Delete => '\u{8}',
            Key::Return => '\n',
        }
    }

    /// Inverse of [`Key::as_char`].
    pub fn from_char(c: char) -> Self {
        match c {
            '\u{8}' => Key::Delete,
            '\n' | '\r' => Key::Return,
            c => Key::Char(c),
        }
    }

    /// Text for typing this key `count` times.
    pub fn repeated(self, count: usize) -> String {
        std::iter::repeat_n(self.as_char(), count).collect()
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }
        match s.trim().to_lowercase().as_str() {
            "delete" | "backspace" => Ok(Key::Delete),
            "return" | "enter" => Ok(Key::Return),
            other => Err(format!("unknown key: {other}")),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Delete => write!(f, "delete"),
            Key::Return => write!(f, "return"),
        }
    }
}

/// A keyboard-level action performed through a key of the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    /// Hide the keyboard.
    Dismiss,
    /// Move to the next input.
    Next,
}

impl KeyboardAction {
    /// Label of the keyboard button performing this action.
    pub fn descriptor(self) -> &'static str {
        match self {
            KeyboardAction::Dismiss => "Hide keyboard",
            KeyboardAction::Next => "Next",
        }
    }
}

impl FromStr for KeyboardAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dismiss" => Ok(KeyboardAction::Dismiss),
            "next" => Ok(KeyboardAction::Next),
            other => Err(format!("unknown keyboard action: {other}")),
        }
    }
}

impl std::fmt::Display for KeyboardAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyboardAction::Dismiss => write!(f, "dismiss"),
            KeyboardAction::Next => write!(f, "next"),
        }
    }
}
