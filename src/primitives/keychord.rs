//! Key chord parsing for the copy shortcut.
//!
//! Chords are written the way keymaps usually spell them: modifiers joined to
//! the key by `-`, e.g. `Alt-Enter`, `Ctrl-Shift-c`, `Mod-Enter`.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key together with the exact set of modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Check whether a key event triggers this chord.
    ///
    /// Character keys compare case-insensitively, and SHIFT is ignored for
    /// them when the chord does not mention it (terminals disagree on whether
    /// an uppercase letter carries SHIFT). Only presses match; release and
    /// repeat events reported by enhanced keyboard protocols do not.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind != KeyEventKind::Press {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(want), KeyCode::Char(got)) => {
                if !want.eq_ignore_ascii_case(&got) {
                    return false;
                }
                let mut held = event.modifiers;
                if !self.modifiers.contains(KeyModifiers::SHIFT) {
                    held.remove(KeyModifiers::SHIFT);
                }
                held == self.modifiers
            }
            (want, got) => want == got && event.modifiers == self.modifiers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParseKeyChordError(pub String);

impl FromStr for KeyChord {
    type Err = ParseKeyChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseKeyChordError("empty key chord".into()));
        }

        if trimmed == "-" {
            return Ok(KeyChord::new(KeyCode::Char('-'), KeyModifiers::NONE));
        }

        let mut tokens: Vec<_> = trimmed.split('-').collect();
        let key_token = tokens
            .pop()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ParseKeyChordError(format!("missing key in '{trimmed}'")))?;

        let mut modifiers = KeyModifiers::NONE;
        for token in tokens {
            let modifier = match token.trim().to_ascii_lowercase().as_str() {
                "s" | "shift" => KeyModifiers::SHIFT,
                "c" | "ctrl" | "control" => KeyModifiers::CONTROL,
                "a" | "alt" | "option" | "opt" => KeyModifiers::ALT,
                "m" | "meta" | "cmd" | "super" => KeyModifiers::SUPER,
                // "Mod" is the platform's primary modifier
                "mod" => {
                    if cfg!(target_os = "macos") {
                        KeyModifiers::SUPER
                    } else {
                        KeyModifiers::CONTROL
                    }
                }
                "" => continue,
                invalid => {
                    return Err(ParseKeyChordError(format!(
                        "invalid key modifier '{invalid}-'"
                    )))
                }
            };
            if modifiers.contains(modifier) {
                return Err(ParseKeyChordError(format!(
                    "repeated key modifier '{}-'",
                    token.trim()
                )));
            }
            modifiers.insert(modifier);
        }

        Ok(KeyChord::new(parse_key_token(key_token)?, modifiers))
    }
}

fn parse_key_token(token: &str) -> Result<KeyCode, ParseKeyChordError> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    match token.to_ascii_lowercase().as_str() {
        "enter" | "ret" | "return" => Ok(KeyCode::Enter),
        "space" => Ok(KeyCode::Char(' ')),
        "tab" => Ok(KeyCode::Tab),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "backspace" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "insert" | "ins" => Ok(KeyCode::Insert),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" => Ok(KeyCode::PageUp),
        "pagedown" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "minus" => Ok(KeyCode::Char('-')),
        other => {
            if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            Err(ParseKeyChordError(format!("unknown key '{token}'")))
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl-"),
            (KeyModifiers::ALT, "Alt-"),
            (KeyModifiers::SHIFT, "Shift-"),
            (KeyModifiers::SUPER, "Meta-"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(name)?;
            }
        }
        match self.code {
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char('-') => f.write_str("Minus"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alt_enter() {
        let chord: KeyChord = "Alt-Enter".parse().unwrap();
        assert_eq!(chord.code, KeyCode::Enter);
        assert_eq!(chord.modifiers, KeyModifiers::ALT);
    }

    #[test]
    fn test_parse_multiple_modifiers() {
        let chord: KeyChord = "Ctrl-Shift-c".parse().unwrap();
        assert_eq!(chord.code, KeyCode::Char('c'));
        assert_eq!(chord.modifiers, KeyModifiers::CONTROL | KeyModifiers::SHIFT);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<KeyChord>().is_err());
        assert!("Alt-".parse::<KeyChord>().is_err());
        assert!("Hyper-Enter".parse::<KeyChord>().is_err());
        assert!("Alt-Alt-Enter".parse::<KeyChord>().is_err());
        assert!("Alt-Whatever".parse::<KeyChord>().is_err());
    }

    #[test]
    fn test_matches_requires_exact_modifiers() {
        let chord: KeyChord = "Alt-Enter".parse().unwrap();
        assert!(chord.matches(&KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)));
        assert!(!chord.matches(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!chord.matches(&KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::ALT | KeyModifiers::CONTROL
        )));
    }

    #[test]
    fn test_matches_char_case_insensitively() {
        let chord: KeyChord = "Ctrl-c".parse().unwrap();
        assert!(chord.matches(&KeyEvent::new(KeyCode::Char('C'), KeyModifiers::CONTROL)));
        assert!(chord.matches(&KeyEvent::new(
            KeyCode::Char('C'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
    }

    #[test]
    fn test_matches_presses_only() {
        let chord: KeyChord = "Alt-Enter".parse().unwrap();
        let mut event = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert!(chord.matches(&event));
        event.kind = KeyEventKind::Release;
        assert!(!chord.matches(&event));
        event.kind = KeyEventKind::Repeat;
        assert!(!chord.matches(&event));
    }

    #[test]
    fn test_display() {
        let chord: KeyChord = "alt-enter".parse().unwrap();
        assert_eq!(chord.to_string(), "Alt-Enter");
    }
}
