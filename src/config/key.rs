use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single key with modifiers, written as `ctrl+s`, `F2`, `Tab` or `G`
/// in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            // Terminals report uppercase letters with or without SHIFT, so
            // SHIFT is ignored once the characters agree.
            (KeyCode::Char(expected), KeyCode::Char(actual)) => {
                let ignore_shift = |m: KeyModifiers| m & !KeyModifiers::SHIFT;
                expected == actual
                    && ignore_shift(self.modifiers) == ignore_shift(event.modifiers)
            }
            _ => self.code == event.code && self.modifiers == event.modifiers,
        }
    }

    pub fn display(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".into());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".into());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("shift".into());
        }
        parts.push(code_name(self.code));
        parts.join("+")
    }
}

fn code_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::BackTab => "BackTab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        _ => "?".into(),
    }
}

fn parse_code(name: &str) -> Result<KeyCode, String> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Single characters keep their case: `g` and `G` are different keys.
        return Ok(KeyCode::Char(c));
    }

    let lower = name.to_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        f if f.starts_with('f') => f[1..]
            .parse()
            .map(KeyCode::F)
            .map_err(|_| format!("Invalid function key: {name}"))?,
        _ => return Err(format!("Unknown key: {name}")),
    };
    Ok(code)
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // A trailing `+` is the plus key itself, e.g. `ctrl++`.
        let (prefix, name) = match s.strip_suffix("++") {
            Some(prefix) => (Some(prefix), "+"),
            None => match s.rsplit_once('+') {
                Some((prefix, name)) if !name.is_empty() => (Some(prefix), name),
                _ => (None, s),
            },
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.into_iter().flat_map(|p| p.split('+')) {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(format!("Unknown modifier: {part}")),
            };
        }

        Ok(Self {
            code: parse_code(name)?,
            modifiers,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One or more keys bound to the same action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Single(Key),
    Multiple(Vec<Key>),
}

impl KeyBinding {
    pub const fn multiple(keys: Vec<Key>) -> Self {
        Self::Multiple(keys)
    }

    pub fn keys(&self) -> &[Key] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multiple(keys) => keys,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys().iter().any(|k| k.matches(event))
    }

    pub fn display(&self) -> String {
        self.keys()
            .iter()
            .map(Key::display)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl From<Key> for KeyBinding {
    fn from(key: Key) -> Self {
        Self::Single(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing() {
        assert_eq!("q".parse::<Key>().unwrap(), Key::new(KeyCode::Char('q')));
        assert_eq!("Enter".parse::<Key>().unwrap(), Key::new(KeyCode::Enter));
        assert_eq!("tab".parse::<Key>().unwrap(), Key::new(KeyCode::Tab));
        assert_eq!(
            "ctrl+s".parse::<Key>().unwrap(),
            Key::with_ctrl(KeyCode::Char('s'))
        );
        assert_eq!("F2".parse::<Key>().unwrap(), Key::new(KeyCode::F(2)));
        assert_eq!("G".parse::<Key>().unwrap(), Key::new(KeyCode::Char('G')));
        assert_eq!(
            "ctrl++".parse::<Key>().unwrap(),
            Key::with_ctrl(KeyCode::Char('+'))
        );
    }

    #[test]
    fn test_key_parsing_errors() {
        assert!("hyper+a".parse::<Key>().is_err());
        assert!("Fx".parse::<Key>().is_err());
        assert!("nonsense".parse::<Key>().is_err());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new(KeyCode::Char('q')).display(), "q");
        assert_eq!(Key::new(KeyCode::F(1)).display(), "F1");
        assert_eq!(Key::with_ctrl(KeyCode::Char('s')).display(), "ctrl+s");
    }

    #[test]
    fn test_uppercase_key_ignores_shift() {
        let key = Key::new(KeyCode::Char('G'));
        let event = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert!(key.matches(&event));
        assert!(!key.matches(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_binding_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            one: KeyBinding,
            many: KeyBinding,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            one = "ctrl+s"
            many = ["Tab", "m"]
            "#,
        )
        .unwrap();

        assert_eq!(parsed.one, Key::with_ctrl(KeyCode::Char('s')).into());
        assert!(parsed.many.matches(&KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE)));
        assert_eq!(parsed.many.display(), "Tab/m");
    }
}
