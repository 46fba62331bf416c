use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub suspend: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageKeybindings {
    pub edit: KeyBinding,
    pub edit_container: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalKeybindings {
    pub save: KeyBinding,
    pub cancel: KeyBinding,
    pub editor_mode: KeyBinding,
    pub settings_mode: KeyBinding,
    pub toggle_mode: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsKeybindings {
    pub edit: KeyBinding,
    pub clear: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub page: PageKeybindings,
    pub modal: ModalKeybindings,
    pub settings: SettingsKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for PageKeybindings {
    fn default() -> Self {
        Self {
            edit: KeyBinding::multiple(vec![Key::new(KeyCode::Enter), Key::new(KeyCode::Char('e'))]),
            edit_container: Key::new(KeyCode::Char('a')).into(),
        }
    }
}

impl Default for ModalKeybindings {
    fn default() -> Self {
        Self {
            save: Key::with_ctrl(KeyCode::Char('s')).into(),
            cancel: Key::new(KeyCode::Esc).into(),
            editor_mode: Key::new(KeyCode::F(1)).into(),
            settings_mode: Key::new(KeyCode::F(2)).into(),
            toggle_mode: Key::new(KeyCode::Tab).into(),
        }
    }
}

impl Default for SettingsKeybindings {
    fn default() -> Self {
        Self {
            edit: Key::new(KeyCode::Enter).into(),
            clear: Key::new(KeyCode::Char('x')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
        }
    }
}
