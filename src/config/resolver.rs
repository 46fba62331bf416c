use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DialogAction, GlobalAction, ModalAction, NavAction, PageAction, SettingsAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to the configured actions of each input scope.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Suspend => &kb.suspend,
        }
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
            NavAction::Select => &kb.select,
        }
    }

    fn page(&self, action: PageAction) -> &KeyBinding {
        let kb = &self.keybindings.page;
        match action {
            PageAction::Edit => &kb.edit,
            PageAction::EditContainer => &kb.edit_container,
        }
    }

    fn modal(&self, action: ModalAction) -> &KeyBinding {
        let kb = &self.keybindings.modal;
        match action {
            ModalAction::Save => &kb.save,
            ModalAction::Cancel => &kb.cancel,
            ModalAction::EditorMode => &kb.editor_mode,
            ModalAction::SettingsMode => &kb.settings_mode,
            ModalAction::ToggleMode => &kb.toggle_mode,
        }
    }

    fn settings(&self, action: SettingsAction) -> &KeyBinding {
        let kb = &self.keybindings.settings;
        match action {
            SettingsAction::Edit => &kb.edit,
            SettingsAction::Clear => &kb.clear,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn matches_page(&self, event: &KeyEvent, action: PageAction) -> bool {
        self.page(action).matches(event)
    }

    pub fn display_page(&self, action: PageAction) -> String {
        self.page(action).display()
    }

    pub fn matches_modal(&self, event: &KeyEvent, action: ModalAction) -> bool {
        self.modal(action).matches(event)
    }

    pub fn display_modal(&self, action: ModalAction) -> String {
        self.modal(action).display()
    }

    pub fn matches_settings(&self, event: &KeyEvent, action: SettingsAction) -> bool {
        self.settings(action).matches(event)
    }

    pub fn display_settings(&self, action: SettingsAction) -> String {
        self.settings(action).display()
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
