pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Settings for the embedded block editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Give up on a block render after this many seconds. Unset means the
    /// modal waits for the renderer indefinitely.
    #[serde(default)]
    pub render_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.theme.name, "Catppuccin Mocha");
        assert!(config.editor.render_timeout_secs.is_none());
        assert_eq!(config.keybindings.modal.cancel.display(), "Esc");
    }

    #[test]
    fn test_partial_keybindings_override() {
        let config: AppConfig = toml::from_str(
            r#"
            [editor]
            render_timeout_secs = 10

            [keybindings.modal]
            toggle_mode = ["Tab", "m"]
            "#,
        )
        .unwrap();

        assert_eq!(config.editor.render_timeout_secs, Some(10));
        assert_eq!(config.keybindings.modal.toggle_mode.display(), "Tab/m");
        assert_eq!(config.keybindings.modal.save.display(), "ctrl+s");
    }
}
