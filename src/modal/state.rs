use std::fmt;

/// Class asserted on the page while a dialog covers it.
pub const PAGE_DIALOG_CLASS: &str = "dialog-is-shown";
/// Class asserted on the overlay root while it is visible.
pub const OVERLAY_SHOWN_CLASS: &str = "is-shown";

/// Whether the modal overlay is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Hidden,
    Shown,
}

impl ModalState {
    /// The page and overlay flags are both derived from this one value, so
    /// they can never disagree.
    pub const fn flags(self) -> VisibilityFlags {
        let shown = matches!(self, Self::Shown);
        VisibilityFlags {
            page_dimmed: shown,
            overlay_shown: shown,
        }
    }
}

/// The two visibility assertions a shown modal makes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityFlags {
    /// The page behind the dialog is dimmed and takes no input.
    pub page_dimmed: bool,
    /// The overlay itself is drawn.
    pub overlay_shown: bool,
}

impl VisibilityFlags {
    pub const fn page_class(self) -> Option<&'static str> {
        if self.page_dimmed {
            Some(PAGE_DIALOG_CLASS)
        } else {
            None
        }
    }

    pub const fn overlay_class(self) -> Option<&'static str> {
        if self.overlay_shown {
            Some(OVERLAY_SHOWN_CLASS)
        } else {
            None
        }
    }

    /// Combine the flags of several modals sharing one page.
    pub const fn union(self, other: Self) -> Self {
        Self {
            page_dimmed: self.page_dimmed || other.page_dimmed,
            overlay_shown: self.overlay_shown || other.overlay_shown,
        }
    }
}

/// Which pane of the tabbed modal is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editor,
    Settings,
}

impl Mode {
    pub const ALL: [Self; 2] = [Self::Editor, Self::Settings];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Settings => "settings",
        }
    }

    /// Parse a mode identifier. Anything other than `editor` selects the
    /// settings pane.
    pub fn from_id(id: &str) -> Self {
        if id == Self::Editor.id() {
            Self::Editor
        } else {
            Self::Settings
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Settings,
            Self::Settings => Self::Editor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Editor => "Editor",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
