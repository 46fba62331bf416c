#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Suspend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
}

/// Actions available on the unit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Edit,
    EditContainer,
}

/// The modal's action table. `Save` is the "add" action of the dialog
/// footer, `ToggleMode` flips between the editor and settings tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Save,
    Cancel,
    EditorMode,
    SettingsMode,
    ToggleMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Edit,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Dismiss,
}
