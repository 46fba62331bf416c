use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::bail;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use serde_json::Map;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::block::{BlockDescriptor, LOCATOR_ATTR};
use crate::commands::Command;
use crate::config::{KeyResolver, ModalAction};
use crate::editor::{BlockRenderer, EditorView, RenderedBlock, STUDIO_VIEW};
use crate::modal::command::RenderBlockCmd;
use crate::modal::message::{ModalMsg, ModalOutput};
use crate::modal::state::{ModalState, Mode, VisibilityFlags};
use crate::page::{Element, Trigger};
use crate::settings::{SettingsEvent, SettingsForm, settings_payload};
use crate::ui::{Component, EventResult, Keybinding, Modal, Result};

const SHELL_CLASS: &str = "wrapper-dialog-edit-xblock";
const HEADER_CLASS: &str = "modal-header";
const MODES_CLASS: &str = "action-modes";
const MODE_LINK_CLASS: &str = "mode-link";
const EDITOR_PANE_CLASS: &str = "xblock-editor";
const SAVE_CLASS: &str = "action-add";
const CANCEL_CLASS: &str = "action-cancel";
const MODE_ATTR: &str = "mode";

/// Setting whose value doubles as the modal title.
const DISPLAY_NAME_FIELD: &str = "display_name";

/// Which of the two modal layouts to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalVariant {
    /// Editor and settings panes behind mode tabs.
    Tabbed,
    /// A single, always visible editor pane.
    EditorOnly,
}

/// Controls in the modal shell and the handler each one triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellAction {
    Save,
    Cancel,
    ChangeMode,
}

const SHELL_ACTIONS: [(&str, ShellAction); 3] = [
    (SAVE_CLASS, ShellAction::Save),
    (CANCEL_CLASS, ShellAction::Cancel),
    (MODE_LINK_CLASS, ShellAction::ChangeMode),
];

/// Runs once the render of the current `open` completes.
pub type OnRendered = Box<dyn FnOnce(&mut EditBlockModal)>;

struct PendingRender {
    label: String,
    on_success: Option<OnRendered>,
}

/// Resolve the block a trigger refers to: the closest ancestor-or-self
/// carrying a locator, or `fallback` when there is none.
pub fn find_block_descriptor(trigger: &Trigger<'_>, fallback: &BlockDescriptor) -> BlockDescriptor {
    trigger
        .closest_with_data(LOCATOR_ATTR)
        .and_then(BlockDescriptor::from_element)
        .unwrap_or_else(|| fallback.clone())
}

/// Overlay that edits one block at a time.
///
/// The modal only becomes visible once the block's editor has rendered:
/// [`EditBlockModal::open`] returns the render as a [`Command`] and the
/// completion arrives later through [`EditBlockModal::update`]. Every `open`
/// starts a new generation, so the completion of an earlier, superseded
/// `open` is dropped.
pub struct EditBlockModal {
    variant: ModalVariant,
    state: ModalState,
    title: String,
    descriptor: Option<BlockDescriptor>,
    shell: Element,
    editor: Option<EditorView>,
    settings: Option<SettingsForm>,
    mode: Option<Mode>,
    generation: u64,
    pending: Option<PendingRender>,
    renderer: Arc<dyn BlockRenderer>,
    render_timeout: Option<Duration>,
    msg_tx: UnboundedSender<ModalMsg>,
    msg_rx: UnboundedReceiver<ModalMsg>,
    resolver: Arc<KeyResolver>,
}

impl EditBlockModal {
    pub fn new(
        variant: ModalVariant,
        renderer: Arc<dyn BlockRenderer>,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();
        Self {
            variant,
            state: ModalState::Hidden,
            title: String::new(),
            descriptor: None,
            shell: Element::default(),
            editor: None,
            settings: None,
            mode: None,
            generation: 0,
            pending: None,
            renderer,
            render_timeout: None,
            msg_tx,
            msg_rx,
            resolver,
        }
    }

    /// Give up on renders that take longer than `timeout`.
    pub const fn with_render_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.render_timeout = timeout;
        self
    }

    /// Start editing the block `trigger` refers to.
    ///
    /// Hides whatever the modal showed before; the modal is shown again once
    /// the returned render command has completed and [`Self::update`] has
    /// picked up its result.
    pub fn open(
        &mut self,
        trigger: &Trigger<'_>,
        fallback: &BlockDescriptor,
    ) -> Result<Box<dyn Command>> {
        let descriptor = find_block_descriptor(trigger, fallback);
        info!("Opening {:?} editor for {descriptor}", self.variant);
        self.hide();
        self.descriptor = Some(descriptor);
        let show: OnRendered = Box::new(|modal| modal.show());
        self.render_editor(Some(show))
    }

    /// Rebuild the shell and the editor for the current block and dispatch
    /// its render. `on_success` runs when the render completes, before the
    /// settings form is built.
    pub fn render_editor(&mut self, on_success: Option<OnRendered>) -> Result<Box<dyn Command>> {
        let Some(descriptor) = self.descriptor.clone() else {
            bail!("No block selected to edit");
        };

        self.generation += 1;
        self.shell = build_shell(self.variant, &descriptor);
        self.title = self
            .shell
            .find_class(HEADER_CLASS)
            .and_then(|header| header.text.clone())
            .unwrap_or_default();
        self.settings = None;
        self.mode = None;

        let editor = EditorView::new(descriptor, STUDIO_VIEW, self.resolver.clone());
        let cmd = RenderBlockCmd {
            renderer: self.renderer.clone(),
            descriptor: editor.descriptor().clone(),
            view: editor.view(),
            generation: self.generation,
            timeout: self.render_timeout,
            tx: self.msg_tx.clone(),
        };
        self.pending = Some(PendingRender {
            label: cmd.name(),
            on_success,
        });
        self.editor = Some(editor);
        debug!("Dispatched render generation {}", self.generation);
        Ok(Box::new(cmd))
    }

    /// Process completed renders. Returns what the host needs to act on.
    pub fn update(&mut self) -> Vec<ModalOutput> {
        let mut outputs = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                ModalMsg::Rendered { generation, block } => self.rendered(generation, block),
                ModalMsg::RenderFailed { generation, reason } => {
                    outputs.extend(self.render_failed(generation, reason));
                }
            }
        }
        outputs
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.pending.is_some()
    }

    fn rendered(&mut self, generation: u64, block: RenderedBlock) {
        if !self.is_current(generation) {
            debug!("Dropping stale render of generation {generation}");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        if let Some(editor) = self.editor.as_mut() {
            editor.load(block);
        }
        if let Some(on_success) = pending.on_success {
            on_success(self);
        }
        if self.variant == ModalVariant::Tabbed {
            self.create_settings_form();
        }
    }

    fn render_failed(&mut self, generation: u64, reason: String) -> Option<ModalOutput> {
        if !self.is_current(generation) {
            debug!("Dropping stale render failure of generation {generation}: {reason}");
            return None;
        }
        self.pending = None;
        self.editor = None;
        let descriptor = self.descriptor.take()?;
        warn!("Could not render editor for {descriptor}: {reason}");
        Some(ModalOutput::RenderFailed { descriptor, reason })
    }

    fn create_settings_form(&mut self) {
        let Some(entries) = self
            .editor
            .as_ref()
            .and_then(EditorView::fragment)
            .and_then(settings_payload)
        else {
            debug!("Rendered block has no settings");
            return;
        };

        let form = SettingsForm::new(entries, self.resolver.clone());
        if let Some(editor) = self.editor.as_mut()
            && editor.set_metadata_editor(&form)
        {
            debug!("Linked {} settings to the block editor", form.entry_count());
        }
        self.settings = Some(form);

        let has_data_editor = self.editor.as_ref().is_some_and(EditorView::has_data_editor);
        self.select_mode(if has_data_editor {
            Mode::Editor
        } else {
            Mode::Settings
        });
    }

    /// Show exactly one of the two panes.
    pub fn select_mode(&mut self, mode: Mode) {
        if self.variant == ModalVariant::EditorOnly {
            warn!("Ignoring {mode} mode: this modal has a single pane");
            return;
        }
        if !self.editor.as_ref().is_some_and(EditorView::is_loaded) {
            warn!("Ignoring {mode} mode: the editor has not rendered yet");
            return;
        }
        if mode == Mode::Settings && self.settings.is_none() {
            warn!("Ignoring settings mode: the block has no settings");
            return;
        }
        debug!("Selected {mode} mode");
        self.mode = Some(mode);
    }

    /// Select the mode named by the parent of the mode control at `path`
    /// in the modal shell.
    pub fn change_mode(&mut self, path: &[usize]) {
        let mode_id = Trigger::at(&self.shell, path)
            .and_then(|control| control.parent())
            .and_then(|parent| parent.data_str(MODE_ATTR));
        match mode_id {
            Some(id) => self.select_mode(Mode::from_id(&id)),
            None => warn!("Mode control at {path:?} names no mode"),
        }
    }

    /// Activate the shell control at `path`.
    fn click(&mut self, path: &[usize]) -> Option<ModalOutput> {
        let target = Trigger::at(&self.shell, path)?.target()?;
        let action = SHELL_ACTIONS
            .iter()
            .find(|(class, _)| target.has_class(class))
            .map(|(_, action)| *action)?;
        match action {
            ShellAction::Save => self.save(),
            ShellAction::Cancel => self.cancel(),
            ShellAction::ChangeMode => {
                self.change_mode(path);
                None
            }
        }
    }

    /// Dismiss the modal and drop any render still in flight. Returns
    /// `Cancelled` only if there was something to dismiss.
    pub fn cancel(&mut self) -> Option<ModalOutput> {
        let active = self.is_shown() || self.pending.is_some();
        self.pending = None;
        self.hide();
        if active {
            info!("Editing cancelled");
            Some(ModalOutput::Cancelled)
        } else {
            debug!("Cancel with nothing to dismiss");
            None
        }
    }

    /// Confirm the edit: report the changed settings and hide.
    pub fn save(&mut self) -> Option<ModalOutput> {
        if !self.is_shown() {
            return None;
        }
        let descriptor = self.descriptor.clone()?;
        let settings = self
            .settings
            .as_ref()
            .map(SettingsForm::modified_values)
            .unwrap_or_else(Map::new);
        info!("Saving {descriptor} with {} changed settings", settings.len());
        self.hide();
        Some(ModalOutput::Saved {
            descriptor,
            settings,
        })
    }

    pub fn show(&mut self) {
        self.set_state(ModalState::Shown);
    }

    pub fn hide(&mut self) {
        self.set_state(ModalState::Hidden);
    }

    fn set_state(&mut self, state: ModalState) {
        if self.state == state {
            return;
        }
        self.state = state;
        let flags = state.flags();
        debug!(
            page = ?flags.page_class(),
            overlay = ?flags.overlay_class(),
            "Modal visibility changed"
        );
    }

    pub const fn flags(&self) -> VisibilityFlags {
        self.state.flags()
    }

    /// Status text while a render is in flight.
    pub fn pending_label(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.label.as_str())
    }

    pub const fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn editor_visible(&self) -> bool {
        match self.mode {
            Some(mode) => mode == Mode::Editor,
            None => self.editor.as_ref().is_some_and(EditorView::is_loaded),
        }
    }

    pub fn settings_visible(&self) -> bool {
        self.mode == Some(Mode::Settings) && self.settings.is_some()
    }

    fn has_tabs(&self) -> bool {
        self.variant == ModalVariant::Tabbed && self.settings.is_some()
    }

    fn control_path(&self, class: &str) -> Option<Vec<usize>> {
        self.shell
            .walk()
            .into_iter()
            .find(|(_, element)| element.has_class(class))
            .map(|(path, _)| path)
    }

    fn control_label(&self, class: &str) -> &str {
        self.shell
            .find_class(class)
            .and_then(|control| control.text.as_deref())
            .unwrap_or_default()
    }

    fn mode_link_path(&self, mode: Mode) -> Option<Vec<usize>> {
        let (mut path, tab) = self
            .shell
            .walk()
            .into_iter()
            .find(|(_, element)| element.data_str(MODE_ATTR).as_deref() == Some(mode.id()))?;
        path.push(tab.children.iter().position(|c| c.has_class(MODE_LINK_CLASS))?);
        Some(path)
    }

    fn action_control(&self, action: ModalAction) -> Option<Vec<usize>> {
        match action {
            ModalAction::Save => self.control_path(SAVE_CLASS),
            ModalAction::Cancel => self.control_path(CANCEL_CLASS),
            ModalAction::EditorMode => self.mode_link_path(Mode::Editor),
            ModalAction::SettingsMode => self.mode_link_path(Mode::Settings),
            ModalAction::ToggleMode => self.mode_link_path(self.mode?.other()),
        }
    }

    fn setting_changed(&mut self, field: &str) {
        if field != DISPLAY_NAME_FIELD {
            return;
        }
        let name = self
            .settings
            .as_ref()
            .and_then(|form| form.entry(DISPLAY_NAME_FIELD))
            .map(|entry| entry.display())
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            self.title = format!("Editing: {name}");
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<EventResult<ModalOutput>> {
        let Some(form) = self.settings.as_mut() else {
            return Ok(EventResult::Consumed);
        };
        if let EventResult::Event(SettingsEvent::Changed(field)) = form.handle_key(key)? {
            self.setting_changed(&field);
        }
        Ok(EventResult::Consumed)
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut spans = Vec::new();
        for mode in Mode::ALL {
            let style = if self.mode == Some(mode) {
                Style::default()
                    .fg(theme.mauve())
                    .bg(theme.selection_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.overlay1())
            };
            spans.push(Span::styled(format!(" {} ", mode.label()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let key_style = Style::default().fg(theme.blue());
        let label_style = Style::default().fg(theme.subtext0());
        let footer = Line::from(vec![
            Span::styled(self.resolver.display_modal(ModalAction::Save), key_style),
            Span::styled(format!(" {}   ", self.control_label(SAVE_CLASS)), label_style),
            Span::styled(self.resolver.display_modal(ModalAction::Cancel), key_style),
            Span::styled(format!(" {}", self.control_label(CANCEL_CLASS)), label_style),
        ]);
        frame.render_widget(Paragraph::new(footer).alignment(Alignment::Right), area);
    }
}

impl Modal for EditBlockModal {
    type Output = ModalOutput;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_shown() {
            return Ok(EventResult::Ignored);
        }

        if self.settings.as_ref().is_some_and(SettingsForm::is_editing) {
            return self.handle_settings_key(key);
        }

        let action = [
            ModalAction::Save,
            ModalAction::Cancel,
            ModalAction::EditorMode,
            ModalAction::SettingsMode,
            ModalAction::ToggleMode,
        ]
        .into_iter()
        .find(|action| self.resolver.matches_modal(&key, *action));
        if let Some(action) = action {
            let output = self
                .action_control(action)
                .and_then(|path| self.click(&path));
            return Ok(output.map_or(EventResult::Consumed, EventResult::Event));
        }

        if self.settings_visible() {
            return self.handle_settings_key(key);
        }
        if let Some(editor) = self.editor.as_mut()
            && !editor.handle_key(key)?.is_consumed()
        {
            debug!("Key {:?} has no binding in the editor", key.code);
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_shown() {
            return;
        }

        let popup_area = area.centered(Constraint::Percentage(80), Constraint::Percentage(80));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.mauve()))
            .style(Style::default().bg(theme.mantle()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let tabs_height = u16::from(self.has_tabs());
        let [tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(tabs_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        if self.has_tabs() {
            self.render_tabs(frame, tabs_area, theme);
        }
        if self.settings_visible() {
            if let Some(form) = self.settings.as_mut() {
                form.render(frame, body_area, theme);
            }
        } else if self.editor_visible()
            && let Some(editor) = self.editor.as_mut()
        {
            editor.render(frame, body_area, theme);
        }
        self.render_footer(frame, footer_area, theme);
    }

    fn is_shown(&self) -> bool {
        self.state == ModalState::Shown
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut bindings = vec![
            Keybinding::new(
                self.resolver.display_modal(ModalAction::Save),
                self.control_label(SAVE_CLASS),
            ),
            Keybinding::new(
                self.resolver.display_modal(ModalAction::Cancel),
                self.control_label(CANCEL_CLASS),
            ),
        ];
        if self.has_tabs() {
            bindings.push(Keybinding::new(
                self.resolver.display_modal(ModalAction::ToggleMode),
                format!("{} pane", self.mode().map_or(Mode::Editor, Mode::other).label()),
            ));
        }
        bindings
    }
}

/// The modal's element skeleton. Controls are addressed by path into this
/// tree, the same way page triggers are.
fn build_shell(variant: ModalVariant, descriptor: &BlockDescriptor) -> Element {
    let header = Element::default()
        .with_class(HEADER_CLASS)
        .with_text(format!("Editing: {}", descriptor.label()));
    let editor_pane = Element::default().with_class(EDITOR_PANE_CLASS);
    let footer = Element::default()
        .with_child(Element::default().with_class(SAVE_CLASS).with_text("Save"))
        .with_child(Element::default().with_class(CANCEL_CLASS).with_text("Cancel"));

    let mut shell = Element::default().with_class(SHELL_CLASS).with_child(header);
    if variant == ModalVariant::Tabbed {
        let modes = Mode::ALL.into_iter().fold(
            Element::default().with_class(MODES_CLASS),
            |modes, mode| {
                modes.with_child(
                    Element::default().with_data(MODE_ATTR, mode.id()).with_child(
                        Element::default()
                            .with_class(MODE_LINK_CLASS)
                            .with_text(mode.label()),
                    ),
                )
            },
        );
        shell = shell.with_child(modes);
    }
    shell.with_child(editor_pane).with_child(footer)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use color_eyre::eyre::eyre;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::{Value, json};

    use super::*;
    use crate::editor::{DATA_EDITOR_CLASS, METADATA_EDITOR_ATTR};
    use crate::settings::{SETTINGS_CONTAINER_CLASS, SETTINGS_PAYLOAD_ATTR};

    /// Renders the fragments it was given; unknown blocks fail, `"slow"`
    /// never completes.
    struct MockRenderer {
        fragments: HashMap<String, Element>,
    }

    #[async_trait]
    impl BlockRenderer for MockRenderer {
        async fn render(
            &self,
            descriptor: &BlockDescriptor,
            _view: &str,
        ) -> color_eyre::Result<RenderedBlock> {
            if descriptor.id == "slow" {
                std::future::pending::<()>().await;
            }
            self.fragments
                .get(&descriptor.id)
                .cloned()
                .map(|fragment| RenderedBlock { fragment })
                .ok_or_else(|| eyre!("unknown block {}", descriptor.id))
        }
    }

    fn settings_container() -> Element {
        Element::default().with_class(SETTINGS_CONTAINER_CLASS).with_data(
            SETTINGS_PAYLOAD_ATTR,
            json!({
                "display_name": {
                    "field_name": "display_name",
                    "display_name": "Display Name",
                    "type": "Generic",
                    "value": "Block 1",
                    "default_value": "Text",
                    "explicitly_set": true
                },
                "max_attempts": {
                    "field_name": "max_attempts",
                    "display_name": "Maximum Attempts",
                    "type": "Integer",
                    "value": null,
                    "default_value": null
                }
            }),
        )
    }

    fn renderer() -> Arc<dyn BlockRenderer> {
        let mut fragments = HashMap::new();
        fragments.insert(
            "b1".to_string(),
            Element::default()
                .with_text("<p>Block 1</p>")
                .with_child(settings_container()),
        );
        fragments.insert(
            "problem".to_string(),
            Element::default()
                .with_data(METADATA_EDITOR_ATTR, true)
                .with_child(
                    Element::default()
                        .with_class(DATA_EDITOR_CLASS)
                        .with_text("What is 2 + 2?"),
                )
                .with_child(settings_container()),
        );
        fragments.insert(
            "v1".to_string(),
            Element::default().with_text("Group A\nGroup B"),
        );
        Arc::new(MockRenderer { fragments })
    }

    fn modal(variant: ModalVariant) -> EditBlockModal {
        EditBlockModal::new(variant, renderer(), Arc::new(KeyResolver::default()))
    }

    fn unit() -> BlockDescriptor {
        BlockDescriptor::new("unit-1", "vertical", "Unit 1")
    }

    fn page() -> Element {
        let block = |locator: &str, category: &str, name: &str| {
            Element::default()
                .with_data("locator", locator)
                .with_data("category", category)
                .with_data("display-name", name)
                .with_child(Element::default().with_class("edit-button").with_text("Edit"))
        };
        Element::default()
            .with_child(block("b1", "html", "Block 1"))
            .with_child(block("problem", "problem", "Addition"))
            .with_child(Element::default().with_class("edit-button"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn open_at(modal: &mut EditBlockModal, path: &[usize]) {
        let root = page();
        let trigger = Trigger::at(&root, path).unwrap();
        let cmd = modal.open(&trigger, &unit()).unwrap();
        cmd.execute().await.unwrap();
        modal.update();
    }

    #[test]
    fn test_descriptor_resolution() {
        let root = Element::default().with_child(
            Element::default()
                .with_data("locator", "block-42")
                .with_data("category", "html")
                .with_data("display-name", "Intro")
                .with_child(Element::default().with_child(Element::default())),
        );

        let nested = Trigger::at(&root, &[0, 0, 0]).unwrap();
        assert_eq!(
            find_block_descriptor(&nested, &unit()),
            BlockDescriptor::new("block-42", "html", "Intro")
        );

        let outside = Trigger::at(&root, &[]).unwrap();
        assert_eq!(find_block_descriptor(&outside, &unit()), unit());
        assert_eq!(find_block_descriptor(&Trigger::detached(), &unit()), unit());
    }

    #[tokio::test]
    async fn test_show_waits_for_render_completion() {
        let mut modal = modal(ModalVariant::Tabbed);
        let root = page();
        let trigger = Trigger::at(&root, &[0, 0]).unwrap();

        let cmd = modal.open(&trigger, &unit()).unwrap();
        assert!(!modal.is_shown());
        assert_eq!(modal.pending_label(), Some("Loading Block 1"));

        cmd.execute().await.unwrap();
        assert!(!modal.is_shown());

        assert!(modal.update().is_empty());
        assert!(modal.is_shown());
        assert_eq!(modal.pending_label(), None);
    }

    #[tokio::test]
    async fn test_visibility_flags_move_together() {
        let mut modal = modal(ModalVariant::Tabbed);
        let check = |modal: &EditBlockModal| {
            let flags = modal.flags();
            assert_eq!(flags.page_dimmed, flags.overlay_shown);
            assert_eq!(flags.overlay_shown, modal.is_shown());
        };

        check(&modal);
        open_at(&mut modal, &[0, 0]).await;
        check(&modal);
        modal.show();
        check(&modal);
        modal.hide();
        check(&modal);
        modal.hide();
        check(&modal);
        modal.show();
        check(&modal);
    }

    #[tokio::test]
    async fn test_block_without_data_editor_opens_settings() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[0, 0]).await;

        assert!(modal.is_shown());
        assert_eq!(modal.mode(), Some(Mode::Settings));
        assert!(modal.settings_visible());
        assert!(!modal.editor_visible());
        assert_eq!(modal.settings.as_ref().map(SettingsForm::entry_count), Some(2));
    }

    #[tokio::test]
    async fn test_block_with_data_editor_opens_editor() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[1, 0]).await;

        assert_eq!(modal.mode(), Some(Mode::Editor));
        assert!(modal.editor_visible());
        assert!(!modal.settings_visible());
        assert!(modal.editor.as_ref().is_some_and(|e| e.has_data_editor()));
    }

    #[tokio::test]
    async fn test_select_mode_shows_exactly_one_pane() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[1, 0]).await;

        for mode in [Mode::Settings, Mode::Editor, Mode::Editor, Mode::Settings] {
            modal.select_mode(mode);
            assert_eq!(modal.mode(), Some(mode));
            assert_ne!(modal.editor_visible(), modal.settings_visible());
            assert_eq!(modal.settings_visible(), mode == Mode::Settings);
        }
    }

    #[test]
    fn test_select_mode_before_render_is_ignored() {
        let mut modal = modal(ModalVariant::Tabbed);
        modal.select_mode(Mode::Editor);
        assert_eq!(modal.mode(), None);
        assert!(!modal.editor_visible());
    }

    #[tokio::test]
    async fn test_change_mode_reads_parent_data() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[1, 0]).await;

        let settings_link = modal.mode_link_path(Mode::Settings).unwrap();
        modal.change_mode(&settings_link);
        assert_eq!(modal.mode(), Some(Mode::Settings));

        let editor_link = modal.mode_link_path(Mode::Editor).unwrap();
        modal.change_mode(&editor_link);
        assert_eq!(modal.mode(), Some(Mode::Editor));

        // The header has no mode attribute on its parent.
        modal.change_mode(&[0]);
        assert_eq!(modal.mode(), Some(Mode::Editor));
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let mut modal = modal(ModalVariant::Tabbed);
        assert_eq!(modal.cancel(), None);
        assert!(!modal.is_shown());

        open_at(&mut modal, &[0, 0]).await;
        assert_eq!(modal.cancel(), Some(ModalOutput::Cancelled));
        assert!(!modal.is_shown());
        assert_eq!(modal.cancel(), None);
        assert!(!modal.is_shown());
        assert!(!modal.flags().page_dimmed);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_render() {
        let mut modal = modal(ModalVariant::Tabbed);
        let root = page();
        let cmd = modal
            .open(&Trigger::at(&root, &[0, 0]).unwrap(), &unit())
            .unwrap();
        assert_eq!(modal.cancel(), Some(ModalOutput::Cancelled));

        cmd.execute().await.unwrap();
        assert!(modal.update().is_empty());
        assert!(!modal.is_shown());
    }

    #[tokio::test]
    async fn test_latest_open_wins() {
        let mut modal = modal(ModalVariant::Tabbed);
        let root = page();
        let first = modal
            .open(&Trigger::at(&root, &[0, 0]).unwrap(), &unit())
            .unwrap();
        let second = modal
            .open(&Trigger::at(&root, &[1, 0]).unwrap(), &unit())
            .unwrap();

        second.execute().await.unwrap();
        first.execute().await.unwrap();
        modal.update();

        assert!(modal.is_shown());
        assert_eq!(modal.descriptor.as_ref().map(|d| d.id.as_str()), Some("problem"));
        assert_eq!(modal.mode(), Some(Mode::Editor));
    }

    #[tokio::test]
    async fn test_render_failure_keeps_modal_hidden() {
        let mut modal = modal(ModalVariant::Tabbed);
        let cmd = modal.open(&Trigger::detached(), &unit()).unwrap();
        cmd.execute().await.unwrap();

        let outputs = modal.update();
        assert!(!modal.is_shown());
        assert_eq!(modal.pending_label(), None);
        match outputs.as_slice() {
            [ModalOutput::RenderFailed { descriptor, reason }] => {
                assert_eq!(descriptor, &unit());
                assert!(reason.contains("unknown block unit-1"));
            }
            other => panic!("unexpected outputs: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let mut modal =
            modal(ModalVariant::Tabbed).with_render_timeout(Some(Duration::from_millis(10)));
        let slow = BlockDescriptor::new("slow", "html", "Slow");
        let cmd = modal.open(&Trigger::detached(), &slow).unwrap();
        cmd.execute().await.unwrap();

        let outputs = modal.update();
        assert!(!modal.is_shown());
        assert!(matches!(
            outputs.as_slice(),
            [ModalOutput::RenderFailed { reason, .. }] if reason.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn test_split_test_modal_has_single_pane() {
        let mut modal = modal(ModalVariant::EditorOnly);
        let cmd = modal
            .open(&Trigger::detached(), &BlockDescriptor::split_test("v1"))
            .unwrap();
        assert_eq!(modal.pending_label(), Some("Loading A/B Test"));
        cmd.execute().await.unwrap();
        modal.update();

        assert!(modal.is_shown());
        assert_eq!(modal.descriptor, Some(BlockDescriptor::new("v1", "vertical", "A/B Test")));
        assert!(modal.settings.is_none());
        assert_eq!(modal.mode(), None);
        assert!(modal.editor_visible());
        assert!(!modal.settings_visible());

        modal.select_mode(Mode::Settings);
        assert_eq!(modal.mode(), None);
        assert!(modal.mode_link_path(Mode::Settings).is_none());
    }

    #[tokio::test]
    async fn test_keys_switch_modes_and_cancel() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[0, 0]).await;

        let hint = |modal: &EditBlockModal| {
            modal.keybindings().last().unwrap().description.clone()
        };
        assert_eq!(hint(&modal), "Editor pane");

        let result = modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(result, EventResult::Consumed);
        assert_eq!(modal.mode(), Some(Mode::Editor));
        assert_eq!(hint(&modal), "Settings pane");

        modal.handle_key(key(KeyCode::F(2))).unwrap();
        assert_eq!(modal.mode(), Some(Mode::Settings));

        // Unbound keys never leak to the page while the modal is shown.
        assert!(modal.handle_key(key(KeyCode::Char('?'))).unwrap().is_consumed());

        let result = modal.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(result, EventResult::Event(ModalOutput::Cancelled));
        assert!(!modal.is_shown());
        assert_eq!(
            modal.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Ignored
        );
    }

    #[tokio::test]
    async fn test_save_reports_modified_settings() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[0, 0]).await;

        // Reset the display name, then set the attempts to 3.
        modal.handle_key(key(KeyCode::Char('x'))).unwrap();
        modal.handle_key(key(KeyCode::Down)).unwrap();
        modal.handle_key(key(KeyCode::Enter)).unwrap();
        modal.handle_key(key(KeyCode::Char('3'))).unwrap();
        modal.handle_key(key(KeyCode::Enter)).unwrap();

        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        let result = modal.handle_key(save).unwrap();

        let mut expected = Map::new();
        expected.insert("display_name".to_string(), Value::Null);
        expected.insert("max_attempts".to_string(), json!(3));
        assert_eq!(
            result,
            EventResult::Event(ModalOutput::Saved {
                descriptor: BlockDescriptor::new("b1", "html", "Block 1"),
                settings: expected,
            })
        );
        assert!(!modal.is_shown());
    }

    #[tokio::test]
    async fn test_display_name_setting_updates_title() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[0, 0]).await;
        assert_eq!(modal.title, "Editing: Block 1");

        modal.handle_key(key(KeyCode::Enter)).unwrap();
        for _ in 0.."Block 1".len() {
            modal.handle_key(key(KeyCode::Backspace)).unwrap();
        }
        for c in "Intro".chars() {
            modal.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        modal.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(modal.title, "Editing: Intro");
    }

    #[tokio::test]
    async fn test_render_draws_tabs_and_footer() {
        let mut modal = modal(ModalVariant::Tabbed);
        open_at(&mut modal, &[0, 0]).await;

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                let area = frame.area();
                Modal::render(&mut modal, frame, area, &theme);
            })
            .unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("Editing: Block 1"));
        assert!(content.contains("Settings"));
        assert!(content.contains("Display Name"));
        assert!(content.contains("Cancel"));
    }
}
