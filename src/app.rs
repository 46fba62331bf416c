//! The application: owns the unit page, the two edit modals and the
//! feedback overlays, and drives them from the terminal event loop.
//!
//! # Terminology
//! - **Event**: input from the terminal, see [`crate::tui::Event`]
//! - **Message**: app-level state transitions, see [`AppMessage`]
//! - **Command**: async side effects spawned on the runtime, see
//!   [`crate::commands::Command`]

use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::block::BlockDescriptor;
use crate::commands::Command;
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::document::{DocumentRenderer, PageDocument};
use crate::editor::BlockRenderer;
use crate::modal::{EditBlockModal, ModalOutput, ModalVariant};
use crate::page::Trigger;
use crate::page_view::{PageEvent, PageView};
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResult, Modal, StatusBar, Toast, ToastManager,
};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Application-level messages.
#[derive(Debug, Clone)]
pub enum AppMessage {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    /// A spawned command finished; the modals may have results to process.
    CommandCompleted {
        name: String,
        result: std::result::Result<(), String>,
    },
}

pub struct App {
    document: PageDocument,
    page: PageView,
    block_modal: EditBlockModal,
    split_test_modal: EditBlockModal,
    status_bar: StatusBar,
    toasts: ToastManager,
    error_dialog: Option<ErrorDialog>,
    theme: Theme,
    resolver: Arc<KeyResolver>,
    msg_tx: UnboundedSender<AppMessage>,
    msg_rx: UnboundedReceiver<AppMessage>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(
        document: PageDocument,
        config: &AppConfig,
        resolver: Arc<KeyResolver>,
        theme: Theme,
    ) -> Self {
        let renderer: Arc<dyn BlockRenderer> = Arc::new(DocumentRenderer::new(&document));
        let timeout = config.editor.render_timeout_secs.map(Duration::from_secs);
        let (msg_tx, msg_rx) = unbounded_channel();

        Self {
            page: PageView::new(&document.root, document.unit.clone(), resolver.clone()),
            block_modal: EditBlockModal::new(
                ModalVariant::Tabbed,
                renderer.clone(),
                resolver.clone(),
            )
            .with_render_timeout(timeout),
            split_test_modal: EditBlockModal::new(
                ModalVariant::EditorOnly,
                renderer,
                resolver.clone(),
            )
            .with_render_timeout(timeout),
            status_bar: StatusBar::new(format!("Unit: {}", document.unit.label())),
            toasts: ToastManager::default(),
            error_dialog: None,
            document,
            theme,
            resolver,
            msg_tx,
            msg_rx,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.msg_tx.send(AppMessage::Resume)?;
                self.msg_tx.send(AppMessage::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Init => info!("Terminal ready"),
            Event::Quit => self.msg_tx.send(AppMessage::Quit)?,
            Event::Tick => self.msg_tx.send(AppMessage::Tick)?,
            Event::Render => self.msg_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => self.msg_tx.send(AppMessage::Resize(width, height))?,
            Event::Key(key) => self.handle_key(key)?,
            Event::Error(message) => {
                warn!("Terminal event error: {message}");
                self.display_error("Terminal error", message);
            }
        }
        Ok(())
    }

    /// Route a key: error dialog, then whichever modal is shown, then the
    /// global bindings, then the page. At most one modal is shown at a time.
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(dialog) = self.error_dialog.as_mut() {
            if let EventResult::Event(ErrorDialogEvent::Dismissed) = dialog.handle_key(key)? {
                self.error_dialog = None;
            }
            return Ok(());
        }

        let shown = if self.block_modal.is_shown() {
            Some(&mut self.block_modal)
        } else if self.split_test_modal.is_shown() {
            Some(&mut self.split_test_modal)
        } else {
            None
        };
        if let Some(modal) = shown {
            if let EventResult::Event(output) = modal.handle_key(key)? {
                self.handle_modal_output(output);
            }
            return Ok(());
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.msg_tx.send(AppMessage::Quit)?;
            return Ok(());
        }
        if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.msg_tx.send(AppMessage::Suspend)?;
            return Ok(());
        }

        match self.page.handle_key(key)? {
            EventResult::Event(PageEvent::Edit(path)) => self.open_block(&path)?,
            EventResult::Event(PageEvent::EditSplitTest(locator)) => {
                self.open_split_test(locator)?;
            }
            EventResult::Consumed | EventResult::Ignored => {}
        }
        Ok(())
    }

    fn open_block(&mut self, path: &[usize]) -> Result<()> {
        let Some(trigger) = Trigger::at(&self.document.root, path) else {
            warn!("No element at {path:?} on the page");
            return Ok(());
        };
        if self.split_test_modal.cancel().is_some() {
            debug!("Closed the split test editor to edit {path:?}");
        }
        let cmd = self.block_modal.open(&trigger, &self.document.unit)?;
        self.spawn(cmd);
        Ok(())
    }

    fn open_split_test(&mut self, locator: String) -> Result<()> {
        if self.block_modal.cancel().is_some() {
            debug!("Closed the block editor to edit split test {locator}");
        }
        let descriptor = BlockDescriptor::split_test(locator);
        let cmd = self
            .split_test_modal
            .open(&Trigger::detached(), &descriptor)?;
        self.spawn(cmd);
        Ok(())
    }

    fn spawn(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name();
        debug!("Spawning command: {name}");
        self.sync_status();
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let result = cmd.execute().await.map_err(|e| format!("{e:#}"));
            let _ = tx.send(AppMessage::CommandCompleted { name, result });
        });
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(msg) = self.msg_rx.try_recv() {
            if !matches!(msg, AppMessage::Tick | AppMessage::Render) {
                debug!("Handling message: {msg:?}");
            }

            match msg {
                AppMessage::Tick => {
                    self.status_bar.handle_tick();
                    self.toasts.handle_tick();
                }
                AppMessage::Render => self.render(tui)?,
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Resume => self.should_suspend = false,
                AppMessage::Quit => self.should_quit = true,
                AppMessage::ClearScreen => tui.clear()?,
                AppMessage::CommandCompleted { name, result } => {
                    if let Err(e) = result {
                        warn!("Command {name:?} failed: {e}");
                        self.display_error("Command failed", format!("{name}: {e}"));
                    }
                    self.update_modals();
                }
            }
        }
        Ok(())
    }

    fn update_modals(&mut self) {
        let mut outputs = self.block_modal.update();
        outputs.extend(self.split_test_modal.update());
        for output in outputs {
            self.handle_modal_output(output);
        }
        self.sync_status();
    }

    fn sync_status(&mut self) {
        let pending = self
            .block_modal
            .pending_label()
            .or_else(|| self.split_test_modal.pending_label())
            .map(str::to_string);
        self.status_bar.set_loading(pending);
    }

    fn handle_modal_output(&mut self, output: ModalOutput) {
        match output {
            ModalOutput::Saved {
                descriptor,
                settings,
            } => {
                let changed = Value::Object(settings.clone());
                info!("Saved {descriptor}: {changed}");
                let message = match settings.len() {
                    0 => format!("Saved {}", descriptor.label()),
                    1 => format!("Saved {} (1 setting changed)", descriptor.label()),
                    n => format!("Saved {} ({n} settings changed)", descriptor.label()),
                };
                self.toasts.show(Toast::success(message));
            }
            ModalOutput::Cancelled => self.toasts.show(Toast::info("Edit cancelled")),
            ModalOutput::RenderFailed { descriptor, reason } => {
                self.display_error(
                    "Could not open editor",
                    format!("Could not open editor for {}: {reason}", descriptor.label()),
                );
            }
        }
        self.sync_status();
    }

    fn display_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.error_dialog =
            Some(ErrorDialog::new(message, self.resolver.clone()).with_title(title));
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        let flags = self.block_modal.flags().union(self.split_test_modal.flags());
        self.page.set_dimmed(flags.page_dimmed);
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(area);

        self.page.render(frame, main_area, &self.theme);

        let mut keybindings = self.page.keybindings();
        for modal in [&mut self.block_modal, &mut self.split_test_modal] {
            if modal.is_shown() {
                modal.render(frame, main_area, &self.theme);
                keybindings = modal.keybindings();
            }
        }

        self.status_bar
            .render(frame, status_area, &self.theme, &keybindings);
        self.toasts.render(frame, main_area, &self.theme);

        if let Some(dialog) = self.error_dialog.as_mut() {
            dialog.render(frame, area, &self.theme);
        }
    }
}
