//! The embedded block editor: the renderer that produces a block's editing
//! view and the component that displays it inside the modal.

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use tracing::debug;

use crate::Theme;
use crate::block::BlockDescriptor;
use crate::config::{KeyResolver, NavAction};
use crate::page::Element;
use crate::settings::{SETTINGS_CONTAINER_CLASS, SettingsForm};
use crate::ui::{Component, EventResult};

/// The view a block renders for authoring.
pub const STUDIO_VIEW: &str = "studio_view";
/// Class marking a block's data-editing surface.
pub const DATA_EDITOR_CLASS: &str = "wrapper-comp-editor";
/// Data attribute on a fragment root declaring that the block wants to be
/// linked to its settings form.
pub const METADATA_EDITOR_ATTR: &str = "metadata-editor";

/// The output of a block render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub fragment: Element,
}

/// Produces the named view of a block.
#[async_trait]
pub trait BlockRenderer: Send + Sync {
    async fn render(&self, descriptor: &BlockDescriptor, view: &str) -> Result<RenderedBlock>;
}

/// Displays a block's rendered view inside the modal.
///
/// Created empty when a render is dispatched, filled by [`EditorView::load`]
/// once the renderer completes.
pub struct EditorView {
    descriptor: BlockDescriptor,
    view: &'static str,
    fragment: Option<Element>,
    lines: Vec<String>,
    scroll: u16,
    linked_settings: Vec<String>,
    resolver: Arc<KeyResolver>,
}

impl EditorView {
    pub fn new(descriptor: BlockDescriptor, view: &'static str, resolver: Arc<KeyResolver>) -> Self {
        Self {
            descriptor,
            view,
            fragment: None,
            lines: Vec::new(),
            scroll: 0,
            linked_settings: Vec::new(),
            resolver,
        }
    }

    pub const fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    pub const fn view(&self) -> &'static str {
        self.view
    }

    pub fn load(&mut self, block: RenderedBlock) {
        self.lines = block.fragment.text_lines(&[SETTINGS_CONTAINER_CLASS]);
        self.fragment = Some(block.fragment);
        self.scroll = 0;
        debug!("Editor for {} loaded with {} lines", self.descriptor.id, self.lines.len());
    }

    pub const fn fragment(&self) -> Option<&Element> {
        self.fragment.as_ref()
    }

    pub const fn is_loaded(&self) -> bool {
        self.fragment.is_some()
    }

    /// Whether the rendered block exposes a data-editing surface.
    pub fn has_data_editor(&self) -> bool {
        self.fragment
            .as_ref()
            .is_some_and(|f| f.find_class(DATA_EDITOR_CLASS).is_some())
    }

    /// Link the settings form to the block, if the block asks for it.
    /// Returns whether the link was made.
    pub fn set_metadata_editor(&mut self, form: &SettingsForm) -> bool {
        let accepts = self
            .fragment
            .as_ref()
            .is_some_and(|f| f.data_flag(METADATA_EDITOR_ATTR));
        if accepts {
            self.linked_settings = form.field_names().into_iter().map(String::from).collect();
        }
        accepts
    }
}

impl Component for EditorView {
    type Output = ();

    fn handle_key(&mut self, key: KeyEvent) -> crate::ui::Result<EventResult<()>> {
        let max_scroll = u16::try_from(self.lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.scroll = (self.scroll + 1).min(max_scroll);
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.scroll = self.scroll.saturating_sub(1);
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.scroll = 0;
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.scroll = max_scroll;
        } else {
            return Ok(EventResult::Ignored);
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_loaded() {
            let waiting = Paragraph::new(Span::styled(
                format!("Rendering {}...", self.descriptor.label()),
                Style::default().fg(theme.overlay0()),
            ));
            frame.render_widget(waiting, area);
            return;
        }

        let footer_height = u16::from(!self.linked_settings.is_empty());
        let [body, footer] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(footer_height)]).areas(area);

        let lines: Vec<Line> = if self.lines.is_empty() {
            vec![Line::from(Span::styled(
                "This block has no editable content",
                Style::default().fg(theme.overlay0()),
            ))]
        } else {
            self.lines
                .iter()
                .map(|l| Line::from(Span::styled(l.as_str(), Style::default().fg(theme.text()))))
                .collect()
        };
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, body);

        if !self.linked_settings.is_empty() {
            let linked = Paragraph::new(Span::styled(
                format!("Linked settings: {}", self.linked_settings.join(", ")),
                Style::default()
                    .fg(theme.subtext0())
                    .add_modifier(Modifier::ITALIC),
            ));
            frame.render_widget(linked, footer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SETTINGS_PAYLOAD_ATTR, settings_payload};
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;

    fn editor() -> EditorView {
        EditorView::new(
            BlockDescriptor::new("b1", "html", "Block 1"),
            STUDIO_VIEW,
            Arc::new(KeyResolver::default()),
        )
    }

    fn fragment() -> Element {
        Element::default()
            .with_data(METADATA_EDITOR_ATTR, true)
            .with_child(
                Element::default()
                    .with_class(DATA_EDITOR_CLASS)
                    .with_text("<p>Hello</p>\n<p>World</p>"),
            )
            .with_child(
                Element::default()
                    .with_class(SETTINGS_CONTAINER_CLASS)
                    .with_text("hidden")
                    .with_data(
                        SETTINGS_PAYLOAD_ATTR,
                        json!({"display_name": {"field_name": "display_name", "display_name": "Display Name"}}),
                    ),
            )
    }

    #[test]
    fn test_load_excludes_settings_text() {
        let mut editor = editor();
        assert!(!editor.is_loaded());
        assert!(!editor.has_data_editor());

        editor.load(RenderedBlock { fragment: fragment() });
        assert!(editor.is_loaded());
        assert!(editor.has_data_editor());
        assert_eq!(editor.lines, vec!["<p>Hello</p>", "<p>World</p>"]);
    }

    #[test]
    fn test_set_metadata_editor_requires_opt_in() {
        let form = SettingsForm::new(
            settings_payload(&fragment()).unwrap(),
            Arc::new(KeyResolver::default()),
        );

        let mut linked = editor();
        linked.load(RenderedBlock { fragment: fragment() });
        assert!(linked.set_metadata_editor(&form));
        assert_eq!(linked.linked_settings, ["display_name"]);

        let mut plain = editor();
        plain.load(RenderedBlock {
            fragment: Element::default().with_text("no opt-in"),
        });
        assert!(!plain.set_metadata_editor(&form));
        assert!(plain.linked_settings.is_empty());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut editor = editor();
        editor.load(RenderedBlock { fragment: fragment() });
        for _ in 0..5 {
            editor
                .handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
                .unwrap();
        }
        assert_eq!(editor.scroll, 1);
        let result = editor
            .handle_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE))
            .unwrap();
        assert!(!result.is_consumed());
    }
}
