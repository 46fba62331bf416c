//! Block settings: the payload embedded in a rendered block and the form
//! that edits it.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, Paragraph, Wrap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::Theme;
use crate::config::{KeyResolver, SettingsAction};
use crate::page::Element;
use crate::ui::{Component, EventResult, List, ListRow, Result, TextInput, TextInputEvent};

/// Class of the element holding the settings payload.
pub const SETTINGS_CONTAINER_CLASS: &str = "metadata_edit";
/// Data attribute on the settings container holding the payload.
pub const SETTINGS_PAYLOAD_ATTR: &str = "metadata";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKind {
    #[default]
    Generic,
    Select,
    Integer,
    Float,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct SettingOption {
    pub display_name: String,
    pub value: Value,
}

/// Options arrive either as bare values or as `{display_name, value}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Labelled { display_name: String, value: Value },
    Bare(Value),
}

impl From<RawOption> for SettingOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Labelled {
                display_name,
                value,
            } => Self {
                display_name,
                value,
            },
            RawOption::Bare(value) => Self {
                display_name: display_value(&value),
                value,
            },
        }
    }
}

/// One named, typed configuration value of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub field_name: String,
    pub display_name: String,
    #[serde(default)]
    pub help: String,
    #[serde(rename = "type", default)]
    pub kind: SettingKind,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub options: Vec<SettingOption>,
    #[serde(default)]
    pub explicitly_set: bool,
}

impl SettingEntry {
    /// Parse user input according to the entry's kind.
    pub fn parse_input(&self, input: &str) -> std::result::Result<Value, String> {
        let input = input.trim();
        match self.kind {
            SettingKind::Integer => input
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("{} must be a whole number", self.display_name)),
            SettingKind::Float => input
                .parse::<f64>()
                .ok()
                .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                .ok_or_else(|| format!("{} must be a number", self.display_name)),
            SettingKind::List => Ok(Value::Array(
                input
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Value::from)
                    .collect(),
            )),
            SettingKind::Generic | SettingKind::Select => Ok(Value::from(input)),
        }
    }

    /// Value shown in the form and pre-filled into the editor.
    pub fn display(&self) -> String {
        if self.kind == SettingKind::Select
            && let Some(option) = self.options.iter().find(|o| o.value == self.value)
        {
            return option.display_name.clone();
        }
        display_value(&self.value)
    }

    fn next_option(&self) -> Option<Value> {
        if self.options.is_empty() {
            return None;
        }
        let next = self
            .options
            .iter()
            .position(|o| o.value == self.value)
            .map_or(0, |i| (i + 1) % self.options.len());
        Some(self.options[next].value.clone())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Extract the ordered settings entries from a rendered block fragment.
///
/// Returns `None` when the fragment has no settings container, or when the
/// payload is not a `key -> entry` object. Entries that fail to deserialize
/// are skipped with a warning.
pub fn settings_payload(fragment: &Element) -> Option<Vec<SettingEntry>> {
    let container = fragment.find_class(SETTINGS_CONTAINER_CLASS)?;
    let Some(Value::Object(payload)) = container.data(SETTINGS_PAYLOAD_ATTR) else {
        warn!("Settings container has no usable {SETTINGS_PAYLOAD_ATTR:?} payload");
        return None;
    };

    let entries = payload
        .iter()
        .filter_map(|(key, raw)| match SettingEntry::deserialize(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed setting {key:?}: {e}");
                None
            }
        })
        .collect();
    Some(entries)
}

#[derive(Clone)]
struct SettingRow {
    entry: SettingEntry,
    modified: bool,
}

impl ListRow for SettingRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        let marker = if self.modified {
            Span::styled("● ", Style::default().fg(theme.peach()))
        } else {
            Span::raw("  ")
        };
        let value_style = if self.entry.explicitly_set {
            Style::default().fg(theme.text())
        } else {
            Style::default().fg(theme.overlay1())
        };
        ListItem::new(Line::from(vec![
            marker,
            Span::styled(
                format!("{:<24}", self.entry.display_name),
                Style::default().fg(theme.lavender()),
            ),
            Span::styled(self.entry.display(), value_style),
        ]))
    }
}

pub enum SettingsEvent {
    /// The named field changed value.
    Changed(String),
}

/// Editable list of a block's settings.
pub struct SettingsForm {
    rows: Vec<SettingRow>,
    list: List<SettingRow>,
    editing: Option<(usize, TextInput)>,
    resolver: Arc<KeyResolver>,
}

impl SettingsForm {
    pub fn new(entries: Vec<SettingEntry>, resolver: Arc<KeyResolver>) -> Self {
        let rows: Vec<SettingRow> = entries
            .into_iter()
            .map(|entry| SettingRow {
                entry,
                modified: false,
            })
            .collect();
        Self {
            list: List::new(rows.clone(), resolver.clone())
                .with_empty_text("This block has no settings"),
            rows,
            editing: None,
            resolver,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.entry.field_name.as_str()).collect()
    }

    pub fn entry(&self, field_name: &str) -> Option<&SettingEntry> {
        self.rows
            .iter()
            .map(|r| &r.entry)
            .find(|e| e.field_name == field_name)
    }

    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Values the user changed, in entry order. A cleared entry maps to
    /// `null`, meaning "reset to default".
    pub fn modified_values(&self) -> Map<String, Value> {
        self.rows
            .iter()
            .filter(|r| r.modified)
            .map(|r| {
                let value = if r.entry.explicitly_set {
                    r.entry.value.clone()
                } else {
                    Value::Null
                };
                (r.entry.field_name.clone(), value)
            })
            .collect()
    }

    fn set_value(&mut self, index: usize, value: Value) -> EventResult<SettingsEvent> {
        let Some(row) = self.rows.get_mut(index) else {
            return EventResult::Consumed;
        };
        if row.entry.value == value && row.entry.explicitly_set {
            return EventResult::Consumed;
        }
        row.entry.value = value;
        row.entry.explicitly_set = true;
        row.modified = true;
        debug!("Setting {} set to {}", row.entry.field_name, row.entry.value);
        let field = row.entry.field_name.clone();
        self.list.set_items(self.rows.clone());
        SettingsEvent::Changed(field).into()
    }

    fn clear(&mut self, index: usize) -> EventResult<SettingsEvent> {
        let Some(row) = self.rows.get_mut(index) else {
            return EventResult::Consumed;
        };
        if !row.entry.explicitly_set {
            return EventResult::Consumed;
        }
        row.entry.value = row.entry.default_value.clone();
        row.entry.explicitly_set = false;
        row.modified = true;
        debug!("Setting {} reset to default", row.entry.field_name);
        let field = row.entry.field_name.clone();
        self.list.set_items(self.rows.clone());
        SettingsEvent::Changed(field).into()
    }

    fn begin_edit(&mut self, index: usize) -> EventResult<SettingsEvent> {
        let Some(entry) = self.rows.get(index).map(|r| &r.entry) else {
            return EventResult::Consumed;
        };
        if entry.kind == SettingKind::Select {
            return match entry.next_option() {
                Some(next) => self.set_value(index, next),
                None => EventResult::Consumed,
            };
        }
        let input = TextInput::new(entry.display_name.clone())
            .with_value(&entry.display())
            .with_placeholder(display_value(&entry.default_value));
        self.editing = Some((index, input));
        EventResult::Consumed
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Result<EventResult<SettingsEvent>> {
        let Some((index, input)) = self.editing.as_mut() else {
            return Ok(EventResult::Ignored);
        };
        let index = *index;
        match input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(text)) => {
                self.editing = None;
                let Some(entry) = self.rows.get(index).map(|r| &r.entry) else {
                    return Ok(EventResult::Consumed);
                };
                match entry.parse_input(&text) {
                    Ok(value) => Ok(self.set_value(index, value)),
                    Err(reason) => {
                        warn!("Rejected setting input: {reason}");
                        Ok(EventResult::Consumed)
                    }
                }
            }
            EventResult::Event(TextInputEvent::Cancelled) => {
                self.editing = None;
                Ok(EventResult::Consumed)
            }
            EventResult::Consumed | EventResult::Ignored => Ok(EventResult::Consumed),
        }
    }
}

impl Component for SettingsForm {
    type Output = SettingsEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.is_editing() {
            return self.handle_edit_key(key);
        }

        let selected = self.list.selected_index();
        if let Some(index) = selected {
            if self.resolver.matches_settings(&key, SettingsAction::Edit) {
                return Ok(self.begin_edit(index));
            }
            if self.resolver.matches_settings(&key, SettingsAction::Clear) {
                return Ok(self.clear(index));
            }
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Ignored => EventResult::Ignored,
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [list_area, help_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(area);

        self.list.render(frame, list_area, theme);

        let help = self
            .list
            .selected()
            .map(|row| row.entry.help.as_str())
            .unwrap_or_default();
        let hint = format!(
            "{} edit · {} reset to default",
            self.resolver.display_settings(SettingsAction::Edit),
            self.resolver.display_settings(SettingsAction::Clear),
        );
        let footer = Paragraph::new(vec![
            Line::from(Span::styled(help, Style::default().fg(theme.subtext0()))),
            Line::from(Span::styled(
                hint,
                Style::default()
                    .fg(theme.overlay0())
                    .add_modifier(Modifier::ITALIC),
            )),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(footer, help_area);

        if let Some((_, input)) = self.editing.as_mut() {
            input.render(frame, area, theme);
        }
    }
}
