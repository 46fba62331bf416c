use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Single-line text input drawn as a small popup.
///
/// The cursor counts characters, not bytes.
pub struct TextInput {
    label: String,
    value: Vec<char>,
    cursor: usize,
    placeholder: Option<String>,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Vec::new(),
            cursor: 0,
            placeholder: None,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.chars().collect();
        self.cursor = self.value.len();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.value.remove(self.cursor);
        }
    }

    fn delete_at_cursor(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let mut start = self.cursor;
        while start > 0 && self.value[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && self.value[start - 1] != ' ' {
            start -= 1;
        }
        self.value.drain(start..self.cursor);
        self.cursor = start;
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_at_cursor();
                EventResult::Consumed
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.value.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.value.len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.value.clear();
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            // Swallow everything else so keys never leak to the modal below.
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(3));
        frame.render_widget(Clear, popup_area);

        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = match &self.placeholder {
            Some(placeholder) if self.value.is_empty() => Line::from(vec![
                Span::styled(" ", cursor_style),
                Span::styled(placeholder.clone(), Style::default().fg(theme.overlay0())),
            ]),
            _ => {
                let before: String = self.value[..self.cursor].iter().collect();
                let at = self.value.get(self.cursor).copied().unwrap_or(' ');
                let after: String = self.value.iter().skip(self.cursor + 1).collect();
                Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ])
            }
        };

        let block = Block::default()
            .title(format!(" {} (Enter to confirm, Esc to cancel) ", self.label))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(line).block(block), popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut TextInput, code: KeyCode) -> EventResult<TextInputEvent> {
        input
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_editing_keeps_multibyte_characters_intact() {
        let mut input = TextInput::new("Display Name").with_value("Übung");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Delete);
        press(&mut input, KeyCode::Char('U'));
        assert_eq!(input.value(), "Ubung");

        press(&mut input, KeyCode::End);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.value(), "Ubun");
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("Name").with_value("hello big world");
        input
            .handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(input.value(), "hello big ");
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = TextInput::new("Name").with_value("42");
        assert!(matches!(
            press(&mut input, KeyCode::Enter),
            EventResult::Event(TextInputEvent::Submitted(v)) if v == "42"
        ));
        assert!(matches!(
            press(&mut input, KeyCode::Esc),
            EventResult::Event(TextInputEvent::Cancelled)
        ));
    }
}
