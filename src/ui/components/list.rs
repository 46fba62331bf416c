use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState, Paragraph};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

/// Selectable list with keyboard navigation.
pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    empty_text: &'static str,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            empty_text: "Nothing to show",
            resolver,
        }
    }

    pub const fn with_empty_text(mut self, text: &'static str) -> Self {
        self.empty_text = text;
        self
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub const fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Replace the items, keeping the selection index where possible.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        match self.state.selected() {
            _ if self.items.is_empty() => self.state.select(None),
            Some(i) if i >= self.items.len() => self.state.select(Some(self.items.len() - 1)),
            Some(_) => {}
            None => self.state.select(Some(0)),
        }
    }

    fn change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        EventResult::Consumed
    }

    fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.items.is_empty() {
            return Ok(EventResult::Ignored);
        }

        let before = self.state.selected();
        let current = before.unwrap_or(0);
        let target = if self.resolver.matches_nav(&key, NavAction::Down) {
            (current + 1).min(self.last_index())
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            current.saturating_sub(1)
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            0
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.last_index()
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            (current + PAGE_STEP).min(self.last_index())
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            current.saturating_sub(PAGE_STEP)
        } else if self.resolver.matches_nav(&key, NavAction::Select) {
            return Ok(self
                .selected()
                .cloned()
                .map_or(EventResult::Ignored, |item| ListEvent::Activated(item).into()));
        } else {
            return Ok(EventResult::Ignored);
        };

        self.state.select(Some(target));
        Ok(self.change_event(before))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.items.is_empty() {
            let placeholder =
                Paragraph::new(self.empty_text).style(Style::default().fg(theme.overlay0()));
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[derive(Clone, Debug, PartialEq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list() -> List<Row> {
        List::new(
            vec![Row("a"), Row("b"), Row("c")],
            Arc::new(KeyResolver::default()),
        )
    }

    #[test]
    fn test_navigation_emits_changed() {
        let mut list = list();
        let result = list.handle_key(key(KeyCode::Down)).unwrap();
        assert!(matches!(result, EventResult::Event(ListEvent::Changed(Row("b")))));

        list.handle_key(key(KeyCode::End)).unwrap();
        let result = list.handle_key(key(KeyCode::Down)).unwrap();
        assert!(matches!(result, EventResult::Consumed));
        assert_eq!(list.selected(), Some(&Row("c")));
    }

    #[test]
    fn test_select_activates_current_row() {
        let mut list = list();
        list.handle_key(key(KeyCode::Char('j'))).unwrap();
        let result = list.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(result, EventResult::Event(ListEvent::Activated(Row("b")))));
    }

    #[test]
    fn test_set_items_clamps_selection() {
        let mut list = list();
        list.handle_key(key(KeyCode::End)).unwrap();
        list.set_items(vec![Row("x")]);
        assert_eq!(list.selected_index(), Some(0));
        list.set_items(vec![]);
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_empty_list_ignores_keys() {
        let mut list: List<Row> = List::new(vec![], Arc::new(KeyResolver::default()));
        assert!(!list.handle_key(key(KeyCode::Down)).unwrap().is_consumed());
    }
}
