//! The unit page: every editable block and split test on it, as a list.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, ListItem};
use tracing::debug;

use crate::Theme;
use crate::block::{BlockDescriptor, LOCATOR_ATTR};
use crate::config::{KeyResolver, PageAction};
use crate::page::{Element, Trigger};
use crate::ui::{Component, EventResult, Keybinding, List, ListEvent, ListRow, Result};

/// Class of the control that opens a block's editor.
pub const EDIT_BUTTON_CLASS: &str = "edit-button";
/// Class of the container wrapping the groups of a split test.
pub const SPLIT_TEST_CLASS: &str = "wrapper-split-test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Open the editor for the edit button at this path.
    Edit(Vec<usize>),
    /// Open the container editor for the split test with this locator.
    EditSplitTest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRow {
    Block {
        path: Vec<usize>,
        title: String,
        category: String,
        split_test: Option<String>,
    },
    SplitTest {
        locator: String,
        title: String,
    },
}

impl PageRow {
    fn split_test(&self) -> Option<&str> {
        match self {
            Self::Block { split_test, .. } => split_test.as_deref(),
            Self::SplitTest { locator, .. } => Some(locator),
        }
    }

    fn edit_event(&self) -> PageEvent {
        match self {
            Self::Block { path, .. } => PageEvent::Edit(path.clone()),
            Self::SplitTest { locator, .. } => PageEvent::EditSplitTest(locator.clone()),
        }
    }
}

impl ListRow for PageRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        let line = match self {
            Self::Block {
                title,
                category,
                split_test,
                ..
            } => {
                let indent = if split_test.is_some() { "    " } else { "" };
                Line::from(vec![
                    Span::raw(indent),
                    Span::styled(title.clone(), Style::default().fg(theme.text())),
                    Span::styled(format!("  {category}"), Style::default().fg(theme.overlay1())),
                ])
            }
            Self::SplitTest { title, .. } => Line::from(Span::styled(
                title.clone(),
                Style::default()
                    .fg(theme.yellow())
                    .add_modifier(Modifier::BOLD),
            )),
        };
        ListItem::new(line)
    }
}

/// Collect the editable rows of a page, in document order.
fn page_rows(root: &Element, unit: &BlockDescriptor) -> Vec<PageRow> {
    root.walk()
        .into_iter()
        .filter_map(|(path, element)| {
            if element.has_class(SPLIT_TEST_CLASS) {
                let locator = element.data_str(LOCATOR_ATTR)?;
                return Some(PageRow::SplitTest {
                    title: format!("Split test {locator}"),
                    locator,
                });
            }
            if !element.has_class(EDIT_BUTTON_CLASS) {
                return None;
            }
            let trigger = Trigger::at(root, &path)?;
            let split_test = trigger
                .closest(|e| e.has_class(SPLIT_TEST_CLASS))
                .and_then(|wrapper| wrapper.data_str(LOCATOR_ATTR));
            let descriptor = trigger
                .closest_with_data(LOCATOR_ATTR)
                .and_then(BlockDescriptor::from_element)
                .unwrap_or_else(|| unit.clone());
            Some(PageRow::Block {
                path,
                title: descriptor.label().to_string(),
                category: descriptor.category,
                split_test,
            })
        })
        .collect()
}

/// Lists the blocks of a unit and turns the page actions into [`PageEvent`]s.
pub struct PageView {
    unit: BlockDescriptor,
    list: List<PageRow>,
    dimmed: bool,
    resolver: Arc<KeyResolver>,
}

impl PageView {
    pub fn new(root: &Element, unit: BlockDescriptor, resolver: Arc<KeyResolver>) -> Self {
        let rows = page_rows(root, &unit);
        debug!("Page for {unit} has {} editable rows", rows.len());
        Self {
            list: List::new(rows, resolver.clone()).with_empty_text("This unit has no blocks"),
            unit,
            dimmed: false,
            resolver,
        }
    }

    /// Draw the page dimmed, behind a dialog.
    pub const fn set_dimmed(&mut self, dimmed: bool) {
        self.dimmed = dimmed;
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_page(PageAction::Edit), "Edit"),
            Keybinding::new(
                self.resolver.display_page(PageAction::EditContainer),
                "Edit A/B test",
            ),
        ]
    }
}

impl Component for PageView {
    type Output = PageEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_page(&key, PageAction::Edit) {
            return Ok(self
                .list
                .selected()
                .map_or(EventResult::Consumed, |row| row.edit_event().into()));
        }
        if self.resolver.matches_page(&key, PageAction::EditContainer) {
            let locator = self.list.selected().and_then(PageRow::split_test);
            return Ok(locator.map_or(EventResult::Consumed, |locator| {
                PageEvent::EditSplitTest(locator.to_string()).into()
            }));
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(row)) => row.edit_event().into(),
            EventResult::Event(ListEvent::Changed(row)) => {
                debug!("Selected {:?}", row.edit_event());
                EventResult::Consumed
            }
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border = if self.dimmed {
            theme.dimmed()
        } else {
            theme.surface1()
        };
        let block = Block::default()
            .title(format!(" {} ", self.unit.label()))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.list.render(frame, inner, theme);

        if self.dimmed {
            frame.buffer_mut().set_style(
                inner,
                Style::default().fg(theme.dimmed()).add_modifier(Modifier::DIM),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn block(locator: &str, name: &str) -> Element {
        Element::default()
            .with_data("locator", locator)
            .with_data("category", "html")
            .with_data("display-name", name)
            .with_child(Element::default().with_class(EDIT_BUTTON_CLASS))
    }

    fn root() -> Element {
        Element::default()
            .with_child(block("b1", "Block 1"))
            .with_child(
                Element::default()
                    .with_class(SPLIT_TEST_CLASS)
                    .with_data("locator", "v1")
                    .with_child(block("b2", "Group A block")),
            )
            .with_child(Element::default().with_class(EDIT_BUTTON_CLASS))
    }

    fn view() -> PageView {
        PageView::new(
            &root(),
            BlockDescriptor::new("unit-1", "vertical", "Unit 1"),
            Arc::new(KeyResolver::default()),
        )
    }

    #[test]
    fn test_rows_follow_document_order() {
        let rows = page_rows(&root(), &BlockDescriptor::new("unit-1", "vertical", "Unit 1"));
        let titles: Vec<_> = rows
            .iter()
            .map(|row| match row {
                PageRow::Block { title, .. } | PageRow::SplitTest { title, .. } => title.as_str(),
            })
            .collect();
        assert_eq!(titles, ["Block 1", "Split test v1", "Group A block", "Unit 1"]);
        assert_eq!(rows[2].split_test(), Some("v1"));
        assert_eq!(rows[0].split_test(), None);
    }

    #[test]
    fn test_edit_emits_button_path() {
        let mut view = view();
        let result = view.handle_key(key('e')).unwrap();
        assert_eq!(result, EventResult::Event(PageEvent::Edit(vec![0, 0])));
    }

    #[test]
    fn test_edit_container_needs_split_test() {
        let mut view = view();
        assert_eq!(view.handle_key(key('a')).unwrap(), EventResult::Consumed);

        view.handle_key(key('j')).unwrap();
        view.handle_key(key('j')).unwrap();
        assert_eq!(
            view.handle_key(key('a')).unwrap(),
            EventResult::Event(PageEvent::EditSplitTest("v1".into()))
        );
        assert_eq!(
            view.handle_key(key('e')).unwrap(),
            EventResult::Event(PageEvent::Edit(vec![1, 0, 0]))
        );
    }
}
