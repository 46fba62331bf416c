use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, Keybinding, Spinner};

/// Bottom bar: the unit being edited (or a spinner while a block editor
/// loads) on the left, key hints on the right.
pub struct StatusBar {
    title: String,
    spinner: Spinner,
    loading: bool,
}

impl StatusBar {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            spinner: Spinner::default(),
            loading: false,
        }
    }

    pub fn set_loading(&mut self, label: Option<String>) {
        match label {
            Some(label) => {
                self.spinner.set_label(label);
                self.loading = true;
            }
            None => self.loading = false,
        }
    }

    pub fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.handle_tick();
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let hints: Vec<Span> = keybindings
            .iter()
            .flat_map(|kb| {
                [
                    Span::styled(kb.key.clone(), Style::default().fg(theme.peach())),
                    Span::styled(
                        format!(" {}  ", kb.description),
                        Style::default().fg(theme.subtext0()),
                    ),
                ]
            })
            .collect();
        let hints = Line::from(hints);
        let hints_width = u16::try_from(hints.width()).unwrap_or(u16::MAX);

        let [left, right] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(hints_width)])
                .areas(inner);

        if self.loading {
            self.spinner.render(frame, left, theme);
        } else {
            let title = Paragraph::new(Span::styled(
                self.title.as_str(),
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            ));
            frame.render_widget(title, left);
        }

        frame.render_widget(Paragraph::new(hints), right);
    }
}
