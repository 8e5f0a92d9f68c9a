use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use crate::config::Theme;
use crate::filter::{genre_label, GenreSelection};

/// The "Filter Options" sidebar: a checkbox list of genres.
pub struct GenreSidebar<'a> {
    selection: &'a GenreSelection,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> GenreSidebar<'a> {
    pub fn new(selection: &'a GenreSelection, theme: &'a Theme) -> Self {
        Self {
            selection,
            theme,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl StatefulWidget for GenreSidebar<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border = if self.focused {
            self.theme.get("sidebar_border_active")
        } else {
            self.theme.get("sidebar_border")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Filter Options ");
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::styled(
                "Select Genres",
                Style::default()
                    .fg(self.theme.get("subheading"))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    " ({}/{})",
                    self.selection.selected_count(),
                    self.selection.len()
                ),
                Style::default().fg(self.theme.get("dimmed")),
            ),
        ]))
        .render(layout[0], buf);

        let items: Vec<ListItem> = self
            .selection
            .options()
            .iter()
            .enumerate()
            .map(|(i, genre)| {
                let (mark, style) = if self.selection.is_selected(i) {
                    ("[x] ", Style::default().fg(self.theme.get("text_primary")))
                } else {
                    ("[ ] ", Style::default().fg(self.theme.get("dimmed")))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::styled(genre_label(genre).to_string(), style),
                ]))
            })
            .collect();

        let highlight = if self.focused {
            Style::default()
                .fg(self.theme.get("selected"))
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        StatefulWidget::render(
            List::new(items).highlight_style(highlight),
            layout[2],
            buf,
            state,
        );
    }
}
