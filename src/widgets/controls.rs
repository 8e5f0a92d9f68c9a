use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

const DASHBOARD_CONTROLS: [(&str, &str); 9] = [
    ("o", "Open"),
    ("Tab", "Focus"),
    ("Space", "Toggle"),
    ("a", "All"),
    ("n", "None"),
    ("j/k", "Scroll"),
    ("e", "Export"),
    ("?", "Help"),
    ("q", "Quit"),
];

const PROMPT_CONTROLS: [(&str, &str); 3] = [("o", "Open"), ("?", "Help"), ("q", "Quit")];

/// Bottom bar of key hints, with the filtered row count on the right.
pub struct Controls {
    pub row_count: Option<(usize, usize)>,
    pub dimmed: bool,
    bg: Color,
    key_color: Color,
    label_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            dimmed: false,
            bg: Color::DarkGray,
            key_color: Color::Reset,
            label_color: Color::Reset,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show "Rows: filtered/total"
    pub fn with_row_count(mut self, filtered: usize, total: usize) -> Self {
        self.row_count = Some((filtered, total));
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_colors(mut self, bg: Color, key_color: Color, label_color: Color) -> Self {
        self.bg = bg;
        self.key_color = key_color;
        self.label_color = label_color;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls: &[(&str, &str)] = if self.row_count.is_some() {
            &DASHBOARD_CONTROLS
        } else {
            &PROMPT_CONTROLS
        };

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        if self.row_count.is_some() {
            constraints.push(Constraint::Length(20));
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_style, label_style) = if self.dimmed {
            let dim = Style::default().fg(Color::DarkGray).bg(self.bg);
            (dim, dim)
        } else {
            (
                Style::default().fg(self.key_color),
                Style::default().fg(self.label_color).bg(self.bg),
            )
        };

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(key_style.add_modifier(Modifier::BOLD))
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = controls.len() * 2;
        if let Some((filtered, total)) = self.row_count {
            Paragraph::new(format!("Rows: {}/{}", filtered, total))
                .style(label_style)
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(Style::default().bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}
