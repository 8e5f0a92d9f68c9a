use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::cache::CacheManager;
use crate::config::Theme;

use super::text_input_common::{add_to_history, load_history_impl, save_history_impl};

/// Event emitted by TextInput
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Submit,
    Cancel,
    HistoryChanged,
}

/// Single-line input over tui-textarea, with optional history persisted in the cache dir.
pub struct TextInput {
    textarea: TextArea<'static>,
    pub value: String,
    pub history_id: Option<String>,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
    pub history_temp: Option<String>,
    pub history_limit: usize,
    history_loaded: bool,
    text_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            value: String::new(),
            history_id: None,
            history: Vec::new(),
            history_index: None,
            history_temp: None,
            history_limit: 200,
            history_loaded: false,
            text_color: None,
            focused: false,
        };
        input.apply_style();
        input
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.apply_style();
        self
    }

    /// Keep history under `<id>_history.txt` in the cache dir
    pub fn with_history(mut self, history_id: impl Into<String>) -> Self {
        self.history_id = Some(history_id.into());
        self
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(color) = self.text_color {
            style = style.fg(color);
        }
        self.textarea.set_style(style);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        self.textarea.set_cursor_style(cursor);
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
    }

    fn sync_to_textarea(&mut self) {
        let single_line = self.value.replace(['\n', '\r'], " ");
        let end = single_line.chars().count().min(u16::MAX as usize) as u16;
        self.textarea = TextArea::new(vec![single_line]);
        self.apply_style();
        self.textarea.move_cursor(CursorMove::Jump(0, end));
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_style();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.sync_to_textarea();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.history_index = None;
        self.history_temp = None;
        self.sync_to_textarea();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn load_history(&mut self, cache: &CacheManager) -> Result<()> {
        if self.history_loaded {
            return Ok(());
        }
        if let Some(history_id) = &self.history_id {
            self.history = load_history_impl(cache, history_id)?;
            self.history_loaded = true;
        }
        Ok(())
    }

    pub fn save_to_history(&mut self, cache: &CacheManager) -> Result<()> {
        let Some(history_id) = self.history_id.clone() else {
            return Ok(());
        };
        // Saving rewrites the file, so earlier entries must be in memory first
        self.load_history(cache)?;
        self.sync_from_textarea();
        let entry = self.value.trim().to_string();
        if !entry.is_empty() {
            add_to_history(&mut self.history, entry);
            save_history_impl(cache, &history_id, &self.history, self.history_limit)?;
        }
        Ok(())
    }

    /// Step to an older entry
    pub fn navigate_history_up(&mut self, cache: Option<&CacheManager>) {
        if self.history_id.is_none() {
            return;
        }
        if !self.history_loaded {
            let Some(cache) = cache else {
                return;
            };
            if let Err(e) = self.load_history(cache) {
                tracing::warn!("could not load input history: {e}");
                return;
            }
        }
        if self.history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.sync_from_textarea();
            self.history_temp = Some(self.value.clone());
        }
        let index = match self.history_index {
            Some(i) => i.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_index = Some(index);
        if let Some(entry) = self.history.get(index) {
            self.value = entry.clone();
            self.sync_to_textarea();
        }
    }

    /// Step to a newer entry, back to the in-progress value past the newest
    pub fn navigate_history_down(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 >= self.history.len() {
            if let Some(temp) = self.history_temp.take() {
                self.value = temp;
                self.sync_to_textarea();
            }
            self.history_index = None;
        } else {
            self.history_index = Some(index + 1);
            if let Some(entry) = self.history.get(index + 1) {
                self.value = entry.clone();
                self.sync_to_textarea();
            }
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent, cache: Option<&CacheManager>) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => {
                if let Some(cache) = cache {
                    if let Err(e) = self.save_to_history(cache) {
                        tracing::warn!("could not save input history: {e}");
                    }
                }
                TextInputEvent::Submit
            }
            KeyCode::Esc => TextInputEvent::Cancel,
            KeyCode::Up if self.history_id.is_some() => {
                self.navigate_history_up(cache);
                TextInputEvent::HistoryChanged
            }
            KeyCode::Down if self.history_id.is_some() => {
                self.navigate_history_down();
                TextInputEvent::HistoryChanged
            }
            _ => {
                let input = key_event_to_input(event);
                if matches!(input.key, Key::Char('\n') | Key::Char('\r') | Key::Null) {
                    return TextInputEvent::None;
                }
                self.textarea.input(input);
                self.sync_from_textarea();
                self.history_index = None;
                self.history_temp = None;
                TextInputEvent::None
            }
        }
    }
}

fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab => Key::Tab,
        _ => Key::Null,
    };
    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.textarea.render(area, buf);
    }
}
