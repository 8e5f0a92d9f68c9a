use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, ListState, Paragraph, StatefulWidget, Wrap,
};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod movies;
pub mod pipeline;
pub mod source;
pub mod statistics;
pub mod widgets;
pub mod wordcloud;

pub use cache::CacheManager;
pub use chart_data::{ChartKind, ChartSettings, Dashboard};
pub use cinedash_cli::{Args, CompressionFormat, FileFormat};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use error::LoadError;
pub use filter::GenreSelection;
pub use pipeline::Session;
pub use source::Upload;

use config::DisplayConfig;
use widgets::chart::render_chart_panel;
use widgets::controls::Controls;
use widgets::genre_sidebar::GenreSidebar;
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "cinedash";

/// Export directory when neither `--export` nor `charts.export_dir` is set
pub const DEFAULT_EXPORT_DIR: &str = "cinedash-export";

const PROMPT: &str = "Press o to open a movie dataset (CSV)";

/// How an upload is read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub format: Option<FileFormat>,
    pub compression: Option<CompressionFormat>,
    pub infer_schema_length: Option<usize>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let mut opts = OpenOptions::new();
        opts.delimiter = args.delimiter.or(config.file_loading.delimiter);
        opts.format = args.format;
        opts.compression = args.compression.or_else(|| {
            config
                .file_loading
                .compression
                .as_deref()
                .and_then(|s| match s {
                    "gzip" => Some(CompressionFormat::Gzip),
                    "zstd" => Some(CompressionFormat::Zstd),
                    "bzip2" => Some(CompressionFormat::Bzip2),
                    "xz" => Some(CompressionFormat::Xz),
                    _ => None,
                })
        });
        opts.infer_schema_length = args
            .infer_schema_length
            .or(config.file_loading.infer_schema_length);
        opts
    }

    /// Field separator: explicit delimiter, then `--format`, then the file extension, then ','.
    pub fn delimiter_for(&self, path: &Path) -> u8 {
        self.delimiter
            .or_else(|| self.format.map(|f| f.delimiter()))
            .or_else(|| FileFormat::from_path(path).map(|f| f.delimiter()))
            .unwrap_or(b',')
    }
}

impl From<&Args> for OpenOptions {
    fn from(args: &Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

/// Chart settings from the `[charts]` section
impl From<&AppConfig> for ChartSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            kde_points: config.charts.kde_points,
            wordcloud_max_words: config.charts.wordcloud_max_words,
        }
    }
}

/// Export directory: explicit choice, then config, then the default.
pub fn resolve_export_dir(explicit: Option<&Path>, config: &AppConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.charts.export_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR))
}

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions), // Performs the load after the loading gauge has rendered
    Refresh,
    Export(PathBuf),
    Exit,
    Resize(u16, u16),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    OpenFile,
    Help,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Charts,
    Sidebar,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading {
        file_path: PathBuf,
        current_phase: String,
        progress_percent: u16,
    },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }
}

pub struct App {
    events: Sender<AppEvent>,
    session: Option<Session>,
    dashboard: Option<Dashboard>,
    pub input_mode: InputMode,
    pub focus: Focus,
    genre_list: ListState,
    chart_scroll: usize,
    open_input: TextInput,
    error_modal: ErrorModal,
    status: Option<String>,
    loading_state: LoadingState,
    cache: CacheManager,
    theme: Theme,
    settings: ChartSettings,
    display: DisplayConfig,
    open_options: OpenOptions,
    export_dir: PathBuf,
    initial_genres: Vec<String>,
}

impl App {
    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, app_config: AppConfig) -> App {
        let cache = CacheManager::new(APP_NAME).unwrap_or_else(|e| {
            tracing::warn!("could not initialize cache manager: {e}");
            CacheManager::with_dir(std::env::temp_dir().join(APP_NAME))
        });

        App {
            events,
            session: None,
            dashboard: None,
            input_mode: InputMode::Normal,
            focus: Focus::Charts,
            genre_list: ListState::default(),
            chart_scroll: 0,
            open_input: TextInput::new().with_theme(&theme).with_history("open"),
            error_modal: ErrorModal::new(),
            status: None,
            loading_state: LoadingState::Idle,
            cache,
            settings: ChartSettings::from(&app_config),
            display: app_config.display.clone(),
            open_options: OpenOptions::default(),
            export_dir: resolve_export_dir(None, &app_config),
            initial_genres: Vec::new(),
            theme,
        }
    }

    /// Read options applied to files opened from the prompt
    pub fn with_open_options(mut self, options: OpenOptions) -> Self {
        self.open_options = options;
        self
    }

    /// Genres to select after the first successful load
    pub fn with_initial_genres(mut self, genres: Vec<String>) -> Self {
        self.initial_genres = genres;
        self
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = cache;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    pub fn loading_state(&self) -> &LoadingState {
        &self.loading_state
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Drop the session after a failed pass; the prompt shows again.
    fn fail(&mut self, message: String) {
        tracing::error!("{message}");
        self.loading_state = LoadingState::Idle;
        self.session = None;
        self.dashboard = None;
        self.focus = Focus::Charts;
        self.error_modal.show(message);
    }

    fn load(&mut self, path: &Path, options: &OpenOptions) -> std::result::Result<(), LoadError> {
        let (mut session, mut dashboard) = Session::open(path, options.clone(), self.settings)?;
        if !self.initial_genres.is_empty() {
            let genres = std::mem::take(&mut self.initial_genres);
            session.selection.only(&genres);
            dashboard = session.run()?;
        }
        self.session = Some(session);
        self.dashboard = Some(dashboard);
        self.genre_list.select(Some(0));
        self.chart_scroll = 0;
        Ok(())
    }

    fn refresh(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match session.run() {
            Ok(dashboard) => self.dashboard = Some(dashboard),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn export(&mut self, dir: &Path) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        match chart_export::export_dashboard(dashboard, dir) {
            Ok(summary) if summary.is_complete() => {
                self.status = Some(format!("Exported charts to {}", dir.display()));
            }
            Ok(summary) => {
                let failed: Vec<&str> = summary.failed.iter().map(|(k, _)| k.file_stem()).collect();
                self.status = Some(format!(
                    "Exported to {} ({} chart(s) failed: {})",
                    dir.display(),
                    failed.len(),
                    failed.join(", ")
                ));
            }
            Err(e) => self.error_modal.show(format!("Export failed: {e}")),
        }
    }

    fn selected_genre_index(&self) -> usize {
        self.genre_list.selected().unwrap_or(0)
    }

    fn move_genre_cursor(&mut self, delta: isize) {
        let Some(session) = &self.session else {
            return;
        };
        let len = session.selection.len();
        if len == 0 {
            return;
        }
        let current = self.selected_genre_index() as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.genre_list.select(Some(next));
    }

    fn scroll_charts(&mut self, delta: isize) {
        let max = ChartKind::ALL.len() as isize - 1;
        self.chart_scroll = (self.chart_scroll as isize + delta).clamp(0, max) as usize;
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        // Handle error modal first - it has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        match self.input_mode {
            InputMode::Help => {
                if matches!(
                    event.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
                ) {
                    self.input_mode = InputMode::Normal;
                }
                return None;
            }
            InputMode::OpenFile => {
                return match self.open_input.handle_key(event, Some(&self.cache)) {
                    TextInputEvent::Submit => {
                        let value = self.open_input.value().trim().to_string();
                        self.input_mode = InputMode::Normal;
                        self.open_input.set_focused(false);
                        if value.is_empty() {
                            None
                        } else {
                            Some(AppEvent::Open(PathBuf::from(value), self.open_options.clone()))
                        }
                    }
                    TextInputEvent::Cancel => {
                        self.input_mode = InputMode::Normal;
                        self.open_input.set_focused(false);
                        None
                    }
                    TextInputEvent::None | TextInputEvent::HistoryChanged => None,
                };
            }
            InputMode::Normal => {}
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('o') => {
                self.open_input.clear();
                self.open_input.set_focused(true);
                self.input_mode = InputMode::OpenFile;
                return None;
            }
            KeyCode::Char('?') => {
                self.input_mode = InputMode::Help;
                return None;
            }
            _ => {}
        }

        self.session.as_ref()?;
        match event.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Charts => Focus::Sidebar,
                    Focus::Sidebar => Focus::Charts,
                };
                None
            }
            KeyCode::Char('e') => Some(AppEvent::Export(self.export_dir.clone())),
            KeyCode::Char('a') => {
                self.session.as_mut()?.selection.select_all();
                Some(AppEvent::Refresh)
            }
            KeyCode::Char('n') => {
                self.session.as_mut()?.selection.select_none();
                Some(AppEvent::Refresh)
            }
            KeyCode::Char(' ') | KeyCode::Enter if self.focus == Focus::Sidebar => {
                let index = self.selected_genre_index();
                self.session.as_mut()?.selection.toggle(index);
                Some(AppEvent::Refresh)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                match self.focus {
                    Focus::Sidebar => self.move_genre_cursor(1),
                    Focus::Charts => self.scroll_charts(1),
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                match self.focus {
                    Focus::Sidebar => self.move_genre_cursor(-1),
                    Focus::Charts => self.scroll_charts(-1),
                }
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                match self.focus {
                    Focus::Sidebar => self.genre_list.select(Some(0)),
                    Focus::Charts => self.chart_scroll = 0,
                }
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                match self.focus {
                    Focus::Sidebar => self.move_genre_cursor(isize::MAX / 2),
                    Focus::Charts => self.scroll_charts(isize::MAX / 2),
                }
                None
            }
            _ => None,
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                self.status = None;
                self.loading_state = LoadingState::Loading {
                    file_path: path.clone(),
                    current_phase: "Reading dataset".to_string(),
                    progress_percent: 20,
                };
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                match self.load(path, options) {
                    Ok(()) => self.loading_state = LoadingState::Idle,
                    Err(e) => self.fail(e.to_string()),
                }
                None
            }
            AppEvent::Refresh => {
                self.refresh();
                None
            }
            AppEvent::Export(dir) => {
                self.export(dir);
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit => None,
        }
    }

    fn render_loading_gauge(loading_state: &LoadingState, area: Rect, buf: &mut Buffer) {
        if let LoadingState::Loading {
            file_path,
            current_phase,
            progress_percent,
        } = loading_state
        {
            let gauge_width = (area.width as f64 * 0.33) as u16;
            let center_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(5),
                    Constraint::Fill(1),
                ])
                .split(area);
            let gauge_area = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Fill(1),
                    Constraint::Length(gauge_width),
                    Constraint::Fill(1),
                ])
                .split(center_layout[1])[1];

            let title = file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Loading".to_string());
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(title))
                .percent(*progress_percent)
                .label(current_phase.clone())
                .render(gauge_area, buf);
        }
    }

    fn render_prompt(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "Please open a movie dataset (CSV) to begin the analysis.",
                Style::default().fg(self.color("text_primary")),
            )),
            Line::from(""),
            Line::from(Span::styled(
                PROMPT,
                Style::default()
                    .fg(self.color("primary"))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Required columns: {}", movies::REQUIRED_COLUMNS.join(", ")),
                Style::default().fg(self.color("dimmed")),
            )),
        ];
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(lines.len() as u16),
                Constraint::Fill(1),
            ])
            .split(area);
        Paragraph::new(lines)
            .centered()
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);
    }

    fn render_dashboard(&mut self, area: Rect, buf: &mut Buffer) {
        let (Some(session), Some(dashboard)) = (&self.session, &self.dashboard) else {
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(self.display.sidebar_width),
                Constraint::Fill(1),
            ])
            .split(area);

        GenreSidebar::new(&session.selection, &self.theme)
            .focused(self.focus == Focus::Sidebar)
            .render(columns[0], buf, &mut self.genre_list);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .split(columns[1]);

        let mut summary = vec![Span::styled(
            format!(
                " Showing {} of {} movies",
                dashboard.filtered_rows, dashboard.total_rows
            ),
            Style::default().fg(self.color("text_primary")),
        )];
        if let Some(status) = &self.status {
            summary.push(Span::styled(
                format!("  {}", status),
                Style::default().fg(self.color("selected")),
            ));
        }
        Paragraph::new(Line::from(summary)).render(rows[0], buf);

        let charts_area = rows[1];
        let panel_height = self.display.panel_height.max(6);
        let mut y = charts_area.y;
        for kind in ChartKind::ALL.iter().skip(self.chart_scroll) {
            let remaining = charts_area.bottom().saturating_sub(y);
            if remaining < 4 {
                break;
            }
            let height = panel_height.min(remaining);
            let panel = Rect::new(charts_area.x, y, charts_area.width, height);
            render_chart_panel(*kind, dashboard, &self.theme, panel, buf);
            y += height;
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 60, 60);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(self.color("modal_border")));
        let text = "\
o          Open a dataset (Up/Down browse previously opened files)
Tab        Switch focus between the genre list and the charts
j/k, ↑/↓   Move in the genre list, or scroll the charts
Space      Toggle the highlighted genre
a / n      Select all genres / clear the selection
e          Export every chart as PNG plus dashboard.json
?          Toggle this help
q          Quit

Rows without a genre are listed as (none).
Charts with nothing to show after filtering display a placeholder.";
        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(popup_area, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 70, 40);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Error")
            .border_style(Style::default().fg(self.color("modal_border_error")));
        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner_area);

        Paragraph::new(self.error_modal.message.as_str())
            .style(Style::default().fg(self.color("error")))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        Paragraph::new("[ OK ]")
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.color("primary"))),
            )
            .render(chunks[1], buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Length(1), Constraint::Fill(1)];
        if self.input_mode == InputMode::OpenFile {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1));
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut title = vec![Span::styled(
            " Movie Dataset - Exploratory Data Analysis",
            Style::default()
                .fg(self.color("title"))
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(session) = &self.session {
            title.push(Span::styled(
                format!("  {}", session.upload().name),
                Style::default().fg(self.color("text_secondary")),
            ));
        }
        Paragraph::new(Line::from(title))
            .style(Style::default().bg(self.color("controls_bg")))
            .render(layout[0], buf);

        let body = layout[1];
        if self.dashboard.is_some() {
            self.render_dashboard(body, buf);
        } else if self.loading_state.is_loading() {
            App::render_loading_gauge(&self.loading_state, body, buf);
        } else {
            self.render_prompt(body, buf);
        }

        if self.input_mode == InputMode::OpenFile {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.color("sidebar_border_active")))
                .title(" Open dataset (path) ");
            let inner = block.inner(layout[2]);
            block.render(layout[2], buf);
            (&self.open_input).render(inner, buf);
        }

        if self.error_modal.active {
            self.render_error(area, buf);
        } else if self.input_mode == InputMode::Help {
            self.render_help(area, buf);
        }

        let mut controls = Controls::new()
            .with_dimmed(self.input_mode != InputMode::Normal || self.error_modal.active)
            .with_colors(
                self.color("controls_bg"),
                self.color("primary"),
                self.color("text_primary"),
            );
        if let Some(dashboard) = &self.dashboard {
            controls = controls.with_row_count(dashboard.filtered_rows, dashboard.total_rows);
        }
        let controls_area = layout[layout.len() - 1];
        (&controls).render(controls_area, buf);
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
