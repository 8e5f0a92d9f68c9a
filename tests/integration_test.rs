use cinedash::{App, AppEvent, CacheManager, Focus, InputMode, OpenOptions};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::path::Path;
use std::sync::mpsc;
use tempfile::TempDir;

mod common;

use common::{write_dataset, MOVIES_CSV};

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Feed an event and every follow-up event the app returns.
fn dispatch(app: &mut App, event: AppEvent) {
    let mut next = app.event(&event);
    while let Some(event) = next {
        next = app.event(&event);
    }
}

fn test_app(cache_dir: &TempDir) -> App {
    let (tx, _rx) = mpsc::channel();
    App::new(tx).with_cache(CacheManager::with_dir(cache_dir.path().to_path_buf()))
}

fn open(app: &mut App, path: &Path) {
    dispatch(app, AppEvent::Open(path.to_path_buf(), OpenOptions::default()));
}

fn render(app: &mut App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    let mut text = String::new();
    for y in 0..height {
        for x in 0..width {
            text.push_str(buf[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[test]
fn test_app_creation() {
    let (tx, _) = mpsc::channel();
    let app = App::new(tx);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.dashboard().is_none());
}

#[test]
fn prompt_is_shown_before_any_upload() {
    let cache = TempDir::new().unwrap();
    let mut app = test_app(&cache);
    let screen = render(&mut app, 100, 30);
    assert!(screen.contains("Movie Dataset - Exploratory Data Analysis"));
    assert!(screen.contains("Press o to open a movie dataset"));
    assert!(!screen.contains("Filter Options"));
}

#[test]
fn open_loads_dashboard() {
    let cache = TempDir::new().unwrap();
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let mut app = test_app(&cache);

    let next = app.event(&AppEvent::Open(path.clone(), OpenOptions::default()));
    assert!(app.loading_state().is_loading());
    assert!(matches!(next, Some(AppEvent::DoLoad(_, _))));
    app.event(&next.unwrap());

    assert!(!app.loading_state().is_loading());
    let dashboard = app.dashboard().unwrap();
    assert_eq!(dashboard.total_rows, 5);
    assert_eq!(dashboard.filtered_rows, 5);
    assert_eq!(app.session().unwrap().selection.len(), 4);

    let screen = render(&mut app, 120, 60);
    assert!(screen.contains("Filter Options"));
    assert!(screen.contains("Top 10 Movies by Box Office Collection"));
}

#[test]
fn sidebar_toggle_refilters() {
    let cache = TempDir::new().unwrap();
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let mut app = test_app(&cache);
    open(&mut app, &path);

    dispatch(&mut app, key(KeyCode::Tab));
    assert_eq!(app.focus, Focus::Sidebar);

    // first option is Action: Alpha and Gamma go away
    dispatch(&mut app, key(KeyCode::Char(' ')));
    assert_eq!(app.dashboard().unwrap().filtered_rows, 3);
    assert!(!app.session().unwrap().selection.is_selected(0));

    dispatch(&mut app, key(KeyCode::Char('j')));
    dispatch(&mut app, key(KeyCode::Char(' ')));
    assert_eq!(app.dashboard().unwrap().filtered_rows, 2);

    dispatch(&mut app, key(KeyCode::Char('n')));
    assert_eq!(app.dashboard().unwrap().filtered_rows, 0);
    let screen = render(&mut app, 120, 60);
    assert!(screen.contains("No data"));

    dispatch(&mut app, key(KeyCode::Char('a')));
    assert_eq!(app.dashboard().unwrap().filtered_rows, 5);
}

#[test]
fn initial_genres_apply_on_first_load() {
    let cache = TempDir::new().unwrap();
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx)
        .with_cache(CacheManager::with_dir(cache.path().to_path_buf()))
        .with_initial_genres(vec!["drama".to_string()]);
    open(&mut app, &path);

    let dashboard = app.dashboard().unwrap();
    assert_eq!(dashboard.filtered_rows, 1);
    assert_eq!(dashboard.selected_genres, vec!["Drama"]);
}

#[test]
fn schema_error_shows_modal_and_returns_to_prompt() {
    let cache = TempDir::new().unwrap();
    let (_dir, good) = write_dataset("movies.csv", MOVIES_CSV);
    let (_dir2, bad) = write_dataset("bad.csv", "Title,Genre\nA,Action\n");
    let mut app = test_app(&cache);
    open(&mut app, &good);
    open(&mut app, &bad);

    assert!(app.dashboard().is_none());
    assert!(app.session().is_none());
    let message = app.error_message().unwrap();
    assert!(message.contains("missing required column"));

    let screen = render(&mut app, 100, 30);
    assert!(screen.contains("Error"));

    dispatch(&mut app, key(KeyCode::Enter));
    assert!(app.error_message().is_none());
    let screen = render(&mut app, 100, 30);
    assert!(screen.contains("Press o to open a movie dataset"));
}

#[test]
fn open_prompt_submits_path() {
    let cache = TempDir::new().unwrap();
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let mut app = test_app(&cache);

    dispatch(&mut app, key(KeyCode::Char('o')));
    assert_eq!(app.input_mode, InputMode::OpenFile);
    for c in path.to_string_lossy().chars() {
        dispatch(&mut app, key(KeyCode::Char(c)));
    }
    dispatch(&mut app, key(KeyCode::Enter));

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.dashboard().unwrap().total_rows, 5);
    assert!(cache.path().join("open_history.txt").exists());
}

#[test]
fn quit_and_help_keys() {
    let cache = TempDir::new().unwrap();
    let mut app = test_app(&cache);
    assert!(matches!(app.event(&key(KeyCode::Char('q'))), Some(AppEvent::Exit)));
    let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));

    dispatch(&mut app, key(KeyCode::Char('?')));
    assert_eq!(app.input_mode, InputMode::Help);
    assert!(render(&mut app, 100, 40).contains("Help"));
    dispatch(&mut app, key(KeyCode::Esc));
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn export_key_writes_summary() {
    let cache = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx)
        .with_cache(CacheManager::with_dir(cache.path().to_path_buf()))
        .with_export_dir(out.path().to_path_buf());
    open(&mut app, &path);

    dispatch(&mut app, key(KeyCode::Char('e')));
    assert!(out.path().join("dashboard.json").exists());
    assert!(app.status().unwrap().contains(&out.path().display().to_string()));
}
