use cinedash::cache::LOG_FILE;
use cinedash::chart_export::export_dashboard;
use cinedash::logging::{init_logging, LogTarget};
use cinedash::{
    resolve_export_dir, App, AppConfig, AppEvent, Args, CacheManager, ChartSettings,
    ConfigManager, OpenOptions, Session, Theme, APP_NAME,
};
use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
        tracing::warn!("invalid theme, using defaults: {e}");
        Theme::default()
    });
    let opts = OpenOptions::from_args_and_config(args, &config);
    let mut app = App::new_with_config(tx.clone(), theme, config)
        .with_open_options(opts.clone())
        .with_initial_genres(args.genres.clone());

    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone(), opts))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Render every chart for the dataset into `dir` without starting the interface.
fn run_export(path: &Path, dir: &Path, args: &Args, config: &AppConfig) -> Result<()> {
    let opts = OpenOptions::from_args_and_config(args, config);
    let (mut session, mut dashboard) = Session::open(path, opts, ChartSettings::from(config))?;
    if !args.genres.is_empty() {
        session.selection.only(&args.genres);
        dashboard = session.run()?;
    }

    let summary = export_dashboard(&dashboard, dir)?;
    println!(
        "{} of {} movies, {} chart(s) written to {}",
        dashboard.filtered_rows,
        dashboard.total_rows,
        summary.written.len(),
        summary.dir.display()
    );
    for (kind, reason) in &summary.failed {
        eprintln!("  {} failed: {}", kind.file_stem(), reason);
    }
    if summary.is_complete() {
        Ok(())
    } else {
        Err(eyre!("{} chart(s) could not be exported", summary.failed.len()))
    }
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config) => match config.write_default_config(args.force) {
                Ok(path) => {
                    println!("Wrote default configuration to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config_result = AppConfig::load(APP_NAME);
    let config = match &config_result {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());

    if let (Some(path), Some(dir)) = (&args.path, &args.export) {
        init_logging(&level, LogTarget::Stderr)?;
        if let Err(e) = &config_result {
            tracing::warn!("could not load config, using defaults: {e}");
        }
        let dir = resolve_export_dir(Some(dir), &config);
        return run_export(path, &dir, &args, &config);
    }

    let log_file = match CacheManager::new(APP_NAME) {
        Ok(cache) => cache.cache_file(LOG_FILE),
        Err(_) => std::env::temp_dir().join(APP_NAME).join(LOG_FILE),
    };
    if let Err(e) = init_logging(&level, LogTarget::File(log_file)) {
        eprintln!("Logging disabled: {}", e);
    }
    if let Err(e) = &config_result {
        tracing::warn!("could not load config, using defaults: {e}");
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_open_options() {
        let args = Args::parse_from([
            "cinedash",
            "movies.psv",
            "--delimiter",
            ";",
            "--infer-schema-length",
            "10",
            "--compression",
            "gzip",
        ]);
        let opts: OpenOptions = (&args).into();
        assert_eq!(opts.delimiter, Some(b';'));
        assert_eq!(opts.infer_schema_length, Some(10));
        assert_eq!(opts.compression, Some(cinedash::CompressionFormat::Gzip));
    }
}
