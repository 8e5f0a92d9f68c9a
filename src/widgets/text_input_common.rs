use color_eyre::Result;
use std::fs;
use std::io::{BufRead, BufReader, Write};

use crate::cache::CacheManager;

fn history_file_name(history_id: &str) -> String {
    format!("{}_history.txt", history_id)
}

/// Load input history from the cache dir. A missing file is an empty history.
pub fn load_history_impl(cache: &CacheManager, history_id: &str) -> Result<Vec<String>> {
    let history_file = cache.cache_file(&history_file_name(history_id));
    if !history_file.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(fs::File::open(&history_file)?);
    let mut history = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            history.push(line);
        }
    }
    Ok(history)
}

/// Write the most recent `limit` entries, oldest first.
pub fn save_history_impl(
    cache: &CacheManager,
    history_id: &str,
    history: &[String],
    limit: usize,
) -> Result<()> {
    cache.ensure_cache_dir()?;
    let mut file = fs::File::create(cache.cache_file(&history_file_name(history_id)))?;
    let start = history.len().saturating_sub(limit);
    for entry in &history[start..] {
        writeln!(file, "{}", entry)?;
    }
    Ok(())
}

/// Append unless it repeats the last entry
pub fn add_to_history(history: &mut Vec<String>, entry: String) {
    if history.last() == Some(&entry) {
        return;
    }
    history.push(entry);
}
