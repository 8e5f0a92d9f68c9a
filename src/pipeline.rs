//! One dashboard pass: parse the held upload, normalize, filter by genre, prepare every view.
//!
//! A [`Session`] owns the upload for as long as it is open. Nothing derived from it is cached:
//! every interaction re-runs the whole pass from the raw bytes.

use std::path::Path;

use crate::chart_data::{ChartSettings, Dashboard};
use crate::error::LoadError;
use crate::filter::{filter_by_genres, GenreSelection};
use crate::movies::{load_movies, MovieTable};
use crate::source::Upload;
use crate::OpenOptions;

/// Parse and normalize an upload with the given read options.
pub fn load_table(upload: &Upload, options: &OpenOptions) -> Result<MovieTable, LoadError> {
    load_movies(
        upload,
        options.delimiter_for(&upload.path),
        options.infer_schema_length,
    )
}

fn build(
    upload: &Upload,
    table: &MovieTable,
    selection: &GenreSelection,
    settings: &ChartSettings,
) -> Result<Dashboard, LoadError> {
    let filtered = filter_by_genres(table.frame(), selection)?;
    tracing::debug!(
        upload = %upload.name,
        rows = table.height(),
        filtered = filtered.height(),
        genres = selection.selected_count(),
        "building dashboard"
    );
    Ok(Dashboard::build(
        &upload.name,
        table,
        &filtered,
        selection,
        settings,
    )?)
}

/// Run a full pass. Load and schema errors abort the pass; empty data does not.
pub fn run_pipeline(
    upload: &Upload,
    options: &OpenOptions,
    selection: &GenreSelection,
    settings: &ChartSettings,
) -> Result<Dashboard, LoadError> {
    let table = load_table(upload, options)?;
    build(upload, &table, selection, settings)
}

/// An open dataset and the current genre selection.
#[derive(Clone, Debug)]
pub struct Session {
    upload: Upload,
    options: OpenOptions,
    settings: ChartSettings,
    pub selection: GenreSelection,
}

impl Session {
    /// Read a file and start a session on it.
    pub fn open(
        path: &Path,
        options: OpenOptions,
        settings: ChartSettings,
    ) -> Result<(Self, Dashboard), LoadError> {
        let upload = Upload::read(path, options.compression)?;
        Self::start(upload, options, settings)
    }

    /// Start a session with every genre selected and render the first pass.
    pub fn start(
        upload: Upload,
        options: OpenOptions,
        settings: ChartSettings,
    ) -> Result<(Self, Dashboard), LoadError> {
        let table = load_table(&upload, &options)?;
        let selection = GenreSelection::from_table(&table)?;
        let dashboard = build(&upload, &table, &selection, &settings)?;
        tracing::info!(
            upload = %upload.name,
            rows = table.height(),
            genres = selection.len(),
            "opened dataset"
        );
        Ok((
            Self {
                upload,
                options,
                settings,
                selection,
            },
            dashboard,
        ))
    }

    /// Re-run the pass from the held upload with the current selection.
    pub fn run(&self) -> Result<Dashboard, LoadError> {
        run_pipeline(&self.upload, &self.options, &self.selection, &self.settings)
    }

    pub fn upload(&self) -> &Upload {
        &self.upload
    }
}
