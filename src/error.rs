//! Failures that abort a whole dashboard pass (load and schema errors).
//!
//! Empty data is not an error: each chart degrades to a placeholder instead.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {name} as delimited text: {source}")]
    Parse {
        name: String,
        #[source]
        source: PolarsError,
    },

    #[error("Dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl LoadError {
    /// True for failures where the upload could not be read as a table at all
    pub fn is_load_error(&self) -> bool {
        matches!(self, LoadError::Read { .. } | LoadError::Parse { .. })
    }

    /// True when the table was read but lacks required columns
    pub fn is_schema_error(&self) -> bool {
        matches!(self, LoadError::MissingColumns(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_every_column() {
        let err = LoadError::MissingColumns(vec!["Cast".into(), "Release_Date".into()]);
        assert_eq!(
            err.to_string(),
            "Dataset is missing required column(s): Cast, Release_Date"
        );
        assert!(err.is_schema_error());
        assert!(!err.is_load_error());
    }
}
