//! Shared CLI definitions for cinedash.
//!
//! Used by the main application and by the build script (manpage).

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Delimited text flavour of an uploaded dataset.
/// When `--format` is not specified, it is detected from the file extension (CSV otherwise).
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Pipe-separated values
    Psv,
}

impl FileFormat {
    /// Detect format from path extension, looking through a compression suffix
    /// (`movies.tsv.gz` is TSV). Returns None when the extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        if CompressionFormat::from_extension(path).is_some() {
            return path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(|e| e.to_str())
                .and_then(Self::from_extension);
        }
        Self::from_extension(ext)
    }

    /// Parse format from extension string (e.g. "csv", "tsv").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "psv" => Some(Self::Psv),
            _ => None,
        }
    }

    /// Field separator implied by the format.
    pub fn delimiter(&self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
            Self::Psv => b'|',
        }
    }
}

/// Compression format for uploaded files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz)
    Gzip,
    /// Zstandard compression (.zst)
    Zstd,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// XZ compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            match ext.to_lowercase().as_str() {
                "gz" => Some(Self::Gzip),
                "zst" | "zstd" => Some(Self::Zstd),
                "bz2" | "bz" => Some(Self::Bzip2),
                "xz" => Some(Self::Xz),
                _ => None,
            }
        } else {
            None
        }
    }
}

/// Parse a delimiter given as a single character (`;`), an escape (`\t`) or a byte value (`59`).
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => return Ok(b'\t'),
        "\\|" | "pipe" => return Ok(b'|'),
        _ => {}
    }
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii() {
            return Ok(c as u8);
        }
        return Err(format!("delimiter must be an ASCII character, got '{c}'"));
    }
    s.parse::<u8>()
        .map_err(|_| format!("invalid delimiter '{s}': expected one character or a byte value"))
}

/// Command-line arguments for cinedash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "cinedash",
    version,
    about = "Movie box-office dashboard in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Movie dataset to open at startup. Without it the dashboard starts with an open-file prompt.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Field delimiter: one character (e.g. ';'), '\t', or a byte value
    #[arg(long = "delimiter", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Force delimited text flavour (csv, tsv, psv) instead of detecting it from the extension
    #[arg(long = "format", value_enum)]
    pub format: Option<FileFormat>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Number of rows used to infer column types (default: 1000)
    #[arg(long = "infer-schema-length", value_name = "N")]
    pub infer_schema_length: Option<usize>,

    /// Start with only these genres selected. Use once per genre. Default: all genres
    #[arg(long = "genre", value_name = "GENRE")]
    pub genres: Vec<String>,

    /// Render all charts as PNG (plus dashboard.json) into DIR and exit without starting the UI
    #[arg(long = "export", value_name = "DIR", requires = "path")]
    pub export: Option<PathBuf>,

    /// Log level written to the log file (error, warn, info, debug, trace). RUST_LOG overrides it
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Clear all cache data (log file, open history) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/cinedash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("movies.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("movies.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("movies.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("movies.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("movies.csv")),
            None
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("movies")), None);
    }

    #[test]
    fn test_file_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("movies.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("movies.TSV")),
            Some(FileFormat::Tsv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("movies.psv.gz")),
            Some(FileFormat::Psv)
        );
        assert_eq!(FileFormat::from_path(Path::new("movies.gz")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("59"), Ok(b';'));
        assert!(parse_delimiter("é").is_err());
        assert!(parse_delimiter("ab").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "cinedash",
            "movies.csv",
            "--genre",
            "Action",
            "--genre",
            "Drama",
            "--delimiter",
            ";",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("movies.csv")));
        assert_eq!(args.genres, vec!["Action", "Drama"]);
        assert_eq!(args.delimiter, Some(b';'));
        assert!(args.export.is_none());
    }

    #[test]
    fn test_export_requires_path() {
        assert!(Args::try_parse_from(["cinedash", "--export", "out"]).is_err());
    }
}
