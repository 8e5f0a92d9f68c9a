//! The uploaded file: raw bytes read once per upload and re-parsed on every pass.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::CompressionFormat;

/// An uploaded dataset, held for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Display name (file name of the upload)
    pub name: String,
    /// Where the upload came from
    pub path: PathBuf,
    /// Decompressed file content
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a file from disk, decompressing it when a compression format is given or detected.
    pub fn read(path: &Path, compression: Option<CompressionFormat>) -> Result<Self, LoadError> {
        let compression = compression.or_else(|| CompressionFormat::from_extension(path));
        let read_err = |source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_err)?;
        let reader = BufReader::new(file);
        let mut bytes = Vec::new();
        match compression {
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut bytes).map_err(read_err)?;
            }
            Some(CompressionFormat::Gzip) => {
                flate2::read::MultiGzDecoder::new(reader)
                    .read_to_end(&mut bytes)
                    .map_err(read_err)?;
            }
            Some(CompressionFormat::Zstd) => {
                zstd::stream::read::Decoder::new(reader)
                    .and_then(|mut decoder| decoder.read_to_end(&mut bytes))
                    .map_err(read_err)?;
            }
            Some(CompressionFormat::Bzip2) => {
                bzip2::read::BzDecoder::new(reader)
                    .read_to_end(&mut bytes)
                    .map_err(read_err)?;
            }
            Some(CompressionFormat::Xz) => {
                xz2::read::XzDecoder::new(reader)
                    .read_to_end(&mut bytes)
                    .map_err(read_err)?;
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(
            upload = %name,
            bytes = bytes.len(),
            ?compression,
            "read upload"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Build an upload from in-memory content (used by tests and embedders)
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        std::fs::write(&path, "Title\nX\n").unwrap();
        let upload = Upload::read(&path, None).unwrap();
        assert_eq!(upload.name, "movies.csv");
        assert_eq!(upload.bytes, b"Title\nX\n");
    }

    #[test]
    fn read_gzip_detected_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"Title\nX\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let upload = Upload::read(&path, None).unwrap();
        assert_eq!(upload.bytes, b"Title\nX\n");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = Upload::read(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(err.is_load_error());
    }
}
