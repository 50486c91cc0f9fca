use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for postimport
#[derive(Error, Debug)]
pub enum ImportError {
    /// Zero-length payload
    #[error("file is empty")]
    EmptyContent,

    /// Content sniffed as something other than text/*
    #[error("invalid content type: {mime}")]
    NotText { mime: &'static str },

    /// Directory had no entries at all
    #[error("directory is empty: {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// Filter pattern failed to compile
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// File system I/O errors
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened as a zip container
    #[error("cannot open archive {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry inside an opened archive could not be read
    #[error("cannot read archive entry {entry}: {source}")]
    ArchiveRead {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "nothing to import here" signal that multi-entry walks skip over.
    pub fn is_empty_content(&self) -> bool {
        matches!(self, ImportError::EmptyContent)
    }
}

/// Convenient Result type using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

/// Per-source failures collected during a directory walk, in walk order.
#[derive(Debug, Default)]
pub struct ImportErrors {
    failures: Vec<(String, ImportError)>,
}

impl ImportErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<String>, error: ImportError) {
        self.failures.push((source.into(), error));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImportError)> {
        self.failures.iter().map(|(s, e)| (s.as_str(), e))
    }

    /// `Ok(())` when nothing failed, otherwise the collected failures.
    pub fn into_result(self) -> std::result::Result<(), ImportErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ImportErrors {
    type Item = (String, ImportError);
    type IntoIter = std::vec::IntoIter<(String, ImportError)>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl fmt::Display for ImportErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.len() {
            0 => return write!(f, "no errors"),
            1 => writeln!(f, "1 error occurred:")?,
            n => writeln!(f, "{} errors occurred:", n)?,
        }
        for (source, error) in &self.failures {
            writeln!(f, "\t* {}: {}", source, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ImportErrors {}
