use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run before any scanning happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No metadata source configured; set either `file_patterns` or `derivation`")]
    NoMetadataSource,

    #[error("No output path configured")]
    MissingOutputPath,

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid metadata file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid group spec '{spec}': {message}")]
    InvalidGroupSpec { spec: String, message: String },

    #[error(transparent)]
    Derivation(#[from] DerivationError),
}

/// Errors raised while resolving a field path inside a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field}: no such field in record type {type_name}")]
    NoSuchField { field: String, type_name: String },

    #[error("{field}: the sub-field in {type_name} is not scalar")]
    NonScalarField { field: String, type_name: String },

    #[error("{field}: cannot traverse into non-record field of {type_name}")]
    NotARecord { field: String, type_name: String },
}

/// Errors raised when turning a type-tagged payload into a concrete record.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Unable to find record type '{0}'")]
    UnknownType(String),

    #[error("Failed to decode record of type '{type_name}': {source}")]
    Decode {
        type_name: String,
        source: serde_json::Error,
    },

    #[error("Failed to encode record of type '{type_name}': {source}")]
    Encode {
        type_name: String,
        source: serde_json::Error,
    },
}

/// Errors produced by derivation lookup, construction, or execution.
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Unknown derivation '{0}'")]
    UnknownDerivation(String),

    #[error("Invalid parameters for derivation '{name}': {source}")]
    InvalidParameters {
        name: String,
        source: serde_json::Error,
    },

    #[error("Unable to parse date from {0}")]
    UnparsableDate(PathBuf),

    #[error("Invalid date format '{format}': {source}")]
    InvalidFormat {
        format: String,
        source: regex::Error,
    },

    #[error("Unable to derive metadata for {path}: {message}")]
    Failed { path: PathBuf, message: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Top-level error for the engine.
#[derive(Error, Debug)]
pub enum SymFsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SymFsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SymFsError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A recoverable condition. The offending unit is skipped and the run continues.
#[derive(Debug)]
pub enum Warning {
    SourceEmpty {
        root: PathBuf,
    },
    UnreadableMetadata {
        file: PathBuf,
        message: String,
    },
    UnreadableEntry {
        path: PathBuf,
        message: String,
    },
    UnknownRecordType {
        item: PathBuf,
        error: RecordError,
    },
    DerivationFailed {
        item: PathBuf,
        error: DerivationError,
    },
    FieldExtraction {
        group: String,
        item: PathBuf,
        error: FieldError,
    },
    LinkConflict {
        target: PathBuf,
        item: PathBuf,
    },
    RelativePath {
        path: PathBuf,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SourceEmpty { root } => {
                write!(f, "No metadata found in {}.", root.display())
            }
            Warning::UnreadableMetadata { file, message } => {
                write!(f, "{}: unreadable metadata ({}); skipping", file.display(), message)
            }
            Warning::UnreadableEntry { path, message } => {
                write!(f, "{}: cannot be read ({}); skipping", path.display(), message)
            }
            Warning::UnknownRecordType { item, error } => {
                write!(f, "{}; skipping {}", error, item.display())
            }
            Warning::DerivationFailed { item, error } => {
                write!(f, "{}; skipping {}", error, item.display())
            }
            Warning::FieldExtraction { group, item, error } => {
                write!(f, "{}; skipping {} for group '{}'", error, item.display(), group)
            }
            Warning::LinkConflict { target, item } => write!(
                f,
                "{} already exists; skipping {}",
                target.display(),
                item.display()
            ),
            Warning::RelativePath { path } => write!(
                f,
                "{} is not an absolute path; may cause broken links!",
                path.display()
            ),
        }
    }
}

/// Collects warnings for a run while forwarding each one to the logger.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the warning and keeps it for later inspection.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}
