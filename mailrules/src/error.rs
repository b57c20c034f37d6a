use std::fmt::Display;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::format::Format;

/// Errors produced while loading, converting, or saving rulesets.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("{} does not exist", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {format} rules: {message}")]
    Decode { format: Format, message: String },
    #[error("failed to encode {format} rules: {message}")]
    Encode { format: Format, message: String },
    #[error("source and destination formats are the same ({0}); no conversion needed")]
    UnsupportedConversion(Format),
    #[error("not implemented yet: {0} convert_to_common")]
    NotImplemented(Format),
    #[error("failed to load settings from {path}: {message}")]
    Settings { path: String, message: String },
}

impl RulesError {
    pub(crate) fn decode(format: Format, err: impl Display) -> Self {
        Self::Decode {
            format,
            message: err.to_string(),
        }
    }

    pub(crate) fn encode(format: Format, err: impl Display) -> Self {
        Self::Encode {
            format,
            message: err.to_string(),
        }
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound {
                path: path.to_path_buf(),
            };
        }
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
