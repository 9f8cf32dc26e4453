use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use super::resolver::ResolveError;
use super::types::MethodId;

/// Load-time failures; any of these aborts engine construction.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("trace decode error: {0}")]
    Decode(String),
    #[error("could not resolve method {method_id}: {source}")]
    Resolve {
        method_id: MethodId,
        #[source]
        source: ResolveError,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(details: impl fmt::Display) -> Self {
        Self::Decode(details.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Decode(err.to_string())
    }
}
