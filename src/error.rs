use crate::manifest::Category;
use thiserror::Error;

/// Failure of the `locator -> bytes` step, before any decoding happens.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no payload found for locator {0}")]
    NotFound(String),
    #[error("i/o error reading {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoadErrorKind {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("duplicate descriptor name within the category")]
    DuplicateName,
    #[error("load finished after a newer scene generation started; entry was not inserted")]
    Stale,
    #[error("loader task failed: {0}")]
    Task(String),
}

/// A single descriptor's failure, wrapped with enough context to tell which
/// manifest line caused it.
#[derive(Debug, Error)]
#[error("{category}/{name} ({locator}): {kind}")]
pub struct LoadError {
    pub category: Category,
    pub name: String,
    pub locator: String,
    #[source]
    pub kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(category: Category, name: &str, locator: &str, kind: LoadErrorKind) -> Self {
        Self {
            category,
            name: name.to_owned(),
            locator: locator.to_owned(),
            kind,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.kind, LoadErrorKind::Stale)
    }
}

pub(crate) fn decode_error(message: impl Into<String>) -> LoadErrorKind {
    LoadErrorKind::Decode(message.into())
}
