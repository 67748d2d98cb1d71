//! Error taxonomy for the pipeline.
//!
//! Each boundary gets its own enum so a caller can decide per failure
//! class whether to proceed with a default or give up.

use std::path::PathBuf;
use thiserror::Error;

/// Failures loading or persisting the page cache.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache file {path} is unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("encoding cache: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("persisting cache to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures at the HTTP boundary or while parsing a scraped page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("missing expected element: {0}")]
    MissingElement(&'static str),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{context}: expected {expected} values, found {found}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Failures reading spreadsheet ranges or the county snapshot CSV.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("opening workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("worksheet {0:?} not found")]
    MissingSheet(String),

    #[error("invalid cell range {0:?}")]
    BadRange(String),

    #[error("series length mismatch: {names} names vs {values} values")]
    SeriesMismatch { names: usize, values: usize },

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV record: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures normalizing scalar values.
#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("cannot parse {0:?} as a number")]
    ParseFailed(String),
}
