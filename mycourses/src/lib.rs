#![doc = include_str!("../README.md")]
#![warn(
    unreachable_pub,
    missing_debug_implementations,
    missing_docs,
    clippy::pedantic
)]

pub mod calendar;
mod client;
pub mod credentials;
pub mod page;
pub mod report;
mod summary;
mod util;

use std::path::PathBuf;

pub use client::*;
pub use summary::*;

/// An error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A local file or value the run depends on is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request could not be completed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The portal rejected the session token, either with a 401 or by
    /// redirecting to its login page.
    #[error("session expired or invalid cookie")]
    AuthFailure {
        /// Whether the rejected token was removed from the credential store.
        purged: bool,
    },

    /// The calendar feed could not be parsed.
    #[error("could not parse calendar data: {source}")]
    Parse {
        /// What the parser choked on.
        source: mycourses_agenda::ParseError,
        /// Where the raw payload was saved, if saving it worked.
        debug_file: Option<PathBuf>,
    },

    /// Reading or writing a local file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into())
    }
}

/// Problems with local configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The calendar feed URL file does not exist.
    #[error("{} not found", .0.display())]
    FeedUrlMissing(PathBuf),

    /// The calendar feed URL file contains nothing.
    #[error("{} is empty", .0.display())]
    FeedUrlEmpty(PathBuf),

    /// The calendar feed URL is not an HTTP(S) URL.
    #[error("invalid URL format: {0}")]
    InvalidFeedUrl(String),

    /// A local file exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        /// The file.
        path: PathBuf,
        /// Why.
        source: std::io::Error,
    },

    /// The operator supplied an empty session token.
    #[error("{0} value cannot be empty")]
    EmptyToken(String),

    /// No token is stored and prompting was not allowed.
    #[error("no {0} stored")]
    MissingToken(String),
}

/// Why a request failed, distinguished for reporting.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The request did not finish within the client timeout.
    #[error("request timed out")]
    Timeout,

    /// DNS resolution or connecting failed.
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error {0}")]
    Status(reqwest::StatusCode),

    /// Any other transport failure.
    #[error("{0}")]
    Other(#[source] reqwest::Error),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::Status(status)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Other(e)
        }
    }
}

/// Portal result.
pub type Result<T, E = Error> = core::result::Result<T, E>;
