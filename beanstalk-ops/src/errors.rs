use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Backing errors for all Elastic Beanstalk operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed API: {message}")]
    API { message: String, is_retryable: bool },
    #[error("failed for other reasons: {message}")]
    Other { message: String, is_retryable: bool },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("invalid platform version: {message}")]
    InvalidPlatformVersion { message: String },
    #[error("validation failed: {message}")]
    Validation { message: String },
}

impl Error {
    /// Returns the error message in "String".
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Error::API { message, .. }
            | Error::Other { message, .. }
            | Error::NotFound { message }
            | Error::InvalidPlatformVersion { message }
            | Error::Validation { message } => message.clone(),
        }
    }

    /// Returns if the error is retryable.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::API { is_retryable, .. } | Error::Other { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        let kind = match &e {
            Error::NotFound { .. } => io::ErrorKind::NotFound,
            Error::InvalidPlatformVersion { .. } | Error::Validation { .. } => {
                io::ErrorKind::InvalidInput
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Other {
            message: e.to_string(),
            is_retryable: false,
        }
    }
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- errors::test_errors --exact --show-output
#[test]
fn test_errors() {
    let e = Error::API {
        message: String::from("throttled"),
        is_retryable: true,
    };
    assert!(e.is_retryable());
    assert_eq!(e.message(), "throttled");

    let e = Error::NotFound {
        message: String::from("no such platform"),
    };
    assert!(!e.is_retryable());
    assert!(e.is_not_found());

    let ioe: io::Error = e.into();
    assert_eq!(ioe.kind(), io::ErrorKind::NotFound);

    let ioe: io::Error = Error::Validation {
        message: String::from("bad"),
    }
    .into();
    assert_eq!(ioe.kind(), io::ErrorKind::InvalidInput);
}
