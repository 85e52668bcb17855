//! The storage network is reached through an [Uploader], which takes the content bytes and the
//! tag set and returns the identifier the network assigned to the upload.
//!
//! Implementations make exactly one remote write per call. Retry, if wanted, is up to the
//! implementation or to whoever drives the [Orchestrator](crate::orchestrate::Orchestrator).
use std::fmt;

use thiserror::Error;

use crate::tag::TagSet;

#[cfg(feature = "client")]
pub mod http;

/// Scripted uploader for tests and dry runs.
pub mod mock;

/// Why the storage network did not accept an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    Network,
    InsufficientFunds,
    Credential,
    Rejected,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind:?}: {diagnostic}")]
pub struct UploadError {
    pub kind: UploadErrorKind,
    /// Message as reported by the storage network client, for display.
    pub diagnostic: String,
}

impl UploadError {
    pub fn new(kind: UploadErrorKind, diagnostic: impl Into<String>) -> UploadError {
        UploadError {
            kind,
            diagnostic: diagnostic.into(),
        }
    }
}

/// Acknowledgement of a stored upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub remote_id: String,
}

/// Opaque credential handed to the uploader on every call.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Credentials {
        Credentials {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("Credentials(***)")
    }
}

pub trait Uploader {
    /// Store `data` on the network with the given tags, in tag set order.
    fn upload(&self, credentials: &Credentials, data: &[u8], tags: &TagSet) -> Result<Receipt, UploadError>;
}

impl<U: Uploader + ?Sized> Uploader for &U {
    fn upload(&self, credentials: &Credentials, data: &[u8], tags: &TagSet) -> Result<Receipt, UploadError> {
        (**self).upload(credentials, data, tags)
    }
}

impl<U: Uploader + ?Sized> Uploader for Box<U> {
    fn upload(&self, credentials: &Credentials, data: &[u8], tags: &TagSet) -> Result<Receipt, UploadError> {
        (**self).upload(credentials, data, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Credentials,
        UploadError,
        UploadErrorKind,
    };

    #[test]
    fn test_credentials_hidden() {
        let c = Credentials::new("s3cret");
        assert_eq!(format!("{:?}", c), "Credentials(***)");
        assert_eq!(c.token(), "s3cret");
    }

    #[test]
    fn test_error_display() {
        let e = UploadError::new(UploadErrorKind::InsufficientFunds, "balance 0");
        assert_eq!(e.to_string(), "InsufficientFunds: balance 0");
    }
}
