//! One upload attempt moves through a fixed sequence of states:
//!
//! ``` ignore,
//! Created -> IdentifierComputed -> TagsAssembled -> Uploading -> Succeeded
//!    |               |                                  |
//!    +---------------+----------------------------------+------> Failed
//! ```
//!
//! An attempt is finalized exactly once, into a [FinalizedAttempt] which can no longer change.
use std::fmt;
use std::path::{
    Path,
    PathBuf,
};

use chrono::{
    DateTime,
    Utc,
};
use url::Url;

use log::debug;

use crate::cid::ContentId;
use crate::tag::TagSet;
use crate::upload::{
    UploadError,
    UploadErrorKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Created,
    IdentifierComputed,
    TagsAssembled,
    Uploading,
    Succeeded,
    Failed,
}

impl State {

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Succeeded | State::Failed)
    }

    /// Whether `next` directly follows this state.
    pub fn can_advance_to(&self, next: State) -> bool {
        match (self, next) {
            (State::Created, State::IdentifierComputed) => true,
            (State::IdentifierComputed, State::TagsAssembled) => true,
            (State::TagsAssembled, State::Uploading) => true,
            (State::Uploading, State::Succeeded) => true,
            (s, State::Failed) => !s.is_terminal() && *s != State::TagsAssembled,
            _ => false,
        }
    }
}

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InputUnreadable,
    TagValidationError,
    CredentialError,
    InsufficientFunds,
    NetworkError,
    RemoteRejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:?}", self)
    }
}

impl From<UploadErrorKind> for FailureKind {
    fn from(kind: UploadErrorKind) -> FailureKind {
        match kind {
            UploadErrorKind::Network => FailureKind::NetworkError,
            UploadErrorKind::InsufficientFunds => FailureKind::InsufficientFunds,
            UploadErrorKind::Credential => FailureKind::CredentialError,
            UploadErrorKind::Rejected => FailureKind::RemoteRejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub diagnostic: String,
}

impl Failure {
    pub fn new(kind: FailureKind, diagnostic: impl Into<String>) -> Failure {
        Failure {
            kind,
            diagnostic: diagnostic.into(),
        }
    }
}

impl From<UploadError> for Failure {
    fn from(e: UploadError) -> Failure {
        Failure {
            kind: FailureKind::from(e.kind),
            diagnostic: e.diagnostic,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: {}", self.kind, self.diagnostic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded {
        remote_id: String,
        url: Url,
    },
    Failed(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded{ .. })
    }
}

/// An attempt in progress.
#[derive(Debug)]
pub struct UploadAttempt {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    state: State,
    size: Option<u64>,
    content_id: Option<ContentId>,
    tags: Option<TagSet>,
}

impl UploadAttempt {

    pub fn new(path: &Path) -> UploadAttempt {
        UploadAttempt {
            path: path.to_path_buf(),
            timestamp: Utc::now(),
            state: State::Created,
            size: None,
            content_id: None,
            tags: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id.as_ref()
    }

    pub fn tags(&self) -> Option<&TagSet> {
        self.tags.as_ref()
    }

    fn advance(&mut self, next: State) {
        debug_assert!(self.state.can_advance_to(next), "illegal transition {:?} -> {:?}", self.state, next);
        debug!("attempt {:?}: {:?} -> {:?}", self.path, self.state, next);
        self.state = next;
    }

    pub fn identified(&mut self, content_id: ContentId, size: u64) {
        self.content_id = Some(content_id);
        self.size = Some(size);
        self.advance(State::IdentifierComputed);
    }

    pub fn tagged(&mut self, tags: TagSet) {
        self.tags = Some(tags);
        self.advance(State::TagsAssembled);
    }

    pub fn uploading(&mut self) {
        self.advance(State::Uploading);
    }

    /// Close the attempt with its outcome.
    pub fn finalize(mut self, outcome: Outcome) -> FinalizedAttempt {
        match &outcome {
            Outcome::Succeeded{ .. } => self.advance(State::Succeeded),
            Outcome::Failed(_) => self.advance(State::Failed),
        }
        FinalizedAttempt {
            path: self.path,
            timestamp: self.timestamp,
            size: self.size,
            content_id: self.content_id,
            tags: self.tags,
            outcome,
        }
    }
}

/// A closed attempt. Fields are read-only.
#[derive(Debug, Clone)]
pub struct FinalizedAttempt {
    path: PathBuf,
    timestamp: DateTime<Utc>,
    size: Option<u64>,
    content_id: Option<ContentId>,
    tags: Option<TagSet>,
    outcome: Outcome,
}

impl FinalizedAttempt {

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Size of the content. Absent when the input could not be read.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id.as_ref()
    }

    pub fn tags(&self) -> Option<&TagSet> {
        self.tags.as_ref()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn state(&self) -> State {
        match self.outcome {
            Outcome::Succeeded{ .. } => State::Succeeded,
            Outcome::Failed(_) => State::Failed,
        }
    }
}
