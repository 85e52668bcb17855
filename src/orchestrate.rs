use std::fs::read;
use std::path::Path;

use log::{debug, info, warn, error};

use crate::attempt::{
    Failure,
    FailureKind,
    FinalizedAttempt,
    Outcome,
    UploadAttempt,
};
use crate::cid::ContentId;
use crate::explorer::Explorer;
use crate::ledger::{
    Ledger,
    LedgerError,
    LedgerRecord,
};
use crate::tag::{
    TagSpec,
    DEFAULT_CONTENT_TYPE,
};
use crate::upload::{
    Credentials,
    Uploader,
};

/// What the caller sees of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Succeeded,
    /// Content is stored remotely, but the local record could not be written.
    SucceededWithLedgerWriteError,
    /// Classification and diagnostic of the failed attempt.
    Failed(Failure),
}

impl Status {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Status::Failed(f) => Some(f.kind),
            _ => None,
        }
    }
}

/// Result of one run: the finalized attempt, and the ledger error if recording it failed.
#[derive(Debug)]
pub struct Report {
    pub attempt: FinalizedAttempt,
    pub ledger_error: Option<LedgerError>,
}

impl Report {

    /// A ledger error never changes a failed outcome into anything else, and only qualifies a
    /// successful one.
    pub fn status(&self) -> Status {
        match (self.attempt.outcome(), &self.ledger_error) {
            (Outcome::Succeeded{ .. }, None) => Status::Succeeded,
            (Outcome::Succeeded{ .. }, Some(_)) => Status::SucceededWithLedgerWriteError,
            (Outcome::Failed(f), _) => Status::Failed(f.clone()),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self.attempt.outcome() {
            Outcome::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// Drives upload attempts: identify, tag, upload once, record.
///
/// An orchestrator holds no per-attempt state, so one instance can serve many runs, also from
/// several threads when the uploader and ledger allow it.
pub struct Orchestrator<U: Uploader, L: Ledger> {
    uploader: U,
    ledger: L,
    credentials: Credentials,
    tag_spec: TagSpec,
    explorer: Explorer,
    content_type: String,
}

impl<U: Uploader, L: Ledger> Orchestrator<U, L> {

    pub fn new(uploader: U, ledger: L, credentials: Credentials) -> Orchestrator<U, L> {
        Orchestrator {
            uploader,
            ledger,
            credentials,
            tag_spec: TagSpec::new(),
            explorer: Explorer::default(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_tag_spec(mut self, tag_spec: TagSpec) -> Self {
        self.tag_spec = tag_spec;
        self
    }

    pub fn with_explorer(mut self, explorer: Explorer) -> Self {
        self.explorer = explorer;
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Archive the file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - File to upload.
    /// * `author` - Value for the author tag, omitted when `None` or blank.
    pub fn run(&self, path: &Path, author: Option<&str>) -> Report {
        let attempt = UploadAttempt::new(path);
        match read(path) {
            Ok(v) => {
                self.proceed(attempt, &v, author)
            },
            Err(e) => {
                error!("cannot read {:?}: {}", path, e);
                let outcome = Outcome::Failed(Failure::new(FailureKind::InputUnreadable, e.to_string()));
                self.conclude(attempt, outcome)
            },
        }
    }

    /// Archive content already in memory. `path` is only used as the record's file reference.
    pub fn run_bytes(&self, path: &Path, data: &[u8], author: Option<&str>) -> Report {
        let attempt = UploadAttempt::new(path);
        self.proceed(attempt, data, author)
    }

    fn proceed(&self, mut attempt: UploadAttempt, data: &[u8], author: Option<&str>) -> Report {
        let content_id = ContentId::from_bytes(data);
        info!("content identifier {} for {:?} ({} bytes)", content_id, attempt.path(), data.len());
        attempt.identified(content_id.clone(), data.len() as u64);

        let tags = match self.tag_spec.build(&content_id, &self.content_type, author) {
            Ok(v) => v,
            Err(e) => {
                error!("tag validation failed: {}", e);
                let outcome = Outcome::Failed(Failure::new(FailureKind::TagValidationError, e.to_string()));
                return self.conclude(attempt, outcome);
            },
        };
        attempt.tagged(tags.clone());

        attempt.uploading();
        let outcome = match self.uploader.upload(&self.credentials, data, &tags) {
            Ok(v) => {
                let url = self.explorer.url_for(&v.remote_id);
                Outcome::Succeeded{
                    remote_id: v.remote_id,
                    url,
                }
            },
            Err(e) => {
                error!("upload failed: {}", e);
                Outcome::Failed(Failure::from(e))
            },
        };
        self.conclude(attempt, outcome)
    }

    fn conclude(&self, attempt: UploadAttempt, outcome: Outcome) -> Report {
        let attempt = attempt.finalize(outcome);
        match attempt.outcome() {
            Outcome::Succeeded{ remote_id, url } => {
                info!("{:?} stored as {} ({})", attempt.path(), remote_id, url);
            },
            Outcome::Failed(f) => {
                info!("{:?} not stored: {}", attempt.path(), f);
            },
        }

        let record = LedgerRecord::from(&attempt);
        let ledger_error = match self.ledger.append(&record) {
            Ok(_) => {
                debug!("recorded attempt for {:?}", attempt.path());
                None
            },
            Err(e) => {
                warn!("local record for {:?} not written: {}", attempt.path(), e);
                Some(e)
            },
        };
        Report {
            attempt,
            ledger_error,
        }
    }
}
