//! The `mock` uploader is provided to facilitate testing.
//!
//! It stores nothing. Each call consumes the next scripted result, and once the script is
//! exhausted every call succeeds. The remote identifier of a successful call is the hex sha256
//! of the call sequence number followed by the content, so repeated uploads of the same content
//! get distinct identifiers, as they would on a real network.
use std::collections::VecDeque;
use std::sync::Mutex;

use sha2::{Sha256, Digest};

use log::debug;

use crate::tag::TagSet;
use crate::upload::{
    Credentials,
    Receipt,
    UploadError,
    UploadErrorKind,
    Uploader,
};

/// One observed call to the mock.
#[derive(Debug, Clone)]
pub struct Call {
    pub data: Vec<u8>,
    pub tags: TagSet,
}

#[derive(Default)]
pub struct MockUploader {
    script: Mutex<VecDeque<UploadError>>,
    calls: Mutex<Vec<Call>>,
}

impl MockUploader {

    pub fn new() -> MockUploader {
        MockUploader::default()
    }

    /// Mock whose next call fails with the given error.
    pub fn failing(kind: UploadErrorKind, diagnostic: &str) -> MockUploader {
        let m = MockUploader::new();
        m.fail_next(kind, diagnostic);
        m
    }

    /// Queue a failure for a coming call.
    pub fn fail_next(&self, kind: UploadErrorKind, diagnostic: &str) {
        match self.script.lock() {
            Ok(mut v) => v.push_back(UploadError::new(kind, diagnostic)),
            Err(e) => e.into_inner().push_back(UploadError::new(kind, diagnostic)),
        }
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        match self.calls.lock() {
            Ok(v) => v.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl Uploader for MockUploader {
    fn upload(&self, credentials: &Credentials, data: &[u8], tags: &TagSet) -> Result<Receipt, UploadError> {
        let seq = {
            let mut calls = match self.calls.lock() {
                Ok(v) => v,
                Err(e) => e.into_inner(),
            };
            calls.push(Call{
                data: data.to_vec(),
                tags: tags.clone(),
            });
            calls.len() as u64
        };

        let scripted = match self.script.lock() {
            Ok(mut v) => v.pop_front(),
            Err(e) => e.into_inner().pop_front(),
        };
        if let Some(e) = scripted {
            debug!("mock upload {} fails with {:?}", seq, e.kind);
            return Err(e);
        }
        if credentials.is_empty() {
            return Err(UploadError::new(UploadErrorKind::Credential, "no credentials"));
        }

        let mut h = Sha256::new();
        h.update(seq.to_be_bytes());
        h.update(data);
        let remote_id = hex::encode(h.finalize());
        debug!("mock upload {} stored {} bytes as {}", seq, data.len(), remote_id);
        Ok(Receipt{
            remote_id,
        })
    }
}
