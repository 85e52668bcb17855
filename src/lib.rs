#![crate_name = "mdarchive"]

//! mdarchive archives markdown files to a permanent storage network and keeps a local record of
//! every attempt.
//!
//! One archive run goes through four steps:
//!
//! 1. The content identifier is derived from the file bytes. It is a CIDv1 over the sha2-256
//!    digest of the content, and is always the same for the same content. See [cid].
//! 2. A tag set describing the upload is assembled in a fixed order. See [tag].
//! 3. The content and tags are handed to an [Uploader](crate::upload::Uploader) exactly once.
//! 4. The outcome is appended to the local [Ledger](crate::ledger::Ledger), successful or not.
//!
//! The [Orchestrator](crate::orchestrate::Orchestrator) ties these together. If the upload
//! succeeds but the ledger cannot be written, the run still counts as successful and the ledger
//! error is reported next to it.
//!
//! ## Running the tool
//!
//! With the `client` feature, the `mdarchive` binary uploads to an HTTP gateway and appends to
//! `uploads.jsonl` in the current directory. See `cargo run -- --help` for details.
//!
//! ``` ignore,
//! mdarchive --token $TOKEN --author "Ada" notes.md
//! ```

/// Derive content identifiers from content bytes.
pub mod cid;

/// Build the ordered tag set sent with an upload.
pub mod tag;

/// Format viewer URLs for remote identifiers.
pub mod explorer;

/// Interface to the storage network.
pub mod upload;

/// State and outcome of a single upload attempt.
pub mod attempt;

/// Local append-only record of upload attempts.
pub mod ledger;

/// Run upload attempts end to end.
pub mod orchestrate;
