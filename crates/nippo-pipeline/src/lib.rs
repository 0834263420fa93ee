//! nippo-pipeline
//!
//! The report lifecycle: status-transition handling, document generation,
//! artifact packaging, notification mail, and bulk export. Every run is a
//! stateless invocation over the collaborator traits in [`nippo_storage`]
//! and [`mailer`]; concurrency comes from the host invoking runs in
//! parallel, never from internal fan-out.

use std::sync::Arc;

use nippo_storage::blobs::BlobStore;
use nippo_storage::fetch::ImageFetcher;
use nippo_storage::records::RecordStore;

use crate::mailer::Mailer;

pub mod error;
pub mod export;
pub mod lifecycle;
pub mod mailer;
pub mod package;

/// Collaborators and configuration for one pipeline, shared by every run.
/// No ambient state: everything a stage needs arrives through here.
#[derive(Clone)]
pub struct Pipeline {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub images: Arc<dyn ImageFetcher>,
    pub mailer: Arc<dyn Mailer>,
    /// Public base URL under which stored artifacts are fetched.
    pub storage_endpoint: String,
    /// From address for notification mail.
    pub sender: String,
}
