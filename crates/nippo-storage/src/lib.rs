//! nippo-storage
//!
//! The external-collaborator boundary: keyed JSON record storage, blob
//! storage with capability-token download URLs, and best-effort image
//! fetching. Traits at the seams; S3/HTTP implementations behind them.

pub mod blobs;
pub mod client;
pub mod error;
pub mod fetch;
pub mod objects;
pub mod records;
