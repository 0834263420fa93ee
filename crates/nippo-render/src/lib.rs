//! nippo-render
//!
//! Fixed-layout PDF generation for work reports, plus the QR code image that
//! accompanies each stored document. The PDF is assembled directly with
//! `lopdf` (content streams and image XObjects) so that two renders of the
//! same inputs are byte-identical.

pub mod error;
pub mod layout;
pub mod page;
pub mod qr;
pub mod report;
