//! Blob storage for generated artifacts.
//!
//! Every stored object carries a random capability token; access control is
//! the token embedded in the download URL, not session auth. URL shape is
//! `{endpoint}/{encoded path}?alt=media&token={token}` with the full path
//! percent-encoded (slashes included).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::StorageError;
use crate::objects;

const PATH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.');

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), StorageError>;
}

/// Deterministic public-fetch URL for a stored blob.
pub fn download_url(endpoint: &str, path: &str, token: &str) -> String {
    let encoded = utf8_percent_encode(path, PATH_ENCODE);
    format!("{endpoint}/{encoded}?alt=media&token={token}")
}

pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), StorageError> {
        objects::put_object(
            &self.client,
            &self.bucket,
            path,
            bytes,
            content_type,
            Some(token),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_encodes_slashes() {
        let url = download_url(
            "https://storage.example.com/v0/b/nippo/o",
            "reports/t/r/report_20240307.pdf",
            "tok-123",
        );
        assert_eq!(
            url,
            "https://storage.example.com/v0/b/nippo/o/reports%2Ft%2Fr%2Freport_20240307.pdf?alt=media&token=tok-123"
        );
    }
}
