//! Record storage: keyed JSON documents for tenants, sites, and reports.
//!
//! The trait is the document-store contract the pipeline depends on; the S3
//! implementation stores one JSON object per record under the
//! `nippo_core::keys` conventions. Partial updates are read-modify-write
//! with last-writer-wins semantics — the updated fields are derived outputs,
//! so concurrent re-runs converge on the same values.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use jiff::Timestamp;
use jiff::civil::Date;
use uuid::Uuid;

use nippo_core::keys;
use nippo_core::models::report::{Report, ReportStatus};
use nippo_core::models::site::Site;
use nippo_core::models::tenant::Tenant;

use crate::error::StorageError;
use crate::objects;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StorageError>;

    async fn get_site(&self, tenant_id: Uuid, site_id: Uuid)
    -> Result<Option<Site>, StorageError>;

    async fn get_report(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
    ) -> Result<Option<Report>, StorageError>;

    async fn put_report(&self, report: &Report) -> Result<(), StorageError>;

    /// Field-level status update; other report fields are untouched.
    async fn set_report_status(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        status: ReportStatus,
    ) -> Result<(), StorageError>;

    /// Persist generated artifact URLs onto the report. Compare-free
    /// overwrite.
    async fn set_report_artifacts(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        pdf_url: &str,
        qr_code_url: &str,
        generated_at: Timestamp,
    ) -> Result<(), StorageError>;

    /// Approved reports with `start <= report_date <= end` (closed range,
    /// whole days), ordered by report date ascending.
    async fn approved_reports_in_range(
        &self,
        tenant_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<Report>, StorageError>;
}

pub struct S3RecordStore {
    client: Client,
    bucket: String,
}

impl S3RecordStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        match objects::get_object(&self.client, &self.bucket, key).await {
            Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(value)?;
        objects::put_object(
            &self.client,
            &self.bucket,
            key,
            body,
            "application/json",
            None,
        )
        .await
    }

    async fn update_report<F>(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        apply: F,
    ) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Report) + Send,
    {
        let key = keys::report(tenant_id, report_id);
        let mut report: Report =
            self.get_json(&key)
                .await?
                .ok_or_else(|| StorageError::NotFound {
                    key: key.clone(),
                })?;
        apply(&mut report);
        self.put_json(&key, &report).await
    }
}

#[async_trait]
impl RecordStore for S3RecordStore {
    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StorageError> {
        self.get_json(&keys::tenant(tenant_id)).await
    }

    async fn get_site(
        &self,
        tenant_id: Uuid,
        site_id: Uuid,
    ) -> Result<Option<Site>, StorageError> {
        self.get_json(&keys::site(tenant_id, site_id)).await
    }

    async fn get_report(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
    ) -> Result<Option<Report>, StorageError> {
        self.get_json(&keys::report(tenant_id, report_id)).await
    }

    async fn put_report(&self, report: &Report) -> Result<(), StorageError> {
        self.put_json(&keys::report(report.tenant_id, report.id), report)
            .await
    }

    async fn set_report_status(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        status: ReportStatus,
    ) -> Result<(), StorageError> {
        self.update_report(tenant_id, report_id, |report| report.status = status)
            .await
    }

    async fn set_report_artifacts(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        pdf_url: &str,
        qr_code_url: &str,
        generated_at: Timestamp,
    ) -> Result<(), StorageError> {
        self.update_report(tenant_id, report_id, |report| {
            report.pdf_url = Some(pdf_url.to_string());
            report.qr_code_url = Some(qr_code_url.to_string());
            report.pdf_generated_at = Some(generated_at);
        })
        .await
    }

    async fn approved_reports_in_range(
        &self,
        tenant_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<Report>, StorageError> {
        let prefix = keys::reports_prefix(tenant_id);
        let keys = objects::list_objects(&self.client, &self.bucket, &prefix).await?;

        let mut matched = Vec::new();
        for key in &keys {
            let Some(report) = self.get_json::<Report>(key).await? else {
                continue;
            };
            if report.status == ReportStatus::Approved
                && report.report_date >= start
                && report.report_date <= end
            {
                matched.push(report);
            }
        }
        matched.sort_by_key(|r| r.report_date);
        Ok(matched)
    }
}
