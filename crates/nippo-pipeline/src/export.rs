//! Bulk export: every approved report in a closed date range, rendered into
//! one deflate-compressed archive. Reports are processed one at a time to
//! bound memory and keep archive entries in query order; any failure fails
//! the whole export rather than returning a partial archive.

use std::io::{Cursor, Write};

use jiff::civil::Date;
use uuid::Uuid;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use nippo_render::report::{ReportDocument, render_report};

use crate::Pipeline;
use crate::error::PipelineError;

pub struct BulkArchive {
    pub bytes: Vec<u8>,
    pub count: usize,
}

impl Pipeline {
    /// `None` means no approved reports matched — a normal outcome with no
    /// storage writes, not an error.
    pub async fn export_approved(
        &self,
        tenant_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Option<BulkArchive>, PipelineError> {
        let reports = self
            .records
            .approved_reports_in_range(tenant_id, start, end)
            .await?;
        if reports.is_empty() {
            tracing::info!(%tenant_id, %start, %end, "no approved reports in range");
            return Ok(None);
        }

        let tenant = self
            .records
            .get_tenant(tenant_id)
            .await?
            .ok_or(PipelineError::TenantNotFound(tenant_id))?;

        // One logo fetch for the whole export; signatures are per-report.
        let logo = match &tenant.logo_url {
            Some(url) => self.images.fetch(url).await,
            None => None,
        };

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for report in &reports {
            let site = self.load_site(tenant_id, report.site_id).await?;
            let lunch = site
                .as_ref()
                .and_then(|s| s.lunch.clone())
                .or_else(|| tenant.lunch.clone())
                .unwrap_or_default();
            let client_name = site.as_ref().and_then(|s| s.client_name.clone());

            let signature_url = report
                .client_signature
                .as_ref()
                .and_then(|s| s.image_url.as_deref());
            let signature = match signature_url {
                Some(url) => self.images.fetch(url).await,
                None => None,
            };

            let rendered = render_report(&ReportDocument {
                report,
                tenant_name: &tenant.display_name,
                client_name: client_name.as_deref(),
                lunch_policy: &lunch,
                logo: logo.as_deref(),
                signature: signature.as_deref(),
            })?;

            let site_label = report
                .site_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("report");
            let entry_name = format!(
                "{}_{}.pdf",
                report.report_date,
                sanitize_filename_component(site_label)
            );

            zip.start_file(entry_name, options)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
            zip.write_all(&rendered.bytes)
                .map_err(|e| PipelineError::Archive(e.to_string()))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| PipelineError::Archive(e.to_string()))?;

        Ok(Some(BulkArchive {
            bytes: cursor.into_inner(),
            count: reports.len(),
        }))
    }
}

/// Replace path-unsafe characters so a site name is usable as an archive
/// entry name.
pub fn sanitize_filename_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
