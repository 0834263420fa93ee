//! The report lifecycle orchestrator.
//!
//! Transition table over report-write events: only a changed status acts.
//! Entry into `submitted` may auto-approve; the resulting status write is
//! redelivered by the platform as its own `approved` transition, which runs
//! generation and notification. The event path swallows stage failures —
//! no caller is waiting, and an approved report without artifact URLs is
//! the operational signal to re-run generation by hand.

use jiff::Timestamp;
use uuid::Uuid;

use nippo_core::dates;
use nippo_core::keys;
use nippo_core::models::report::{Report, ReportStatus};
use nippo_core::models::site::Site;
use nippo_core::models::tenant::ApprovalMode;
use nippo_core::policy::{ResolvedPolicy, resolve_approval_policy};
use nippo_render::report::{ReportDocument, render_report};

use crate::Pipeline;
use crate::error::PipelineError;
use crate::mailer::{EmailAttachment, EmailMessage};
use crate::package::PackagedArtifacts;

/// Before/after snapshot of one report write, as delivered by the platform.
#[derive(Debug, Clone)]
pub struct ReportWriteEvent {
    pub tenant_id: Uuid,
    pub report_id: Uuid,
    pub before: Option<Report>,
    pub after: Report,
}

impl Pipeline {
    /// Event-triggered entry point. Never returns an error: post-gate
    /// failures are logged with full context and swallowed, since the event
    /// source redelivers at-least-once and a retry-by-error would duplicate
    /// the mail send.
    pub async fn handle_report_write(&self, event: ReportWriteEvent) {
        let before = event.before.as_ref().map(|r| r.status);
        if before == Some(event.after.status) {
            tracing::debug!(report = %event.report_id, "status unchanged, nothing to do");
            return;
        }

        let result = match event.after.status {
            ReportStatus::Submitted => self.on_submitted(&event.after).await,
            ReportStatus::Approved => self.on_approved(&event.after).await,
            ReportStatus::Draft | ReportStatus::Rejected => Ok(()),
        };

        if let Err(e) = result {
            tracing::error!(
                tenant = %event.tenant_id,
                report = %event.report_id,
                status = ?event.after.status,
                error = %e,
                "report pipeline run failed"
            );
        }
    }

    /// Gate for auto-approval. Generation does not happen here; it runs when
    /// the status write comes back as an `approved` transition.
    async fn on_submitted(&self, report: &Report) -> Result<(), PipelineError> {
        let policy = self.resolve_policy(report.tenant_id, report.site_id).await?;
        if policy.mode != ApprovalMode::Auto {
            return Ok(());
        }

        tracing::info!(report = %report.id, "auto-approving submitted report");
        self.records
            .set_report_status(report.tenant_id, report.id, ReportStatus::Approved)
            .await?;
        Ok(())
    }

    async fn on_approved(&self, report: &Report) -> Result<(), PipelineError> {
        let (artifacts, pdf) = self.generate_artifacts(report).await?;
        self.notify(report, &artifacts, pdf).await
    }

    /// Interactive regeneration: same render-package-persist path as the
    /// approval handler, without the notification mail.
    pub async fn regenerate(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
    ) -> Result<PackagedArtifacts, PipelineError> {
        let report = self
            .records
            .get_report(tenant_id, report_id)
            .await?
            .ok_or(PipelineError::ReportNotFound(report_id))?;
        let (artifacts, _) = self.generate_artifacts(&report).await?;
        Ok(artifacts)
    }

    /// Reloads settings on every call — configuration may change between
    /// submission and approval, and the notification step wants the current
    /// recipient list, not the one seen at submission.
    pub async fn resolve_policy(
        &self,
        tenant_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Result<ResolvedPolicy, PipelineError> {
        let tenant = self.records.get_tenant(tenant_id).await?;
        let site = self.load_site(tenant_id, site_id).await?;
        Ok(resolve_approval_policy(
            tenant.as_ref().and_then(|t| t.approval.as_ref()),
            site.as_ref().and_then(|s| s.approval.as_ref()),
        ))
    }

    pub(crate) async fn load_site(
        &self,
        tenant_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Result<Option<Site>, PipelineError> {
        match site_id {
            Some(site_id) => Ok(self.records.get_site(tenant_id, site_id).await?),
            None => Ok(None),
        }
    }

    /// Render, package, persist. Returns the stored URLs and the PDF bytes
    /// for callers that also attach the document to mail.
    async fn generate_artifacts(
        &self,
        report: &Report,
    ) -> Result<(PackagedArtifacts, Vec<u8>), PipelineError> {
        let tenant = self
            .records
            .get_tenant(report.tenant_id)
            .await?
            .ok_or(PipelineError::TenantNotFound(report.tenant_id))?;
        let site = self.load_site(report.tenant_id, report.site_id).await?;

        let lunch = site
            .as_ref()
            .and_then(|s| s.lunch.clone())
            .or_else(|| tenant.lunch.clone())
            .unwrap_or_default();
        let client_name = site.as_ref().and_then(|s| s.client_name.clone());

        let logo = match &tenant.logo_url {
            Some(url) => self.images.fetch(url).await,
            None => None,
        };
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
        let pdf = rendered.bytes;

        let artifacts = self
            .package_for_retrieval(report.tenant_id, report.id, report.report_date, pdf.clone())
            .await?;

        self.records
            .set_report_artifacts(
                report.tenant_id,
                report.id,
                &artifacts.document_url,
                &artifacts.qr_code_url,
                Timestamp::now(),
            )
            .await?;

        Ok((artifacts, pdf))
    }

    /// One mail per approval, to the recipient list as configured *now*.
    /// An empty list is a normal stop; a send failure is logged and not
    /// surfaced — delivery is fire-and-forget.
    async fn notify(
        &self,
        report: &Report,
        artifacts: &PackagedArtifacts,
        pdf: Vec<u8>,
    ) -> Result<(), PipelineError> {
        let policy = self.resolve_policy(report.tenant_id, report.site_id).await?;
        if policy.emails.is_empty() {
            tracing::info!(report = %report.id, "no notification recipients configured");
            return Ok(());
        }

        let site_name = report.site_name.as_deref().unwrap_or("");
        let date_label = dates::year_month_day(report.report_date);
        let subject = format!("【作業報告書】{site_name} {date_label}");
        let approval_phrase = if policy.mode == ApprovalMode::Auto {
            "自動承認されました"
        } else {
            "承認されました"
        };
        let body = format!(
            "{site_name} {date_label}の作業報告書が{approval_phrase}。\n\n報告書: {}\n",
            artifacts.document_url
        );

        let message = EmailMessage {
            to: policy.emails,
            from: self.sender.clone(),
            subject,
            body,
            attachments: vec![EmailAttachment {
                filename: keys::pdf_filename(report.report_date),
                bytes: pdf,
                mime_type: "application/pdf".to_string(),
            }],
        };

        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!(report = %report.id, error = %e, "notification mail failed");
        }
        Ok(())
    }
}
