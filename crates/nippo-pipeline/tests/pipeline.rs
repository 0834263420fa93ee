use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jiff::Timestamp;
use jiff::civil::{Date, date};
use uuid::Uuid;

use nippo_core::models::report::{Report, ReportStatus};
use nippo_core::models::site::Site;
use nippo_core::models::tenant::{ApprovalMode, ApprovalSettings, Tenant};
use nippo_pipeline::Pipeline;
use nippo_pipeline::error::PipelineError;
use nippo_pipeline::lifecycle::ReportWriteEvent;
use nippo_pipeline::mailer::{EmailMessage, Mailer};
use nippo_storage::blobs::BlobStore;
use nippo_storage::error::StorageError;
use nippo_storage::fetch::ImageFetcher;
use nippo_storage::records::RecordStore;

#[derive(Default)]
struct MemRecords {
    tenants: Mutex<HashMap<Uuid, Tenant>>,
    sites: Mutex<HashMap<(Uuid, Uuid), Site>>,
    reports: Mutex<HashMap<(Uuid, Uuid), Report>>,
}

#[async_trait]
impl RecordStore for MemRecords {
    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Option<Tenant>, StorageError> {
        Ok(self.tenants.lock().unwrap().get(&tenant_id).cloned())
    }

    async fn get_site(
        &self,
        tenant_id: Uuid,
        site_id: Uuid,
    ) -> Result<Option<Site>, StorageError> {
        Ok(self.sites.lock().unwrap().get(&(tenant_id, site_id)).cloned())
    }

    async fn get_report(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
    ) -> Result<Option<Report>, StorageError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .get(&(tenant_id, report_id))
            .cloned())
    }

    async fn put_report(&self, report: &Report) -> Result<(), StorageError> {
        self.reports
            .lock()
            .unwrap()
            .insert((report.tenant_id, report.id), report.clone());
        Ok(())
    }

    async fn set_report_status(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        status: ReportStatus,
    ) -> Result<(), StorageError> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .get_mut(&(tenant_id, report_id))
            .ok_or(StorageError::NotFound {
                key: report_id.to_string(),
            })?;
        report.status = status;
        Ok(())
    }

    async fn set_report_artifacts(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        pdf_url: &str,
        qr_code_url: &str,
        generated_at: Timestamp,
    ) -> Result<(), StorageError> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .get_mut(&(tenant_id, report_id))
            .ok_or(StorageError::NotFound {
                key: report_id.to_string(),
            })?;
        report.pdf_url = Some(pdf_url.to_string());
        report.qr_code_url = Some(qr_code_url.to_string());
        report.pdf_generated_at = Some(generated_at);
        Ok(())
    }

    async fn approved_reports_in_range(
        &self,
        tenant_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<Report>, StorageError> {
        let mut matched: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.tenant_id == tenant_id
                    && r.status == ReportStatus::Approved
                    && r.report_date >= start
                    && r.report_date <= end
            })
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.report_date);
        Ok(matched)
    }
}

#[derive(Default)]
struct MemBlobs {
    puts: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl BlobStore for MemBlobs {
    async fn put(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), StorageError> {
        self.puts.lock().unwrap().push((
            path.to_string(),
            content_type.to_string(),
            token.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), PipelineError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: EmailMessage) -> Result<(), PipelineError> {
        Err(PipelineError::Mail("smtp unreachable".to_string()))
    }
}

struct NoImages;

#[async_trait]
impl ImageFetcher for NoImages {
    async fn fetch(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

struct World {
    records: Arc<MemRecords>,
    blobs: Arc<MemBlobs>,
    mailer: Arc<RecordingMailer>,
    pipeline: Pipeline,
}

fn world() -> World {
    let records = Arc::new(MemRecords::default());
    let blobs = Arc::new(MemBlobs::default());
    let mailer = Arc::new(RecordingMailer::default());
    let pipeline = Pipeline {
        records: records.clone(),
        blobs: blobs.clone(),
        images: Arc::new(NoImages),
        mailer: mailer.clone(),
        storage_endpoint: "https://storage.example.com/v0/b/nippo/o".to_string(),
        sender: "noreply@nippo.example.com".to_string(),
    };
    World {
        records,
        blobs,
        mailer,
        pipeline,
    }
}

fn tenant(id: Uuid, emails: &[&str]) -> Tenant {
    Tenant {
        id,
        display_name: "サンプル建設".to_string(),
        logo_url: None,
        approval: Some(ApprovalSettings {
            mode: ApprovalMode::Manual,
            auto_approval_emails: emails.iter().map(|e| e.to_string()).collect(),
        }),
        lunch: None,
    }
}

fn auto_site(id: Uuid, tenant_id: Uuid) -> Site {
    Site {
        id,
        tenant_id,
        name: "渋谷第2ビル".to_string(),
        client_name: Some("大手建設".to_string()),
        approval: Some(ApprovalSettings {
            mode: ApprovalMode::Auto,
            auto_approval_emails: vec![],
        }),
        lunch: None,
    }
}

fn report(tenant_id: Uuid, site_id: Option<Uuid>, status: ReportStatus, day: Date) -> Report {
    Report {
        id: Uuid::new_v4(),
        tenant_id,
        site_id,
        site_name: Some("渋谷第2ビル".to_string()),
        status,
        report_date: day,
        submitted_at: Some("2024-03-07T08:30:00Z".parse().unwrap()),
        created_by_name: "田中太郎".to_string(),
        workers: vec![],
        notes: String::new(),
        client_signature: None,
        pdf_url: None,
        qr_code_url: None,
        pdf_generated_at: None,
    }
}

async fn seed(world: &World, report: &Report) {
    world.records.put_report(report).await.unwrap();
}

fn submitted_event(report: &Report) -> ReportWriteEvent {
    let mut before = report.clone();
    before.status = ReportStatus::Draft;
    ReportWriteEvent {
        tenant_id: report.tenant_id,
        report_id: report.id,
        before: Some(before),
        after: report.clone(),
    }
}

#[tokio::test]
async fn auto_approval_generates_artifacts_and_notifies() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    let site_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["ops@x.com"]));
    w.records
        .sites
        .lock()
        .unwrap()
        .insert((tenant_id, site_id), auto_site(site_id, tenant_id));

    let r = report(
        tenant_id,
        Some(site_id),
        ReportStatus::Submitted,
        date(2024, 3, 7),
    );
    seed(&w, &r).await;

    // Transition into submitted: the auto gate flips status to approved.
    w.pipeline.handle_report_write(submitted_event(&r)).await;
    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReportStatus::Approved);

    // The platform redelivers the status write as its own transition.
    w.pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(r.clone()),
            after: stored,
        })
        .await;

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    let pdf_url = stored.pdf_url.expect("pdf url persisted");
    assert!(pdf_url.contains("report_20240307.pdf"));
    assert!(pdf_url.contains("alt=media&token="));
    assert!(stored.qr_code_url.unwrap().contains("qrcode.png"));
    assert!(stored.pdf_generated_at.is_some());

    let sent = w.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["ops@x.com"]);
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(sent[0].attachments[0].mime_type, "application/pdf");
    assert_eq!(sent[0].attachments[0].filename, "report_20240307.pdf");
    assert!(sent[0].body.contains("自動承認"));

    let puts = w.blobs.puts.lock().unwrap();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].1, "application/pdf");
    assert_eq!(puts[1].1, "image/png");
}

#[tokio::test]
async fn unchanged_status_is_a_noop() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["ops@x.com"]));

    let r = report(tenant_id, None, ReportStatus::Submitted, date(2024, 3, 7));
    seed(&w, &r).await;

    w.pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(r.clone()),
            after: r.clone(),
        })
        .await;

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReportStatus::Submitted);
    assert!(w.blobs.puts.lock().unwrap().is_empty());
    assert!(w.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn manual_mode_waits_for_human_approval() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["ops@x.com"]));

    let r = report(tenant_id, None, ReportStatus::Submitted, date(2024, 3, 7));
    seed(&w, &r).await;

    w.pipeline.handle_report_write(submitted_event(&r)).await;

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReportStatus::Submitted);
    assert!(w.blobs.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_recipient_list_still_generates_artifacts() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &[]));

    let r = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 7));
    seed(&w, &r).await;

    let mut before = r.clone();
    before.status = ReportStatus::Submitted;
    w.pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(before),
            after: r.clone(),
        })
        .await;

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.pdf_url.is_some());
    assert!(w.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn recipients_are_re_resolved_at_approval_time() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    let site_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["old@x.com"]));
    w.records
        .sites
        .lock()
        .unwrap()
        .insert((tenant_id, site_id), auto_site(site_id, tenant_id));

    let r = report(
        tenant_id,
        Some(site_id),
        ReportStatus::Submitted,
        date(2024, 3, 7),
    );
    seed(&w, &r).await;
    w.pipeline.handle_report_write(submitted_event(&r)).await;

    // Configuration changes between submission and approval delivery.
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["new@x.com"]));

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    w.pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(r.clone()),
            after: stored,
        })
        .await;

    let sent = w.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["new@x.com"]);
}

#[tokio::test]
async fn redelivered_approval_overwrites_the_same_paths() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &[]));

    let r = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 7));
    seed(&w, &r).await;

    let event = || {
        let mut before = r.clone();
        before.status = ReportStatus::Submitted;
        ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(before),
            after: r.clone(),
        }
    };
    w.pipeline.handle_report_write(event()).await;
    w.pipeline.handle_report_write(event()).await;

    let puts = w.blobs.puts.lock().unwrap();
    assert_eq!(puts.len(), 4);
    // Same deterministic paths, rotated tokens.
    assert_eq!(puts[0].0, puts[2].0);
    assert_eq!(puts[1].0, puts[3].0);
    assert_ne!(puts[0].2, puts[2].2);
}

#[tokio::test]
async fn mail_failure_does_not_lose_artifacts() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["ops@x.com"]));

    let pipeline = Pipeline {
        mailer: Arc::new(FailingMailer),
        ..w.pipeline.clone()
    };

    let r = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 7));
    seed(&w, &r).await;

    let mut before = r.clone();
    before.status = ReportStatus::Submitted;
    pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id,
            report_id: r.id,
            before: Some(before),
            after: r.clone(),
        })
        .await;

    let stored = w
        .records
        .get_report(tenant_id, r.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.pdf_url.is_some());
    assert!(stored.qr_code_url.is_some());
}

#[tokio::test]
async fn regenerate_reports_not_found() {
    let w = world();
    let err = w
        .pipeline
        .regenerate(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ReportNotFound(_)));
}

#[tokio::test]
async fn regenerate_returns_urls_without_mailing() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &["ops@x.com"]));

    let r = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 7));
    seed(&w, &r).await;

    let artifacts = w.pipeline.regenerate(tenant_id, r.id).await.unwrap();
    assert!(artifacts.document_url.contains("report_20240307.pdf"));
    assert!(artifacts.qr_code_url.contains("qrcode.png"));
    assert!(w.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_export_range_is_a_normal_outcome() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &[]));

    let archive = w
        .pipeline
        .export_approved(tenant_id, date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert!(archive.is_none());
    assert!(w.blobs.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn export_archives_matching_reports_in_date_order() {
    let w = world();
    let tenant_id = Uuid::new_v4();
    w.records
        .tenants
        .lock()
        .unwrap()
        .insert(tenant_id, tenant(tenant_id, &[]));

    let mut late = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 20));
    late.site_name = Some("現場/2号".to_string());
    let early = report(tenant_id, None, ReportStatus::Approved, date(2024, 3, 5));
    let outside = report(tenant_id, None, ReportStatus::Approved, date(2024, 4, 2));
    let unapproved = report(tenant_id, None, ReportStatus::Submitted, date(2024, 3, 10));
    for r in [&late, &early, &outside, &unapproved] {
        seed(&w, r).await;
    }

    let archive = w
        .pipeline
        .export_approved(tenant_id, date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap()
        .expect("archive produced");
    assert_eq!(archive.count, 2);

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["2024-03-05_渋谷第2ビル.pdf", "2024-03-20_現場_2号.pdf"]
    );
}
