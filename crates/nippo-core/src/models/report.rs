use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A daily work report submitted by a field worker.
///
/// `status` is the only field whose transition drives the generation
/// pipeline. `pdf_url` / `qr_code_url` are written at most once per approval
/// event and reflect the report's state at generation time; later edits do
/// not re-trigger generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub site_id: Option<Uuid>,
    #[serde(default)]
    pub site_name: Option<String>,
    pub status: ReportStatus,
    pub report_date: Date,
    #[serde(default)]
    pub submitted_at: Option<Timestamp>,
    pub created_by_name: String,
    #[serde(default)]
    pub workers: Vec<WorkerEntry>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub client_signature: Option<ClientSignature>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub pdf_generated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

/// One row of the worker table. Clock fields are raw `HH:MM` strings as
/// entered in the field; no identity beyond table position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerEntry {
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub no_lunch_break: bool,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSignature {
    #[serde(default)]
    pub image_url: Option<String>,
}
