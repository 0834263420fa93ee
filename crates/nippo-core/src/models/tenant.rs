use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer organization. Owned and mutated by the CRUD layer; the pipeline
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub approval: Option<ApprovalSettings>,
    #[serde(default)]
    pub lunch: Option<LunchBreakPolicy>,
}

/// Approval configuration, carried independently at tenant and site level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalSettings {
    #[serde(default)]
    pub mode: ApprovalMode,
    #[serde(default)]
    pub auto_approval_emails: Vec<String>,
}

/// `Default` is the site-level sentinel meaning "inherit the tenant's mode".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    #[default]
    Manual,
    Auto,
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunchBreakPolicy {
    pub deduct_lunch_break: bool,
    pub lunch_break_minutes: i64,
}

impl Default for LunchBreakPolicy {
    fn default() -> Self {
        Self {
            deduct_lunch_break: true,
            lunch_break_minutes: 60,
        }
    }
}
