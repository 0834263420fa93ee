use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tenant::{ApprovalSettings, LunchBreakPolicy};

/// A work location under a tenant, with optional policy overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub approval: Option<ApprovalSettings>,
    #[serde(default)]
    pub lunch: Option<LunchBreakPolicy>,
}
