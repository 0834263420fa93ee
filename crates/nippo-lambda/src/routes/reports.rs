use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateResponse {
    pub success: bool,
    pub document_url: String,
    pub qr_code_url: String,
}

/// Re-run document generation for one report. The artifacts land at the
/// same paths with fresh download tokens; no notification mail is sent.
pub async fn regenerate_report(
    State(state): State<AppState>,
    Path((tenant_id, report_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RegenerateResponse>, ApiError> {
    let artifacts = state.pipeline.regenerate(tenant_id, report_id).await?;

    Ok(Json(RegenerateResponse {
        success: true,
        document_url: artifacts.document_url,
        qr_code_url: artifacts.qr_code_url,
    }))
}
