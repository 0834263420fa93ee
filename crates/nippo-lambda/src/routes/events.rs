use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nippo_core::models::report::Report;
use nippo_pipeline::lifecycle::ReportWriteEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Before/after snapshots of one report-record write, as delivered by the
/// platform's change feed. `before` is absent on creation; `after` is
/// absent on deletion.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWriteBody {
    pub tenant_id: Uuid,
    pub report_id: Uuid,
    #[serde(default)]
    pub before: Option<Report>,
    #[serde(default)]
    pub after: Option<Report>,
}

#[derive(Serialize)]
pub struct EventResponse {}

/// Fire-and-forget from the platform's perspective: always 200, pipeline
/// failures are logged inside the handler and never surfaced here.
pub async fn report_write(
    State(state): State<AppState>,
    Json(body): Json<ReportWriteBody>,
) -> Result<Json<EventResponse>, ApiError> {
    let Some(after) = body.after else {
        // Deletion: nothing to transition.
        return Ok(Json(EventResponse {}));
    };

    state
        .pipeline
        .handle_report_write(ReportWriteEvent {
            tenant_id: body.tenant_id,
            report_id: body.report_id,
            before: body.before,
            after,
        })
        .await;

    Ok(Json(EventResponse {}))
}
