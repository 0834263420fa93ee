use axum::Json;
use axum::extract::{Path, State};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// Base64-encoded zip archive, or null when no reports matched.
    pub archive_bytes: Option<String>,
    pub count: usize,
}

/// Export every approved report in a closed date range as one zip archive.
pub async fn export_reports(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let start = parse_date(&req.start_date)?;
    let end = parse_date(&req.end_date)?;
    if start > end {
        return Err(ApiError::InvalidArgument(format!(
            "startDate {start} is after endDate {end}"
        )));
    }

    let archive = state.pipeline.export_approved(tenant_id, start, end).await?;

    let response = match archive {
        Some(archive) => ExportResponse {
            archive_bytes: Some(STANDARD.encode(&archive.bytes)),
            count: archive.count,
        },
        None => ExportResponse {
            archive_bytes: None,
            count: 0,
        },
    };

    Ok(Json(response))
}

fn parse_date(value: &str) -> Result<Date, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::InvalidArgument(format!("invalid date: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-03-07").unwrap(), date(2024, 3, 7));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("07/03/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("").is_err());
    }
}
