use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Unified API error type for all route handlers.
///
/// Callers receive a stable machine-readable code and a localized message;
/// internal detail stays in the logs.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    InvalidArgument(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidArgument(_) => "invalid-argument",
            ApiError::NotFound(_) => "not-found",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Unauthenticated => "認証に失敗しました".to_string(),
            ApiError::InvalidArgument(detail) => {
                format!("リクエスト内容が不正です: {detail}")
            }
            ApiError::NotFound(what) => format!("{what}が見つかりません"),
            ApiError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "サーバーエラーが発生しました".to_string()
            }
        };
        let status = self.status();
        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<nippo_storage::error::StorageError> for ApiError {
    fn from(e: nippo_storage::error::StorageError) -> Self {
        match e {
            nippo_storage::error::StorageError::NotFound { key } => {
                ApiError::NotFound(format!("オブジェクト {key}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<nippo_pipeline::error::PipelineError> for ApiError {
    fn from(e: nippo_pipeline::error::PipelineError) -> Self {
        use nippo_pipeline::error::PipelineError;
        match e {
            PipelineError::TenantNotFound(id) => {
                ApiError::NotFound(format!("テナント {id}"))
            }
            PipelineError::ReportNotFound(id) => {
                ApiError::NotFound(format!("報告書 {id}"))
            }
            PipelineError::Storage(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidArgument(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nippo_pipeline::error::PipelineError;
    use nippo_storage::error::StorageError;
    use uuid::Uuid;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidArgument("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_report_maps_to_not_found() {
        let err: ApiError = PipelineError::ReportNotFound(Uuid::new_v4()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn missing_object_maps_to_not_found() {
        let err: ApiError = StorageError::NotFound {
            key: "tenants/x.json".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn render_failure_maps_to_internal() {
        let err: ApiError = PipelineError::Archive("zip truncated".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn bad_json_maps_to_invalid_argument() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ApiError = parse_err.into();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
