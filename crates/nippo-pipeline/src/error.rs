use thiserror::Error;
use uuid::Uuid;

use nippo_render::error::RenderError;
use nippo_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("tenant not found: {0}")]
    TenantNotFound(Uuid),

    #[error("report not found: {0}")]
    ReportNotFound(Uuid),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("mail send failed: {0}")]
    Mail(String),

    #[error("archive assembly failed: {0}")]
    Archive(String),
}
