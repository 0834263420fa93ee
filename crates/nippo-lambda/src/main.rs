use std::env;
use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use nippo_pipeline::Pipeline;
use nippo_pipeline::mailer::SmtpMailer;
use nippo_storage::blobs::S3BlobStore;
use nippo_storage::fetch::HttpImageFetcher;
use nippo_storage::records::S3RecordStore;

mod error;
mod middleware;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let bucket = env::var("NIPPO_BUCKET").unwrap_or_else(|_| "nippo".to_string());
    let storage_endpoint = env::var("NIPPO_STORAGE_ENDPOINT")
        .unwrap_or_else(|_| "https://storage.googleapis.com/nippo".to_string());
    let sender =
        env::var("NIPPO_SENDER").unwrap_or_else(|_| "noreply@nippo.example.com".to_string());
    let smtp_url = env::var("SMTP_URL").unwrap_or_else(|_| "smtp://localhost:25".to_string());
    let api_token = env::var("NIPPO_API_TOKEN").unwrap_or_default();
    if api_token.is_empty() {
        tracing::warn!("NIPPO_API_TOKEN is not set; all protected routes will reject");
    }

    let s3 = nippo_storage::client::build_client().await;
    let mailer = SmtpMailer::from_url(&smtp_url)?;

    let pipeline = Pipeline {
        records: Arc::new(S3RecordStore::new(s3.clone(), bucket.clone())),
        blobs: Arc::new(S3BlobStore::new(s3, bucket)),
        images: Arc::new(HttpImageFetcher::new()),
        mailer: Arc::new(mailer),
        storage_endpoint,
        sender,
    };

    let state = AppState {
        pipeline: Arc::new(pipeline),
        api_token,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route(
            "/tenants/{tenant_id}/reports/{report_id}/regenerate",
            post(routes::reports::regenerate_report),
        )
        .route(
            "/tenants/{tenant_id}/exports",
            post(routes::exports::export_reports),
        )
        .route("/events/report-write", post(routes::events::report_write))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let app = Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health_check))
        .merge(protected)
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state);

    lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
}
