use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("image decode failed: {0}")]
    Image(String),

    #[error("QR encoding failed: {0}")]
    Qr(String),

    #[error("PNG encoding failed: {0}")]
    Png(String),
}
