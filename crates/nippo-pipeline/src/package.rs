//! Artifact packaging: a rendered document becomes two durable objects, the
//! PDF itself and a QR code image encoding the PDF's download URL.
//!
//! Paths are deterministic in (tenant, report, date); tokens are fresh per
//! run, so a repeat overwrites the same objects under rotated URLs. The PDF
//! is stored before the code — an orphaned document on a later failure is
//! accepted, the code is a derived convenience.

use jiff::civil::Date;
use uuid::Uuid;

use nippo_core::keys;
use nippo_render::qr;
use nippo_storage::blobs;

use crate::Pipeline;
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct PackagedArtifacts {
    pub document_url: String,
    pub qr_code_url: String,
}

impl Pipeline {
    pub async fn package_for_retrieval(
        &self,
        tenant_id: Uuid,
        report_id: Uuid,
        date: Date,
        pdf: Vec<u8>,
    ) -> Result<PackagedArtifacts, PipelineError> {
        let pdf_path = keys::report_pdf(tenant_id, report_id, date);
        let pdf_token = Uuid::new_v4().to_string();
        self.blobs
            .put(&pdf_path, pdf, "application/pdf", &pdf_token)
            .await?;
        let document_url = blobs::download_url(&self.storage_endpoint, &pdf_path, &pdf_token);

        let code = qr::qr_png(&document_url)?;
        let code_path = keys::report_qr_code(tenant_id, report_id);
        let code_token = Uuid::new_v4().to_string();
        self.blobs
            .put(&code_path, code, "image/png", &code_token)
            .await?;
        let qr_code_url = blobs::download_url(&self.storage_endpoint, &code_path, &code_token);

        Ok(PackagedArtifacts {
            document_url,
            qr_code_url,
        })
    }
}
