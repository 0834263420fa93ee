//! Storage key/path conventions.
//!
//! Pure string functions — no AWS SDK dependency. These define the canonical
//! layout of records and generated artifacts in the nippo bucket. Artifact
//! paths are deterministic in (tenant, report, date) so regeneration
//! overwrites prior objects instead of accumulating duplicates.

use jiff::civil::Date;
use uuid::Uuid;

pub fn tenant(tenant_id: Uuid) -> String {
    format!("tenants/{tenant_id}.json")
}

pub fn site(tenant_id: Uuid, site_id: Uuid) -> String {
    format!("tenants/{tenant_id}/sites/{site_id}.json")
}

pub fn report(tenant_id: Uuid, report_id: Uuid) -> String {
    format!("tenants/{tenant_id}/reports/{report_id}.json")
}

pub fn reports_prefix(tenant_id: Uuid) -> String {
    format!("tenants/{tenant_id}/reports/")
}

/// `report_YYYYMMDD.pdf` — also the attachment filename in notification mail.
pub fn pdf_filename(date: Date) -> String {
    format!(
        "report_{:04}{:02}{:02}.pdf",
        date.year(),
        date.month(),
        date.day()
    )
}

pub fn report_pdf(tenant_id: Uuid, report_id: Uuid, date: Date) -> String {
    format!(
        "reports/{tenant_id}/{report_id}/{}",
        pdf_filename(date)
    )
}

pub fn report_qr_code(tenant_id: Uuid, report_id: Uuid) -> String {
    format!("reports/{tenant_id}/{report_id}/qrcode.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn artifact_paths_are_deterministic() {
        let tenant_id = Uuid::nil();
        let report_id = Uuid::nil();
        let day = date(2024, 3, 7);

        let first = report_pdf(tenant_id, report_id, day);
        let second = report_pdf(tenant_id, report_id, day);
        assert_eq!(first, second);
        assert!(first.ends_with("/report_20240307.pdf"));

        assert!(report_qr_code(tenant_id, report_id).ends_with("/qrcode.png"));
    }
}
