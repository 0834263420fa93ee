//! The fixed-template report document.
//!
//! One parameterized renderer serves both the approval pipeline and
//! interactive regeneration. Layout is absolute-positioned (see
//! [`crate::layout`]); optional images embed best-effort and never fail the
//! render.

use nippo_core::dates;
use nippo_core::models::report::Report;
use nippo_core::models::tenant::LunchBreakPolicy;
use nippo_core::time::worked_duration;

use crate::error::RenderError;
use crate::layout::{
    CHECKBOX, CLIENT_LINE_TOP, CONFIRM_COLS, CONFIRM_ROW_H, CONFIRM_TOP, CONTENT_WIDTH,
    HEADER_LABEL_SIZE, HEADER_TOP, INFO_SIZE, LOGO_BOX, MARGIN, NOTES_BOX_H, NOTES_BOX_TOP,
    NOTES_FONT, NOTES_LABEL_TOP, NOTES_LINE_H, NOTES_PAD, PAGE_WIDTH, SIGNATURE_BOX_H,
    SIGNATURE_BOX_W, SITE_LINE_TOP, TABLE_COLS, TABLE_FONT, TABLE_ROW_H, TABLE_ROWS, TABLE_TOP,
    TENANT_NAME_SIZE,
};
use crate::page::PageBuilder;

/// Inputs for one render. All configuration arrives as explicit parameters;
/// nothing is read from ambient state.
pub struct ReportDocument<'a> {
    pub report: &'a Report,
    pub tenant_name: &'a str,
    pub client_name: Option<&'a str>,
    pub lunch_policy: &'a LunchBreakPolicy,
    pub logo: Option<&'a [u8]>,
    pub signature: Option<&'a [u8]>,
}

/// Outcome of a best-effort image embed. `Degraded` means the image was
/// skipped but layout proceeded without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    Ok,
    Degraded(String),
}

pub struct Rendered {
    pub bytes: Vec<u8>,
    pub logo_embed: Option<Embed>,
    pub signature_embed: Option<Embed>,
}

const TABLE_HEADERS: [&str; 6] = ["氏名", "開始", "終了", "実働", "昼食休憩なし", "備考"];

pub fn render_report(input: &ReportDocument<'_>) -> Result<Rendered, RenderError> {
    let mut page = PageBuilder::new();
    let report = input.report;

    // Header: logo square, tenant name, right-aligned submission date.
    let logo_embed = input
        .logo
        .map(|bytes| embed_image(&mut page, bytes, MARGIN, HEADER_TOP, LOGO_BOX, LOGO_BOX, "logo"));
    page.text(
        MARGIN + LOGO_BOX + 12.0,
        HEADER_TOP + 32.0,
        TENANT_NAME_SIZE,
        input.tenant_name,
    );
    let submitted = report
        .submitted_at
        .map(dates::jst_date)
        .unwrap_or(report.report_date);
    page.text_right(
        PAGE_WIDTH - MARGIN,
        HEADER_TOP + 12.0,
        HEADER_LABEL_SIZE,
        &format!("報告日: {}", dates::month_day(submitted)),
    );

    // Two-row confirmation grid.
    let grid_h = CONFIRM_ROW_H * 2.0;
    page.rect(MARGIN, CONFIRM_TOP, CONTENT_WIDTH, grid_h, 1.0);
    page.line(
        MARGIN,
        CONFIRM_TOP + CONFIRM_ROW_H,
        MARGIN + CONTENT_WIDTH,
        CONFIRM_TOP + CONFIRM_ROW_H,
        1.0,
    );
    let col1_x = MARGIN + CONFIRM_COLS[0];
    let col2_x = col1_x + CONFIRM_COLS[1];
    page.line(col1_x, CONFIRM_TOP, col1_x, CONFIRM_TOP + grid_h, 1.0);
    page.line(col2_x, CONFIRM_TOP, col2_x, CONFIRM_TOP + CONFIRM_ROW_H, 1.0);

    page.text_center(
        MARGIN + CONFIRM_COLS[0] / 2.0,
        CONFIRM_TOP + 22.0,
        INFO_SIZE,
        "確認",
    );
    let signature_embed = input.signature.map(|bytes| {
        embed_image(
            &mut page,
            bytes,
            col1_x + 10.0,
            CONFIRM_TOP + (CONFIRM_ROW_H - SIGNATURE_BOX_H) / 2.0,
            SIGNATURE_BOX_W,
            SIGNATURE_BOX_H,
            "signature",
        )
    });
    page.text(
        col2_x + 10.0,
        CONFIRM_TOP + 22.0,
        INFO_SIZE,
        &format!("実施日: {}", dates::month_day(report.report_date)),
    );
    page.text_center(
        MARGIN + CONFIRM_COLS[0] / 2.0,
        CONFIRM_TOP + CONFIRM_ROW_H + 22.0,
        INFO_SIZE,
        "報告書",
    );
    page.text(
        col1_x + 10.0,
        CONFIRM_TOP + CONFIRM_ROW_H + 22.0,
        INFO_SIZE,
        &report.created_by_name,
    );

    // Client (optional) and site lines.
    if let Some(client) = input.client_name {
        page.text(
            MARGIN,
            CLIENT_LINE_TOP,
            INFO_SIZE,
            &format!("元請: {client}"),
        );
    }
    let site_name = report.site_name.as_deref().unwrap_or("");
    page.text(
        MARGIN,
        SITE_LINE_TOP,
        INFO_SIZE,
        &format!("現場名: {site_name}"),
    );

    draw_worker_table(&mut page, report, input.lunch_policy);
    draw_notes(&mut page, &report.notes);

    let bytes = page.finish()?;
    Ok(Rendered {
        bytes,
        logo_embed,
        signature_embed,
    })
}

fn draw_worker_table(page: &mut PageBuilder, report: &Report, lunch: &LunchBreakPolicy) {
    let row_count = TABLE_ROWS + 1; // header row
    let table_h = TABLE_ROW_H * row_count as f64;
    page.rect(MARGIN, TABLE_TOP, CONTENT_WIDTH, table_h, 1.0);

    for row in 1..row_count {
        let y = TABLE_TOP + TABLE_ROW_H * row as f64;
        page.line(MARGIN, y, MARGIN + CONTENT_WIDTH, y, 0.5);
    }
    let mut x = MARGIN;
    for width in &TABLE_COLS[..TABLE_COLS.len() - 1] {
        x += width;
        page.line(x, TABLE_TOP, x, TABLE_TOP + table_h, 0.5);
    }

    let mut x = MARGIN;
    for (header, width) in TABLE_HEADERS.iter().zip(TABLE_COLS) {
        page.text_center(x + width / 2.0, TABLE_TOP + 17.0, TABLE_FONT, header);
        x += width;
    }

    // Fixed row count: blank trailing rows still get their checkbox square,
    // and workers beyond the table are dropped.
    for row in 0..TABLE_ROWS {
        let row_top = TABLE_TOP + TABLE_ROW_H * (row + 1) as f64;
        let baseline = row_top + 17.0;
        let worker = report.workers.get(row);

        let col = |index: usize| -> f64 { MARGIN + TABLE_COLS[..index].iter().sum::<f64>() };

        if let Some(worker) = worker {
            page.text(col(0) + 4.0, baseline, TABLE_FONT, &worker.name);
            page.text_center(
                col(1) + TABLE_COLS[1] / 2.0,
                baseline,
                TABLE_FONT,
                &worker.start_time,
            );
            page.text_center(
                col(2) + TABLE_COLS[2] / 2.0,
                baseline,
                TABLE_FONT,
                &worker.end_time,
            );
            let duration = worked_duration(
                &worker.start_time,
                &worker.end_time,
                worker.no_lunch_break,
                lunch,
            )
            .unwrap_or_default();
            page.text_center(col(3) + TABLE_COLS[3] / 2.0, baseline, TABLE_FONT, &duration);
            page.text(col(5) + 4.0, baseline, TABLE_FONT, &worker.remarks);
        }

        let box_x = col(4) + (TABLE_COLS[4] - CHECKBOX) / 2.0;
        let box_top = row_top + (TABLE_ROW_H - CHECKBOX) / 2.0;
        page.rect(box_x, box_top, CHECKBOX, CHECKBOX, 0.5);
        if worker.is_some_and(|w| w.no_lunch_break) {
            page.text_center(col(4) + TABLE_COLS[4] / 2.0, baseline, TABLE_FONT, "✓");
        }
    }
}

fn draw_notes(page: &mut PageBuilder, notes: &str) {
    page.text(MARGIN, NOTES_LABEL_TOP, TABLE_FONT, "特記事項");
    page.rect(MARGIN, NOTES_BOX_TOP, CONTENT_WIDTH, NOTES_BOX_H, 1.0);

    let max_lines = ((NOTES_BOX_H - NOTES_PAD) / NOTES_LINE_H) as usize;
    let lines = wrap_text(notes, CONTENT_WIDTH - 2.0 * NOTES_PAD, NOTES_FONT);
    for (index, line) in lines.iter().take(max_lines).enumerate() {
        page.text(
            MARGIN + NOTES_PAD,
            NOTES_BOX_TOP + 4.0 + NOTES_LINE_H * (index + 1) as f64,
            NOTES_FONT,
            line,
        );
    }
}

/// Width-aware character wrapping: full-width glyphs count double. Respects
/// embedded newlines; makes no attempt at word boundaries.
pub fn wrap_text(text: &str, max_width: f64, size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut line = String::new();
        let mut width = 0.0;
        for c in raw.chars() {
            let advance = if c.is_ascii() { 0.5 } else { 1.0 } * size;
            if width + advance > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            line.push(c);
            width += advance;
        }
        lines.push(line);
    }
    lines
}

fn embed_image(
    page: &mut PageBuilder,
    bytes: &[u8],
    x: f64,
    from_top: f64,
    box_w: f64,
    box_h: f64,
    what: &str,
) -> Embed {
    match page.image(bytes, x, from_top, box_w, box_h) {
        Ok(()) => Embed::Ok,
        Err(e) => {
            tracing::warn!(image = what, error = %e, "image embed skipped");
            Embed::Degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_newlines() {
        let lines = wrap_text("one\ntwo", 500.0, 9.0);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn wrap_breaks_long_ascii_runs() {
        // 9pt ASCII is 4.5pt per char; 45pt fits ten characters.
        let lines = wrap_text(&"a".repeat(25), 45.0, 9.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 10);
        assert_eq!(lines[2].len(), 5);
    }

    #[test]
    fn full_width_counts_double() {
        // 9pt full-width is 9pt per char; 45pt fits five.
        let lines = wrap_text(&"あ".repeat(7), 45.0, 9.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 5);
    }
}
