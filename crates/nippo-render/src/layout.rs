//! Absolute-position layout constants for the single-page report document.
//!
//! All vertical positions are offsets from the top edge of an A4 page in
//! points; [`crate::page::PageBuilder`] converts to PDF's bottom-up axis.
//! The worker table has a fixed row count regardless of how many entries a
//! report carries; excess workers are not rendered.

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 40.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

// Header: logo square, tenant name, right-aligned report date.
pub const HEADER_TOP: f64 = 40.0;
pub const LOGO_BOX: f64 = 48.0;
pub const TENANT_NAME_SIZE: f64 = 16.0;
pub const HEADER_LABEL_SIZE: f64 = 10.0;

// Two-row confirmation grid.
pub const CONFIRM_TOP: f64 = 104.0;
pub const CONFIRM_ROW_H: f64 = 34.0;
pub const CONFIRM_COLS: [f64; 3] = [96.0, 170.0, 249.28];
pub const SIGNATURE_BOX_W: f64 = 150.0;
pub const SIGNATURE_BOX_H: f64 = 26.0;

// Client / site lines.
pub const CLIENT_LINE_TOP: f64 = 198.0;
pub const SITE_LINE_TOP: f64 = 218.0;
pub const INFO_SIZE: f64 = 11.0;

// Worker table: header row plus a fixed number of data rows.
pub const TABLE_TOP: f64 = 244.0;
pub const TABLE_ROWS: usize = 9;
pub const TABLE_ROW_H: f64 = 26.0;
pub const TABLE_COLS: [f64; 6] = [120.0, 60.0, 60.0, 70.0, 85.0, 120.28];
pub const TABLE_FONT: f64 = 10.0;
pub const CHECKBOX: f64 = 12.0;

// Notes: fixed-height box, overflow is clipped rather than paginated.
pub const NOTES_LABEL_TOP: f64 = 528.0;
pub const NOTES_BOX_TOP: f64 = 544.0;
pub const NOTES_BOX_H: f64 = 120.0;
pub const NOTES_FONT: f64 = 9.0;
pub const NOTES_LINE_H: f64 = 13.0;
pub const NOTES_PAD: f64 = 8.0;
