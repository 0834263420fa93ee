//! QR code image generation for document retrieval URLs.

use std::io::Cursor;

use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};

use crate::error::RenderError;

/// Target edge length in pixels; the actual size is the nearest whole
/// multiple of the module count.
pub const TARGET_SIZE: u32 = 300;

/// Quiet zone around the code, in module units.
pub const QUIET_ZONE: u32 = 2;

/// Encode `data` into a two-tone PNG.
pub fn qr_png(data: &str) -> Result<Vec<u8>, RenderError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| RenderError::Qr(e.to_string()))?;
    let modules = code.width() as u32;
    let total_modules = modules + 2 * QUIET_ZONE;
    let scale = (TARGET_SIZE / total_modules).max(1);
    let size = total_modules * scale;

    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
    for my in 0..modules {
        for mx in 0..modules {
            if code[(mx as usize, my as usize)] == Color::Dark {
                let px = (mx + QUIET_ZONE) * scale;
                let py = (my + QUIET_ZONE) * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(px + dx, py + dy, Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(|e| RenderError::Png(e.to_string()))?;
    Ok(buffer)
}
