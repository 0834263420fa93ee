//! Single-page PDF assembly on top of `lopdf`.
//!
//! Text uses one non-embedded Type0 CID font (HeiseiKakuGo-W5 with the
//! UniJIS-UCS2-H CMap) so Japanese labels render without shipping a font
//! file, and output stays byte-stable. Strings are written as UTF-16BE hex.

use image::GenericImageView;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::error::RenderError;
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};

const FONT_NAME: &str = "F1";

/// Approximate advance width in text-space units: CJK glyphs are full-width,
/// everything ASCII is half-width. Good enough for right-alignment and
/// wrapping on a fixed layout.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars()
        .map(|c| if c.is_ascii() { 0.5 } else { 1.0 })
        .sum::<f64>()
        * size
}

pub struct PageBuilder {
    ops: Vec<Operation>,
    images: Vec<(String, Stream)>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Offsets in this module's callers are measured from the top edge;
    /// convert to PDF's bottom-up y axis.
    fn baseline(from_top: f64) -> f64 {
        PAGE_HEIGHT - from_top
    }

    pub fn text(&mut self, x: f64, from_top: f64, size: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        let encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![FONT_NAME.into(), size.into()]));
        self.ops.push(Operation::new(
            "Td",
            vec![x.into(), Self::baseline(from_top).into()],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encoded, StringFormat::Hexadecimal)],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    pub fn text_right(&mut self, right: f64, from_top: f64, size: f64, text: &str) {
        self.text(right - text_width(text, size), from_top, size, text);
    }

    pub fn text_center(&mut self, center: f64, from_top: f64, size: f64, text: &str) {
        self.text(center - text_width(text, size) / 2.0, from_top, size, text);
    }

    /// Stroke a rectangle whose top-left corner sits `from_top` below the
    /// page's top edge.
    pub fn rect(&mut self, x: f64, from_top: f64, width: f64, height: f64, line_width: f64) {
        let y = PAGE_HEIGHT - from_top - height;
        self.ops
            .push(Operation::new("w", vec![line_width.into()]));
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    pub fn line(&mut self, x1: f64, from_top1: f64, x2: f64, from_top2: f64, line_width: f64) {
        self.ops
            .push(Operation::new("w", vec![line_width.into()]));
        self.ops.push(Operation::new(
            "m",
            vec![x1.into(), (PAGE_HEIGHT - from_top1).into()],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![x2.into(), (PAGE_HEIGHT - from_top2).into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Decode an image and place it scaled to fit inside the given box,
    /// centered. JPEG bytes embed as-is (DCTDecode); everything else embeds
    /// as raw RGB flattened onto white.
    pub fn image(
        &mut self,
        bytes: &[u8],
        x: f64,
        from_top: f64,
        box_w: f64,
        box_h: f64,
    ) -> Result<(), RenderError> {
        let (stream, width, height) = image_xobject(bytes)?;

        let scale = (box_w / f64::from(width)).min(box_h / f64::from(height));
        let draw_w = f64::from(width) * scale;
        let draw_h = f64::from(height) * scale;
        let draw_x = x + (box_w - draw_w) / 2.0;
        let draw_y = PAGE_HEIGHT - from_top - box_h + (box_h - draw_h) / 2.0;

        let name = format!("Im{}", self.images.len());
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                draw_w.into(),
                0i64.into(),
                0i64.into(),
                draw_h.into(),
                draw_x.into(),
                draw_y.into(),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![name.as_str().into()]));
        self.ops.push(Operation::new("Q", vec![]));
        self.images.push((name, stream));

        Ok(())
    }

    /// Assemble the finished single-page document.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "HeiseiKakuGo-W5",
            "Flags" => 4i64,
            "FontBBox" => vec![(-92i64).into(), (-250i64).into(), 1010i64.into(), 922i64.into()],
            "ItalicAngle" => 0i64,
            "Ascent" => 920i64,
            "Descent" => -250i64,
            "CapHeight" => 740i64,
            "StemV" => 80i64,
        });

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType0",
            "BaseFont" => "HeiseiKakuGo-W5",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::String(b"Adobe".to_vec(), StringFormat::Literal),
                "Ordering" => Object::String(b"Japan1".to_vec(), StringFormat::Literal),
                "Supplement" => 6i64,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => 1000i64,
        });

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "HeiseiKakuGo-W5",
            "Encoding" => "UniJIS-UCS2-H",
            "DescendantFonts" => vec![cid_font_id.into()],
        });

        let mut xobjects = lopdf::Dictionary::new();
        for (name, stream) in self.images {
            let image_id = doc.add_object(Object::Stream(stream));
            xobjects.set(name.into_bytes(), image_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
            "XObject" => xobjects,
        });

        let encoded = Content { operations: self.ops }
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, encoded)));

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0i64.into(),
                0i64.into(),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buffer)
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an image XObject stream plus pixel dimensions.
fn image_xobject(bytes: &[u8]) -> Result<(Stream, u32, u32), RenderError> {
    let img = image::load_from_memory(bytes).map_err(|e| RenderError::Image(e.to_string()))?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::Image("zero-sized image".to_string()));
    }

    // JPEG passes through untouched as a DCTDecode stream.
    if bytes.starts_with(&[0xFF, 0xD8]) {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "DCTDecode",
            },
            bytes.to_vec(),
        );
        return Ok((stream, width, height));
    }

    // Everything else: flatten alpha onto white, embed raw RGB.
    let rgba = img.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        for channel in [r, g, b] {
            let composed = (u32::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(composed as u8);
        }
    }

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
        },
        rgb,
    );
    Ok((stream, width, height))
}
