//! printpdf-backed [`Surface`].
//!
//! printpdf measures from the bottom-left corner; every call here flips `y`
//! against the page height. Text uses the built-in Helvetica pair, which is
//! why the sanitiser restricts strings to Latin-1.

use crate::config::PageSize;
use crate::error::{AssetError, ReportError};
use crate::layout::surface::{Align, Color, Surface, TextStyle};
use crate::pipeline::assets::ImageAsset;
use base64::Engine as _;
use printpdf::{
    BuiltinFont, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex,
};
use std::io::BufWriter;
use tracing::debug;

/// Resolution assumed when converting image pixels to millimetres.
const IMAGE_DPI: f32 = 300.0;

pub struct PdfSurface {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    width: f32,
    height: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PdfSurface {
    pub fn new(title: &str, page_size: PageSize) -> Result<Self, ReportError> {
        let (width, height) = page_size.dimensions_mm();
        let (doc, page, layer) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::DocumentFailed {
                detail: format!("Helvetica: {e}"),
            })?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::DocumentFailed {
                detail: format!("Helvetica-Bold: {e}"),
            })?;
        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            current: 0,
            width,
            height,
            regular,
            bold,
        })
    }

    /// Serialise the finished document.
    pub fn into_bytes(self) -> Result<Vec<u8>, ReportError> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| ReportError::DocumentFailed {
                detail: format!("PDF save: {e}"),
            })?;
        writer.into_inner().map_err(|e| ReportError::DocumentFailed {
            detail: format!("PDF buffer: {e}"),
        })
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.doc.get_page(page).get_layer(layer)
    }

    fn pdf_color(color: Color) -> printpdf::Color {
        printpdf::Color::Rgb(printpdf::Rgb::new(
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0,
            None,
        ))
    }
}

impl Surface for PdfSurface {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.width), Mm(self.height), "Layer 1");
        self.pages.push((page, layer));
        self.current = self.pages.len() - 1;
    }

    fn set_page(&mut self, index: usize) {
        self.current = index.min(self.pages.len() - 1);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let x = match style.align {
            Align::Left => x,
            Align::Center => x - self.text_width(text, style) / 2.0,
            Align::Right => x - self.text_width(text, style),
        };
        let font = if style.bold { &self.bold } else { &self.regular };
        let layer = self.layer();
        layer.set_fill_color(Self::pdf_color(style.color));
        layer.use_text(text, style.size, Mm(x), Mm(self.height - y), font);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let layer = self.layer();
        layer.set_fill_color(Self::pdf_color(color));
        let rect = printpdf::Rect::new(
            Mm(x),
            Mm(self.height - y - h),
            Mm(x + w),
            Mm(self.height - y),
        );
        layer.add_rect(rect);
    }

    fn embed_image(
        &mut self,
        image: &ImageAsset,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Result<(), AssetError> {
        let embed_err = |detail: String| AssetError::EmbedFailed {
            label: image.mime.clone(),
            detail,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image.base64)
            .map_err(|e| embed_err(format!("base64: {e}")))?;
        let decoded = printpdf::image_crate::load_from_memory(&bytes)
            .map_err(|e| embed_err(format!("decode: {e}")))?;
        let (px_w, px_h) = (decoded.width().max(1), decoded.height().max(1));
        let natural_w = px_w as f32 * 25.4 / IMAGE_DPI;
        let natural_h = px_h as f32 * 25.4 / IMAGE_DPI;

        let pdf_image = printpdf::Image::from_dynamic_image(&decoded);
        pdf_image.add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(self.height - y - h)),
                scale_x: Some(w / natural_w),
                scale_y: Some(h / natural_h),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        debug!("Embedded {}×{} px image at ({x:.1}, {y:.1}) mm", px_w, px_h);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_pdf_bytes() {
        let mut s = PdfSurface::new("prueba", PageSize::A4).unwrap();
        s.draw_text("Año 2024", 15.0, 30.0, &TextStyle::bold(12.0));
        s.fill_rect(15.0, 40.0, 180.0, 8.0, Color::BRAND);
        s.add_page();
        assert_eq!(s.page_count(), 2);
        let bytes = s.into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn undecodable_image_is_an_embed_error() {
        let mut s = PdfSurface::new("prueba", PageSize::A4).unwrap();
        let asset = ImageAsset {
            base64: base64::engine::general_purpose::STANDARD.encode(b"not an image"),
            width: 10,
            height: 10,
            mime: "application/octet-stream".into(),
            optimized: false,
        };
        let err = s.embed_image(&asset, 0.0, 0.0, 10.0, 10.0).unwrap_err();
        assert!(matches!(err, AssetError::EmbedFailed { .. }));
    }
}
