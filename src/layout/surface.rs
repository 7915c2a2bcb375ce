//! The drawing primitive the composer orchestrates.
//!
//! [`Surface`] is the seam between layout decisions and the actual page
//! format. Coordinates are millimetres from the **top-left** corner with `y`
//! growing downwards; text is placed by its baseline. Backends convert to
//! their own origin.
//!
//! Two implementations ship with the crate:
//! * [`crate::layout::pdf::PdfSurface`]: printpdf, built-in Helvetica
//! * [`RecordingSurface`]: an in-memory display list, serialisable as JSON

use crate::error::{AssetError, ReportError};
use crate::pipeline::assets::ImageAsset;
use serde::{Deserialize, Serialize};

/// Points → millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// An sRGB fill or text colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const MUTED: Color = Color::rgb(110, 110, 110);
    pub const BRAND: Color = Color::rgb(31, 78, 121);
    pub const STRIPE: Color = Color::rgb(242, 244, 247);
    pub const RULE: Color = Color::rgb(200, 205, 212);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font, size and colour for one text run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    pub align: Align,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self {
            size,
            bold: false,
            color: Color::BLACK,
            align: Align::Left,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            bold: true,
            ..Self::regular(size)
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// Page-level drawing operations.
///
/// A surface starts with exactly one page. `wrap_text` and `text_width`
/// have default implementations based on average Helvetica glyph widths;
/// a backend with real font metrics should override them.
pub trait Surface {
    /// Page (width, height) in millimetres.
    fn page_size(&self) -> (f32, f32);

    fn page_count(&self) -> usize;

    /// Zero-based index of the page draw calls go to.
    fn current_page(&self) -> usize;

    /// Append a page and make it current.
    fn add_page(&mut self);

    /// Make an existing page current (used for footer stamps).
    fn set_page(&mut self, index: usize);

    /// Draw one line of already-sanitised text with its baseline at `y`.
    /// `x` is the left edge, centre or right edge depending on `style.align`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    /// Fill a rectangle whose top-left corner is `(x, y)`.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    /// Place an image inside the `w × h` box whose top-left corner is `(x, y)`.
    fn embed_image(
        &mut self,
        image: &ImageAsset,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Result<(), AssetError>;

    /// Estimated rendered width in millimetres.
    fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        let em = if style.bold { 0.56 } else { 0.52 };
        text.chars().count() as f32 * style.size * em * PT_TO_MM
    }

    /// Greedy word wrap to `max_width`. Words longer than a line are split.
    fn wrap_text(&self, text: &str, max_width: f32, style: &TextStyle) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.text_width(&candidate, style) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            // Hard-split a word that alone overflows the line.
            let mut piece = String::new();
            for ch in word.chars() {
                piece.push(ch);
                if self.text_width(&piece, style) > max_width && piece.chars().count() > 1 {
                    let last = piece.pop().unwrap_or(ch);
                    lines.push(std::mem::take(&mut piece));
                    piece.push(last);
                }
            }
            current = piece;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

// ── Recording surface ────────────────────────────────────────────────────

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Image {
        mime: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        width_px: u32,
        height_px: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Text runs on this page, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Lowest point any operation reaches.
    pub fn max_y(&self) -> f32 {
        self.ops
            .iter()
            .map(|op| match op {
                DrawOp::Text { y, .. } => *y,
                DrawOp::Rect { y, h, .. } | DrawOp::Image { y, h, .. } => y + h,
            })
            .fold(0.0, f32::max)
    }
}

/// Serialisable display list: what the JSON output format contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<RecordedPage>,
}

/// A surface that records every call instead of rendering it.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pages: Vec<RecordedPage>,
    current: usize,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![RecordedPage::default()],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    /// Every text run in document order.
    pub fn all_text(&self) -> Vec<&str> {
        self.pages.iter().flat_map(|p| p.texts()).collect()
    }

    pub fn into_display_list(self) -> DisplayList {
        DisplayList {
            page_width: self.width,
            page_height: self.height,
            pages: self.pages,
        }
    }

    /// Pretty JSON of the display list.
    pub fn into_bytes(self) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec_pretty(&self.into_display_list()).map_err(|e| {
            ReportError::DocumentFailed {
                detail: format!("display list serialisation: {e}"),
            }
        })
    }

    fn push(&mut self, op: DrawOp) {
        self.pages[self.current].ops.push(op);
    }
}

impl Surface for RecordingSurface {
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
        self.pages.push(RecordedPage::default());
        self.current = self.pages.len() - 1;
    }

    fn set_page(&mut self, index: usize) {
        self.current = index.min(self.pages.len() - 1);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.push(DrawOp::Rect { x, y, w, h, color });
    }

    fn embed_image(
        &mut self,
        image: &ImageAsset,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Result<(), AssetError> {
        self.push(DrawOp::Image {
            mime: image.mime.clone(),
            x,
            y,
            w,
            h,
            width_px: image.width,
            height_px: image.height,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_page() {
        let s = RecordingSurface::new(210.0, 297.0);
        assert_eq!(s.page_count(), 1);
        assert_eq!(s.current_page(), 0);
    }

    #[test]
    fn set_page_routes_later_ops() {
        let mut s = RecordingSurface::new(210.0, 297.0);
        s.add_page();
        s.set_page(0);
        s.draw_text("pie", 105.0, 290.0, &TextStyle::regular(8.0));
        assert_eq!(s.pages()[0].texts().collect::<Vec<_>>(), vec!["pie"]);
        assert_eq!(s.pages()[1].ops.len(), 0);
    }

    #[test]
    fn wrap_respects_width() {
        let s = RecordingSurface::new(210.0, 297.0);
        let style = TextStyle::regular(10.0);
        let text = "el mantenimiento preventivo del ascensor se realizó sin novedades ".repeat(6);
        let lines = s.wrap_text(&text, 60.0, &style);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(s.text_width(line, &style) <= 60.0, "overflowing line: {line}");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let s = RecordingSurface::new(210.0, 297.0);
        let style = TextStyle::regular(10.0);
        let word = "x".repeat(200);
        let lines = s.wrap_text(&word, 40.0, &style);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        let s = RecordingSurface::new(210.0, 297.0);
        assert!(s.wrap_text("   ", 50.0, &TextStyle::regular(10.0)).is_empty());
    }

    #[test]
    fn display_list_serialises() {
        let mut s = RecordingSurface::new(210.0, 297.0);
        s.fill_rect(10.0, 10.0, 50.0, 5.0, Color::BRAND);
        let bytes = s.into_bytes().expect("json");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"op\": \"rect\""));
    }
}
