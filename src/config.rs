//! Configuration types for report generation.
//!
//! All layout and asset behaviour is controlled through [`ReportConfig`],
//! built via its [`ReportConfigBuilder`]. Geometry is in millimetres, font
//! sizes in points. The pagination constants (`heading_space`,
//! `table_min_space`, `block_gap`) are calibrated for A4 with the built-in
//! Helvetica metrics; recalibrate them when changing page size or fonts.

use crate::error::ReportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a report generation call.
///
/// # Example
/// ```rust
/// use condo_report::{ReportConfig, Locale, OutputFormat};
///
/// let config = ReportConfig::builder()
///     .locale(Locale::En)
///     .output_format(OutputFormat::Json)
///     .detail_text_budget(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Paper size. Default: A4.
    pub page_size: PageSize,

    /// Top margin; the cursor resets here after each page break. Default: 20 mm.
    pub margin_top: f32,

    /// Bottom margin; content never crosses `page_height - margin_bottom`. Default: 20 mm.
    pub margin_bottom: f32,

    /// Left margin. Default: 15 mm.
    pub margin_left: f32,

    /// Right margin. Default: 15 mm.
    pub margin_right: f32,

    /// Body font size in points. Default: 10.
    pub font_size: f32,

    /// Vertical advance per wrapped body line. Default: 5 mm.
    pub line_height: f32,

    /// Gap added after every drawn block. Default: 2 mm.
    pub block_gap: f32,

    /// Space reserved before a heading so it never sits alone at a page
    /// bottom. Default: 13 mm.
    pub heading_space: f32,

    /// Minimum free space before a table is started. Default: 28 mm.
    pub table_min_space: f32,

    /// Free-text characters kept per detail-table cell before an ellipsis. Default: 250.
    pub detail_text_budget: usize,

    /// Cap on detail rows per section. Default: `None` (all rows).
    pub detail_row_limit: Option<usize>,

    /// Logo bounding box in pixels before re-encoding. Default: 180×90.
    pub logo_max: (u32, u32),

    /// Signature bounding box in pixels before re-encoding. Default: 300×150.
    pub signature_max: (u32, u32),

    /// Lossy re-encode quality in `0.0..=1.0`. Default: 0.7.
    pub image_quality: f32,

    /// HTTP timeout for remote assets, in seconds. Default: 30.
    pub asset_timeout_secs: u64,

    /// Language for labels, month names and number formatting. Default: Spanish.
    pub locale: Locale,

    /// Artifact encoding. Default: PDF.
    pub output_format: OutputFormat,

    /// Optional per-section progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin_top: 20.0,
            margin_bottom: 20.0,
            margin_left: 15.0,
            margin_right: 15.0,
            font_size: 10.0,
            line_height: 5.0,
            block_gap: 2.0,
            heading_space: 13.0,
            table_min_space: 28.0,
            detail_text_budget: 250,
            detail_row_limit: None,
            logo_max: (180, 90),
            signature_max: (300, 150),
            image_quality: 0.7,
            asset_timeout_secs: 30,
            locale: Locale::default(),
            output_format: OutputFormat::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("page_size", &self.page_size)
            .field("margin_top", &self.margin_top)
            .field("margin_bottom", &self.margin_bottom)
            .field("margin_left", &self.margin_left)
            .field("margin_right", &self.margin_right)
            .field("font_size", &self.font_size)
            .field("line_height", &self.line_height)
            .field("detail_text_budget", &self.detail_text_budget)
            .field("image_quality", &self.image_quality)
            .field("locale", &self.locale)
            .field("output_format", &self.output_format)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Height available for content on one page.
    pub fn usable_height(&self) -> f32 {
        self.page_size.dimensions_mm().1 - self.margin_top - self.margin_bottom
    }

    /// Width available for content on one page.
    pub fn usable_width(&self) -> f32 {
        self.page_size.dimensions_mm().0 - self.margin_left - self.margin_right
    }

    /// JPEG quality on the encoder's 1–100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.image_quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set all four margins at once (top, right, bottom, left).
    pub fn margins(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.config.margin_top = top;
        self.config.margin_right = right;
        self.config.margin_bottom = bottom;
        self.config.margin_left = left;
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt.clamp(6.0, 24.0);
        self
    }

    pub fn line_height(mut self, mm: f32) -> Self {
        self.config.line_height = mm;
        self
    }

    pub fn block_gap(mut self, mm: f32) -> Self {
        self.config.block_gap = mm.max(0.0);
        self
    }

    pub fn heading_space(mut self, mm: f32) -> Self {
        self.config.heading_space = mm.max(0.0);
        self
    }

    pub fn table_min_space(mut self, mm: f32) -> Self {
        self.config.table_min_space = mm.max(0.0);
        self
    }

    pub fn detail_text_budget(mut self, chars: usize) -> Self {
        self.config.detail_text_budget = chars.max(10);
        self
    }

    pub fn detail_row_limit(mut self, rows: usize) -> Self {
        self.config.detail_row_limit = Some(rows.max(1));
        self
    }

    pub fn logo_max(mut self, width: u32, height: u32) -> Self {
        self.config.logo_max = (width.max(1), height.max(1));
        self
    }

    pub fn signature_max(mut self, width: u32, height: u32) -> Self {
        self.config.signature_max = (width.max(1), height.max(1));
        self
    }

    pub fn image_quality(mut self, q: f32) -> Self {
        self.config.image_quality = q.clamp(0.01, 1.0);
        self
    }

    pub fn asset_timeout_secs(mut self, secs: u64) -> Self {
        self.config.asset_timeout_secs = secs;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        let (width, _) = c.page_size.dimensions_mm();
        if c.margin_top < 0.0 || c.margin_bottom < 0.0 || c.margin_left < 0.0 || c.margin_right < 0.0
        {
            return Err(ReportError::InvalidConfig("Margins must be ≥ 0".into()));
        }
        if c.usable_width() < 50.0 || width <= 0.0 {
            return Err(ReportError::InvalidConfig(format!(
                "Horizontal margins leave only {:.1} mm of content width",
                c.usable_width()
            )));
        }
        if c.line_height <= 0.0 {
            return Err(ReportError::InvalidConfig(
                "Line height must be > 0".into(),
            ));
        }
        // A heading or table reservation larger than a page would break forever.
        let usable = c.usable_height();
        if usable < c.table_min_space.max(c.heading_space) + c.line_height {
            return Err(ReportError::InvalidConfig(format!(
                "Vertical margins leave only {:.1} mm per page",
                usable
            )));
        }
        if c.asset_timeout_secs == 0 {
            return Err(ReportError::InvalidConfig(
                "Asset timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Page size options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// A4 paper size (210 x 297 mm)
    #[default]
    A4,
    /// US Letter size (8.5 x 11 inches)
    Letter,
}

impl PageSize {
    /// Page dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

/// How the finished artifact is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Printable PDF.
    #[default]
    Pdf,
    /// The recorded display list as JSON: pages of draw operations.
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = ReportConfig::builder().build().expect("default config builds");
        assert_eq!(c.jpeg_quality(), 70);
        assert_eq!(c.signature_max, (300, 150));
        assert!((c.usable_height() - 257.0).abs() < f32::EPSILON);
    }

    #[test]
    fn huge_margins_are_rejected() {
        let err = ReportConfig::builder()
            .margins(140.0, 15.0, 140.0, 15.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("per page"), "got: {err}");
    }

    #[test]
    fn quality_is_clamped() {
        let c = ReportConfig::builder().image_quality(3.0).build().unwrap();
        assert_eq!(c.jpeg_quality(), 100);
    }

    #[test]
    fn extension_follows_format() {
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
