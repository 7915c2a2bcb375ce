//! Pagination / flow control.
//!
//! [`LayoutContext`] owns the vertical cursor for the page being filled and
//! is the only place that decides page breaks. Every draw helper reserves
//! its height with [`LayoutContext::ensure_space`] first, so a drawn element
//! never crosses `page_height - margin_bottom`. Text goes through
//! [`sanitize`] on the way in.

use crate::config::ReportConfig;
use crate::layout::surface::{Align, Color, Surface, TextStyle, PT_TO_MM};
use crate::pipeline::assets::ImageAsset;
use crate::pipeline::sanitize::sanitize;
use tracing::{debug, warn};

/// Indent of bullet text relative to the content's left edge.
const BULLET_INDENT: f32 = 5.0;

/// Vertical position on the current page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub y: f32,
    pub top: f32,
    /// Lowest y content may reach (`page_height - margin_bottom`).
    pub limit: f32,
}

impl PageCursor {
    pub fn new(top: f32, limit: f32) -> Self {
        Self { y: top, top, limit }
    }

    pub fn remaining(&self) -> f32 {
        (self.limit - self.y).max(0.0)
    }

    pub fn fits(&self, height: f32) -> bool {
        self.y + height <= self.limit + f32::EPSILON
    }

    /// Nothing has been placed on this page yet.
    pub fn at_top(&self) -> bool {
        self.y <= self.top + f32::EPSILON
    }
}

/// Heading level for [`LayoutContext::draw_heading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    fn font_size(self, body: f32) -> f32 {
        match self {
            HeadingLevel::H1 => body + 6.0,
            HeadingLevel::H2 => body + 3.0,
            HeadingLevel::H3 => body + 1.0,
        }
    }
}

/// Cursor plus surface: the state of one generation.
pub struct LayoutContext<'s> {
    surface: &'s mut dyn Surface,
    cursor: PageCursor,
    left: f32,
    width: f32,
    page_width: f32,
    page_height: f32,
    margin_bottom: f32,
    font_size: f32,
    line_height: f32,
    block_gap: f32,
    heading_space: f32,
    table_min_space: f32,
}

impl<'s> LayoutContext<'s> {
    pub fn new(surface: &'s mut dyn Surface, config: &ReportConfig) -> Self {
        let (page_width, page_height) = surface.page_size();
        Self {
            cursor: PageCursor::new(config.margin_top, page_height - config.margin_bottom),
            surface,
            left: config.margin_left,
            width: page_width - config.margin_left - config.margin_right,
            page_width,
            page_height,
            margin_bottom: config.margin_bottom,
            font_size: config.font_size,
            line_height: config.line_height,
            block_gap: config.block_gap,
            heading_space: config.heading_space,
            table_min_space: config.table_min_space,
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────────

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn content_width(&self) -> f32 {
        self.width
    }

    pub fn usable_height(&self) -> f32 {
        self.cursor.limit - self.cursor.top
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn table_min_space(&self) -> f32 {
        self.table_min_space
    }

    pub fn page_count(&self) -> usize {
        self.surface.page_count()
    }

    /// Break to a new page unless `height` fits below the cursor.
    ///
    /// Returns `true` when a page was added. A request taller than a whole
    /// page is clamped to the usable height, so this never loops.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        let needed = height.min(self.usable_height());
        if self.cursor.fits(needed) {
            return false;
        }
        self.new_page();
        true
    }

    /// Move the cursor down, never past the bottom limit.
    pub fn advance(&mut self, height: f32) {
        self.cursor.y = (self.cursor.y + height).min(self.cursor.limit);
    }

    /// Forced break between major sections. A page with nothing on it is reused.
    pub fn page_break(&mut self) {
        if !self.cursor.at_top() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.surface.add_page();
        self.cursor.y = self.cursor.top;
        debug!("Page break → page {}", self.surface.page_count());
    }

    pub fn gap(&mut self) {
        self.advance(self.block_gap);
    }

    // ── Text primitives ──────────────────────────────────────────────────

    /// Sanitise, then wrap to `max_width`.
    pub fn wrap(&self, text: &str, max_width: f32, style: &TextStyle) -> Vec<String> {
        self.surface.wrap_text(&sanitize(text), max_width, style)
    }

    pub fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        self.surface.text_width(text, style)
    }

    /// Draw one pre-wrapped line at an explicit position. No cursor change.
    pub fn draw_text_at(&mut self, text: &str, x: f32, baseline: f32, style: &TextStyle) {
        let clean = sanitize(text);
        if !clean.is_empty() {
            self.surface.draw_text(&clean, x, baseline, style);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.surface.fill_rect(x, y, w, h, color);
    }

    /// Baseline offset for a line box of `line_height` starting at the cursor.
    fn baseline(&self, size_pt: f32, box_height: f32) -> f32 {
        let cap = size_pt * PT_TO_MM * 0.72;
        self.cursor.y + (box_height + cap) / 2.0
    }

    /// Wrapped lines at `x`, one `ensure_space` per line.
    ///
    /// The first reservation covers the whole block (capped at a page) so a
    /// short paragraph moves to the next page intact instead of splitting.
    pub fn draw_lines(&mut self, lines: &[String], x: f32, style: &TextStyle, line_height: f32) {
        if lines.is_empty() {
            return;
        }
        self.ensure_space(lines.len() as f32 * line_height);
        for line in lines {
            self.ensure_space(line_height);
            let baseline = self.baseline(style.size, line_height);
            let anchor = match style.align {
                Align::Left => x,
                Align::Center => self.left + self.width / 2.0,
                Align::Right => self.left + self.width,
            };
            self.surface.draw_text(line, anchor, baseline, style);
            self.advance(line_height);
        }
    }

    // ── Blocks ───────────────────────────────────────────────────────────

    /// Heading with its reserved space; never left alone at a page bottom.
    pub fn draw_heading(&mut self, text: &str, level: HeadingLevel) {
        let size = level.font_size(self.font_size);
        let space = match level {
            HeadingLevel::H1 => self.heading_space,
            HeadingLevel::H2 => self.heading_space - 2.0,
            HeadingLevel::H3 => self.heading_space - 3.0,
        }
        .max(self.line_height);
        let style = TextStyle::bold(size).with_color(Color::BRAND);
        let lines = self.wrap(text, self.width, &style);
        if lines.is_empty() {
            return;
        }
        // Heading plus at least one body line must fit together.
        let line_h = (size * PT_TO_MM * 1.4).max(self.line_height);
        let body = (lines.len() as f32 - 1.0) * line_h;
        self.ensure_space(space + body + self.line_height);
        let pad = (space - line_h).max(0.0);
        self.advance(pad * 0.6);
        let x = self.left;
        self.draw_lines(&lines, x, &style, line_h);
        self.advance(pad * 0.4);
    }

    pub fn draw_paragraph(&mut self, text: &str) {
        let style = TextStyle::regular(self.font_size);
        self.draw_paragraph_styled(text, &style);
    }

    pub fn draw_paragraph_styled(&mut self, text: &str, style: &TextStyle) {
        let lines = self.wrap(text, self.width, style);
        if lines.is_empty() {
            return;
        }
        let x = self.left;
        let lh = self.line_height;
        self.draw_lines(&lines, x, style, lh);
        self.gap();
    }

    pub fn draw_bullet(&mut self, text: &str) {
        let style = TextStyle::regular(self.font_size);
        let text_x = self.left + BULLET_INDENT;
        let lines = self.wrap(text, self.width - BULLET_INDENT, &style);
        if lines.is_empty() {
            return;
        }
        let lh = self.line_height;
        self.ensure_space(lines.len() as f32 * lh);
        let baseline = self.baseline(style.size, lh);
        let marker_x = self.left + 1.0;
        self.surface.draw_text("-", marker_x, baseline, &style);
        self.draw_lines(&lines, text_x, &style, lh);
        self.gap();
    }

    /// Blank line: a half-line of space, nothing drawn.
    pub fn spacer(&mut self) {
        self.advance(self.line_height / 2.0);
    }

    /// Thin full-width rule under the cursor.
    pub fn rule(&mut self) {
        self.ensure_space(2.0);
        let (x, y, w) = (self.left, self.cursor.y + 0.5, self.width);
        self.surface.fill_rect(x, y, w, 0.4, Color::RULE);
        self.advance(2.0);
    }

    /// Image fitted into `max_w × max_h` mm, preserving aspect ratio.
    ///
    /// An embed failure is logged and skipped; the cursor still advances so
    /// the layout does not shift with asset availability.
    pub fn draw_image(
        &mut self,
        image: &ImageAsset,
        max_w: f32,
        max_h: f32,
        align: Align,
    ) -> Result<(), crate::error::AssetError> {
        let (w, h) = fit_mm(image.width, image.height, max_w, max_h);
        self.ensure_space(h);
        let x = match align {
            Align::Left => self.left,
            Align::Center => self.left + (self.width - w) / 2.0,
            Align::Right => self.left + self.width - w,
        };
        let y = self.cursor.y;
        let result = self.surface.embed_image(image, x, y, w, h);
        if let Err(ref e) = result {
            warn!("Image not embedded: {e}");
        }
        self.advance(h);
        result
    }

    // ── Footer ───────────────────────────────────────────────────────────

    /// Stamp every page with `stamp(page_number, total)` in the bottom margin.
    ///
    /// Must run after all content so `total` is final.
    pub fn stamp_footers<F>(&mut self, stamp: F)
    where
        F: Fn(usize, usize) -> String,
    {
        let total = self.surface.page_count();
        let last = self.surface.current_page();
        let style = TextStyle::regular(self.font_size - 2.0)
            .with_color(Color::MUTED)
            .with_align(Align::Center);
        let baseline = self.page_height - self.margin_bottom / 2.0;
        let x = self.page_width / 2.0;
        for index in 0..total {
            self.surface.set_page(index);
            let text = sanitize(&stamp(index + 1, total));
            self.surface.draw_text(&text, x, baseline, &style);
        }
        self.surface.set_page(last);
    }
}

/// Scale `(px_w, px_h)` to fit a `max_w × max_h` mm box.
///
/// Unknown pixel sizes fill the box.
pub fn fit_mm(px_w: u32, px_h: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    if px_w == 0 || px_h == 0 {
        return (max_w, max_h);
    }
    let scale = (max_w / px_w as f32).min(max_h / px_h as f32);
    (px_w as f32 * scale, px_h as f32 * scale)
}
