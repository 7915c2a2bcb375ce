//! Styled table drawing with page continuation.
//!
//! Column widths: pinned columns get their fixed width, the rest share what
//! is left equally. A row that does not fit starts a new page and the header
//! is repeated there. Cells wrap inside their column; a row is never split.

use crate::layout::flow::LayoutContext;
use crate::layout::surface::{Color, TextStyle, PT_TO_MM};
use crate::pipeline::table::TableBlock;

/// Narrowest width a free column may shrink to.
const MIN_COLUMN: f32 = 8.0;

/// Colours and metrics for one table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub padding: f32,
    pub header_fill: Color,
    pub header_text: Color,
    pub stripe: Option<Color>,
}

impl TableStyle {
    pub fn for_body(body_font: f32) -> Self {
        Self {
            font_size: body_font - 1.0,
            padding: 1.5,
            header_fill: Color::BRAND,
            header_text: Color::WHITE,
            stripe: Some(Color::STRIPE),
        }
    }

    fn line_height(&self) -> f32 {
        self.font_size * PT_TO_MM * 1.3
    }
}

/// Everything [`draw_table`] needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    /// Fixed widths in mm by column index; `None` shares the remainder.
    pub pinned: Vec<Option<f32>>,
    /// Body row indices drawn in bold.
    pub emphasized: Vec<usize>,
    pub style: TableStyle,
}

impl TableSpec {
    pub fn new(head: Vec<String>, body: Vec<Vec<String>>, style: TableStyle) -> Self {
        Self {
            head,
            body,
            pinned: Vec::new(),
            emphasized: Vec::new(),
            style,
        }
    }

    pub fn from_block(block: TableBlock, style: TableStyle) -> Self {
        Self::new(block.head, block.body, style)
    }

    pub fn pin(mut self, column: usize, width: f32) -> Self {
        if self.pinned.len() <= column {
            self.pinned.resize(column + 1, None);
        }
        self.pinned[column] = Some(width);
        self
    }

    pub fn emphasize(mut self, row: usize) -> Self {
        self.emphasized.push(row);
        self
    }

    pub fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.head.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Resolve column widths so they add up to `total`.
///
/// Pinned widths that leave less than [`MIN_COLUMN`] per free column are
/// scaled down proportionally.
pub fn column_widths(total: f32, columns: usize, pinned: &[Option<f32>]) -> Vec<f32> {
    if columns == 0 {
        return Vec::new();
    }
    let pins: Vec<Option<f32>> = (0..columns)
        .map(|i| pinned.get(i).copied().flatten().map(|w| w.max(0.0)))
        .collect();
    let free = pins.iter().filter(|p| p.is_none()).count();
    let pinned_sum: f32 = pins.iter().flatten().sum();
    let reserve = free as f32 * MIN_COLUMN;

    let scale = if pinned_sum > 0.0 && pinned_sum + reserve > total {
        ((total - reserve).max(0.0)) / pinned_sum
    } else {
        1.0
    };
    let used = pinned_sum * scale;
    let share = if free > 0 {
        (total - used) / free as f32
    } else {
        0.0
    };

    let mut widths: Vec<f32> = pins
        .iter()
        .map(|p| p.map_or(share, |w| w * scale))
        .collect();
    // All pinned: stretch the last column to close the gap.
    if free == 0 {
        let sum: f32 = widths.iter().sum();
        if let Some(last) = widths.last_mut() {
            *last += total - sum;
        }
    }
    widths
}

/// Draw `spec` at the cursor and return the y below it.
///
/// The caller reserves `table_min_space` first; this function only keeps the
/// header attached to the first row and repeats it after page breaks.
pub fn draw_table(ctx: &mut LayoutContext<'_>, spec: &TableSpec) -> f32 {
    let columns = spec.column_count();
    if columns == 0 {
        return ctx.y();
    }
    let style = spec.style;
    let widths = column_widths(ctx.content_width(), columns, &spec.pinned);
    let line_h = style.line_height();

    let head_style = TextStyle::bold(style.font_size).with_color(style.header_text);
    let head_cells = wrap_row(ctx, &spec.head, &widths, &head_style, style.padding);
    let head_h = row_height(&head_cells, line_h, style.padding);

    // Rows never exceed what a fresh page offers under the header.
    let max_row = (ctx.usable_height() - head_h).max(line_h + 2.0 * style.padding);

    let rows: Vec<(Vec<Vec<String>>, bool)> = spec
        .body
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let bold = spec.emphasized.contains(&i);
            let text_style = if bold {
                TextStyle::bold(style.font_size)
            } else {
                TextStyle::regular(style.font_size)
            };
            let mut cells = wrap_row(ctx, row, &widths, &text_style, style.padding);
            cap_lines(&mut cells, max_row, line_h, style.padding);
            (cells, bold)
        })
        .collect();

    let first_h = rows
        .first()
        .map_or(0.0, |(cells, _)| row_height(cells, line_h, style.padding));
    ctx.ensure_space(head_h + first_h);
    draw_header(ctx, &head_cells, &widths, head_h, &style);

    for (index, (cells, bold)) in rows.iter().enumerate() {
        let h = row_height(cells, line_h, style.padding);
        if ctx.ensure_space(h) {
            draw_header(ctx, &head_cells, &widths, head_h, &style);
        }
        let y = ctx.y();
        if let (Some(stripe), true) = (style.stripe, index % 2 == 1) {
            let (x, w) = (ctx.left(), ctx.content_width());
            ctx.fill_rect(x, y, w, h, stripe);
        }
        let text_style = if *bold {
            TextStyle::bold(style.font_size)
        } else {
            TextStyle::regular(style.font_size)
        };
        draw_cells(ctx, cells, &widths, y, line_h, &style, &text_style);
        ctx.advance(h);
    }
    ctx.y()
}

fn draw_header(
    ctx: &mut LayoutContext<'_>,
    cells: &[Vec<String>],
    widths: &[f32],
    height: f32,
    style: &TableStyle,
) {
    ctx.ensure_space(height);
    let (x, y, w) = (ctx.left(), ctx.y(), ctx.content_width());
    ctx.fill_rect(x, y, w, height, style.header_fill);
    let text_style = TextStyle::bold(style.font_size).with_color(style.header_text);
    draw_cells(ctx, cells, widths, y, style.line_height(), style, &text_style);
    ctx.advance(height);
}

fn draw_cells(
    ctx: &mut LayoutContext<'_>,
    cells: &[Vec<String>],
    widths: &[f32],
    top: f32,
    line_h: f32,
    style: &TableStyle,
    text_style: &TextStyle,
) {
    let ascent = style.font_size * PT_TO_MM * 0.8;
    let mut x = ctx.left();
    for (lines, width) in cells.iter().zip(widths) {
        for (i, line) in lines.iter().enumerate() {
            let baseline = top + style.padding + ascent + i as f32 * line_h;
            ctx.draw_text_at(line, x + style.padding, baseline, text_style);
        }
        x += width;
    }
}

fn wrap_row(
    ctx: &LayoutContext<'_>,
    row: &[String],
    widths: &[f32],
    style: &TextStyle,
    padding: f32,
) -> Vec<Vec<String>> {
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let text = row.get(i).map(String::as_str).unwrap_or("");
            ctx.wrap(text, (width - 2.0 * padding).max(1.0), style)
        })
        .collect()
}

fn row_height(cells: &[Vec<String>], line_h: f32, padding: f32) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    lines as f32 * line_h + 2.0 * padding
}

fn cap_lines(cells: &mut [Vec<String>], max_h: f32, line_h: f32, padding: f32) {
    let max_lines = (((max_h - 2.0 * padding) / line_h).floor() as usize).max(1);
    for lines in cells.iter_mut() {
        if lines.len() > max_lines {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                last.push_str("...");
            }
        }
    }
}
