//! Document composer: drives one report through a [`LayoutContext`].
//!
//! ## Page Order
//!
//! ```text
//! header (logo, title, period) ─▶ KPI table ─▶ [narrative]
//!   ─▶ maintenance sections, one per page  |  income narrative
//!   ─▶ signature page ─▶ footer stamps on every page
//! ```
//!
//! Composition is single-pass and append-only: nothing is measured twice and
//! no page is revisited except for the footer stamps at the very end. Assets
//! are resolved before this module runs; an image the surface refuses to
//! embed is reported and skipped.

use crate::config::{Locale, ReportConfig};
use crate::error::{AssetError, ReportError};
use crate::format::{format_cents, format_date, format_raw_date, month_label, parse_date, truncate_chars};
use crate::labels::Labels;
use crate::layout::flow::{HeadingLevel, LayoutContext};
use crate::layout::surface::{Align, Color, Surface, TextStyle};
use crate::layout::table::{draw_table, TableSpec, TableStyle};
use crate::model::{
    Appointment, Contract, CostRecord, DateRange, DomainRecords, MaintenanceReport, ReportKind,
    ReportMeta, ReportRequest, Ticket,
};
use crate::output::SectionSummary;
use crate::pipeline::aggregate::{
    filter_by_date_range, group_by_dimension, group_by_month, with_total, AggregateRow,
};
use crate::pipeline::assets::ImageAsset;
use crate::pipeline::blocks::{classify, BlockKind};
use crate::pipeline::sanitize::to_plain_text;
use tracing::{debug, info, warn};

/// Image pixels per millimetre on the page.
const PX_PER_MM: f32 = 4.0;

/// Number of body sections in a maintenance report.
pub const MAINTENANCE_SECTIONS: usize = 5;

/// Logo and signature after fetching and preprocessing.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    pub logo: Option<ImageAsset>,
    pub signature: Option<ImageAsset>,
    /// Fetch failures, already logged.
    pub errors: Vec<AssetError>,
}

/// What [`compose_into`] produced on the surface.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    pub page_count: usize,
    pub sections: Vec<SectionSummary>,
    pub skipped_tables: usize,
    /// Images the surface refused to embed.
    pub embed_errors: Vec<AssetError>,
}

/// Lay out `request` on `surface`, footers included.
pub fn compose_into(
    request: &ReportRequest,
    assets: &ResolvedAssets,
    config: &ReportConfig,
    surface: &mut dyn Surface,
) -> Result<Composition, ReportError> {
    request.validate()?;
    let mut composer = Composer {
        ctx: LayoutContext::new(surface, config),
        config,
        labels: Labels::for_locale(config.locale),
        out: Composition::default(),
    };

    let sections = match request.kind {
        ReportKind::Maintenance => MAINTENANCE_SECTIONS,
        ReportKind::Income { .. } => 1,
    };
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(sections);
    }

    composer.draw_header(request, assets);
    composer.draw_kpis(&request.content.meta);

    let narrative = request
        .content
        .narrative
        .as_deref()
        .filter(|n| !n.trim().is_empty());
    match request.kind {
        ReportKind::Maintenance => {
            if let Some(text) = narrative {
                let title = composer.labels.analysis;
                composer.ctx.draw_heading(title, HeadingLevel::H2);
                composer.draw_narrative(text);
            }
            composer.draw_maintenance_sections(&request.records, &request.range);
        }
        ReportKind::Income { .. } => {
            let title = composer.labels.analysis;
            composer.section_started(title);
            composer.ctx.draw_heading(title, HeadingLevel::H2);
            match narrative {
                Some(text) => composer.draw_narrative(text),
                None => composer.placeholder(),
            }
            composer.section_finished(title, usize::from(narrative.is_some()), 0);
        }
    }

    composer.draw_signature(&request.content.meta, assets);

    let labels = composer.labels;
    composer
        .ctx
        .stamp_footers(|page, total| labels.page_stamp(page, total));

    composer.out.page_count = composer.ctx.page_count();
    info!(
        "Composed {} page(s), {} section(s)",
        composer.out.page_count,
        composer.out.sections.len()
    );
    Ok(composer.out)
}

struct Composer<'a, 's> {
    ctx: LayoutContext<'s>,
    config: &'a ReportConfig,
    labels: &'static Labels,
    out: Composition,
}

/// One summary table of a section.
struct Summary {
    title: &'static str,
    rows: Vec<AggregateRow>,
    money: bool,
    months: bool,
}

impl Summary {
    fn counts(title: &'static str, rows: Vec<AggregateRow>) -> Self {
        Self {
            title,
            rows,
            money: false,
            months: false,
        }
    }

    fn money(title: &'static str, rows: Vec<AggregateRow>) -> Self {
        Self {
            title,
            rows,
            money: true,
            months: false,
        }
    }

    fn by_month(mut self) -> Self {
        self.months = true;
        self
    }
}

/// Everything needed to draw one maintenance section.
struct SectionData {
    title: &'static str,
    records: usize,
    summaries: Vec<Summary>,
    head: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    /// Free-text column, pinned wider than the rest.
    text_column: usize,
}

impl<'a, 's> Composer<'a, 's> {
    fn locale(&self) -> Locale {
        self.config.locale
    }

    fn body_style(&self) -> TableStyle {
        TableStyle::for_body(self.config.font_size)
    }

    fn clip(&self, text: &str) -> String {
        truncate_chars(&to_plain_text(text), self.config.detail_text_budget)
    }

    fn date(&self, raw: &str) -> String {
        format_raw_date(raw, self.locale())
    }

    fn money(&self, cents: i64) -> String {
        format_cents(cents, self.locale())
    }

    // ── Events ───────────────────────────────────────────────────────────

    fn section_started(&self, name: &str) {
        debug!("Section start: {name}");
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_section_start(name);
        }
    }

    fn section_finished(&mut self, name: &str, records: usize, detail_rows: usize) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_section_complete(name, records);
        }
        self.out.sections.push(SectionSummary {
            name: name.to_string(),
            records,
            detail_rows,
        });
    }

    fn embed_failed(&mut self, what: &str, error: AssetError) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_asset_error(what, &error.to_string());
        }
        self.out.embed_errors.push(error);
    }

    // ── Blocks ───────────────────────────────────────────────────────────

    fn placeholder(&mut self) {
        let style = TextStyle::regular(self.config.font_size).with_color(Color::MUTED);
        self.ctx.draw_paragraph_styled(self.labels.no_records, &style);
    }

    /// Reserve `table_min_space`, draw, then leave a gap.
    fn table(&mut self, spec: &TableSpec) {
        let reserve = self.ctx.table_min_space();
        self.ctx.ensure_space(reserve);
        draw_table(&mut self.ctx, spec);
        self.ctx.gap();
    }

    fn draw_header(&mut self, request: &ReportRequest, assets: &ResolvedAssets) {
        if let Some(ref logo) = assets.logo {
            let (w, h) = self.config.logo_max;
            let (w, h) = (w as f32 / PX_PER_MM, h as f32 / PX_PER_MM);
            if let Err(e) = self.ctx.draw_image(logo, w, h, Align::Left) {
                self.embed_failed("logo", e);
            }
            self.ctx.gap();
        }

        let meta = &request.content.meta;
        let title = if meta.title.trim().is_empty() {
            match request.kind {
                ReportKind::Maintenance => self.labels.maintenance_title.to_string(),
                ReportKind::Income { year: Some(y) } => format!("{} {y}", self.labels.income_title),
                ReportKind::Income { year: None } => self.labels.income_title.to_string(),
            }
        } else {
            meta.title.clone()
        };
        self.ctx.draw_heading(&title, HeadingLevel::H1);

        let muted = TextStyle::regular(self.config.font_size).with_color(Color::MUTED);
        let period = format!("{}: {}", self.labels.period, self.period_text(request));
        self.ctx.draw_paragraph_styled(&period, &muted);
        let generated = format!(
            "{}: {} {}",
            self.labels.generated,
            format_date(meta.generated_at.date(), self.locale()),
            meta.generated_at.format("%H:%M")
        );
        self.ctx.draw_paragraph_styled(&generated, &muted);
        self.ctx.rule();
    }

    fn period_text(&self, request: &ReportRequest) -> String {
        let label = request.content.meta.period_label.trim();
        if !label.is_empty() {
            return label.to_string();
        }
        if let ReportKind::Income { year } = request.kind {
            return year.map_or_else(|| self.labels.all_periods.to_string(), |y| y.to_string());
        }
        let range = request.range;
        if range.is_unbounded() {
            return self.labels.all_periods.to_string();
        }
        let side = |d: Option<chrono::NaiveDate>| {
            d.map_or_else(|| "...".to_string(), |d| format_date(d, self.locale()))
        };
        format!("{} - {}", side(range.start), side(range.end))
    }

    fn draw_kpis(&mut self, meta: &ReportMeta) {
        let l = self.labels;
        let k = &meta.kpi;
        let rows = vec![
            vec![l.kpi_income.to_string(), self.money(k.income_cents)],
            vec![l.kpi_expenses.to_string(), self.money(k.expenses_cents)],
            vec![l.kpi_balance.to_string(), self.money(k.balance_cents)],
            vec![l.kpi_pending_fees.to_string(), self.money(k.pending_fees_cents)],
            vec![l.kpi_reserve.to_string(), self.money(k.reserve_fund_cents)],
            vec![l.kpi_units.to_string(), k.units_total.to_string()],
            vec![l.kpi_delinquent.to_string(), k.units_delinquent.to_string()],
            vec![l.kpi_open_tickets.to_string(), k.open_tickets.to_string()],
        ];
        self.ctx.draw_heading(l.kpi_title, HeadingLevel::H2);
        let spec = TableSpec::new(
            vec![l.indicator.to_string(), l.value.to_string()],
            rows,
            self.body_style(),
        )
        .pin(0, 90.0);
        self.table(&spec);
    }

    /// Markdown-lite narrative, block by block.
    fn draw_narrative(&mut self, text: &str) {
        for block in classify(text) {
            match block.kind {
                BlockKind::Heading1 => {
                    self.ctx.draw_heading(&to_plain_text(&block.raw), HeadingLevel::H1)
                }
                BlockKind::Heading2 => {
                    self.ctx.draw_heading(&to_plain_text(&block.raw), HeadingLevel::H2)
                }
                BlockKind::Heading3 => {
                    self.ctx.draw_heading(&to_plain_text(&block.raw), HeadingLevel::H3)
                }
                BlockKind::Bullet => self.ctx.draw_bullet(&to_plain_text(&block.raw)),
                BlockKind::Paragraph => self.ctx.draw_paragraph(&to_plain_text(&block.raw)),
                BlockKind::Spacer => self.ctx.spacer(),
                BlockKind::Table => match block.as_table() {
                    Some(table) if !table.is_empty() && table.column_count() > 0 => {
                        let spec = TableSpec::from_block(table, self.body_style());
                        self.table(&spec);
                    }
                    _ => {
                        warn!("Skipping malformed narrative table");
                        self.out.skipped_tables += 1;
                    }
                },
            }
        }
    }

    // ── Maintenance sections ─────────────────────────────────────────────

    fn draw_maintenance_sections(&mut self, records: &DomainRecords, range: &DateRange) {
        let sections = [
            self.reports_section(&records.reports, range),
            self.tickets_section(&records.tickets, range),
            self.appointments_section(&records.appointments, range),
            self.contracts_section(&records.contracts, range),
            self.costs_section(&records.costs, range),
        ];
        for section in sections {
            self.draw_section(section);
        }
    }

    fn draw_section(&mut self, section: SectionData) {
        self.section_started(section.title);
        self.ctx.page_break();
        self.ctx.draw_heading(section.title, HeadingLevel::H1);

        if section.records == 0 {
            self.placeholder();
            self.section_finished(section.title, 0, 0);
            return;
        }

        for summary in &section.summaries {
            self.ctx.draw_heading(summary.title, HeadingLevel::H3);
            let spec = self.summary_spec(summary);
            self.table(&spec);
        }

        let limit = self.config.detail_row_limit.unwrap_or(usize::MAX);
        let shown = section.rows.len().min(limit);
        let omitted = section.rows.len() - shown;
        let mut rows = section.rows;
        rows.truncate(shown);

        self.ctx.draw_heading(self.labels.detail, HeadingLevel::H3);
        let spec = TableSpec::new(
            section.head.iter().map(|h| h.to_string()).collect(),
            rows,
            self.body_style(),
        )
        .pin(section.text_column, 70.0);
        self.table(&spec);
        if omitted > 0 {
            let style = TextStyle::regular(self.config.font_size - 1.0).with_color(Color::MUTED);
            let note = self.labels.omitted(omitted);
            self.ctx.draw_paragraph_styled(&note, &style);
        }
        self.section_finished(section.title, section.records, shown);
    }

    fn summary_spec(&self, summary: &Summary) -> TableSpec {
        let l = self.labels;
        let mut head = vec![l.col_group.to_string(), l.col_count.to_string()];
        if summary.money {
            head.push(l.col_amount.to_string());
        }
        let body = summary
            .rows
            .iter()
            .map(|row| {
                let key = if row.is_total() {
                    l.total.to_string()
                } else if summary.months {
                    month_label(&row.group_key, self.locale())
                } else {
                    row.group_key.clone()
                };
                let mut cells = vec![key, row.count.to_string()];
                if summary.money {
                    cells.push(self.money(row.total_cents));
                }
                cells
            })
            .collect();
        let spec = TableSpec::new(head, body, self.body_style()).pin(0, 80.0);
        summary
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_total())
            .fold(spec, |spec, (i, _)| spec.emphasize(i))
    }

    fn reports_section(&self, records: &[MaintenanceReport], range: &DateRange) -> SectionData {
        let l = self.labels;
        let mut filtered = filter_by_date_range(records, range, |r| r.date.as_str());
        filtered.sort_by_key(|r| parse_date(&r.date));
        let summaries = vec![
            Summary::counts(
                l.by_status,
                group_by_dimension(&filtered, |r| r.status.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_category,
                group_by_dimension(&filtered, |r| r.category.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_month,
                with_total(group_by_month(&filtered, |r| r.date.as_str(), |_| 0)),
            )
            .by_month(),
        ];
        let rows = filtered
            .iter()
            .map(|r| {
                vec![
                    self.date(&r.date),
                    r.category.clone(),
                    r.status.clone(),
                    r.provider.clone().unwrap_or_default(),
                    self.clip(&r.description),
                ]
            })
            .collect();
        SectionData {
            title: l.reports,
            records: filtered.len(),
            summaries,
            head: vec![l.col_date, l.col_category, l.col_status, l.col_provider, l.col_description],
            rows,
            text_column: 4,
        }
    }

    fn tickets_section(&self, records: &[Ticket], range: &DateRange) -> SectionData {
        let l = self.labels;
        let mut filtered = filter_by_date_range(records, range, |t| t.created_at.as_str());
        filtered.sort_by_key(|t| parse_date(&t.created_at));
        let summaries = vec![
            Summary::counts(
                l.by_status,
                group_by_dimension(&filtered, |t| t.status.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_category,
                group_by_dimension(&filtered, |t| t.category.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_month,
                with_total(group_by_month(&filtered, |t| t.created_at.as_str(), |_| 0)),
            )
            .by_month(),
        ];
        let rows = filtered
            .iter()
            .map(|t| {
                vec![
                    self.date(&t.created_at),
                    self.clip(&t.title),
                    t.priority.clone(),
                    t.status.clone(),
                    self.clip(&t.description),
                ]
            })
            .collect();
        SectionData {
            title: l.tickets,
            records: filtered.len(),
            summaries,
            head: vec![l.col_date, l.col_title, l.col_priority, l.col_status, l.col_description],
            rows,
            text_column: 4,
        }
    }

    fn appointments_section(&self, records: &[Appointment], range: &DateRange) -> SectionData {
        let l = self.labels;
        let mut filtered = filter_by_date_range(records, range, |a| a.date.as_str());
        filtered.sort_by_key(|a| parse_date(&a.date));
        let summaries = vec![
            Summary::counts(
                l.by_status,
                group_by_dimension(&filtered, |a| a.status.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_provider,
                group_by_dimension(&filtered, |a| a.provider.as_str(), |_| 0, l.unspecified),
            ),
            Summary::counts(
                l.by_month,
                with_total(group_by_month(&filtered, |a| a.date.as_str(), |_| 0)),
            )
            .by_month(),
        ];
        let rows = filtered
            .iter()
            .map(|a| {
                vec![
                    self.date(&a.date),
                    a.provider.clone(),
                    a.status.clone(),
                    self.clip(&a.notes),
                ]
            })
            .collect();
        SectionData {
            title: l.appointments,
            records: filtered.len(),
            summaries,
            head: vec![l.col_date, l.col_provider, l.col_status, l.col_notes],
            rows,
            text_column: 3,
        }
    }

    fn contracts_section(&self, records: &[Contract], range: &DateRange) -> SectionData {
        let l = self.labels;
        let mut filtered = filter_by_date_range(records, range, |c| c.start_date.as_str());
        filtered.sort_by_key(|c| parse_date(&c.start_date));
        let summaries = vec![
            Summary::money(
                l.by_provider,
                group_by_dimension(&filtered, |c| c.provider.as_str(), |c| c.amount_cents, l.unspecified),
            ),
            Summary::money(
                l.by_status,
                group_by_dimension(&filtered, |c| c.status.as_str(), |c| c.amount_cents, l.unspecified),
            ),
            Summary::money(
                l.by_month,
                with_total(group_by_month(&filtered, |c| c.start_date.as_str(), |c| c.amount_cents)),
            )
            .by_month(),
        ];
        let rows = filtered
            .iter()
            .map(|c| {
                vec![
                    self.date(&c.start_date),
                    self.date(c.end_date.as_deref().unwrap_or("")),
                    c.provider.clone(),
                    c.status.clone(),
                    self.money(c.amount_cents),
                    self.clip(&c.description),
                ]
            })
            .collect();
        SectionData {
            title: l.contracts,
            records: filtered.len(),
            summaries,
            head: vec![
                l.col_start,
                l.col_end,
                l.col_provider,
                l.col_status,
                l.col_amount,
                l.col_description,
            ],
            rows,
            text_column: 5,
        }
    }

    fn costs_section(&self, records: &[CostRecord], range: &DateRange) -> SectionData {
        let l = self.labels;
        let mut filtered = filter_by_date_range(records, range, |c| c.date.as_str());
        filtered.sort_by_key(|c| parse_date(&c.date));
        let summaries = vec![
            Summary::money(
                l.by_category,
                group_by_dimension(&filtered, |c| c.category.as_str(), |c| c.amount_cents, l.unspecified),
            ),
            Summary::money(
                l.by_provider,
                group_by_dimension(
                    &filtered,
                    |c| c.provider.as_deref().unwrap_or(""),
                    |c| c.amount_cents,
                    l.unspecified,
                ),
            ),
            Summary::money(
                l.by_month,
                with_total(group_by_month(&filtered, |c| c.date.as_str(), |c| c.amount_cents)),
            )
            .by_month(),
        ];
        let rows = filtered
            .iter()
            .map(|c| {
                vec![
                    self.date(&c.date),
                    c.category.clone(),
                    c.provider.clone().unwrap_or_default(),
                    self.money(c.amount_cents),
                    self.clip(&c.description),
                ]
            })
            .collect();
        SectionData {
            title: l.costs,
            records: filtered.len(),
            summaries,
            head: vec![l.col_date, l.col_category, l.col_provider, l.col_amount, l.col_description],
            rows,
            text_column: 4,
        }
    }

    // ── Signature page ───────────────────────────────────────────────────

    fn draw_signature(&mut self, meta: &ReportMeta, assets: &ResolvedAssets) {
        self.ctx.page_break();
        self.ctx
            .draw_heading(self.labels.signature_title, HeadingLevel::H2);
        self.ctx.draw_paragraph(self.labels.signature_intro);

        if let Some(ref signature) = assets.signature {
            let (w, h) = self.config.signature_max;
            let (w, h) = (w as f32 / PX_PER_MM, h as f32 / PX_PER_MM);
            if let Err(e) = self.ctx.draw_image(signature, w, h, Align::Left) {
                self.embed_failed("signature", e);
            }
        }
        self.ctx.rule();

        let bold = TextStyle::bold(self.config.font_size);
        for (i, line) in meta.admin.lines().into_iter().enumerate() {
            if i == 0 {
                self.ctx.draw_paragraph_styled(line, &bold);
            } else {
                self.ctx.draw_paragraph(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::surface::RecordingSurface;
    use crate::model::{CostRecord, ReportContent};

    fn compose_recorded(request: &ReportRequest, config: &ReportConfig) -> (RecordingSurface, Composition) {
        let mut surface = RecordingSurface::new(210.0, 297.0);
        let out = compose_into(request, &ResolvedAssets::default(), config, &mut surface).unwrap();
        (surface, out)
    }

    fn cost(date: &str, category: &str, cents: i64) -> CostRecord {
        CostRecord {
            date: date.into(),
            category: category.into(),
            amount_cents: cents,
            description: "Compra de insumos".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_maintenance_report_has_placeholders_and_footers() {
        let config = ReportConfig::default();
        let (surface, out) = compose_recorded(&ReportRequest::default(), &config);

        assert_eq!(out.sections.len(), MAINTENANCE_SECTIONS);
        assert!(out.sections.iter().all(|s| s.records == 0));
        let text = surface.all_text();
        let placeholders = text
            .iter()
            .filter(|t| **t == "No hay registros en el periodo seleccionado.")
            .count();
        assert_eq!(placeholders, MAINTENANCE_SECTIONS);
        assert!(!text.contains(&"Detalle"));

        // header + 5 sections + signature
        assert_eq!(out.page_count, 7);
        let last = surface.pages().last().unwrap().texts().last().unwrap();
        assert_eq!(last, "Página 7 de 7");
    }

    #[test]
    fn costs_section_tables() {
        let config = ReportConfig::default();
        let request = ReportRequest {
            records: DomainRecords {
                costs: vec![
                    cost("2024-01-10", "Materiales", 40_000),
                    cost("2024-02-10", "Servicios", 60_000),
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        let (surface, out) = compose_recorded(&request, &config);
        let costs = out.sections.iter().find(|s| s.name == "Costos").unwrap();
        assert_eq!(costs.records, 2);
        assert_eq!(costs.detail_rows, 2);

        let text = surface.all_text();
        assert!(text.contains(&"Enero 2024"));
        assert!(text.contains(&"Febrero 2024"));
        assert!(text.contains(&"$1.000,00"));
        assert!(text.contains(&"Sin especificar"));
    }

    #[test]
    fn category_named_total_is_drawn_as_a_plain_row() {
        let config = ReportConfig::default();
        let request = ReportRequest {
            records: DomainRecords {
                costs: vec![cost("2024-01-10", "Total", 100), cost("2024-01-11", "Otros", 50)],
                ..Default::default()
            },
            ..Default::default()
        };
        let (surface, _) = compose_recorded(&request, &config);
        let totals: Vec<bool> = surface
            .pages()
            .iter()
            .flat_map(|p| &p.ops)
            .filter_map(|op| match op {
                crate::layout::surface::DrawOp::Text { text, style, .. } if text == "Total" => {
                    Some(style.bold)
                }
                _ => None,
            })
            .collect();
        // Category, provider and month tables each end with a bold total;
        // the category table also holds the real "Total" group plus its
        // detail-table cell, both regular.
        assert_eq!(totals.iter().filter(|b| **b).count(), 3);
        assert_eq!(totals.iter().filter(|b| !**b).count(), 2);
    }

    #[test]
    fn detail_row_limit_adds_note() {
        let config = ReportConfig::builder().detail_row_limit(3).build().unwrap();
        let request = ReportRequest {
            records: DomainRecords {
                costs: (1..=9)
                    .map(|d| cost(&format!("2024-01-0{d}"), "Materiales", 100))
                    .collect(),
                ..Default::default()
            },
            ..Default::default()
        };
        let (surface, out) = compose_recorded(&request, &config);
        let costs = out.sections.iter().find(|s| s.name == "Costos").unwrap();
        assert_eq!(costs.records, 9);
        assert_eq!(costs.detail_rows, 3);
        assert!(surface
            .all_text()
            .contains(&"6 registros adicionales no se muestran."));
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let config = ReportConfig::builder().detail_text_budget(20).build().unwrap();
        let mut long = cost("2024-01-10", "Materiales", 100);
        long.description = "palabra ".repeat(40);
        let request = ReportRequest {
            records: DomainRecords {
                costs: vec![long],
                ..Default::default()
            },
            ..Default::default()
        };
        let (surface, _) = compose_recorded(&request, &config);
        assert!(surface.all_text().iter().any(|t| t.ends_with("...")));
        assert!(!surface.all_text().iter().any(|t| t.matches("palabra").count() > 3));
    }

    #[test]
    fn income_narrative_blocks_are_drawn() {
        let config = ReportConfig::default();
        let request = ReportRequest {
            kind: ReportKind::Income { year: Some(2024) },
            content: ReportContent {
                narrative: Some(
                    "# Resumen\n\nLos **ingresos** crecieron.\n- Cuotas al día\n| Mes | Monto |\n|---|---|\n| Enero | $10 |"
                        .into(),
                ),
                ..Default::default()
            },
            ..Default::default()
        };
        let (surface, out) = compose_recorded(&request, &config);
        let text = surface.all_text();
        assert!(text.contains(&"Reporte de Ingresos 2024"));
        assert!(text.contains(&"Resumen"));
        assert!(text.contains(&"Los ingresos crecieron."));
        assert!(text.contains(&"Cuotas al día"));
        assert!(text.contains(&"Mes"));
        assert!(text.contains(&"Enero"));
        assert_eq!(out.skipped_tables, 0);
        assert_eq!(out.sections.len(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let request = ReportRequest {
            range: DateRange::new(
                chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            ),
            ..Default::default()
        };
        let mut surface = RecordingSurface::new(210.0, 297.0);
        let err = compose_into(
            &request,
            &ResolvedAssets::default(),
            &ReportConfig::default(),
            &mut surface,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::InvalidDateRange { .. }));
    }
}
