//! Report inputs: domain records, narrative content and request metadata.
//!
//! Everything here arrives already fetched from the data-access layer. The
//! engine only reads these values; it never mutates a record. Money fields
//! are integer cents (`i64`) so no floating-point value ever enters an
//! aggregation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Domain records ───────────────────────────────────────────────────────

/// A maintenance report filed for a building area or installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceReport {
    pub id: String,
    pub date: String,
    pub category: String,
    pub status: String,
    pub provider: Option<String>,
    pub description: String,
}

/// A resident ticket (complaint, request, incident).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub description: String,
}

/// A scheduled visit from a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    pub id: String,
    pub date: String,
    pub provider: String,
    pub status: String,
    pub notes: String,
}

/// A service contract. Filtered by `start_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contract {
    pub id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub provider: String,
    pub status: String,
    pub amount_cents: i64,
    pub description: String,
}

/// A single cost entry. `amount_cents` is always integer minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRecord {
    pub id: String,
    pub date: String,
    pub category: String,
    pub provider: Option<String>,
    pub amount_cents: i64,
    pub description: String,
}

/// All domain collections a maintenance report draws from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRecords {
    pub reports: Vec<MaintenanceReport>,
    pub tickets: Vec<Ticket>,
    pub appointments: Vec<Appointment>,
    pub contracts: Vec<Contract>,
    pub costs: Vec<CostRecord>,
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// Administrator contact block printed on the signature page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminContact {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

impl AdminContact {
    /// Non-empty fields in display order.
    pub fn lines(&self) -> Vec<&str> {
        [
            self.name.as_str(),
            self.role.as_str(),
            self.company.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect()
    }
}

/// Canonical headline figures computed upstream. Never recomputed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiSnapshot {
    pub income_cents: i64,
    pub expenses_cents: i64,
    pub balance_cents: i64,
    pub pending_fees_cents: i64,
    pub reserve_fund_cents: i64,
    pub units_total: u32,
    pub units_delinquent: u32,
    pub open_tickets: u32,
}

/// Document metadata: title, period, timestamp, contact and KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMeta {
    pub title: String,
    pub period_label: String,
    pub generated_at: NaiveDateTime,
    pub admin: AdminContact,
    pub kpi: KpiSnapshot,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            period_label: String::new(),
            generated_at: chrono::Local::now().naive_local(),
            admin: AdminContact::default(),
            kpi: KpiSnapshot::default(),
        }
    }
}

/// Narrative text (markdown-lite) plus metadata for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportContent {
    pub narrative: Option<String>,
    pub meta: ReportMeta,
}

/// Logo and signature sources: `http(s)://` URL, `data:` URI or file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub logo: Option<String>,
    pub signature: Option<String>,
}

// ── Request ──────────────────────────────────────────────────────────────

/// Inclusive date filter. An open end matches everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range spanning one calendar year.
    pub fn year(year: i32) -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1),
            end: NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Which document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportKind {
    /// Per-section summaries of every domain collection.
    #[default]
    Maintenance,
    /// Narrative income analysis for one year, or every year when `None`.
    Income { year: Option<i32> },
}

/// One generation request. Built fresh per call and discarded afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub content: ReportContent,
    pub records: DomainRecords,
    pub range: DateRange,
    pub branding: Branding,
}

impl ReportRequest {
    /// Deterministic artifact name, without extension.
    pub fn file_stem(&self) -> String {
        match self.kind {
            ReportKind::Maintenance => format!(
                "reporte_mantenimiento_{}",
                self.content.meta.generated_at.format("%Y%m%d_%H%M%S")
            ),
            ReportKind::Income { year: Some(y) } => format!("reporte-ia-ingresos-{y}"),
            ReportKind::Income { year: None } => "reporte-ia-ingresos-all-years".to_string(),
        }
    }

    /// Reject requests whose date range is inverted.
    pub fn validate(&self) -> Result<(), crate::error::ReportError> {
        if let (Some(start), Some(end)) = (self.range.start, self.range.end) {
            if start > end {
                return Err(crate::error::ReportError::InvalidDateRange { start, end });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn maintenance_file_stem_uses_timestamp() {
        let mut req = ReportRequest::default();
        req.content.meta.generated_at = at(2024, 3, 9, 14, 5, 7);
        assert_eq!(req.file_stem(), "reporte_mantenimiento_20240309_140507");
    }

    #[test]
    fn income_file_stem() {
        let mut req = ReportRequest {
            kind: ReportKind::Income { year: Some(2023) },
            ..Default::default()
        };
        assert_eq!(req.file_stem(), "reporte-ia-ingresos-2023");
        req.kind = ReportKind::Income { year: None };
        assert_eq!(req.file_stem(), "reporte-ia-ingresos-all-years");
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = DateRange::year(2024);
        assert!(r.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(r.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!r.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(DateRange::default().contains(NaiveDate::from_ymd_opt(1999, 6, 1).unwrap()));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let req = ReportRequest {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 6, 1),
                NaiveDate::from_ymd_opt(2024, 1, 1),
            ),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_deserialises_with_defaults() {
        let json = r#"{
            "kind": {"type": "income", "year": 2024},
            "records": {"costs": [{"date": "2024-02-01", "category": "Servicios", "amount_cents": 1200}]}
        }"#;
        let req: ReportRequest = serde_json::from_str(json).expect("parse");
        assert_eq!(req.kind, ReportKind::Income { year: Some(2024) });
        assert_eq!(req.records.costs.len(), 1);
        assert_eq!(req.records.costs[0].amount_cents, 1200);
        assert!(req.records.tickets.is_empty());
    }

    #[test]
    fn admin_lines_skip_blank_fields() {
        let admin = AdminContact {
            name: "Laura Gómez".into(),
            email: "admin@edificio.test".into(),
            ..Default::default()
        };
        assert_eq!(admin.lines(), vec!["Laura Gómez", "admin@edificio.test"]);
    }
}
