//! # condo-report
//!
//! Paginated report documents for condominium administration: maintenance
//! summaries and narrative income reports, rendered to PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ReportRequest
//!  │
//!  ├─ 1. Assets     fetch logo / signature (URL, data URI, file), shrink, JPEG
//!  ├─ 2. Aggregate  date-range filter, group by dimension and month (i64 cents)
//!  ├─ 3. Classify   narrative markdown-lite → headings, bullets, tables
//!  ├─ 4. Layout     cursor + ensure_space page breaks on a drawing surface
//!  └─ 5. Output     PDF bytes (or a JSON display list) + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use condo_report::{generate, ReportConfig, ReportRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request: ReportRequest = serde_json::from_str(&std::fs::read_to_string("input.json")?)?;
//!     let artifact = generate(&request, &ReportConfig::default()).await?;
//!     std::fs::write(&artifact.filename, &artifact.bytes)?;
//!     eprintln!("{} pages", artifact.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `condo-report` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! condo-report = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compose;
pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod labels;
pub mod layout;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compose::{compose_into, Composition, ResolvedAssets};
pub use config::{Locale, OutputFormat, PageSize, ReportConfig, ReportConfigBuilder};
pub use error::{AssetError, ReportError};
pub use generate::{
    compose, generate, generate_sync, generate_to_file, load_request, resolve_assets,
};
pub use layout::{DisplayList, RecordingSurface, Surface};
pub use model::{
    AdminContact, Appointment, Branding, Contract, CostRecord, DateRange, DomainRecords,
    KpiSnapshot, MaintenanceReport, ReportContent, ReportKind, ReportMeta, ReportRequest, Ticket,
};
pub use output::{GenerationStats, ReportArtifact, SectionSummary};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
