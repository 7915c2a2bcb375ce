//! CLI binary for condo-report.
//!
//! A thin shim over the library crate: reads a JSON `ReportRequest`,
//! applies flag overrides, maps flags to `ReportConfig` and writes the
//! artifact.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use condo_report::{
    generate_to_file, load_request, GenerationProgressCallback, Locale, OutputFormat, PageSize,
    ProgressCallback, ReportConfig, ReportKind, ReportRequest,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while images are fetched, then a bar over
/// the report sections with one log line per finished section.
struct CliProgressCallback {
    bar: ProgressBar,
    asset_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading images…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            asset_errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} sections  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Composing");
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, sections: usize) {
        self.activate_bar(sections);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Composing report with {sections} sections…"))
        ));
    }

    fn on_section_start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_section_complete(&self, name: &str, records: usize) {
        self.bar.println(format!(
            "  {} {:<24}  {}",
            green("✓"),
            name,
            dim(&format!("{records:>4} records")),
        ));
        self.bar.inc(1);
    }

    fn on_asset_error(&self, source: &str, error: &str) {
        self.asset_errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            source,
            red(&msg)
        ));
    }

    fn on_generation_complete(&self, pages: usize) {
        self.bar.finish_and_clear();
        let failed = self.asset_errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!("{} {} pages laid out", green("✔"), bold(&pages.to_string()));
        } else {
            eprintln!(
                "{} {} pages laid out  ({} images omitted)",
                cyan("⚠"),
                bold(&pages.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Maintenance report into the current directory
  condo-report data.json

  # Only the first quarter, written to a fixed path
  condo-report data.json --from 2024-01-01 --to 2024-03-31 -o q1.pdf

  # Income analysis for one year with a narrative file
  condo-report data.json --kind income --year 2024 --narrative analisis.md

  # Inspect the layout as a JSON display list
  condo-report data.json --format json -o layout.json

INPUT:
  A JSON ReportRequest: { "kind": {"type": "maintenance"}, "content": {...},
  "records": {"reports": [], "tickets": [], "appointments": [],
  "contracts": [], "costs": []}, "range": {...}, "branding": {...} }.
  Every field is optional. Money is integer cents.

ENVIRONMENT VARIABLES:
  CONDO_REPORT_OUTPUT        Output file or directory
  CONDO_REPORT_LOCALE        es | en
  CONDO_REPORT_PAGE_SIZE     a4 | letter
  CONDO_REPORT_LOGO          Logo source (URL, data URI or path)
  CONDO_REPORT_SIGNATURE     Signature source
  RUST_LOG                   Overrides the log filter
"#;

/// Generate paginated condominium reports.
#[derive(Parser, Debug)]
#[command(
    name = "condo-report",
    version,
    about = "Generate paginated maintenance and income reports as PDF",
    long_about = "Generate paginated condominium administration reports from a JSON request: \
per-section maintenance summaries with exact-cents totals, or a narrative income analysis \
written in a markdown-lite dialect, with logo, signature page and page footers.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON file holding a ReportRequest.
    input: PathBuf,

    /// Output file, or a directory to receive the generated filename.
    #[arg(short, long, env = "CONDO_REPORT_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Override the report kind from the input file.
    #[arg(long, env = "CONDO_REPORT_KIND", value_enum)]
    kind: Option<KindArg>,

    /// Year for an income report (implies --kind income).
    #[arg(long, env = "CONDO_REPORT_YEAR")]
    year: Option<i32>,

    /// Inclusive range start (YYYY-MM-DD).
    #[arg(long, env = "CONDO_REPORT_FROM")]
    from: Option<NaiveDate>,

    /// Inclusive range end (YYYY-MM-DD).
    #[arg(long, env = "CONDO_REPORT_TO")]
    to: Option<NaiveDate>,

    /// Markdown-lite narrative file; replaces the input's narrative.
    #[arg(long, env = "CONDO_REPORT_NARRATIVE")]
    narrative: Option<PathBuf>,

    /// Logo source: URL, data URI or file path.
    #[arg(long, env = "CONDO_REPORT_LOGO")]
    logo: Option<String>,

    /// Signature source: URL, data URI or file path.
    #[arg(long, env = "CONDO_REPORT_SIGNATURE")]
    signature: Option<String>,

    /// Artifact encoding.
    #[arg(long, env = "CONDO_REPORT_FORMAT", value_enum, default_value = "pdf")]
    format: FormatArg,

    /// Label language.
    #[arg(long, env = "CONDO_REPORT_LOCALE", value_enum, default_value = "es")]
    locale: LocaleArg,

    /// Paper size.
    #[arg(long, env = "CONDO_REPORT_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Maximum detail rows per section.
    #[arg(long, env = "CONDO_REPORT_DETAIL_LIMIT")]
    detail_limit: Option<usize>,

    /// Image fetch timeout in seconds.
    #[arg(long, env = "CONDO_REPORT_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Print the artifact stats as JSON on stdout.
    #[arg(long, env = "CONDO_REPORT_STATS_JSON")]
    stats_json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CONDO_REPORT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CONDO_REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CONDO_REPORT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Maintenance,
    Income,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LocaleArg {
    Es,
    En,
}

impl From<LocaleArg> for Locale {
    fn from(v: LocaleArg) -> Self {
        match v {
            LocaleArg::Es => Locale::Es,
            LocaleArg::En => Locale::En,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.stats_json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load request ─────────────────────────────────────────────────────
    let mut request = load_request(&cli.input)
        .await
        .context("Failed to load report data")?;
    apply_overrides(&cli, &mut request).await?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Generate ─────────────────────────────────────────────────────────
    let artifact = generate_to_file(&request, &cli.output, &config)
        .await
        .context("Report generation failed")?;

    if cli.stats_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&artifact).context("Failed to serialise stats")?
        );
    }

    if !cli.quiet {
        let stats = &artifact.stats;
        let written = condo_report::generate::output_path_for(&cli.output, &artifact.filename);
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            if stats.asset_errors.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            },
            artifact.page_count,
            stats.total_duration_ms,
            bold(&written.display().to_string()),
        );
        eprintln!(
            "   {} records in {} sections  /  {} empty",
            dim(&stats.total_records().to_string()),
            dim(&stats.sections.len().to_string()),
            dim(&stats.empty_sections().count().to_string()),
        );
        if stats.skipped_tables > 0 {
            eprintln!(
                "   {} malformed narrative tables skipped",
                cyan(&stats.skipped_tables.to_string())
            );
        }
        if !show_progress {
            for e in &stats.asset_errors {
                eprintln!("   {} {}", red("✗"), e);
            }
        }
    }

    Ok(())
}

/// Apply flags that change what is reported rather than how.
async fn apply_overrides(cli: &Cli, request: &mut ReportRequest) -> Result<()> {
    match (cli.kind, cli.year) {
        (Some(KindArg::Maintenance), Some(_)) => {
            anyhow::bail!("--year only applies to income reports")
        }
        (Some(KindArg::Maintenance), None) => request.kind = ReportKind::Maintenance,
        (Some(KindArg::Income), year) | (None, year @ Some(_)) => {
            request.kind = ReportKind::Income { year }
        }
        (None, None) => {}
    }

    if cli.from.is_some() {
        request.range.start = cli.from;
    }
    if cli.to.is_some() {
        request.range.end = cli.to;
    }

    if let Some(ref path) = cli.narrative {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read narrative from {:?}", path))?;
        request.content.narrative = Some(text);
    }

    if cli.logo.is_some() {
        request.branding.logo = cli.logo.clone();
    }
    if cli.signature.is_some() {
        request.branding.signature = cli.signature.clone();
    }
    Ok(())
}

/// Map CLI args to `ReportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let mut builder = ReportConfig::builder()
        .output_format(cli.format.into())
        .locale(cli.locale.into())
        .page_size(cli.page_size.into())
        .asset_timeout_secs(cli.timeout);

    if let Some(limit) = cli.detail_limit {
        builder = builder.detail_row_limit(limit);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
