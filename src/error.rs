//! Error types for the condo-report library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReportError`] — **Fatal**: the document cannot be produced at all
//!   (unreadable input data, invalid configuration, the drawing surface
//!   refused to serialise). Returned as `Err(ReportError)` from the
//!   top-level `generate*` functions; no artifact is emitted.
//!
//! * [`AssetError`] — **Non-fatal**: a logo or signature could not be
//!   resolved. The composer logs it, omits the image and keeps going.
//!   Collected in [`crate::output::GenerationStats::asset_errors`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the condo-report library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input data file was not found at the given path.
    #[error("Report data file not found: '{path}'\nCheck the path exists and is readable.")]
    DataFileNotFound { path: PathBuf },

    /// The input data could not be parsed into report records.
    #[error("Invalid report data in '{source_name}': {detail}")]
    InvalidData { source_name: String, detail: String },

    /// The requested date range ends before it starts.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The drawing surface failed to assemble or serialise the document.
    #[error("Document assembly failed: {detail}")]
    DocumentFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error resolving an image asset.
///
/// The affected image is omitted from the document; generation continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AssetError {
    /// Network or transport failure.
    #[error("Failed to fetch asset '{source_url}': {reason}")]
    FetchFailed { source_url: String, reason: String },

    /// The fetch exceeded the configured timeout.
    #[error("Fetching asset '{source_url}' timed out after {secs}s")]
    Timeout { source_url: String, secs: u64 },

    /// The server answered with a non-success status.
    #[error("Asset '{source_url}' returned HTTP {status}")]
    HttpStatus { source_url: String, status: u16 },

    /// A `data:` URI was malformed or not base64.
    #[error("Malformed data URI for asset: {detail}")]
    BadDataUri { detail: String },

    /// A local asset file could not be read.
    #[error("Cannot read asset file '{path}': {detail}")]
    FileUnreadable { path: PathBuf, detail: String },

    /// The asset was fetched but is empty.
    #[error("Asset '{source_url}' is empty")]
    Empty { source_url: String },

    /// The drawing surface could not embed the prepared image.
    #[error("Could not embed image '{label}': {detail}")]
    EmbedFailed { label: String, detail: String },
}
