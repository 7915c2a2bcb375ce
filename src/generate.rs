//! Generation entry points.
//!
//! [`generate`] is the async front door: it resolves the logo and signature
//! (the only I/O), then hands everything to the synchronous composer.
//! [`compose`] skips the fetch step for callers that already hold prepared
//! images.

use crate::compose::{compose_into, ResolvedAssets};
use crate::config::{OutputFormat, ReportConfig};
use crate::error::{AssetError, ReportError};
use crate::layout::pdf::PdfSurface;
use crate::layout::surface::RecordingSurface;
use crate::model::{Branding, ReportRequest};
use crate::output::{GenerationStats, ReportArtifact};
use crate::pipeline::assets::{display_source, AssetCache, ImageAsset, ImageRequest};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate a report document.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ReportArtifact)` on success, even if the logo or signature could not
/// be loaded (check `artifact.stats.asset_errors`).
///
/// # Errors
/// Returns `Err(ReportError)` only for fatal errors:
/// - inverted date range
/// - the document could not be serialised
pub async fn generate(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<ReportArtifact, ReportError> {
    let total_start = Instant::now();
    info!("Starting report generation: {:?}", request.kind);
    request.validate()?;

    // ── Step 1: Resolve images ───────────────────────────────────────────
    let asset_start = Instant::now();
    let assets = resolve_assets(&request.branding, config).await;
    let asset_duration_ms = asset_start.elapsed().as_millis() as u64;

    // ── Step 2: Lay out and serialise ────────────────────────────────────
    let mut artifact = compose(request, &assets, config)?;
    artifact.stats.asset_duration_ms = asset_duration_ms;
    artifact.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Generated {} ({} pages, {} bytes) in {}ms",
        artifact.filename,
        artifact.page_count,
        artifact.bytes.len(),
        artifact.stats.total_duration_ms
    );
    Ok(artifact)
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    request: &ReportRequest,
    config: &ReportConfig,
) -> Result<ReportArtifact, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(request, config))
}

/// Generate and write the artifact to disk.
///
/// `output` may be a file path or an existing directory; in the latter case
/// the artifact's own filename is used (see [`output_path_for`]). Uses
/// atomic write (temp file + rename) to prevent partial files.
pub async fn generate_to_file(
    request: &ReportRequest,
    output: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportArtifact, ReportError> {
    let artifact = generate(request, config).await?;
    let path = output_path_for(output.as_ref(), &artifact.filename);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReportError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension(format!("{}.tmp", config.output_format.extension()));
    tokio::fs::write(&tmp_path, &artifact.bytes)
        .await
        .map_err(|e| ReportError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| ReportError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Wrote {}", path.display());
    Ok(artifact)
}

/// Read a JSON [`ReportRequest`] from disk.
///
/// # Errors
/// - [`ReportError::DataFileNotFound`] if `path` does not exist
/// - [`ReportError::InvalidData`] if it cannot be read or does not parse
pub async fn load_request(path: impl AsRef<Path>) -> Result<ReportRequest, ReportError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ReportError::DataFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let invalid = |detail: String| ReportError::InvalidData {
        source_name: path.display().to_string(),
        detail,
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    let request: ReportRequest = serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;
    debug!(
        "Loaded {} ({} bytes, kind {:?})",
        path.display(),
        raw.len(),
        request.kind
    );
    Ok(request)
}

/// Where [`generate_to_file`] writes: `output/filename` for a directory,
/// `output` itself otherwise.
pub fn output_path_for(output: &Path, filename: &str) -> PathBuf {
    if output.is_dir() {
        output.join(filename)
    } else {
        output.to_path_buf()
    }
}

/// Lay out `request` with already-resolved images and serialise it.
pub fn compose(
    request: &ReportRequest,
    assets: &ResolvedAssets,
    config: &ReportConfig,
) -> Result<ReportArtifact, ReportError> {
    let layout_start = Instant::now();
    let (bytes, composition) = match config.output_format {
        OutputFormat::Pdf => {
            let title = request.file_stem();
            let mut surface = PdfSurface::new(&title, config.page_size)?;
            let composition = compose_into(request, assets, config, &mut surface)?;
            (surface.into_bytes()?, composition)
        }
        OutputFormat::Json => {
            let (w, h) = config.page_size.dimensions_mm();
            let mut surface = RecordingSurface::new(w, h);
            let composition = compose_into(request, assets, config, &mut surface)?;
            (surface.into_bytes()?, composition)
        }
    };
    let layout_duration_ms = layout_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(composition.page_count);
    }

    let mut asset_errors = assets.errors.clone();
    asset_errors.extend(composition.embed_errors);

    Ok(ReportArtifact {
        filename: format!(
            "{}.{}",
            request.file_stem(),
            config.output_format.extension()
        ),
        bytes,
        page_count: composition.page_count,
        stats: GenerationStats {
            sections: composition.sections,
            skipped_tables: composition.skipped_tables,
            asset_errors,
            asset_duration_ms: 0,
            layout_duration_ms,
            total_duration_ms: layout_duration_ms,
        },
    })
}

/// Fetch and preprocess the logo and signature, one after the other.
///
/// Never fails: a source that cannot be resolved is logged, reported to the
/// progress callback and left out.
pub async fn resolve_assets(branding: &Branding, config: &ReportConfig) -> ResolvedAssets {
    let mut cache = AssetCache::new(config.asset_timeout_secs);
    let mut resolved = ResolvedAssets::default();

    if let Some(source) = non_blank(branding.logo.as_deref()) {
        resolved.logo =
            resolve_one(&mut cache, source, config.logo_max, config, &mut resolved.errors).await;
    }
    if let Some(source) = non_blank(branding.signature.as_deref()) {
        resolved.signature = resolve_one(
            &mut cache,
            source,
            config.signature_max,
            config,
            &mut resolved.errors,
        )
        .await;
    }
    debug!(
        "Assets resolved: logo={} signature={} errors={}",
        resolved.logo.is_some(),
        resolved.signature.is_some(),
        resolved.errors.len()
    );
    resolved
}

fn non_blank(source: Option<&str>) -> Option<&str> {
    source.map(str::trim).filter(|s| !s.is_empty())
}

async fn resolve_one(
    cache: &mut AssetCache,
    source: &str,
    (max_width, max_height): (u32, u32),
    config: &ReportConfig,
    errors: &mut Vec<AssetError>,
) -> Option<ImageAsset> {
    let request = ImageRequest {
        source: source.to_string(),
        max_width,
        max_height,
        quality: config.jpeg_quality(),
    };
    match cache.resolve(&request).await {
        Ok(asset) => Some(asset),
        Err(e) => {
            let shown = display_source(source);
            warn!("Omitting image {}: {}", shown, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_asset_error(&shown, &e.to_string());
            }
            errors.push(e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_for_directory_uses_filename() {
        let dir = tempfile::tempdir().unwrap();
        let p = output_path_for(dir.path(), "reporte-ia-ingresos-2024.pdf");
        assert_eq!(p, dir.path().join("reporte-ia-ingresos-2024.pdf"));

        let file = dir.path().join("salida.pdf");
        assert_eq!(output_path_for(&file, "ignored.pdf"), file);
    }

    #[test]
    fn blank_sources_are_skipped() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" logo.png ")), Some("logo.png"));
    }

    #[tokio::test]
    async fn load_request_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("datos.json");
        assert!(matches!(
            load_request(&missing).await,
            Err(ReportError::DataFileNotFound { .. })
        ));

        std::fs::write(&missing, "{ not json").unwrap();
        let err = load_request(&missing).await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidData { .. }));
        assert!(err.to_string().contains("datos.json"), "got: {err}");

        std::fs::write(&missing, r#"{"kind": {"type": "income", "year": 2023}}"#).unwrap();
        let request = load_request(&missing).await.unwrap();
        assert_eq!(request.kind, crate::model::ReportKind::Income { year: Some(2023) });
    }

    #[tokio::test]
    async fn unreadable_logo_is_reported_not_fatal() {
        let branding = Branding {
            logo: Some("/definitely/missing/logo.png".into()),
            signature: None,
        };
        let assets = resolve_assets(&branding, &ReportConfig::default()).await;
        assert!(assets.logo.is_none());
        assert_eq!(assets.errors.len(), 1);
        assert!(matches!(assets.errors[0], AssetError::FileUnreadable { .. }));
    }
}
