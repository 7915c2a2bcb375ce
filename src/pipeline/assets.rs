//! Image assets: fetch a logo or signature, then shrink and re-encode it.
//!
//! ## Sources
//!
//! * `http://` / `https://`: downloaded with a per-client timeout
//! * `data:<mime>;base64,<payload>`: decoded in place
//! * anything else: a local file path
//!
//! ## Preprocessing
//!
//! Decoded images are fitted inside the requested pixel box (never
//! upscaled), flattened onto white and re-encoded as JPEG. Bytes that do not
//! decode are passed through untouched as base64 with whatever dimensions
//! can be sniffed from the header; the drawing surface may still reject them
//! later, which is reported as a non-fatal asset error.

use crate::error::AssetError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What to fetch and the pixel box to fit it into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    pub source: String,
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1–100.
    pub quality: u8,
}

/// An image ready for a drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub base64: String,
    /// Pixel width; 0 when unknown.
    pub width: u32,
    pub height: u32,
    pub mime: String,
    /// `false` for the raw pass-through fallback.
    pub optimized: bool,
}

/// Check if the source string looks like a URL.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn is_data_uri(source: &str) -> bool {
    source.starts_with("data:")
}

/// Fetch the raw bytes behind `source`.
pub async fn fetch_asset(source: &str, timeout_secs: u64) -> Result<Vec<u8>, AssetError> {
    let bytes = if is_url(source) {
        download(source, timeout_secs).await?
    } else if is_data_uri(source) {
        decode_data_uri(source)?.1
    } else {
        read_local(source).await?
    };
    if bytes.is_empty() {
        return Err(AssetError::Empty {
            source_url: display_source(source),
        });
    }
    Ok(bytes)
}

async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, AssetError> {
    info!("Downloading asset from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AssetError::FetchFailed {
            source_url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AssetError::Timeout {
                source_url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AssetError::FetchFailed {
                source_url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AssetError::HttpStatus {
            source_url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            AssetError::Timeout {
                source_url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AssetError::FetchFailed {
                source_url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;
    debug!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Split `data:<mime>;base64,<payload>` into its mime type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), AssetError> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| AssetError::BadDataUri {
        detail: "missing 'data:' prefix".into(),
    })?;
    let (meta, payload) = rest.split_once(',').ok_or_else(|| AssetError::BadDataUri {
        detail: "missing ',' separator".into(),
    })?;
    let mime = meta.strip_suffix(";base64").ok_or_else(|| AssetError::BadDataUri {
        detail: format!("only base64 payloads are supported, got '{meta}'"),
    })?;
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| AssetError::BadDataUri {
            detail: e.to_string(),
        })?;
    Ok((mime.to_string(), bytes))
}

async fn read_local(path: &str) -> Result<Vec<u8>, AssetError> {
    let path = PathBuf::from(path);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AssetError::FileUnreadable {
            path: path.clone(),
            detail: e.to_string(),
        })?;
    debug!("Read asset file: {}", path.display());
    Ok(bytes)
}

/// Data URIs are shortened in messages; they can be megabytes long.
pub fn display_source(source: &str) -> String {
    if is_data_uri(source) {
        let head: String = source.chars().take(32).collect();
        format!("{head}...")
    } else {
        source.to_string()
    }
}

// ── Preprocessing ────────────────────────────────────────────────────────

/// Largest size inside `max_w × max_h` with the same aspect ratio; never larger
/// than the original.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Shrink, flatten and re-encode; fall back to the raw bytes on decode failure.
pub fn prepare_image(bytes: &[u8], max_w: u32, max_h: u32, quality: u8) -> ImageAsset {
    match optimize(bytes, max_w, max_h, quality) {
        Ok(asset) => asset,
        Err(e) => {
            warn!("Image optimisation failed, embedding original bytes: {e}");
            raw_asset(bytes, max_w, max_h)
        }
    }
}

/// Decode → fit → flatten on white → JPEG → base64.
pub fn optimize(
    bytes: &[u8],
    max_w: u32,
    max_h: u32,
    quality: u8,
) -> Result<ImageAsset, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = fit_within(img.width(), img.height(), max_w, max_h);

    let rgba = img.to_rgba8();
    let rgba = if (w, h) != rgba.dimensions() {
        image::imageops::resize(&rgba, w, h, FilterType::Triangle)
    } else {
        rgba
    };

    // Alpha-composite over white; JPEG has no alpha channel.
    let mut flat = RgbImage::from_pixel(w, h, Rgb([255, 255, 255]));
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = u32::from(px[3]);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        flat.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(flat).write_with_encoder(encoder)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Optimised image {}×{} → {}×{}, {} → {} bytes",
        img.width(),
        img.height(),
        w,
        h,
        bytes.len(),
        buf.len()
    );
    Ok(ImageAsset {
        base64: b64,
        width: w,
        height: h,
        mime: "image/jpeg".into(),
        optimized: true,
    })
}

/// Pass-through for bytes the decoder rejected.
///
/// Dimensions come from the image header when either decoder recognises the
/// format (the PDF embedder reads more formats than this crate decodes),
/// otherwise the request box is used.
pub fn raw_asset(bytes: &[u8], max_w: u32, max_h: u32) -> ImageAsset {
    let (width, height) = header_dimensions(bytes).unwrap_or_else(|| {
        debug!("Image header unreadable, assuming the {max_w}x{max_h} box");
        (max_w, max_h)
    });
    ImageAsset {
        base64: STANDARD.encode(bytes),
        width,
        height,
        mime: sniff_mime(bytes).to_string(),
        optimized: false,
    }
}

fn header_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|r| r.into_dimensions().ok())
        .or_else(|| {
            printpdf::image_crate::io::Reader::new(Cursor::new(bytes))
                .with_guessed_format()
                .ok()
                .and_then(|r| r.into_dimensions().ok())
        })
}

/// Mime type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "image/tiff",
        [b'P', b'1'..=b'7', ..] => "image/x-portable-anymap",
        _ => "application/octet-stream",
    }
}

// ── Cache ────────────────────────────────────────────────────────────────

/// Per-generation memo of prepared images, keyed by the whole request.
///
/// Failures are not cached, so a later request for the same source retries.
#[derive(Debug)]
pub struct AssetCache {
    timeout_secs: u64,
    entries: HashMap<ImageRequest, ImageAsset>,
}

impl AssetCache {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch and prepare `request`, or return the memoised asset.
    pub async fn resolve(&mut self, request: &ImageRequest) -> Result<ImageAsset, AssetError> {
        if let Some(hit) = self.entries.get(request) {
            debug!("Asset cache hit: {}", display_source(&request.source));
            return Ok(hit.clone());
        }
        let bytes = fetch_asset(&request.source, self.timeout_secs).await?;
        let asset = prepare_image(
            &bytes,
            request.max_width,
            request.max_height,
            request.quality,
        );
        self.entries.insert(request.clone(), asset.clone());
        Ok(asset)
    }
}
