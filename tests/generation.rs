//! End-to-end generation tests.
//!
//! Every test runs the public `generate*` entry points. Layout assertions use
//! the JSON display list so page contents can be inspected without a PDF
//! parser.

use base64::Engine;
use condo_report::{
    generate, generate_sync, generate_to_file, AssetError, Branding, CostRecord, DisplayList,
    DomainRecords, OutputFormat, ReportConfig, ReportContent, ReportKind, ReportRequest,
};

fn json_config() -> ReportConfig {
    ReportConfig::builder()
        .output_format(OutputFormat::Json)
        .build()
        .unwrap()
}

fn display_list(bytes: &[u8]) -> DisplayList {
    serde_json::from_slice(bytes).expect("JSON output is a display list")
}

fn texts(list: &DisplayList) -> Vec<String> {
    list.pages
        .iter()
        .flat_map(|p| p.texts().map(str::to_string))
        .collect()
}

fn income(narrative: &str) -> ReportRequest {
    ReportRequest {
        kind: ReportKind::Income { year: Some(2024) },
        content: ReportContent {
            narrative: Some(narrative.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Uncompressed 24-bit BMP, a format only the PDF embedder decodes.
fn bmp_data_uri(width: u32, height: u32) -> String {
    let row = (width * 3 + 3) & !3;
    let pixels = row * height;
    let mut bmp = Vec::new();
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&(54 + pixels).to_le_bytes());
    bmp.extend_from_slice(&[0; 4]);
    bmp.extend_from_slice(&54u32.to_le_bytes());
    bmp.extend_from_slice(&40u32.to_le_bytes());
    bmp.extend_from_slice(&(width as i32).to_le_bytes());
    bmp.extend_from_slice(&(height as i32).to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes());
    bmp.extend_from_slice(&24u16.to_le_bytes());
    bmp.extend_from_slice(&0u32.to_le_bytes());
    bmp.extend_from_slice(&pixels.to_le_bytes());
    bmp.extend_from_slice(&2835u32.to_le_bytes());
    bmp.extend_from_slice(&2835u32.to_le_bytes());
    bmp.extend_from_slice(&[0; 8]);
    bmp.resize(54 + pixels as usize, 0x80);
    format!(
        "data:image/bmp;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bmp)
    )
}

fn png_data_uri(w: u32, h: u32) -> String {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([31, 78, 121, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
    )
}

#[tokio::test]
async fn long_narrative_flows_across_pages_within_margins() {
    let config = json_config();
    let narrative: String = (1..=120).map(|i| format!("Línea {i}\n")).collect();
    let artifact = generate(&income(&narrative), &config).await.unwrap();
    let list = display_list(&artifact.bytes);

    // Narrative height over usable page height, plus the signature page.
    // The header block shares the first page, hence the tolerance of one.
    let rendered = 120.0 * (config.line_height + config.block_gap);
    let expected = (rendered / config.usable_height()).ceil() as usize + 1;
    assert!(
        artifact.page_count.abs_diff(expected) <= 1,
        "pages: {}, expected about {expected}",
        artifact.page_count
    );
    assert_eq!(artifact.page_count, list.pages.len());

    let limit = list.page_height - config.margin_bottom;
    for page in &list.pages {
        for op in &page.ops {
            if let condo_report::layout::DrawOp::Text { text, y, .. } = op {
                if !text.starts_with("Página") {
                    assert!(*y <= limit + 0.01, "'{text}' at {y} crosses {limit}");
                }
            }
        }
    }

    // Paragraph order survives pagination.
    let lines: Vec<String> = texts(&list)
        .into_iter()
        .filter(|t| t.starts_with("Línea "))
        .collect();
    let expected: Vec<String> = (1..=120).map(|i| format!("Línea {i}")).collect();
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn zero_records_render_placeholders_only() {
    let artifact = generate(&ReportRequest::default(), &json_config())
        .await
        .unwrap();
    let all = texts(&display_list(&artifact.bytes));

    let placeholders = all
        .iter()
        .filter(|t| *t == "No hay registros en el periodo seleccionado.")
        .count();
    assert_eq!(placeholders, 5);
    assert!(!all.iter().any(|t| t == "Detalle"));
    assert_eq!(artifact.stats.empty_sections().count(), 5);
    assert_eq!(artifact.stats.total_records(), 0);
}

#[tokio::test]
async fn ten_costs_over_three_months() {
    let dates = [
        "2024-01-05", "2024-01-12", "2024-01-20", "2024-02-02", "2024-02-14", "2024-02-28",
        "2024-03-01", "2024-03-09", "2024-03-15", "2024-03-30",
    ];
    let costs = dates
        .iter()
        .enumerate()
        .map(|(i, d)| CostRecord {
            id: format!("c{i}"),
            date: d.to_string(),
            category: if i < 4 { "Materiales" } else { "Servicios" }.into(),
            provider: (i < 5).then(|| "Ferretería Central".to_string()),
            amount_cents: 15_000,
            description: "Reposición".into(),
        })
        .collect();
    let request = ReportRequest {
        records: DomainRecords {
            costs,
            ..Default::default()
        },
        ..Default::default()
    };

    let artifact = generate(&request, &json_config()).await.unwrap();
    let costs = artifact
        .stats
        .sections
        .iter()
        .find(|s| s.name == "Costos")
        .unwrap();
    assert_eq!(costs.records, 10);
    assert_eq!(costs.detail_rows, 10);

    let all = texts(&display_list(&artifact.bytes));
    for month in ["Enero 2024", "Febrero 2024", "Marzo 2024"] {
        assert!(all.iter().any(|t| t == month), "missing {month}");
    }
    // Materiales 4 × 150, Servicios 6 × 150, 1.500 overall.
    assert!(all.iter().any(|t| t == "$600,00"));
    assert!(all.iter().any(|t| t == "$900,00"));
    assert!(all.iter().any(|t| t == "$1.500,00"));
    // The five costs without provider are grouped together.
    assert!(all.iter().any(|t| t == "Sin especificar"));
}

#[tokio::test]
async fn income_report_draws_narrative_and_signature() {
    let mut request = income("## Evolución\n\nLos ingresos **subieron** un 12%.\n\n- Cuotas\n- Arriendos");
    request.content.meta.admin.name = "Ana Pérez".into();
    request.content.meta.admin.role = "Administradora".into();

    let artifact = generate(&request, &json_config()).await.unwrap();
    assert_eq!(artifact.filename, "reporte-ia-ingresos-2024.json");

    let all = texts(&display_list(&artifact.bytes));
    assert!(all.iter().any(|t| t == "Evolución"));
    assert!(all.iter().any(|t| t == "Los ingresos subieron un 12%."));
    assert!(all.iter().any(|t| t == "Arriendos"));
    assert!(all.iter().any(|t| t == "Ana Pérez"));
    let last = all.last().unwrap();
    assert_eq!(last, &format!("Página {0} de {0}", artifact.page_count));
}

#[tokio::test]
async fn missing_logo_is_not_fatal() {
    let mut request = income("Texto.");
    request.branding = Branding {
        logo: Some("/no/such/dir/logo.png".into()),
        signature: None,
    };

    let artifact = generate(&request, &json_config()).await.unwrap();
    assert_eq!(artifact.stats.asset_errors.len(), 1);
    assert!(matches!(
        artifact.stats.asset_errors[0],
        AssetError::FileUnreadable { .. }
    ));

    let list = display_list(&artifact.bytes);
    let images = list
        .pages
        .iter()
        .flat_map(|p| &p.ops)
        .filter(|op| matches!(op, condo_report::layout::DrawOp::Image { .. }))
        .count();
    assert_eq!(images, 0);
}

#[tokio::test]
async fn data_uri_logo_is_shrunk_and_embedded() {
    let mut request = income("Texto.");
    request.branding.logo = Some(png_data_uri(720, 360));

    let artifact = generate(&request, &json_config()).await.unwrap();
    assert!(artifact.stats.asset_errors.is_empty());

    let list = display_list(&artifact.bytes);
    let image = list.pages[0]
        .ops
        .iter()
        .find_map(|op| match op {
            condo_report::layout::DrawOp::Image {
                width_px,
                height_px,
                mime,
                ..
            } => Some((*width_px, *height_px, mime.clone())),
            _ => None,
        })
        .expect("logo drawn on the first page");
    assert_eq!(image, (180, 90, "image/jpeg".to_string()));
}

#[tokio::test]
async fn passthrough_logo_keeps_aspect_ratio() {
    let mut request = income("Texto.");
    request.branding.logo = Some(bmp_data_uri(100, 50));

    let artifact = generate(&request, &json_config()).await.unwrap();
    assert!(artifact.stats.asset_errors.is_empty());

    let list = display_list(&artifact.bytes);
    let (px, mm, mime) = list.pages[0]
        .ops
        .iter()
        .find_map(|op| match op {
            condo_report::layout::DrawOp::Image {
                width_px,
                height_px,
                w,
                h,
                mime,
                ..
            } => Some(((*width_px, *height_px), (*w, *h), mime.clone())),
            _ => None,
        })
        .expect("logo drawn on the first page");
    assert_eq!(px, (100, 50));
    assert_eq!(mime, "image/bmp");
    assert!((mm.0 / mm.1 - 2.0).abs() < 1e-3, "drawn box {mm:?}");
}

#[test]
fn passthrough_logo_embeds_in_pdf() {
    let mut request = income("Texto.");
    request.branding.logo = Some(bmp_data_uri(100, 50));
    let artifact = generate_sync(&request, &ReportConfig::default()).unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert!(artifact.stats.asset_errors.is_empty());
}

#[tokio::test]
async fn file_output_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = generate_to_file(&income("Texto."), dir.path(), &json_config())
        .await
        .unwrap();

    let written = dir.path().join(&artifact.filename);
    assert!(written.exists());
    assert_eq!(std::fs::read(&written).unwrap(), artifact.bytes);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn nested_output_path_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("2024").join("ingresos.json");
    generate_to_file(&income("Texto."), &target, &json_config())
        .await
        .unwrap();
    assert!(target.exists());
}

#[test]
fn pdf_output_starts_with_magic() {
    let artifact = generate_sync(&income("# Ingresos\n\nTodo en orden."), &ReportConfig::default())
        .unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert_eq!(artifact.filename, "reporte-ia-ingresos-2024.pdf");
    assert!(artifact.page_count >= 2);
}

#[test]
fn maintenance_filename_uses_timestamp() {
    let mut request = ReportRequest::default();
    request.content.meta.generated_at = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 7, 9)
        .unwrap();
    let artifact = generate_sync(&request, &json_config()).unwrap();
    assert_eq!(artifact.filename, "reporte_mantenimiento_20240305_140709.json");
}
