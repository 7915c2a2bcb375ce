//! Generation results.

use crate::error::AssetError;
use serde::{Deserialize, Serialize};

/// A finished document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    /// Deterministic name including the extension for the output format.
    pub filename: String,
    /// PDF bytes or the JSON display list.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub stats: GenerationStats,
}

/// Per-section outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    /// Records left after the date-range filter.
    pub records: usize,
    /// Detail rows actually drawn (≤ `records` with a row limit).
    pub detail_rows: usize,
}

/// Counters for one generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub sections: Vec<SectionSummary>,
    /// Narrative tables skipped because they parsed empty.
    pub skipped_tables: usize,
    /// Logo/signature failures; each omitted image appears here once.
    pub asset_errors: Vec<AssetError>,
    pub asset_duration_ms: u64,
    pub layout_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl GenerationStats {
    /// Sum of filtered records across all sections.
    pub fn total_records(&self) -> usize {
        self.sections.iter().map(|s| s.records).sum()
    }

    pub fn empty_sections(&self) -> impl Iterator<Item = &SectionSummary> {
        self.sections.iter().filter(|s| s.records == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_empty_sections() {
        let stats = GenerationStats {
            sections: vec![
                SectionSummary {
                    name: "Costos".into(),
                    records: 10,
                    detail_rows: 10,
                },
                SectionSummary {
                    name: "Contratos".into(),
                    records: 0,
                    detail_rows: 0,
                },
            ],
            ..Default::default()
        };
        assert_eq!(stats.total_records(), 10);
        let empty: Vec<&str> = stats.empty_sections().map(|s| s.name.as_str()).collect();
        assert_eq!(empty, vec!["Contratos"]);
    }

    #[test]
    fn artifact_json_omits_bytes() {
        let artifact = ReportArtifact {
            filename: "reporte-ia-ingresos-2024.pdf".into(),
            bytes: vec![1, 2, 3],
            page_count: 2,
            stats: GenerationStats::default(),
        };
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("reporte-ia-ingresos-2024.pdf"));
        assert!(!json.contains("bytes"));
    }
}
