//! Text sanitising for the drawing surface.
//!
//! The built-in PDF fonts cover printable ASCII plus the Latin-1 supplement
//! (0x20–0x7E, 0xA0–0xFF). Anything else renders as garbage or aborts the
//! text run, so every string passes through [`sanitize`] before it is drawn.
//!
//! ## Rule Order
//!
//! [`to_plain_text`] strips markdown markers *before* filtering characters:
//! filtering first would leave `**` pairs intact and drop nothing useful,
//! while stripping first lets the filter see the final visible text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Reduce `text` to single-spaced, trimmed, font-safe characters.
///
/// 1. Map typographic punctuation to ASCII (curly quotes, dashes, ellipsis, bullet)
/// 2. Turn tab / CR / LF into spaces; drop every other control character
/// 3. Drop characters outside 0x20–0x7E and 0xA0–0xFF
/// 4. Collapse whitespace runs to one space and trim
///
/// Deterministic and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mapped = map_typographic_punctuation(text);
    let filtered = filter_font_range(&mapped);
    collapse_whitespace(&filtered)
}

/// Strip markdown-lite markup, then [`sanitize`].
///
/// Removes heading markers (`^#{1,6}\s+`), bold / italic pairs and inline
/// code backticks.
pub fn to_plain_text(fragment: &str) -> String {
    let s = RE_HEADING.replace_all(fragment, "");
    let s = RE_BOLD_STARS.replace_all(&s, "$1");
    let s = RE_BOLD_UNDERSCORES.replace_all(&s, "$1");
    let s = RE_ITALIC_STAR.replace_all(&s, "$1");
    let s = RE_ITALIC_UNDERSCORE.replace_all(&s, "$1$2$3");
    let s = s.replace("**", "").replace('`', "");
    sanitize(&s)
}

// ── Rule 1: Typographic punctuation ──────────────────────────────────────────

fn map_typographic_punctuation(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25CF}' => out.push('-'),
            other => out.push(other),
        }
    }
    out
}

// ── Rules 2–3: Control characters and font range ─────────────────────────────

fn filter_font_range(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => Some(c),
            _ => None,
        })
        .collect()
}

// ── Rule 4: Whitespace ───────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

// ── Markdown markers ─────────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+").unwrap());
static RE_BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static RE_BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static RE_ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());
// Underscore italics only at word edges so identifiers like fondo_reserva survive.
static RE_ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)_([^_\s][^_]*)_($|\s)").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "plain text",
        "  leading and trailing  ",
        "tabs\tand\nnewlines\r\nmixed",
        "nul\x00byte and bell\x07",
        "del\x7Fchar",
        "emoji 🏢 building ✅ done",
        "Año 2024: mantención — “urgente” … listo",
        "nbsp\u{A0}\u{A0}runs",
        "c1 control \u{0085} next",
        "zero\u{200B}width\u{FEFF}bom",
        "\u{00A0} only nbsp \u{00A0}",
        "中文 mixed with latin",
    ];

    #[test]
    fn sanitize_is_idempotent() {
        for s in SAMPLES {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn output_stays_in_font_range() {
        for s in SAMPLES {
            for c in sanitize(s).chars() {
                let cp = c as u32;
                assert!(
                    (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp),
                    "U+{cp:04X} survived in {s:?}"
                );
            }
        }
    }

    #[test]
    fn removes_controls_and_collapses() {
        assert_eq!(sanitize("nul\x00byte"), "nulbyte");
        assert_eq!(sanitize("a\t\tb\nc"), "a b c");
        assert_eq!(sanitize("  x  "), "x");
    }

    #[test]
    fn keeps_latin1_and_maps_punctuation() {
        assert_eq!(
            sanitize("Año — “urgente” …"),
            "Año - \"urgente\" ..."
        );
        assert_eq!(sanitize("edificio 🏢 norte"), "edificio norte");
    }

    #[test]
    fn plain_text_strips_markers_first() {
        assert_eq!(to_plain_text("## Resumen **anual**"), "Resumen anual");
        assert_eq!(to_plain_text("Total `150000` *centavos*"), "Total 150000 centavos");
        assert_eq!(to_plain_text("__Nota__: ver _anexo_ hoy"), "Nota: ver anexo hoy");
        assert_eq!(to_plain_text("campo fondo_reserva_2024"), "campo fondo_reserva_2024");
    }

    #[test]
    fn plain_text_handles_unbalanced_markers() {
        assert_eq!(to_plain_text("**sin cierre"), "sin cierre");
        assert_eq!(to_plain_text("###### h6 heading"), "h6 heading");
        assert_eq!(to_plain_text("#hashtag"), "#hashtag");
    }
}
