//! Pipe-table parsing: raw `| a | b |` rows → [`TableBlock`].

use crate::pipeline::sanitize::to_plain_text;
use serde::{Deserialize, Serialize};

/// Header and body cells of a markdown-lite table, already plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl TableBlock {
    /// An empty table must not be rendered.
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.body.is_empty()
    }

    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.head.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Parse contiguous pipe rows.
///
/// Row 0 is the header, row 1 (the separator) is discarded, the rest is the
/// body. Fewer than two rows yields an empty [`TableBlock`].
pub fn parse_table<'a, I>(lines: I) -> TableBlock
where
    I: IntoIterator<Item = &'a str>,
{
    let rows: Vec<&str> = lines.into_iter().collect();
    if rows.len() < 2 {
        return TableBlock::default();
    }
    TableBlock {
        head: split_row(rows[0]),
        body: rows[2..].iter().map(|r| split_row(r)).collect(),
    }
}

/// Split one row on `|`, dropping the empty edge cells that leading and
/// trailing pipes produce.
fn split_row(row: &str) -> Vec<String> {
    let mut cells: Vec<&str> = row.trim().split('|').collect();
    if cells.first().is_some_and(|c| c.trim().is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(to_plain_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_separator_and_body() {
        let lines = [
            "| Categoría | Monto | Nota |",
            "|---|---|---|",
            "| Materiales | $40 | **urgente** |",
            "| Servicios | $60 | `ok` |",
        ];
        let t = parse_table(lines);
        assert_eq!(t.head.len(), 3);
        assert_eq!(t.body.len(), 2);
        assert_eq!(t.head[0], "Categoría");
        assert_eq!(t.body[0][2], "urgente");
        assert_eq!(t.body[1][2], "ok");
    }

    #[test]
    fn every_cell_is_plain_text_of_its_source() {
        let n = 5;
        let m = 4;
        let mut lines = vec![
            (0..m).map(|c| format!("| ## H{c} ")).collect::<String>() + "|",
            "|".to_string() + &"---|".repeat(m),
        ];
        for r in 0..n {
            lines.push((0..m).map(|c| format!("| *r{r}c{c}* ")).collect::<String>() + "|");
        }
        let t = parse_table(lines.iter().map(String::as_str));
        assert_eq!(t.head.len(), m);
        assert_eq!(t.body.len(), n);
        for (r, row) in t.body.iter().enumerate() {
            assert_eq!(row.len(), m);
            for (c, cell) in row.iter().enumerate() {
                assert_eq!(*cell, to_plain_text(&format!(" *r{r}c{c}* ")));
            }
        }
    }

    #[test]
    fn fewer_than_two_rows_is_empty() {
        assert!(parse_table(["| solo |"]).is_empty());
        assert!(parse_table(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn header_only_table_has_no_body() {
        let t = parse_table(["| a | b |", "|---|---|"]);
        assert_eq!(t.head, vec!["a", "b"]);
        assert!(t.body.is_empty());
        assert!(!t.is_empty());
    }

    #[test]
    fn rows_without_edge_pipes() {
        let t = parse_table(["a | b", "---|---", "1 | 2"]);
        assert_eq!(t.head, vec!["a", "b"]);
        assert_eq!(t.body, vec![vec!["1", "2"]]);
    }

    #[test]
    fn interior_empty_cells_survive() {
        let t = parse_table(["| a | b | c |", "|---|---|---|", "| 1 |  | 3 |"]);
        assert_eq!(t.body[0], vec!["1", "", "3"]);
        assert_eq!(t.column_count(), 3);
    }
}
