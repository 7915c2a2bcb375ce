//! Block classification: narrative markdown-lite → ordered [`Block`]s.
//!
//! [`classify`] returns a [`Blocks`] iterator over a peekable line iterator.
//! The only look-ahead is one line, used to confirm that a pipe row is
//! followed by a separator before a table is opened. Nothing is consumed
//! past the last contiguous `|` line, so a table never swallows the block
//! after it. `Blocks` is `Clone`, so the same text can be scanned twice
//! (for example to estimate height before drawing).

use crate::pipeline::table::{parse_table, TableBlock};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Lines;

/// Classified narrative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Bullet,
    Paragraph,
    /// A blank line: nothing drawn, the cursor still advances a little.
    Spacer,
    Table,
}

/// One classified unit with its raw text.
///
/// For headings and bullets `raw` excludes the marker. For tables it holds
/// the contiguous pipe lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub raw: String,
}

impl Block {
    fn new(kind: BlockKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Parse a table block; `None` for any other kind.
    pub fn as_table(&self) -> Option<TableBlock> {
        match self.kind {
            BlockKind::Table => Some(parse_table(self.raw.lines())),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3
        )
    }
}

/// Classify `text` into blocks, preserving order.
pub fn classify(text: &str) -> Blocks<'_> {
    Blocks {
        lines: text.lines().peekable(),
    }
}

/// Iterator over the blocks of a narrative.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: Peekable<Lines<'a>>,
}

static RE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|\s*:?-{3,}").unwrap());

fn is_pipe_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn is_separator(line: &str) -> bool {
    RE_SEPARATOR.is_match(line.trim())
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        let line = self.lines.next()?;
        let trimmed = line.trim();

        if is_pipe_row(line) && self.lines.peek().is_some_and(|next| is_separator(next)) {
            let mut rows = vec![trimmed.to_string()];
            while let Some(next) = self.lines.next_if(|l| is_pipe_row(l)) {
                rows.push(next.trim().to_string());
            }
            return Some(Block::new(BlockKind::Table, rows.join("\n")));
        }

        if trimmed.is_empty() {
            return Some(Block::new(BlockKind::Spacer, ""));
        }

        let block = if let Some(rest) = trimmed.strip_prefix("### ") {
            Block::new(BlockKind::Heading3, rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            Block::new(BlockKind::Heading2, rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            Block::new(BlockKind::Heading1, rest.trim())
        } else if let Some(rest) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            Block::new(BlockKind::Bullet, rest.trim())
        } else {
            Block::new(BlockKind::Paragraph, trimmed)
        };
        Some(block)
    }
}

impl std::iter::FusedIterator for Blocks<'_> {}
