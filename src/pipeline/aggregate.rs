//! Section aggregators: date-range filter and group-by reducers.
//!
//! Every reducer takes accessor closures instead of field names so one
//! implementation serves all five record types. Sums are `i64` cents;
//! conversion to a display decimal happens in [`crate::format`] only.
//! Group order is first-seen order, which for month grouping is not
//! necessarily chronological.

use crate::format::parse_date;
use crate::model::DateRange;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the synthetic row appended by [`group_by_dimension`] and [`with_total`].
pub const TOTAL_KEY: &str = "Total";

/// One summarised group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub group_key: String,
    pub total_cents: i64,
    pub count: usize,
    /// Set only on the row appended by [`with_total`].
    #[serde(default)]
    pub total: bool,
}

impl AggregateRow {
    pub fn is_total(&self) -> bool {
        self.total
    }
}

/// Keep records whose date falls inside `range` (inclusive).
///
/// Records whose date does not parse are dropped, even for an unbounded range.
pub fn filter_by_date_range<'a, T, F>(records: &'a [T], range: &DateRange, field: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    records
        .iter()
        .filter(|r| parse_date(field(*r)).is_some_and(|d| range.contains(d)))
        .collect()
}

/// Locale-neutral `YYYY-MM` grouping key.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Sum `value` and count records per `YYYY-MM` of `field`.
pub fn group_by_month<T, F, V>(records: &[&T], field: F, value: V) -> Vec<AggregateRow>
where
    F: Fn(&T) -> &str,
    V: Fn(&T) -> i64,
{
    let mut groups = Groups::default();
    for &r in records {
        if let Some(date) = parse_date(field(r)) {
            groups.add(&month_key(date), value(r));
        }
    }
    groups.rows
}

/// Sum `value` and count records per key, then append a `"Total"` row.
///
/// Blank keys are grouped under `unspecified`.
pub fn group_by_dimension<T, K, V>(
    records: &[&T],
    key: K,
    value: V,
    unspecified: &str,
) -> Vec<AggregateRow>
where
    K: Fn(&T) -> &str,
    V: Fn(&T) -> i64,
{
    let mut groups = Groups::default();
    for &r in records {
        let k = key(r).trim();
        let k = if k.is_empty() { unspecified } else { k };
        groups.add(k, value(r));
    }
    with_total(groups.rows)
}

/// Append a `"Total"` row summing every row already present.
pub fn with_total(mut rows: Vec<AggregateRow>) -> Vec<AggregateRow> {
    let total = AggregateRow {
        group_key: TOTAL_KEY.to_string(),
        total_cents: rows
            .iter()
            .fold(0i64, |acc, r| acc.saturating_add(r.total_cents)),
        count: rows.iter().map(|r| r.count).sum(),
        total: true,
    };
    rows.push(total);
    rows
}

/// Ungrouped sum over the same filtered set.
pub fn sum_cents<T, V>(records: &[&T], value: V) -> i64
where
    V: Fn(&T) -> i64,
{
    records
        .iter()
        .fold(0i64, |acc, &r| acc.saturating_add(value(r)))
}

/// Insertion-ordered accumulator.
#[derive(Default)]
struct Groups {
    index: HashMap<String, usize>,
    rows: Vec<AggregateRow>,
}

impl Groups {
    fn add(&mut self, key: &str, cents: i64) {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.rows.push(AggregateRow {
                    group_key: key.to_string(),
                    total_cents: 0,
                    count: 0,
                    total: false,
                });
                self.index.insert(key.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        let row = &mut self.rows[i];
        row.total_cents = row.total_cents.saturating_add(cents);
        row.count += 1;
    }
}
