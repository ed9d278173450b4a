use std::cmp::Ordering;

use crate::breakdown::{BreakdownRow, BreakdownTable};
use crate::models::GradeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryOrder {
    Lexicographic,
    /// "2nd Year" before "10th Year".
    YearLevel,
}

/// Leading ordinal of a year label such as "3rd Year".
pub fn year_ordinal(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn sentinel_last(a: &str, b: &str, sentinel: &str) -> Option<Ordering> {
    match (a == sentinel, b == sentinel) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        (false, false) => None,
    }
}

/// Numbered labels first by ordinal, then unnumbered labels by text, sentinel last.
pub fn compare_year_labels(a: &str, b: &str, sentinel: &str) -> Ordering {
    if let Some(ord) = sentinel_last(a, b, sentinel) {
        return ord;
    }
    match (year_ordinal(a), year_ordinal(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn compare_labels(a: &str, b: &str, sentinel: &str) -> Ordering {
    sentinel_last(a, b, sentinel).unwrap_or_else(|| a.cmp(b))
}

/// Display-name order with the sentinel key always last.
pub fn compare_primary_keys<F>(a: &str, b: &str, sentinel: &str, display_name: &F) -> Ordering
where
    F: Fn(&str) -> String,
{
    sentinel_last(a, b, sentinel)
        .unwrap_or_else(|| display_name(a).cmp(&display_name(b)).then_with(|| a.cmp(b)))
}

/// Presentation order for a breakdown. The counts are untouched.
pub fn sort_breakdown<F>(
    table: BreakdownTable,
    primary_sentinel: &str,
    secondary_sentinel: &str,
    secondary_order: SecondaryOrder,
    display_name: F,
) -> BreakdownTable
where
    F: Fn(&str) -> String,
{
    let mut rows: Vec<BreakdownRow> = table.rows;
    rows.sort_by(|a, b| compare_primary_keys(&a.key, &b.key, primary_sentinel, &display_name));

    for row in &mut rows {
        row.cells.sort_by(|a, b| match secondary_order {
            SecondaryOrder::Lexicographic => compare_labels(&a.key, &b.key, secondary_sentinel),
            SecondaryOrder::YearLevel => compare_year_labels(&a.key, &b.key, secondary_sentinel),
        });
    }

    BreakdownTable { rows }
}

pub fn sort_grades(records: &mut [GradeRecord]) {
    records.sort_by(|a, b| a.subject.cmp(&b.subject));
}
