//! Global and per-group ranking.

use std::cmp::Ordering;

use crate::executor::aggregate::{column, group_rows};
use crate::error::Result;
use crate::parser::SortDirection;
use crate::storage::{ColumnStorage, Dataset};

fn numeric(column: &ColumnStorage, row: usize) -> Option<f64> {
    column.get(row).and_then(|v| v.to_f64())
}

fn directed(a: f64, b: f64, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => a.total_cmp(&b),
        SortDirection::Desc => b.total_cmp(&a),
    }
}

/// Stable sort of the selected rows by a numeric column.
///
/// Rows whose cell is not numeric go last, in their original order. The
/// result is truncated to `limit` when given.
///
/// # Errors
///
/// Returns `UnknownColumn` if the sort column is missing.
pub fn sort_rows(
    dataset: &Dataset,
    rows: &[usize],
    sort_column: &str,
    direction: SortDirection,
    limit: Option<usize>,
) -> Result<Vec<usize>> {
    let col = column(dataset, sort_column)?;
    let mut keyed: Vec<(usize, Option<f64>)> = rows.iter().map(|&r| (r, numeric(col, r))).collect();
    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => directed(x, y, direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    let mut sorted: Vec<usize> = keyed.into_iter().map(|(r, _)| r).collect();
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    Ok(sorted)
}

/// Top `limit` rows of each group, groups in ascending key order.
///
/// Only rows with a numeric sort value compete. With `keep_ties`, rows equal
/// to the last kept value are also kept.
///
/// # Errors
///
/// Returns `UnknownColumn` if the group or sort column is missing.
pub fn group_top_rows(
    dataset: &Dataset,
    rows: &[usize],
    group_by: &str,
    sort_column: &str,
    direction: SortDirection,
    limit: usize,
    keep_ties: bool,
) -> Result<Vec<usize>> {
    let sort_col = column(dataset, sort_column)?;
    let mut groups = group_rows(column(dataset, group_by)?, rows);
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out = Vec::new();
    for (_, members) in groups {
        let mut ranked: Vec<(usize, f64)> = members
            .into_iter()
            .filter_map(|r| numeric(sort_col, r).map(|v| (r, v)))
            .collect();
        ranked.sort_by(|a, b| directed(a.1, b.1, direction));

        let mut keep = limit.min(ranked.len());
        if keep_ties && keep > 0 {
            let boundary = ranked[keep - 1].1;
            while keep < ranked.len() && ranked[keep].1 == boundary {
                keep += 1;
            }
        }
        out.extend(ranked[..keep].iter().map(|(r, _)| *r));
    }
    Ok(out)
}
