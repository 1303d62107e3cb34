//! Chart type recommendation.
//!
//! Rules are checked in order and the first whose keywords and column
//! types both match decides the chart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{columns, ColumnCatalog};
use crate::parser::QueryDescriptor;
use crate::text::{contains_any, normalize};

/// Kind of chart suited to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Pie,
    Donut,
    Bar,
    Treemap,
    Histogram,
    Scatter,
    Table,
}

impl ChartKind {
    /// Returns the chart name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Bar => "bar",
            ChartKind::Treemap => "treemap",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Table => "table",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const TREND_KEYWORDS: &[&str] = &["over time", "trend", "trends", "year", "years", "hired", "years at company"];
const COUNT_KEYWORDS: &[&str] = &["count", "number of", "how many", "total"];
const AGGREGATE_KEYWORDS: &[&str] = &["average", "mean", "sum", "max", "maximum", "min", "minimum"];
const DISTRIBUTION_KEYWORDS: &[&str] = &["distribution", "range", "spread"];

/// Dataset columns a descriptor touches, first mention first.
///
/// Synthetic labels such as `count(employees)` are dropped.
#[must_use]
pub fn columns_involved(descriptor: &QueryDescriptor, catalog: &ColumnCatalog) -> Vec<String> {
    descriptor
        .referenced_columns()
        .into_iter()
        .filter(|c| catalog.contains(c))
        .map(str::to_string)
        .collect()
}

fn is_grouping(question: &str) -> bool {
    contains_any(question, &["by", "per"])
        || question
            .split_whitespace()
            .any(|w| w == "wise" || w.ends_with("-wise"))
}

/// Recommends a chart for a question and the columns its query involves.
#[must_use]
pub fn recommend(question: &str, involved: &[String], catalog: &ColumnCatalog) -> ChartKind {
    let q = normalize(question);
    let defs: Vec<_> = involved.iter().filter_map(|c| catalog.get(c)).collect();
    let categorical = defs
        .iter()
        .filter(|c| c.is_categorical() && c.name != catalog.identifier())
        .count();
    let numeric = defs.iter().filter(|c| c.is_numeric()).count();
    let temporal = defs.iter().any(|c| c.is_temporal());

    if temporal && contains_any(&q, TREND_KEYWORDS) {
        return ChartKind::Line;
    }
    if categorical > 0 && contains_any(&q, COUNT_KEYWORDS) {
        let remote = contains_any(&q, &["remote work", "work mode", "work modes"])
            || involved.iter().any(|c| c == columns::REMOTE_WORK_CATEGORY);
        return if remote { ChartKind::Donut } else { ChartKind::Pie };
    }
    if numeric > 0 && contains_any(&q, AGGREGATE_KEYWORDS) {
        return ChartKind::Bar;
    }
    if categorical >= 2 && is_grouping(&q) {
        return ChartKind::Treemap;
    }
    if numeric > 0 && contains_any(&q, DISTRIBUTION_KEYWORDS) {
        return ChartKind::Histogram;
    }
    if numeric >= 2 {
        return ChartKind::Scatter;
    }
    ChartKind::Table
}
