//! Columns computed once when a dataset is loaded.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::catalog::{columns, ColumnCatalog, LevelBins};
use crate::error::Result;
use crate::storage::Dataset;
use crate::types::Value;

/// Average days per year used for tenure.
const DAYS_PER_YEAR: f64 = 365.25;

/// Work mode labels derived from the remote work frequency.
pub const WORK_FROM_OFFICE: &str = "Work From Office";
pub const WORK_FROM_HOME: &str = "Work From Home";
pub const HYBRID: &str = "Hybrid";

/// Maps a remote work frequency (percent of time remote) to a work mode.
#[must_use]
pub fn remote_work_category(frequency: &Value) -> Value {
    match frequency.to_f64() {
        Some(f) if f == 0.0 => Value::text(WORK_FROM_OFFICE),
        Some(f) if f == 100.0 => Value::text(WORK_FROM_HOME),
        Some(_) => Value::text(HYBRID),
        None => Value::Null,
    }
}

/// Years elapsed between a hire date and the reference date.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn years_between(hired: NaiveDate, reference: NaiveDate) -> f64 {
    (reference - hired).num_days() as f64 / DAYS_PER_YEAR
}

fn level_values(dataset: &Dataset, source: &str, bins: LevelBins) -> Option<Vec<Value>> {
    let column = dataset.column(source)?;
    Some(
        column
            .iter()
            .map(|v| v.to_f64().map_or(Value::Null, |s| Value::text(bins.label(s))))
            .collect(),
    )
}

/// Adds tenure, work mode and level columns to a freshly loaded dataset.
///
/// Tenure replaces any loaded `Years_At_Company` when hire dates are present.
/// Level and work mode columns are only computed when absent. Columns whose
/// source is missing are skipped with a warning.
///
/// # Errors
///
/// Returns an error if a computed column cannot be attached.
pub fn derive_columns(
    mut dataset: Dataset,
    catalog: &ColumnCatalog,
    reference_date: NaiveDate,
) -> Result<Dataset> {
    if let Some(hire_dates) = dataset.column(columns::HIRE_DATE) {
        let tenure = hire_dates
            .iter()
            .map(|v| {
                v.to_date()
                    .map_or(Value::Null, |d| Value::Float64(years_between(d, reference_date)))
            })
            .collect();
        dataset.set_column(columns::YEARS_AT_COMPANY, tenure)?;
        debug!(reference = %reference_date, "computed tenure");
    } else if !dataset.has_column(columns::YEARS_AT_COMPANY) {
        warn!(column = columns::YEARS_AT_COMPANY, "no hire dates; tenure unavailable");
    }

    if catalog.contains(columns::REMOTE_WORK_CATEGORY)
        && !dataset.has_column(columns::REMOTE_WORK_CATEGORY)
    {
        match dataset.column(columns::REMOTE_WORK_FREQUENCY) {
            Some(frequency) => {
                let modes = frequency.iter().map(remote_work_category).collect();
                dataset.set_column(columns::REMOTE_WORK_CATEGORY, modes)?;
            }
            None => warn!(
                column = columns::REMOTE_WORK_CATEGORY,
                source = columns::REMOTE_WORK_FREQUENCY,
                "source column missing; skipping"
            ),
        }
    }

    for level in catalog.level_columns() {
        let Some(derived) = &level.derived else {
            continue;
        };
        if dataset.has_column(&level.name) {
            continue;
        }
        match level_values(&dataset, &derived.source, derived.bins) {
            Some(values) => dataset.set_column(&level.name, values)?,
            None => warn!(
                column = %level.name,
                source = %derived.source,
                "source column missing; skipping"
            ),
        }
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(names: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::from_rows(names.iter().map(|s| (*s).to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_remote_work_category() {
        assert_eq!(remote_work_category(&Value::Int64(0)), Value::text(WORK_FROM_OFFICE));
        assert_eq!(remote_work_category(&Value::Float64(100.0)), Value::text(WORK_FROM_HOME));
        assert_eq!(remote_work_category(&Value::Int64(50)), Value::text(HYBRID));
        assert_eq!(remote_work_category(&Value::Null), Value::Null);
    }

    #[test]
    fn test_years_between() {
        let hired = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let years = years_between(hired, reference);
        assert!((years - 1461.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn test_derive_levels_and_modes() {
        let ds = dataset(
            &[columns::EMPLOYEE_ID, columns::PERFORMANCE_SCORE, columns::REMOTE_WORK_FREQUENCY],
            vec![
                vec![Value::Int64(1), Value::Int64(1), Value::Int64(0)],
                vec![Value::Int64(2), Value::Float64(3.33), Value::Int64(25)],
                vec![Value::Int64(3), Value::Int64(5), Value::Null],
            ],
        );
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let ds = derive_columns(ds, &ColumnCatalog::employees(), reference).unwrap();

        let levels: Vec<_> = ds.column(columns::PERFORMANCE_LEVEL).unwrap().iter().cloned().collect();
        assert_eq!(levels, vec![Value::text("Low"), Value::text("Medium"), Value::text("High")]);
        assert_eq!(ds.value(1, columns::REMOTE_WORK_CATEGORY), Some(&Value::text(HYBRID)));
        assert_eq!(ds.value(2, columns::REMOTE_WORK_CATEGORY), Some(&Value::Null));
        // sources absent from the dataset are skipped
        assert!(!ds.has_column(columns::SATISFACTION_LEVEL));
        assert!(!ds.has_column(columns::YEARS_AT_COMPANY));
    }

    #[test]
    fn test_tenure_replaces_loaded_column() {
        let hired = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
        let ds = dataset(
            &[columns::EMPLOYEE_ID, columns::HIRE_DATE, columns::YEARS_AT_COMPANY],
            vec![vec![Value::Int64(1), Value::date(hired), Value::Int64(99)]],
        );
        let reference = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let ds = derive_columns(ds, &ColumnCatalog::employees(), reference).unwrap();
        let years = ds.value(0, columns::YEARS_AT_COMPANY).and_then(Value::to_f64).unwrap();
        assert!((years - 10.0).abs() < 0.01);
    }
}
