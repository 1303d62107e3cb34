//! Column catalog definitions for the employee dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{HrqlError, Result};
use crate::text::contains_phrase;

/// Canonical column names of the employee dataset.
pub mod columns {
    pub const EMPLOYEE_ID: &str = "Employee_ID";
    pub const DEPARTMENT: &str = "Department";
    pub const GENDER: &str = "Gender";
    pub const AGE: &str = "Age";
    pub const JOB_TITLE: &str = "Job_Title";
    pub const HIRE_DATE: &str = "Hire_Date";
    pub const YEARS_AT_COMPANY: &str = "Years_At_Company";
    pub const PERFORMANCE_SCORE: &str = "Performance_Score";
    pub const SATISFACTION_SCORE: &str = "Employee_Satisfaction_Score";
    pub const PRODUCTIVITY_SCORE: &str = "Productivity_Score";
    pub const ANNUAL_SALARY: &str = "Annual_Salary";
    pub const RETENTION_RISK_INDEX: &str = "Retention_Risk_Index";
    pub const NUMBER_OF_PROJECTS: &str = "Number_of_Projects";
    pub const OVERTIME_HOURS: &str = "Overtime_Hours";
    pub const REMOTE_WORK_FREQUENCY: &str = "Remote_Work_Frequency";
    pub const REMOTE_WORK_CATEGORY: &str = "Remote_Work_Category";
    pub const PERFORMANCE_LEVEL: &str = "Performance_Level";
    pub const SATISFACTION_LEVEL: &str = "Satisfaction_Level";
    pub const RETENTION_RISK_LEVEL: &str = "Retention_Risk_Level";
}

/// Labels produced by level binning, lowest first.
pub const LEVEL_LABELS: [&str; 3] = ["Low", "Medium", "High"];

/// Semantic classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    /// Free-form or enumerated text.
    Categorical,
    /// Numeric measure.
    Numeric,
    /// Calendar date.
    Temporal,
    /// Low/Medium/High label binned from a numeric column.
    DerivedLevel,
}

/// Upper bounds (inclusive) of the Low and Medium bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBins {
    pub low_max: f64,
    pub medium_max: f64,
}

impl LevelBins {
    /// Creates bins with the given inclusive upper bounds.
    #[must_use]
    pub const fn new(low_max: f64, medium_max: f64) -> Self {
        LevelBins {
            low_max,
            medium_max,
        }
    }

    /// Returns the level label for a score.
    #[must_use]
    pub fn label(&self, score: f64) -> &'static str {
        if score <= self.low_max {
            LEVEL_LABELS[0]
        } else if score <= self.medium_max {
            LEVEL_LABELS[1]
        } else {
            LEVEL_LABELS[2]
        }
    }
}

/// Source column and bins of a derived-level column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedLevel {
    /// Numeric column the level is computed from.
    pub source: String,
    /// Bin thresholds.
    pub bins: LevelBins,
}

/// Definition of a single catalog column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Canonical column name.
    pub name: String,
    /// Semantic type.
    pub semantic_type: SemanticType,
    /// User-facing synonyms, lowercase.
    pub aliases: Vec<String>,
    /// Numeric column that can also serve as a time axis.
    #[serde(default)]
    pub time_axis: bool,
    /// Binning definition for derived-level columns.
    #[serde(default)]
    pub derived: Option<DerivedLevel>,
}

impl ColumnDef {
    /// Creates a new column definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the column name is empty.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(HrqlError::SchemaError("Column name cannot be empty".into()));
        }
        Ok(ColumnDef {
            name,
            semantic_type,
            aliases: Vec::new(),
            time_axis: false,
            derived: None,
        })
    }

    /// Adds aliases to the column.
    #[must_use]
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|a| a.to_lowercase()));
        self
    }

    /// Marks the column as usable as a time axis.
    #[must_use]
    pub fn with_time_axis(mut self) -> Self {
        self.time_axis = true;
        self
    }

    /// Attaches a level binning definition.
    #[must_use]
    pub fn derived_from(mut self, source: &str, bins: LevelBins) -> Self {
        self.derived = Some(DerivedLevel {
            source: source.to_string(),
            bins,
        });
        self
    }

    /// Returns the column name as it would be written in a question.
    #[must_use]
    pub fn spoken_name(&self) -> String {
        self.name.replace('_', " ").to_lowercase()
    }

    /// Returns true for categorical and derived-level columns.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(
            self.semantic_type,
            SemanticType::Categorical | SemanticType::DerivedLevel
        )
    }

    /// Returns true for numeric columns.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.semantic_type == SemanticType::Numeric
    }

    /// Returns true for temporal columns and time-axis numeric columns.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        self.semantic_type == SemanticType::Temporal || self.time_axis
    }
}

/// Registry of the dataset's canonical columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnCatalog {
    /// Columns in iteration order.
    columns: Vec<ColumnDef>,
    /// Name of the entity identifier column.
    identifier: String,
}

impl ColumnCatalog {
    /// Creates a catalog with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if column names are duplicated, the identifier column
    /// is missing, or a derived level refers to an unknown source column.
    pub fn new(columns: Vec<ColumnDef>, identifier: impl Into<String>) -> Result<Self> {
        let catalog = ColumnCatalog {
            columns,
            identifier: identifier.into(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(HrqlError::SchemaError(format!(
                    "Duplicate column name '{}'",
                    col.name
                )));
            }
        }

        if !self.contains(&self.identifier) {
            return Err(HrqlError::SchemaError(format!(
                "Identifier column '{}' not found in catalog",
                self.identifier
            )));
        }

        for col in &self.columns {
            if let Some(derived) = &col.derived {
                if !self.contains(&derived.source) {
                    return Err(HrqlError::SchemaError(format!(
                        "Level column '{}' derives from unknown column '{}'",
                        col.name, derived.source
                    )));
                }
            }
        }

        Ok(())
    }

    /// Builds the catalog of the employee performance dataset.
    #[must_use]
    pub fn employees() -> Self {
        use columns::*;
        use SemanticType as S;

        let score_bins = LevelBins::new(1.67, 3.33);
        let risk_bins = LevelBins::new(0.67, 1.33);

        let defs = [
            (EMPLOYEE_ID, S::Categorical, &["employee id", "emp id", "empid", "employeeid", "employee", "employees", "id"][..]),
            (DEPARTMENT, S::Categorical, &["department", "departments", "dept"][..]),
            (GENDER, S::Categorical, &["gender", "genders", "male", "males", "female", "females"][..]),
            (AGE, S::Numeric, &["age"][..]),
            (JOB_TITLE, S::Categorical, &["job title", "job titles", "jobtitle", "jobtitles", "job role", "analyst", "analysts"][..]),
            (HIRE_DATE, S::Temporal, &["hire date", "hiring date", "hired"][..]),
            (YEARS_AT_COMPANY, S::Numeric, &["years at company", "tenure"][..]),
            (PERFORMANCE_SCORE, S::Numeric, &["performance", "performance score", "performance index", "perfomance"][..]),
            (SATISFACTION_SCORE, S::Numeric, &["satisfaction", "satisfaction score", "satisfcation"][..]),
            (PRODUCTIVITY_SCORE, S::Numeric, &["productivity", "productivity score"][..]),
            (ANNUAL_SALARY, S::Numeric, &["salary", "annual salary", "pay", "wage", "sallary"][..]),
            (RETENTION_RISK_INDEX, S::Numeric, &["retention", "retention risk", "retention risk index", "retension risk index"][..]),
            (NUMBER_OF_PROJECTS, S::Numeric, &["projects", "number of projects", "promotion", "promotions", "promotion rate"][..]),
            (OVERTIME_HOURS, S::Numeric, &["overtime", "overtime hours", "working hours", "hours"][..]),
            (REMOTE_WORK_FREQUENCY, S::Numeric, &["remote work frequency"][..]),
            (REMOTE_WORK_CATEGORY, S::Categorical, &["work mode", "work modes", "remote work", "remote", "work from home", "hybrid"][..]),
            (PERFORMANCE_LEVEL, S::DerivedLevel, &["performance level", "performance levels"][..]),
            (SATISFACTION_LEVEL, S::DerivedLevel, &["satisfaction level", "satisfaction levels"][..]),
            (RETENTION_RISK_LEVEL, S::DerivedLevel, &["retention risk level", "retention risk levels", "retention level"][..]),
        ];

        let columns = defs
            .into_iter()
            .map(|(name, semantic_type, aliases)| {
                let def = ColumnDef {
                    name: name.to_string(),
                    semantic_type,
                    aliases: Vec::new(),
                    time_axis: false,
                    derived: None,
                }
                .with_aliases(aliases);
                match name {
                    YEARS_AT_COMPANY => def.with_time_axis(),
                    PERFORMANCE_LEVEL => def.derived_from(PERFORMANCE_SCORE, score_bins),
                    SATISFACTION_LEVEL => def.derived_from(SATISFACTION_SCORE, score_bins),
                    RETENTION_RISK_LEVEL => def.derived_from(RETENTION_RISK_INDEX, risk_bins),
                    _ => def,
                }
            })
            .collect();

        ColumnCatalog {
            columns,
            identifier: EMPLOYEE_ID.to_string(),
        }
    }

    /// Returns all column definitions in iteration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns all canonical column names in iteration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the identifier column name.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Finds a column definition by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks if a column exists in the catalog.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the semantic type of a column.
    #[must_use]
    pub fn semantic_type(&self, name: &str) -> Option<SemanticType> {
        self.get(name).map(|c| c.semantic_type)
    }

    /// Returns every (alias, column) pair, longest alias first.
    ///
    /// Equal-length aliases keep catalog order.
    #[must_use]
    pub fn alias_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .columns
            .iter()
            .flat_map(|c| c.aliases.iter().map(move |a| (a.as_str(), c.name.as_str())))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        entries
    }

    /// Returns true if the question names the column literally or by alias.
    ///
    /// `question` must already be lowercase.
    #[must_use]
    pub fn is_mentioned(&self, name: &str, question: &str) -> bool {
        let Some(col) = self.get(name) else {
            return false;
        };
        contains_phrase(question, &col.name.to_lowercase())
            || contains_phrase(question, &col.spoken_name())
            || col.aliases.iter().any(|a| contains_phrase(question, a))
    }

    /// Returns the derived-level columns.
    pub fn level_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.derived.is_some())
    }
}

impl Default for ColumnCatalog {
    fn default() -> Self {
        ColumnCatalog::employees()
    }
}
