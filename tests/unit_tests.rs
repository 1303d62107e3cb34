//! Unit tests for hrql's public building blocks.

use hrql::catalog::{columns, ColumnCatalog, SemanticType};
use hrql::types::Value;
use hrql::{EngineConfig, HrqlError};
use std::cmp::Ordering;
use std::sync::Arc;

// =============================================================================
// Error Tests
// =============================================================================

mod error_tests {
    use super::*;
    use hrql::ErrorKind;

    #[test]
    fn test_unresolved_query_display() {
        let err = HrqlError::UnresolvedQuery {
            known_columns: vec!["Department".into(), "Gender".into()],
            examples: vec!["List departments".into(), "Count of males".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Department, Gender"));
        assert!(msg.contains("List departments; Count of males"));
        assert_eq!(err.kind(), ErrorKind::UnresolvedQuery);
    }

    #[test]
    fn test_unknown_column_display() {
        let err = HrqlError::unknown_column("Shoe_Size", ["Age", "Gender"]);
        assert!(err.to_string().contains("'Shoe_Size'"));
        assert!(err.to_string().contains("Age, Gender"));
        assert_eq!(err.kind(), ErrorKind::UnknownColumn);
    }

    #[test]
    fn test_internal_kinds() {
        assert_eq!(HrqlError::ImportError("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(HrqlError::ValidationError("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(
            HrqlError::UnresolvedFollowUp("x".into()).kind(),
            ErrorKind::UnresolvedFollowUp
        );
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.word_match_threshold, 50);
        assert_eq!(config.phrase_match_threshold, 80);
        assert_eq!(config.default_limit, 5);
        assert!(config.keep_group_top_ties);
        assert_eq!(config.history_window, 3);
        assert_eq!(config.follow_up_extra_columns, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = EngineConfig::new()
            .with_word_match_threshold(60)
            .with_default_limit(10);
        assert_eq!(config.word_match_threshold, 60);
        assert_eq!(config.default_limit, 10);
        assert!(EngineConfig::new().with_phrase_match_threshold(101).validate().is_err());
    }
}

// =============================================================================
// Catalog and Resolver Tests
// =============================================================================

mod catalog_tests {
    use super::*;
    use hrql::resolver::ColumnResolver;

    #[test]
    fn test_employee_catalog_order_and_types() {
        let catalog = ColumnCatalog::employees();
        let names = catalog.names();
        assert_eq!(names.first(), Some(&columns::EMPLOYEE_ID));
        assert_eq!(names.last(), Some(&columns::RETENTION_RISK_LEVEL));
        assert_eq!(catalog.identifier(), columns::EMPLOYEE_ID);
        assert_eq!(catalog.semantic_type(columns::HIRE_DATE), Some(SemanticType::Temporal));
        assert_eq!(
            catalog.semantic_type(columns::PERFORMANCE_LEVEL),
            Some(SemanticType::DerivedLevel)
        );
    }

    #[test]
    fn test_alias_beats_fuzzy() {
        let resolver = ColumnResolver::new(Arc::new(ColumnCatalog::employees()));
        let r = resolver.resolve("pay", 80);
        assert_eq!(r.column.as_deref(), Some(columns::ANNUAL_SALARY));
        assert_eq!(r.confidence, 100);
    }

    #[test]
    fn test_fuzzy_threshold() {
        let resolver = ColumnResolver::new(Arc::new(ColumnCatalog::employees()));
        let r = resolver.resolve("qqqq", 80);
        assert_eq!(r.column, None);
        assert_eq!(r.confidence, 0);
    }
}

// =============================================================================
// Value Tests
// =============================================================================

mod value_tests {
    use super::*;

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(Value::Int64(3).compare(&Value::Float64(3.0)), Some(Ordering::Equal));
        assert_eq!(Value::text("a").compare(&Value::Int64(1)), None);
    }

    #[test]
    fn test_lenient_number_parsing() {
        assert_eq!(Value::text("$90,000").to_f64(), Some(90_000.0));
        assert_eq!(Value::text("n/a").to_f64(), None);
    }

    #[test]
    fn test_null_sorts_last() {
        let mut values = vec![Value::Null, Value::Int64(2), Value::Int64(1)];
        values.sort_by(Value::total_cmp);
        assert_eq!(values, vec![Value::Int64(1), Value::Int64(2), Value::Null]);
    }
}

// =============================================================================
// Intent and Chart Tests
// =============================================================================

mod intent_tests {
    use chrono::{TimeZone, Utc};
    use hrql::intent::classify_at;

    #[test]
    fn test_anchored_small_talk() {
        let now = Utc.with_ymd_and_hms(2025, 3, 3, 9, 5, 0).single().expect("valid time");
        assert_eq!(classify_at("good morning", &now).map(|m| m.name).as_deref(), Some("good_morning"));
        assert_eq!(classify_at("tell me a joke", &now).map(|m| m.name).as_deref(), Some("joke"));
        assert!(classify_at("count of males", &now).is_none());
        let day = classify_at("what day is it?", &now).expect("day intent");
        assert_eq!(day.reply, "Today is Monday.");
    }
}

mod chart_tests {
    use super::*;
    use hrql::chart::{columns_involved, recommend};
    use hrql::parser::QueryParser;
    use hrql::ChartKind;

    fn chart_for(question: &str) -> ChartKind {
        let catalog = Arc::new(ColumnCatalog::employees());
        let parser = QueryParser::new(Arc::clone(&catalog), EngineConfig::default());
        let descriptor = parser.parse(question).expect("parse");
        recommend(question, &columns_involved(&descriptor, &catalog), &catalog)
    }

    #[test]
    fn test_parsed_questions() {
        assert_eq!(chart_for("Average salary for analyst"), ChartKind::Bar);
        assert_eq!(chart_for("Count by department"), ChartKind::Pie);
        assert_eq!(chart_for("List departments"), ChartKind::Table);
    }

    #[test]
    fn test_chart_names_serialize_lowercase() {
        assert_eq!(ChartKind::Treemap.to_string(), "treemap");
    }
}
