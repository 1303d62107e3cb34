//! Contract tests for the public API (Engine::ask, executor) and result shapes.

use hrql::catalog::columns;
use hrql::{
    AnswerStatus, ChartKind, CsvImportConfig, Dataset, DatasetLoader, Engine, EngineConfig, Session,
    Value,
};
use std::sync::Arc;

const EMPLOYEES: &str = "\
Employee_ID,Department,Gender,Age,Job_Title,Hire_Date,Performance_Score,Employee_Satisfaction_Score,Productivity_Score,Annual Salary,Retention_Risk_Index,Number_of_Projects,Overtime_Hours,Remote_Work_Frequency
1,Sales,Male,34,Data Analyst,2019-04-01,4,4.2,80,\"$60,000\",0.5,3,10,0
2,IT,Female,41,Engineer,2016-08-15,5,3.9,92,\"$95,000\",0.3,7,22,100
3,Sales,Female,29,Sales Analyst,2021-01-10,3,2.5,70,\"$70,000\",1.1,2,5,50
4,HR,Male,52,Manager,2012-02-20,2,1.5,60,\"$88,000\",1.6,4,15,0
5,IT,Male,38,Developer,2018-11-05,4,4.8,85,\"$91,000\",0.9,5,30,50
6,Finance,Female,45,Financial Analyst,2015-06-30,1,3.1,55,\"$72,000\",1.4,1,2,100
";

fn dataset() -> Dataset {
    let config = CsvImportConfig::sequential()
        .with_reference_date(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"));
    let loader = DatasetLoader::new(Arc::new(hrql::ColumnCatalog::employees()), config);
    let (dataset, _) = loader.load_reader(EMPLOYEES.as_bytes()).expect("load fixture");
    dataset
}

fn engine() -> Engine {
    Engine::employees(dataset()).expect("create engine")
}

fn ask(question: &str) -> hrql::Answer {
    engine().ask(&mut Session::new(), question)
}

fn ids(answer: &hrql::Answer) -> Vec<i64> {
    answer
        .result
        .as_ref()
        .expect("result")
        .column_values(columns::EMPLOYEE_ID)
        .into_iter()
        .filter_map(Value::as_int64)
        .collect()
}

// =============================================================================
// Scenario Contracts
// =============================================================================

mod scenario_contracts {
    use super::*;
    use hrql::parser::{AggregateFunction, Condition, Operation, SortDirection};

    #[test]
    fn test_employee_lookup() {
        let answer = ask("Employee 3");
        assert_eq!(answer.status, AnswerStatus::Answered);
        let result = answer.result.as_ref().expect("result");
        assert_eq!(result.row_count(), 1);
        assert!(result.has_column(columns::DEPARTMENT));
        assert!(result.has_column(columns::JOB_TITLE));
        assert!(result.has_column(columns::PERFORMANCE_LEVEL));
        assert!(answer.reply.contains("Department: Sales"));
        assert!(answer.reply.contains("Remote Work: Hybrid"));
    }

    #[test]
    fn test_employee_lookup_absent() {
        let answer = ask("Employee 123");
        assert_eq!(answer.status, AnswerStatus::EmptyResult);
        assert!(answer.reply.starts_with("No employee found with ID 123"));
        assert!(answer.result.expect("result").is_empty());
    }

    #[test]
    fn test_average_salary_for_analyst() {
        let answer = ask("Average salary for analyst");
        let d = answer.descriptor.as_ref().expect("descriptor");
        assert_eq!(d.operation, Operation::Aggregate);
        assert_eq!(d.aggregate_function, Some(AggregateFunction::Mean));
        assert_eq!(d.aggregate_column.as_deref(), Some(columns::ANNUAL_SALARY));
        assert_eq!(
            d.conditions,
            vec![Condition::contains(columns::JOB_TITLE, Value::text("Analyst"))]
        );

        let result = answer.result.as_ref().expect("result");
        assert_eq!(result.columns, vec!["mean(Annual_Salary)"]);
        let mean = result.scalar_value().and_then(Value::as_float64).expect("numeric");
        assert!((mean - 67_333.333).abs() < 0.01);
        assert_eq!(answer.chart, Some(ChartKind::Bar));
    }

    #[test]
    fn test_list_departments() {
        let answer = ask("List departments");
        let d = answer.descriptor.as_ref().expect("descriptor");
        assert_eq!(d.operation, Operation::ListUnique);
        let values: Vec<String> = answer
            .result
            .as_ref()
            .expect("result")
            .column_values(columns::DEPARTMENT)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(values, vec!["Finance", "HR", "IT", "Sales"]);
        assert_eq!(answer.reply, "Unique Department: Finance, HR, IT, Sales");
    }

    #[test]
    fn test_count_of_males() {
        let answer = ask("Count of males");
        let d = answer.descriptor.as_ref().expect("descriptor");
        assert_eq!(d.operation, Operation::CountValue);
        assert_eq!(d.count_value, Some(Value::text("Male")));
        assert_eq!(
            answer.result.as_ref().and_then(|r| r.scalar_value()),
            Some(&Value::Int64(3))
        );
        assert_eq!(answer.reply, "Count of Male: 3");
        assert_eq!(answer.chart, Some(ChartKind::Pie));
    }

    #[test]
    fn test_top_5_salary() {
        let answer = ask("Top 5 salary");
        let d = answer.descriptor.as_ref().expect("descriptor");
        assert_eq!(d.operation, Operation::Sort);
        assert_eq!(d.sort_direction, Some(SortDirection::Desc));
        assert_eq!(d.limit, Some(5));
        let result = answer.result.as_ref().expect("result");
        assert_eq!(result.columns[0], columns::EMPLOYEE_ID);
        assert_eq!(ids(&answer), vec![2, 5, 4, 6, 3]);
    }

    #[test]
    fn test_count_by_department() {
        let answer = ask("Count by department");
        let result = answer.result.as_ref().expect("result");
        assert_eq!(result.columns, vec![columns::DEPARTMENT, "Count"]);
        let total: i64 = result
            .column_values("Count")
            .into_iter()
            .filter_map(Value::as_int64)
            .sum();
        assert_eq!(total, 6);
        assert_eq!(answer.reply, "Count by Department: Sales: 2, IT: 2, HR: 1, Finance: 1");
    }

    #[test]
    fn test_salary_filter_puts_identifier_first() {
        let answer = ask("Employee ID with salary > 90,000");
        assert_eq!(ids(&answer), vec![2, 5]);
        assert_eq!(answer.reply, "Found 2 employees matching the criteria.");
    }

    #[test]
    fn test_unresolved_lists_known_columns() {
        let answer = ask("tell me something interesting");
        assert!(matches!(answer.status, AnswerStatus::Failed(hrql::ErrorKind::UnresolvedQuery)));
        assert!(answer.reply.contains(columns::ANNUAL_SALARY));
        assert!(answer.reply.contains("Count of males"));
    }

    #[test]
    fn test_empty_result_is_a_status() {
        let answer = ask("employees with age above 90");
        assert_eq!(answer.status, AnswerStatus::EmptyResult);
        assert!(answer.chart.is_none());
    }

    #[test]
    fn test_aggregate_over_no_rows_is_empty_result() {
        let answer = ask("average salary of employees with salary > 1000000");
        assert_eq!(answer.status, AnswerStatus::EmptyResult);
        assert_eq!(answer.reply, "No employees found matching the criteria.");
        assert!(answer.chart.is_none());

        let count = ask("how many employees with salary > 1000000");
        assert_eq!(count.status, AnswerStatus::Answered);
    }
}

// =============================================================================
// Executor Properties
// =============================================================================

mod executor_properties {
    use super::*;
    use hrql::executor::{execute, group_top_rows};
    use hrql::parser::{AggregateFunction, Operation, QueryDescriptor, SortDirection};
    use proptest::prelude::*;

    const DEPARTMENTS: [&str; 4] = ["Sales", "IT", "HR", "Finance"];

    fn build(rows: &[(usize, Option<i64>)]) -> Dataset {
        Dataset::from_rows(
            vec!["Department".into(), "Score".into()],
            rows.iter()
                .map(|(d, s)| {
                    vec![
                        Value::text(DEPARTMENTS[*d]),
                        s.map_or(Value::Null, Value::Int64),
                    ]
                })
                .collect(),
        )
        .expect("build dataset")
    }

    fn rows_strategy() -> impl Strategy<Value = Vec<(usize, Option<i64>)>> {
        proptest::collection::vec((0..DEPARTMENTS.len(), proptest::option::of(0i64..6)), 0..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_count_value_matches_exact_equality(rows in rows_strategy(), pick in 0..DEPARTMENTS.len()) {
            let ds = build(&rows);
            let d = QueryDescriptor {
                operation: Operation::CountValue,
                aggregate_function: Some(AggregateFunction::Count),
                aggregate_column: Some("Department".into()),
                count_value: Some(Value::text(DEPARTMENTS[pick])),
                ..QueryDescriptor::default()
            };
            let expected = rows.iter().filter(|(d, _)| *d == pick).count() as i64;
            let table = execute(&ds, &d).expect("execute");
            prop_assert_eq!(table.scalar_value(), Some(&Value::Int64(expected)));
        }

        #[test]
        fn test_list_unique_is_sorted_and_distinct(rows in rows_strategy()) {
            let ds = build(&rows);
            let d = QueryDescriptor {
                operation: Operation::ListUnique,
                list_column: Some("Score".into()),
                output_columns: vec!["Score".into()],
                ..QueryDescriptor::default()
            };
            let table = execute(&ds, &d).expect("execute");
            let values: Vec<i64> = table
                .column_values("Score")
                .into_iter()
                .map(|v| v.as_int64().expect("no missing values"))
                .collect();
            let mut expected: Vec<i64> = rows.iter().filter_map(|(_, s)| *s).collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(values, expected);
        }

        #[test]
        fn test_group_top_keeps_limit_plus_ties(rows in rows_strategy(), limit in 1usize..4) {
            let ds = build(&rows);
            let all: Vec<usize> = (0..ds.row_count()).collect();
            let kept = group_top_rows(&ds, &all, "Department", "Score", SortDirection::Desc, limit, true)
                .expect("group top");

            for (index, dept) in DEPARTMENTS.iter().enumerate() {
                let mut scores: Vec<i64> = rows
                    .iter()
                    .filter(|(d, _)| *d == index)
                    .filter_map(|(_, s)| *s)
                    .collect();
                scores.sort_unstable_by(|a, b| b.cmp(a));
                let returned = kept
                    .iter()
                    .filter(|&&r| ds.value(r, "Department") == Some(&Value::text(*dept)))
                    .count();
                let expected = if scores.len() <= limit {
                    scores.len()
                } else {
                    let boundary = scores[limit - 1];
                    scores.iter().filter(|&&s| s >= boundary).count()
                };
                prop_assert!(returned >= limit.min(scores.len()));
                prop_assert_eq!(returned, expected);
            }
        }

        #[test]
        fn test_execution_is_idempotent(rows in rows_strategy()) {
            let ds = build(&rows);
            let d = QueryDescriptor {
                operation: Operation::GroupAggregate,
                aggregate_function: Some(AggregateFunction::Count),
                group_by_column: Some("Department".into()),
                output_columns: vec!["Department".into(), "Count".into()],
                ..QueryDescriptor::default()
            };
            prop_assert_eq!(execute(&ds, &d).expect("first"), execute(&ds, &d).expect("second"));
        }
    }
}

// =============================================================================
// Configuration Contracts
// =============================================================================

mod config_contracts {
    use super::*;

    #[test]
    fn test_group_top_ties_can_be_dropped() {
        let rows = vec![
            vec![Value::Int64(1), Value::text("IT"), Value::text("Engineer"), Value::Int64(5)],
            vec![Value::Int64(2), Value::text("IT"), Value::text("Developer"), Value::Int64(5)],
            vec![Value::Int64(3), Value::text("IT"), Value::text("Engineer"), Value::Int64(1)],
        ];
        let ds = Dataset::from_rows(
            vec![
                columns::EMPLOYEE_ID.into(),
                columns::DEPARTMENT.into(),
                columns::JOB_TITLE.into(),
                columns::PERFORMANCE_SCORE.into(),
            ],
            rows,
        )
        .expect("dataset");
        let catalog = Arc::new(hrql::ColumnCatalog::employees());
        let question = "top 1 performance in each department";

        let with_ties = Engine::new(Arc::clone(&catalog), Arc::new(ds.clone()), EngineConfig::default())
            .expect("engine");
        let answer = with_ties.ask(&mut Session::new(), question);
        assert_eq!(ids(&answer), vec![1, 2]);

        let config = EngineConfig::default().with_group_top_ties(false);
        let without_ties = Engine::new(catalog, Arc::new(ds), config).expect("engine");
        let answer = without_ties.ask(&mut Session::new(), question);
        assert_eq!(ids(&answer), vec![1]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_default_limit(0);
        assert!(Engine::new(
            Arc::new(hrql::ColumnCatalog::employees()),
            Arc::new(dataset()),
            config
        )
        .is_err());
    }
}
