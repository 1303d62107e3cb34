//! Integration tests for the full question workflow.

use hrql::catalog::columns;
use hrql::{AnswerStatus, ChartKind, CsvImportConfig, Engine, EngineConfig, Session, Value};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const EMPLOYEES: &str = "\
Employee_ID,Department,Gender,Age,Job_Title,Hire_Date,Performance_Score,Employee_Satisfaction_Score,Productivity_Score,Annual Salary,Retention_Risk_Index,Number_of_Projects,Overtime_Hours,Remote_Work_Frequency
1,Sales,Male,34,Data Analyst,2019-04-01,4,4.2,80,\"$60,000\",0.5,3,10,0
2,IT,Female,41,Engineer,2016-08-15,5,3.9,92,\"$95,000\",0.3,7,22,100
3,Sales,Female,29,Sales Analyst,2021-01-10,3,2.5,70,\"$70,000\",1.1,2,5,50
4,HR,Male,52,Manager,2012-02-20,2,1.5,60,\"$88,000\",1.6,4,15,0
5,IT,Male,38,Developer,2018-11-05,4,4.8,85,\"$91,000\",0.9,5,30,50
6,Finance,Female,45,Financial Analyst,2015-06-30,1,3.1,55,\"$72,000\",1.4,1,2,100
";

fn write_csv(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("employees.csv");
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    (temp_dir, path)
}

fn csv_config() -> CsvImportConfig {
    CsvImportConfig::default()
        .with_reference_date(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"))
}

fn engine() -> Engine {
    let (_temp, path) = write_csv(EMPLOYEES);
    let (engine, import) = Engine::from_csv(&path, csv_config(), EngineConfig::default())
        .expect("load engine");
    assert!(import.is_success());
    engine
}

// =============================================================================
// CSV Loading
// =============================================================================

mod csv_loading {
    use super::*;

    #[test]
    fn test_loads_and_derives_columns() {
        let engine = engine();
        let ds = engine.dataset();
        assert_eq!(ds.row_count(), 6);
        assert_eq!(ds.value(0, columns::ANNUAL_SALARY), Some(&Value::Int64(60_000)));
        assert_eq!(ds.value(5, columns::PERFORMANCE_LEVEL), Some(&Value::text("Low")));
        assert_eq!(ds.value(3, columns::RETENTION_RISK_LEVEL), Some(&Value::text("High")));
        assert_eq!(ds.value(0, columns::REMOTE_WORK_CATEGORY), Some(&Value::text("Work From Office")));
        let tenure = ds
            .value(3, columns::YEARS_AT_COMPANY)
            .and_then(Value::to_f64)
            .expect("tenure");
        assert!((tenure - 12.87).abs() < 0.01);
    }

    #[test]
    fn test_skipped_rows_are_reported() {
        let contents = format!("{EMPLOYEES}7,Sales\n,IT,Male,30,Engineer,2020-01-01,3,3,3,1,1,1,1,0\n");
        let (_temp, path) = write_csv(&contents);
        let config = csv_config().with_ignore_errors(true);
        let (engine, import) = Engine::from_csv(&path, config, EngineConfig::default()).expect("load");
        assert_eq!(engine.dataset().row_count(), 6);
        assert_eq!(import.rows_failed, 2);

        assert!(Engine::from_csv(&path, csv_config(), EngineConfig::default()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let result = Engine::from_csv(
            &temp_dir.path().join("absent.csv"),
            csv_config(),
            EngineConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_result_exports_to_arrow() {
        let answer = engine().ask(&mut Session::new(), "Top 5 salary");
        let batch = answer
            .result
            .expect("result")
            .to_record_batch()
            .expect("record batch");
        assert_eq!(batch.num_rows(), 5);
        assert_eq!(batch.schema().field(0).name(), columns::EMPLOYEE_ID);
    }
}

// =============================================================================
// Conversations
// =============================================================================

mod conversations {
    use super::*;

    #[test]
    fn test_entity_then_expanded_follow_up() {
        let engine = engine();
        let mut session = Session::new();

        let first = engine.ask(&mut session, "Employee 2");
        assert_eq!(first.status, AnswerStatus::Answered);
        assert_eq!(session.last_entity_id(), Some(2));

        let more = engine.ask(&mut session, "more details about employee 2");
        assert_eq!(more.status, AnswerStatus::Answered);
        assert!(more
            .reply
            .starts_with("Following up on Employee 2, here are more details:\nAnnual Salary: 95000"));
        assert!(more.reply.contains("Number of Projects: 7"));
        assert_eq!(more.chart, Some(ChartKind::Bar));
    }

    #[test]
    fn test_repeated_entity_continues_discussion() {
        let engine = engine();
        let mut session = Session::new();
        engine.ask(&mut session, "Employee 4");
        let again = engine.ask(&mut session, "info on employee 4");
        assert!(again
            .reply
            .starts_with("Continuing our discussion about Employee 4, here are the details:\nEmployee ID: 4"));
    }

    #[test]
    fn test_follow_up_expands_previous_query() {
        let engine = engine();
        let mut session = Session::new();
        let first = engine.ask(&mut session, "Employees with high performance level");
        assert_eq!(first.result.as_ref().map(hrql::ResultTable::row_count), Some(3));

        let more = engine.ask(&mut session, "tell me more");
        assert_eq!(
            more.reply,
            "Following up on your previous query, here are more details: Found 3 employees."
        );
        let d = more.descriptor.expect("descriptor");
        assert_eq!(
            d.output_columns,
            vec![
                columns::EMPLOYEE_ID,
                columns::PERFORMANCE_LEVEL,
                columns::DEPARTMENT,
                columns::JOB_TITLE
            ]
        );
        assert_eq!(session.last_descriptor(), Some(&d));
    }

    #[test]
    fn test_follow_up_on_other_employee_expands_previous_query() {
        let engine = engine();
        let mut session = Session::new();
        engine.ask(&mut session, "Employee 1");
        let listed = engine.ask(&mut session, "employee ids with salary > 80000");
        assert_eq!(listed.result.as_ref().map(hrql::ResultTable::row_count), Some(3));
        let previous = listed.descriptor.expect("descriptor");

        let more = engine.ask(&mut session, "more details for employee 2");
        assert_eq!(more.status, AnswerStatus::Answered);
        assert_eq!(
            more.reply,
            "Following up on your previous query, here are more details: Found 3 employees."
        );
        let d = more.descriptor.expect("descriptor");
        assert_eq!(d.conditions, previous.conditions);
        assert_eq!(d.output_columns.len(), previous.output_columns.len() + 2);
        assert!(d.output_columns.starts_with(&previous.output_columns));
        assert_eq!(session.last_entity_id(), Some(1));
    }

    #[test]
    fn test_details_for_employee_opens_conversation() {
        let engine = engine();
        let mut session = Session::new();
        let answer = engine.ask(&mut session, "details for employee 3");
        assert_eq!(answer.status, AnswerStatus::Answered);
        assert_eq!(session.last_entity_id(), Some(3));
    }

    #[test]
    fn test_context_prefixes() {
        let engine = engine();
        let mut session = Session::new();
        engine.ask(&mut session, "Average salary for analyst");

        let related = engine.ask(&mut session, "max salary");
        assert_eq!(
            related.reply,
            "Following up on your previous interest in similar topics, max of Annual_Salary: 95000.00"
        );

        let unrelated = engine.ask(&mut session, "List departments");
        assert!(unrelated.reply.starts_with("Moving on from our previous chat, unique Department"));
    }

    #[test]
    fn test_failure_does_not_end_conversation() {
        let engine = engine();
        let mut session = Session::new();
        let failed = engine.ask(&mut session, "average of the vibes");
        assert_eq!(failed.status, AnswerStatus::Failed(hrql::ErrorKind::UnknownColumn));
        let next = engine.ask(&mut session, "Count of males");
        assert_eq!(next.status, AnswerStatus::Answered);
        assert_eq!(session.turns().len(), 4);
    }

    #[test]
    fn test_declining_a_chart() {
        let engine = engine();
        let mut session = Session::new();
        engine.ask(&mut session, "Count by department");
        session.set_visualization_preference(false);
        let last = session.turns().last().expect("turn");
        assert_eq!(last.text, "Thank you for saving our efforts");
    }
}

// =============================================================================
// Session Store
// =============================================================================

mod session_store {
    use super::*;
    use hrql::SessionStore;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_sessions_share_one_engine() {
        let engine = Arc::new(engine());
        let store = Arc::new(SessionStore::new());
        let ids: Vec<_> = (0..4).map(|_| store.create()).collect();

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let engine = Arc::clone(&engine);
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    engine
                        .ask_session(&store, id, "Count of males")
                        .expect("session exists")
                })
            })
            .collect();

        for handle in handles {
            let answer = handle.join().expect("thread");
            assert_eq!(answer.reply, "Count of Male: 3");
        }
        for id in ids {
            let session = store.get(id).expect("session");
            assert_eq!(session.lock().turns().len(), 2);
        }
    }

    #[test]
    fn test_unknown_session() {
        let engine = engine();
        let store = SessionStore::new();
        let result = engine.ask_session(&store, uuid::Uuid::new_v4(), "hello");
        assert!(matches!(result, Err(hrql::HrqlError::SessionNotFound(_))));
    }
}
