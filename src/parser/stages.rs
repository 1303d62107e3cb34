//! Stages of the rule cascade.
//!
//! Each stage takes the accumulated state and returns it, possibly changed.
//! Stages after the first few only act while the operation is still
//! `filter`, so the first stage to classify a question wins.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::catalog::{columns, ColumnCatalog};
use crate::config::EngineConfig;
use crate::error::{HrqlError, Result};
use crate::parser::descriptor::{
    AggregateFunction, Condition, ConditionOperator, Operation, QueryDescriptor, SortDirection,
    COUNT_COLUMN, COUNT_EMPLOYEES,
};
use crate::parser::patterns as p;
use crate::resolver::ColumnResolver;
use crate::text::{contains_any, contains_phrase, is_stop_word, singular, title_case, words};
use crate::types::{parse_date, parse_number, Value};

/// Accumulator threaded through the stages.
pub(crate) struct ParseState<'a> {
    /// Normalized question.
    pub question: &'a str,
    pub catalog: &'a ColumnCatalog,
    pub resolver: &'a ColumnResolver,
    pub config: &'a EngineConfig,
    pub descriptor: QueryDescriptor,
    /// The question contains an aggregation keyword.
    pub is_aggregation: bool,
    /// Stage 1 recognized a topic family.
    pub topic_matched: bool,
    /// The question asked about all departments.
    pub unscoped: bool,
}

impl<'a> ParseState<'a> {
    pub(crate) fn new(
        question: &'a str,
        catalog: &'a ColumnCatalog,
        resolver: &'a ColumnResolver,
        config: &'a EngineConfig,
    ) -> Self {
        ParseState {
            question,
            catalog,
            resolver,
            config,
            descriptor: QueryDescriptor::new(),
            is_aggregation: has_aggregation(question),
            topic_matched: false,
            unscoped: false,
        }
    }

    fn still_filter(&self) -> bool {
        self.descriptor.operation == Operation::Filter
    }

    fn identifier(&self) -> String {
        self.catalog.identifier().to_string()
    }

    /// First column of `candidates` present in the catalog and mentioned in the question.
    fn first_mentioned(&self, candidates: &[&'static str]) -> Option<&'static str> {
        candidates
            .iter()
            .copied()
            .find(|c| self.catalog.is_mentioned(c, self.question))
    }

    /// First column of `candidates` present in the catalog.
    fn first_available(&self, candidates: &[&'static str]) -> Option<&'static str> {
        candidates.iter().copied().find(|c| self.catalog.contains(c))
    }

    fn is_groupable(&self, name: &str) -> bool {
        name != self.catalog.identifier()
            && self.catalog.get(name).is_some_and(|c| c.is_categorical())
    }
}

/// A cascade stage.
pub(crate) type Stage = for<'a> fn(ParseState<'a>) -> Result<ParseState<'a>>;

/// The cascade, in priority order.
pub(crate) const STAGES: [(&str, Stage); 8] = [
    ("default_columns", default_columns),
    ("list_or_count_category", list_or_count_category),
    ("value_counts", value_counts),
    ("grouped_count", grouped_count),
    ("general_aggregate", general_aggregate),
    ("conditions", conditions),
    ("department_top", department_top),
    ("global_top", global_top),
];

/// Topic keyword families and the columns they project, after the identifier.
const TOPICS: &[(&[&str], &[&str])] = &[
    (&["performance level", "performance levels"], &[columns::PERFORMANCE_LEVEL]),
    (&["satisfaction level", "satisfaction levels"], &[columns::SATISFACTION_LEVEL]),
    (
        &["retention risk level", "retention risk levels", "retention level"],
        &[columns::RETENTION_RISK_LEVEL],
    ),
    (
        &["salary", "salaries", "pay", "wage", "wages", "sallary"],
        &[columns::ANNUAL_SALARY],
    ),
    (
        &["working hours", "hours", "overtime"],
        &[columns::NUMBER_OF_PROJECTS, columns::OVERTIME_HOURS],
    ),
    (
        &["satisfaction", "satisfaction score", "satisfcation"],
        &[columns::SATISFACTION_SCORE, columns::ANNUAL_SALARY],
    ),
    (
        &["performance", "performance score", "performance index", "perfomance"],
        &[columns::PERFORMANCE_SCORE],
    ),
    (
        &["promotion", "promotions", "promotion rate", "projects"],
        &[columns::NUMBER_OF_PROJECTS, columns::YEARS_AT_COMPANY],
    ),
    (&["employee id", "employee ids", "emp id", "empid"], &[]),
];

const EMPLOYEE_ID_MENTIONS: &[&str] = &["employee id", "employee ids", "emp id", "empid"];

const GROUP_FALLBACK: &[&str] = &[
    columns::DEPARTMENT,
    columns::GENDER,
    columns::JOB_TITLE,
    columns::REMOTE_WORK_CATEGORY,
    columns::PERFORMANCE_LEVEL,
    columns::SATISFACTION_LEVEL,
    columns::RETENTION_RISK_LEVEL,
];

const AGGREGATE_KEYWORDS: &[(&str, &str)] = &[
    ("salary", columns::ANNUAL_SALARY),
    ("salaries", columns::ANNUAL_SALARY),
    ("age", columns::AGE),
    ("performance", columns::PERFORMANCE_SCORE),
    ("satisfaction", columns::SATISFACTION_SCORE),
    ("productivity", columns::PRODUCTIVITY_SCORE),
    ("tenure", columns::YEARS_AT_COMPANY),
    ("years at company", columns::YEARS_AT_COMPANY),
    ("overtime", columns::OVERTIME_HOURS),
    ("working hours", columns::OVERTIME_HOURS),
    ("projects", columns::NUMBER_OF_PROJECTS),
];

const GROUP_TOP_SORT: &[&str] = &[
    columns::PERFORMANCE_SCORE,
    columns::ANNUAL_SALARY,
    columns::SATISFACTION_SCORE,
    columns::PRODUCTIVITY_SCORE,
    columns::NUMBER_OF_PROJECTS,
    columns::OVERTIME_HOURS,
];

const GLOBAL_SORT_FALLBACK: &[&str] = &[
    columns::PERFORMANCE_SCORE,
    columns::ANNUAL_SALARY,
    columns::SATISFACTION_SCORE,
    columns::PRODUCTIVITY_SCORE,
    columns::OVERTIME_HOURS,
    columns::NUMBER_OF_PROJECTS,
];

const ROLE_PREPOSITIONS: &[&str] = &["for", "of", "in", "with", "as"];

/// Words that end a role phrase.
const ROLE_TERMINATORS: &[&str] = &[
    "across", "by", "per", "and", "or", "who", "whose", "that", "where", "having", "than",
    "department", "departments", "dept", "job", "level", "levels", "score", "scores",
];

/// Words after "gender" that are not gender values.
const GENDER_STOPLIST: &[&str] = &["wise", "by", "per", "count", "distribution", "breakdown", "split"];

/// Words after "job title" that are not titles.
const JOB_TITLE_STOPLIST: &[&str] = &["wise", "by", "per", "count", "distribution", "breakdown", "of"];

// ============================================================================
// Keyword helpers
// ============================================================================

/// Start of the first match, ignoring "number of" when it names the projects column.
fn first_keyword(re: &Regex, question: &str) -> Option<usize> {
    re.find_iter(question)
        .find(|m| {
            !(m.as_str().starts_with("number")
                && question[m.end()..].trim_start().starts_with("project"))
        })
        .map(|m| m.start())
}

/// Returns true if the question contains an aggregation keyword.
pub(crate) fn has_aggregation(question: &str) -> bool {
    first_keyword(&p::AGGREGATION, question).is_some()
}

fn has_count(question: &str) -> bool {
    first_keyword(&p::COUNT, question).is_some()
}

/// Phrase naming the grouping of a grouped count, if the question is one.
fn grouped_count_phrase(question: &str) -> Option<&str> {
    let start = first_keyword(&p::COUNT, question)?;
    if let Some(caps) = p::GROUP_BY.captures(&question[start..]) {
        return caps.name("phrase").map(|m| m.as_str());
    }
    p::WISE
        .captures(question)
        .and_then(|caps| caps.name("phrase"))
        .map(|m| m.as_str())
}

fn is_grouped_count(question: &str) -> bool {
    grouped_count_phrase(question).is_some()
}

fn parse_limit(re: &Regex, question: &str) -> Option<usize> {
    re.captures(question)
        .and_then(|caps| caps["n"].parse::<usize>().ok())
        .filter(|n| *n > 0)
}

fn gender_label(word: &str) -> String {
    match word {
        "male" | "males" | "men" | "man" => "Male".to_string(),
        "female" | "females" | "women" | "woman" => "Female".to_string(),
        other => title_case(singular(other)),
    }
}

fn level_column(family: &str) -> &'static str {
    if family.starts_with("performance") {
        columns::PERFORMANCE_LEVEL
    } else if family.starts_with("satisfaction") {
        columns::SATISFACTION_LEVEL
    } else {
        columns::RETENTION_RISK_LEVEL
    }
}

/// Reads a numeric literal, keeping integers integral.
#[allow(clippy::cast_possible_truncation)]
fn number_value(literal: &str) -> Option<Value> {
    let n = parse_number(literal)?;
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Some(Value::Int64(n as i64))
    } else {
        Some(Value::Float64(n))
    }
}

fn year_start(year: &str) -> Option<Value> {
    let year = year.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1).map(Value::date)
}

/// Parses a date bound; a bare year means its first or last day.
fn date_bound(text: &str, end: bool) -> Option<Value> {
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        let year = text.parse::<i32>().ok()?;
        let (month, day) = if end { (12, 31) } else { (1, 1) };
        return NaiveDate::from_ymd_opt(year, month, day).map(Value::date);
    }
    parse_date(text).map(Value::date)
}

// ============================================================================
// Stage 1: default output columns
// ============================================================================

fn default_columns(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    if state.is_aggregation {
        state.descriptor.output_columns.clear();
        return Ok(state);
    }

    state.descriptor.output_columns = vec![state.identifier()];
    let topic = TOPICS
        .iter()
        .find(|(keywords, _)| contains_any(state.question, keywords));
    if let Some((_, topic_columns)) = topic {
        state.topic_matched = true;
        for column in topic_columns.iter().filter(|c| state.catalog.contains(c)) {
            state.descriptor.push_output(*column);
        }
    }
    Ok(state)
}

// ============================================================================
// Stage 2: list unique values, or count a listed category
// ============================================================================

fn list_or_count_category(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if is_grouped_count(q) {
        return Ok(state);
    }

    let (column, scoped_all) = if let Some(caps) = p::LIST_CATEGORY.captures(q) {
        let column = state
            .resolver
            .alias_lookup(&caps["category"])
            .filter(|c| state.is_groupable(c))
            .map(str::to_string);
        (column, false)
    } else if let Some(caps) = p::LIST_EMPLOYEES.captures(q) {
        let all = caps.name("prep").is_some() || caps.name("all").is_some();
        (Some(state.identifier()), all)
    } else {
        (None, false)
    };
    let Some(column) = column else {
        return Ok(state);
    };

    if has_count(q) {
        let d = &mut state.descriptor;
        d.operation = Operation::Aggregate;
        d.aggregate_function = Some(AggregateFunction::Count);
        d.output_columns = vec![COUNT_EMPLOYEES.to_string()];
    } else {
        let d = &mut state.descriptor;
        d.operation = Operation::ListUnique;
        d.output_columns = vec![column.clone()];
        d.list_column = Some(column);
    }

    if scoped_all || p::UNSCOPED.is_match(q) {
        state.descriptor.conditions.clear();
        state.unscoped = true;
    }
    Ok(state)
}

// ============================================================================
// Stage 3: value-specific counts
// ============================================================================

fn set_count_value(descriptor: &mut QueryDescriptor, column: &str, value: String) {
    descriptor.operation = Operation::CountValue;
    descriptor.aggregate_function = Some(AggregateFunction::Count);
    descriptor.aggregate_column = Some(column.to_string());
    descriptor.output_columns = vec![format!("count({value})")];
    descriptor.count_value = Some(Value::String(value));
}

fn value_counts(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if !state.still_filter() || is_grouped_count(q) {
        return Ok(state);
    }

    if let Some(caps) = p::COUNT_GENDER.captures(q) {
        if state.catalog.contains(columns::GENDER) {
            set_count_value(&mut state.descriptor, columns::GENDER, gender_label(&caps["gender"]));
        }
    } else if let Some(caps) = p::COUNT_LEVEL.captures(q) {
        let column = level_column(&caps["family"]);
        if state.catalog.contains(column) {
            set_count_value(&mut state.descriptor, column, title_case(&caps["level"]));
        }
    } else if let Some(caps) = p::COUNT_EMPLOYEES.captures(q) {
        let conditions = std::mem::take(&mut state.descriptor.conditions);
        state.descriptor = QueryDescriptor {
            conditions,
            ..QueryDescriptor::count()
        };
        if caps.name("prep").is_some() || caps.name("all").is_some() {
            state.descriptor.conditions.clear();
            state.unscoped = true;
        }
    }
    Ok(state)
}

// ============================================================================
// Stage 4: grouped counts
// ============================================================================

fn grouped_count(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if !state.still_filter() {
        return Ok(state);
    }
    let Some(phrase) = grouped_count_phrase(q) else {
        return Ok(state);
    };

    let from_phrase = state
        .resolver
        .alias_lookup(phrase)
        .filter(|c| state.is_groupable(c))
        .or_else(|| {
            state
                .catalog
                .columns()
                .iter()
                .find(|c| state.is_groupable(&c.name) && state.catalog.is_mentioned(&c.name, phrase))
                .map(|c| c.name.as_str())
        });
    let group = from_phrase
        .or_else(|| {
            state
                .catalog
                .columns()
                .iter()
                .find(|c| state.is_groupable(&c.name) && state.catalog.is_mentioned(&c.name, q))
                .map(|c| c.name.as_str())
        })
        .or_else(|| state.first_available(GROUP_FALLBACK));
    let Some(group) = group.map(str::to_string) else {
        return Ok(state);
    };

    let d = &mut state.descriptor;
    d.operation = Operation::GroupAggregate;
    d.aggregate_function = Some(AggregateFunction::Count);
    d.output_columns = vec![group.clone(), COUNT_COLUMN.to_string()];
    d.group_by_column = Some(group);
    Ok(state)
}

// ============================================================================
// Stage 5: general aggregation
// ============================================================================

fn aggregate_function(q: &str) -> AggregateFunction {
    if contains_any(q, &["average", "mean", "avg"]) {
        AggregateFunction::Mean
    } else if contains_phrase(q, "sum") {
        AggregateFunction::Sum
    } else if contains_any(q, &["max", "maximum"]) {
        AggregateFunction::Max
    } else if contains_any(q, &["min", "minimum"]) {
        AggregateFunction::Min
    } else {
        AggregateFunction::Count
    }
}

fn aggregate_column(state: &ParseState<'_>) -> Option<String> {
    let q = state.question;
    if let Some((_, column)) = AGGREGATE_KEYWORDS
        .iter()
        .find(|(keyword, column)| contains_phrase(q, keyword) && state.catalog.contains(column))
    {
        return Some((*column).to_string());
    }

    if let Some(def) = state
        .catalog
        .columns()
        .iter()
        .find(|c| c.is_numeric() && state.catalog.is_mentioned(&c.name, q))
    {
        return Some(def.name.clone());
    }

    let resolution = state.resolver.resolve(q, state.config.phrase_match_threshold);
    resolution
        .column
        .filter(|c| state.catalog.get(c).is_some_and(|def| def.is_numeric()))
}

fn is_role_word(word: &str) -> bool {
    word.chars().all(char::is_alphabetic)
        && !is_stop_word(word)
        && !ROLE_TERMINATORS.contains(&word)
}

/// Job role named by a trailing "for/of/in/with/as <role>" clause.
fn role_clause(state: &ParseState<'_>) -> Option<String> {
    let tokens: Vec<&str> = words(state.question).collect();
    for (i, token) in tokens.iter().enumerate() {
        if !ROLE_PREPOSITIONS.contains(token) {
            continue;
        }
        let mut j = i + 1;
        while j < tokens.len() && matches!(tokens[j], "the" | "a" | "an" | "all" | "every" | "each") {
            j += 1;
        }
        let start = j;
        while j < tokens.len() && j - start < 3 && is_role_word(tokens[j]) {
            j += 1;
        }
        if start == j {
            continue;
        }
        if tokens
            .get(j)
            .is_some_and(|t| matches!(*t, "department" | "departments" | "dept"))
        {
            continue;
        }

        let phrase = tokens[start..j].join(" ");
        if let Some(column) = state.resolver.alias_lookup(&phrase) {
            if column != columns::JOB_TITLE {
                continue;
            }
        }
        let names_other_column = state.catalog.columns().iter().any(|c| {
            c.name != columns::JOB_TITLE && contains_phrase(&phrase, &c.spoken_name())
        });
        if names_other_column {
            continue;
        }

        let mut role: Vec<&str> = tokens[start..j].to_vec();
        if let Some(last) = role.last_mut() {
            *last = singular(last);
        }
        return Some(title_case(&role.join(" ")));
    }
    None
}

fn general_aggregate(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if !state.still_filter() || !state.is_aggregation {
        return Ok(state);
    }

    let function = aggregate_function(q);
    let column = if function == AggregateFunction::Count {
        None
    } else {
        let column = aggregate_column(&state);
        if column.is_none() {
            let target = p::AGGREGATE_TARGET
                .captures(q)
                .map_or_else(|| q.to_string(), |caps| caps["target"].to_string());
            return Err(HrqlError::unknown_column(target, state.catalog.names()));
        }
        column
    };

    state.descriptor.operation = Operation::Aggregate;
    state.descriptor.aggregate_function = Some(function);
    state.descriptor.aggregate_column = column;

    if state.catalog.contains(columns::JOB_TITLE) {
        if let Some(role) = role_clause(&state) {
            debug!(role = %role, "job role clause");
            state
                .descriptor
                .add_condition(Condition::contains(columns::JOB_TITLE, Value::String(role)));
            state.descriptor.push_output(columns::JOB_TITLE);
        }
    }
    Ok(state)
}

// ============================================================================
// Stage 6: condition extraction
// ============================================================================

/// Department named by the last preposition segment before "department".
fn department_name(q: &str) -> Option<String> {
    let caps = p::DEPARTMENT.captures(q)?;
    let raw = caps.name("name")?.as_str();
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let last_prep = tokens
        .iter()
        .rposition(|t| matches!(*t, "in" | "across" | "for" | "of"));
    let segment: Vec<&str> = tokens[last_prep.map_or(0, |i| i + 1)..]
        .iter()
        .copied()
        .skip_while(|t| *t == "the")
        .collect();
    match segment.as_slice() {
        [] => None,
        [only] if matches!(*only, "each" | "all" | "every" | "any" | "which" | "what" | "this" | "that") => None,
        name => Some(title_case(&name.join(" "))),
    }
}

/// Conditions named by the question, in extraction order.
fn extract_conditions(state: &ParseState<'_>) -> Vec<Condition> {
    let q = state.question;
    let mut found = Vec::new();

    if !state.unscoped {
        if let Some(name) = department_name(q) {
            found.push(Condition::equals(columns::DEPARTMENT, Value::String(name)));
        }
    }

    let counting_gender = state.descriptor.operation == Operation::CountValue
        && state.descriptor.aggregate_column.as_deref() == Some(columns::GENDER);
    let gender = p::GENDER
        .captures(q)
        .map(|caps| caps["value"].to_string())
        .filter(|v| !GENDER_STOPLIST.contains(&v.as_str()))
        .or_else(|| {
            p::GENDER_NOUN
                .captures(q)
                .filter(|_| !counting_gender)
                .map(|caps| caps["value"].to_string())
        });
    if let Some(word) = gender {
        found.push(Condition::equals(columns::GENDER, Value::String(gender_label(&word))));
    }

    if let Some(caps) = p::JOB_TITLE.captures(q) {
        let value = caps["value"].trim();
        let first = value.split_whitespace().next().unwrap_or_default();
        if !value.is_empty() && !JOB_TITLE_STOPLIST.contains(&first) {
            found.push(Condition::equals(columns::JOB_TITLE, Value::String(title_case(value))));
        }
    }

    if let Some(caps) = p::ROLE.captures(q) {
        found.push(Condition::contains(
            columns::JOB_TITLE,
            Value::String(title_case(&caps["role"])),
        ));
    }

    for (column, [greater, less, exact]) in p::COMPARISONS.iter() {
        let mut compared = false;
        if let Some(v) = greater.captures(q).and_then(|c| number_value(&c["n"])) {
            found.push(Condition::greater_than(*column, v));
            compared = true;
        }
        if let Some(v) = less.captures(q).and_then(|c| number_value(&c["n"])) {
            found.push(Condition::less_than(*column, v));
            compared = true;
        }
        if !compared {
            if let Some(v) = exact.captures(q).and_then(|c| number_value(&c["n"])) {
                found.push(Condition::equals(*column, v));
            }
        }
    }

    if let Some(v) = p::HIRED_AFTER.captures(q).and_then(|c| year_start(&c["year"])) {
        found.push(Condition::greater_than(columns::HIRE_DATE, v));
    }
    if let Some(v) = p::HIRED_BEFORE.captures(q).and_then(|c| year_start(&c["year"])) {
        found.push(Condition::less_than(columns::HIRE_DATE, v));
    }
    if let Some(caps) = p::HIRED_BETWEEN.captures(q) {
        if let (Some(lo), Some(hi)) = (date_bound(&caps["start"], false), date_bound(&caps["end"], true)) {
            found.push(Condition::between(columns::HIRE_DATE, lo, hi));
        }
    }

    if let Some(caps) = p::LEVEL.captures(q) {
        found.push(Condition::equals(
            level_column(&caps["family"]),
            Value::String(title_case(&caps["level"])),
        ));
    }

    found.retain(|c| state.catalog.contains(&c.column));
    found
}

fn conditions(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let found = extract_conditions(&state);
    let project = !state.is_aggregation && state.still_filter();

    let mut compared = false;
    for condition in found {
        compared |= matches!(
            condition.operator,
            ConditionOperator::GreaterThan | ConditionOperator::LessThan
        );
        if project {
            state.descriptor.push_output(condition.column.clone());
        }
        state.descriptor.add_condition(condition);
    }

    if project && (compared || contains_any(state.question, EMPLOYEE_ID_MENTIONS)) {
        let id = state.identifier();
        state.descriptor.push_output_front(&id);
    }
    Ok(state)
}

// ============================================================================
// Stage 7: department-wise top N
// ============================================================================

fn department_top(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if !state.still_filter()
        || !p::DEPARTMENT_WISE.is_match(q)
        || !state.catalog.contains(columns::DEPARTMENT)
    {
        return Ok(state);
    }
    let Some(sort) = state
        .first_mentioned(GROUP_TOP_SORT)
        .or_else(|| state.first_available(GROUP_TOP_SORT))
    else {
        return Ok(state);
    };

    let mut output = vec![state.identifier(), columns::DEPARTMENT.to_string()];
    if state.catalog.contains(columns::JOB_TITLE) {
        output.push(columns::JOB_TITLE.to_string());
    }
    output.push(sort.to_string());

    let d = &mut state.descriptor;
    d.operation = Operation::GroupTop;
    d.group_by_column = Some(columns::DEPARTMENT.to_string());
    d.sort_column = Some(sort.to_string());
    d.sort_direction = Some(SortDirection::Desc);
    d.limit = Some(parse_limit(&p::TOP_LIMIT, q).unwrap_or(state.config.default_limit));
    d.output_columns = output;
    Ok(state)
}

// ============================================================================
// Stage 8: global top/bottom
// ============================================================================

fn global_top(mut state: ParseState<'_>) -> Result<ParseState<'_>> {
    let q = state.question;
    if !state.still_filter() {
        return Ok(state);
    }
    let (direction, limit_pattern) = if p::TOP.is_match(q) {
        (SortDirection::Desc, &*p::TOP_LIMIT)
    } else if p::BOTTOM.is_match(q) {
        (SortDirection::Asc, &*p::BOTTOM_LIMIT)
    } else {
        return Ok(state);
    };

    let mentioned = state
        .catalog
        .columns()
        .iter()
        .find(|c| c.is_numeric() && state.catalog.is_mentioned(&c.name, q))
        .map(|c| c.name.clone());
    let Some(sort) = mentioned.or_else(|| state.first_available(GLOBAL_SORT_FALLBACK).map(str::to_string))
    else {
        return Ok(state);
    };

    let id = state.identifier();
    let limit = parse_limit(limit_pattern, q).unwrap_or(state.config.default_limit);
    let d = &mut state.descriptor;
    d.operation = Operation::Sort;
    d.sort_direction = Some(direction);
    d.limit = Some(limit);
    d.push_output_front(&id);
    d.push_output(sort.clone());
    d.sort_column = Some(sort);
    Ok(state)
}
