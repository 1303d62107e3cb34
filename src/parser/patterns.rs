//! Regular expressions used by the rule cascade.
//!
//! All patterns run against normalized (lowercase, single-spaced) questions.

use lazy_static::lazy_static;
use regex::Regex;

use crate::catalog::columns;

/// Compiles a pattern from the static tables in this crate.
///
/// # Panics
///
/// Panics if the pattern is not a valid regular expression. Every caller
/// passes a literal, so this only fires on a programming error.
#[must_use]
pub(crate) fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid static pattern {pattern:?}: {e}"),
    }
}

const LIST_PREFIX: &str = r"^(?:(?:list|show|get|give\s+me|display|what\s+are\s+the|all|total)\s+)?(?:the\s+)?";
const EMPLOYEE_NOUN: &str = r"(?:employee\s+ids?|emp\s+ids?|empids?|employees?|staff)";
const DEPARTMENT_SCOPE: &str =
    r"(?:\s+(?P<prep>in|across|for))?(?:\s+(?P<all>all|every))?(?:\s+(?:the\s+)?(?:departments?|dept|company|organization))?";

lazy_static! {
    /// Any aggregation keyword.
    pub static ref AGGREGATION: Regex = compile(
        r"\b(?:average|mean|sum|count|max|maximum|min|minimum|how\s+many|number\s+of|total)\b"
    );

    /// Keywords that ask for a count.
    pub static ref COUNT: Regex = compile(r"\b(?:count|how\s+many|number\s+of|total)\b");

    /// Listing a category column: "list unique departments".
    pub static ref LIST_CATEGORY: Regex = compile(&format!(
        r"{LIST_PREFIX}(?:(?:unique|distinct)\s+)?(?P<category>departments?|job\s+titles?|work\s+modes?|remote\s+works?|genders?|performance\s+levels?|satisfaction\s+levels?|retention\s+risk\s+levels?)(?:\s*[?.!]?\s*$|\s+(?:in|across|for|of|with|where|having|who|that|are|is|do|does|we|there|please|available|present|exist)\b)"
    ));

    /// Listing employees, optionally across all departments.
    pub static ref LIST_EMPLOYEES: Regex = compile(&format!(
        r"{LIST_PREFIX}(?:(?:unique|distinct)\s+)?{EMPLOYEE_NOUN}{DEPARTMENT_SCOPE}\s*\??$"
    ));

    /// A whole-dataset qualifier.
    pub static ref UNSCOPED: Regex = compile(
        r"\b(?:in|across|for)\s+(?:all|every)\b|\b(?:all|every)\s+(?:the\s+)?(?:departments?|dept)\b|\b(?:in|across|for)\s+(?:the\s+)?(?:departments|company|organization)\b"
    );

    /// "count of males", "how many females".
    pub static ref COUNT_GENDER: Regex = compile(
        r"\b(?:count\s+of|how\s+many|number\s+of)\s+(?:the\s+)?(?P<gender>males?|females?|men|women)\b"
    );

    /// "how many employees with high performance level".
    pub static ref COUNT_LEVEL: Regex = compile(&format!(
        r"^(?:how\s+many|number\s+of|total|count(?:\s+of)?)\s+(?:the\s+)?{EMPLOYEE_NOUN}\s+(?:(?:with|having|have|has|are|at|in)\s+)?(?:an?\s+)?(?P<level>high|medium|low)\s+(?P<family>performance|satisfaction|retention\s+risk|retention)\s+levels?\b"
    ));

    /// "how many employees (across all departments)".
    pub static ref COUNT_EMPLOYEES: Regex = compile(&format!(
        r"^(?:how\s+many|number\s+of|total|count(?:\s+of)?)\s+(?:the\s+)?(?:total\s+)?{EMPLOYEE_NOUN}(?:\s+(?:are\s+there|do\s+we\s+have))?{DEPARTMENT_SCOPE}\s*\??$"
    ));

    /// "by department", "per gender".
    pub static ref GROUP_BY: Regex = compile(r"\b(?:by|per)\s+(?P<phrase>[a-z][a-z_]*(?:\s+[a-z][a-z_]*){0,2})");

    /// "department-wise", "gender wise".
    pub static ref WISE: Regex = compile(r"\b(?P<phrase>[a-z][a-z_]*(?:\s+[a-z][a-z_]*)?)[\s-]?wise\b");

    /// Phrase after an aggregate function word, used in error messages.
    pub static ref AGGREGATE_TARGET: Regex = compile(
        r"\b(?:average|mean|sum|max|maximum|min|minimum)\s+(?:of\s+)?(?:the\s+)?(?:employees?\s+)?(?P<target>[a-z_]+(?:\s+[a-z_]+)?)"
    );

    /// "in sales department" (the name is narrowed to its last preposition segment).
    pub static ref DEPARTMENT: Regex = compile(
        r"\b(?:in|across|for|of)\s+(?P<name>[a-z&][a-z&\s]*?)\s*(?:department|dept)s?\b"
    );

    /// "gender female".
    pub static ref GENDER: Regex = compile(r"\bgender\s+(?:is\s+|=\s*|of\s+)?(?P<value>[a-z]+)\b");

    /// Bare gender nouns.
    pub static ref GENDER_NOUN: Regex = compile(r"\b(?P<value>males?|females?|men|women)\b");

    /// "job title data analyst".
    pub static ref JOB_TITLE: Regex = compile(
        r"\bjob\s+title\s+(?:is\s+|=\s*|of\s+)?(?P<value>[a-z][a-z&\s]*?)(?:\s+(?:in|across|for|with|and|who|by|per|department|dept)\b|[?.!,]|$)"
    );

    /// Role shortcuts matched as substrings of the job title.
    pub static ref ROLE: Regex = compile(r"\b(?P<role>analyst|engineer|manager|developer|specialist)s?\b");

    /// "hired after 2020".
    pub static ref HIRED_AFTER: Regex = compile(r"\bhired\s+after\s+(?P<year>\d{4})\b");

    /// "hired before 2020".
    pub static ref HIRED_BEFORE: Regex = compile(r"\bhired\s+before\s+(?P<year>\d{4})\b");

    /// "hired between 2019-01-01 and 2020-12-31".
    pub static ref HIRED_BETWEEN: Regex = compile(
        r"\bhired\s+between\s+(?P<start>[\d/-]+)\s+and\s+(?P<end>[\d/-]+)"
    );

    /// "high performance level".
    pub static ref LEVEL: Regex = compile(
        r"\b(?P<level>high|medium|low)\s+(?P<family>performance|satisfaction|retention\s+risk|retention)\s+levels?\b"
    );

    /// "each department", "department-wise".
    pub static ref DEPARTMENT_WISE: Regex = compile(
        r"\b(?:each|by|per|every)\s+department\b|\bdepartment[\s-]?wise\b"
    );

    /// "top 10", "lowest 3".
    pub static ref TOP_LIMIT: Regex = compile(r"\b(?:top|highest|best)\s+(?P<n>\d+)\b");
    pub static ref BOTTOM_LIMIT: Regex = compile(r"\b(?:bottom|lowest|worst)\s+(?P<n>\d+)\b");
    pub static ref TOP: Regex = compile(r"\b(?:top|highest)\b");
    pub static ref BOTTOM: Regex = compile(r"\b(?:bottom|lowest)\b");

    /// Numeric comparisons per column as (greater, less, exact).
    pub static ref COMPARISONS: Vec<(&'static str, [Regex; 3])> = vec![
        (columns::AGE, comparison_patterns(r"age")),
        (columns::ANNUAL_SALARY, comparison_patterns(r"(?:annual\s+)?salary|pay")),
        (columns::PERFORMANCE_SCORE, comparison_patterns(r"performance(?:\s+score)?")),
    ];
}

/// Builds the (greater, less, exact) comparison patterns for a column phrase.
#[must_use]
pub(crate) fn comparison_patterns(subject: &str) -> [Regex; 3] {
    const NUMBER: &str = r"\$?(?P<n>\d[\d,]*(?:\.\d+)?)";
    [
        compile(&format!(
            r"\b(?:{subject})\s*(?:>|(?:is\s+)?(?:above|over|more\s+than|greater\s+than))\s*{NUMBER}"
        )),
        compile(&format!(
            r"\b(?:{subject})\s*(?:<|(?:is\s+)?(?:below|under|less\s+than))\s*{NUMBER}"
        )),
        compile(&format!(r"\b(?:{subject})\s*(?:=+\s*|(?:is|of|equal\s+to)\s+|\s)\s*{NUMBER}")),
    ]
}
