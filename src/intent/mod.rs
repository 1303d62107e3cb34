//! Conversational intent classification.
//!
//! Small talk is recognized by anchored patterns checked in a fixed order.
//! The first match wins and short-circuits all data-query handling.

use chrono::{DateTime, Local, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parser::patterns::compile;

/// How the reply of an intent is produced.
#[derive(Debug, Clone, Copy)]
enum Reply {
    Fixed(&'static str),
    Date,
    Time,
    Day,
}

struct Intent {
    name: &'static str,
    pattern: Regex,
    reply: Reply,
}

impl Intent {
    fn new(name: &'static str, alternatives: &str, terminator: &str, reply: Reply) -> Self {
        Intent {
            name,
            pattern: compile(&format!(r"(?i)^({alternatives}){terminator}")),
            reply,
        }
    }
}

const WORD_END: &str = r"(\s|$)";
const QUESTION_END: &str = r"(\?|\s|$)";

lazy_static! {
    static ref INTENTS: Vec<Intent> = vec![
        Intent::new("greeting", r"hi|hello|hey|hola|howdy", WORD_END,
            Reply::Fixed("Hello! I'm here to help with employee data or just chat. What's on your mind?")),
        Intent::new("good_morning", r"good\s+morning", WORD_END,
            Reply::Fixed("Good morning! Ready to dive into some employee data or just feeling chatty?")),
        Intent::new("good_afternoon", r"good\s+afternoon", WORD_END,
            Reply::Fixed("Good afternoon! How can I assist you with employee details or other questions?")),
        Intent::new("good_evening", r"good\s+evening", WORD_END,
            Reply::Fixed("Good evening! What's up? Want to explore employee data or have a quick chat?")),
        Intent::new("how_are_you", r"how\s+are\s+you|how's\s+it\s+going|what's\s+up|how\s+you\s+doing|are\s+you\s+okay", QUESTION_END,
            Reply::Fixed("I'm doing great, thanks for asking! Ready to answer your questions. What's up with you?")),
        Intent::new("date", r"what's\s+the\s+date|today's\s+date|current\s+date", QUESTION_END, Reply::Date),
        Intent::new("time", r"what\s+time\s+is\s+it|current\s+time|time\s+now", QUESTION_END, Reply::Time),
        Intent::new("day", r"what\s+day\s+is\s+it|current\s+day|what's\s+today", QUESTION_END, Reply::Day),
        Intent::new("identity", r"who\s+are\s+you|what\s+are\s+you|who\s+made\s+you", QUESTION_END,
            Reply::Fixed("I'm an HR data assistant. I answer questions about employee data and can have a friendly chat too!")),
        Intent::new("name", r"what's\s+your\s+name|your\s+name", QUESTION_END,
            Reply::Fixed("I'm your HR data assistant, nice to meet you! What's your name?")),
        Intent::new("about", r"tell\s+me\s+about\s+yourself", QUESTION_END,
            Reply::Fixed("I love crunching employee data and answering questions about departments, salaries, performance and more. Ask me anything!")),
        Intent::new("goodbye", r"bye|goodbye|see\s+you|take\s+care|later", WORD_END,
            Reply::Fixed("See you later! Feel free to come back anytime.")),
        Intent::new("thanks", r"thank\s+you|thanks|appreciate\s+it", WORD_END,
            Reply::Fixed("You're welcome! Happy to help.")),
        Intent::new("help", r"help|what\s+can\s+you\s+do|how\s+to\s+use|assist\s+me", QUESTION_END,
            Reply::Fixed("I can answer questions about employee data (e.g., 'Employee 123', 'Average salary for analyst') or chat about general stuff like greetings, time, or jokes. Try asking something!")),
        Intent::new("casual", r"what's\s+good|sup|yo|how's\s+it\s+hanging", QUESTION_END,
            Reply::Fixed("Yo, just hanging out in the digital realm! What's good with you?")),
        Intent::new("compliment", r"you're\s+awesome|great\s+job|nice\s+work", WORD_END,
            Reply::Fixed("Aw, shucks! Thanks for the kind words. What's next?")),
        Intent::new("joke", r"tell\s+me\s+a\s+joke|say\s+something\s+funny", QUESTION_END,
            Reply::Fixed("Why did the computer go to art school? Because it wanted to learn how to draw a better 'byte'!")),
        Intent::new("weather", r"what's\s+the\s+weather|weather\s+today", QUESTION_END,
            Reply::Fixed("Sorry, I cannot answer this. I'm not connected to real-time weather data, but I can help with employee info!")),
        Intent::new("news", r"latest\s+news|news\s+today", QUESTION_END,
            Reply::Fixed("Sorry, I cannot answer this. I don't have access to real-time news, but I can assist with employee data queries!")),
        Intent::new("mood", r"are\s+you\s+happy|are\s+you\s+sad|how's\s+your\s+mood", QUESTION_END,
            Reply::Fixed("I'm as happy as a neural network with perfect weights! How about you?")),
        Intent::new("purpose", r"why\s+are\s+you\s+here|what's\s+your\s+purpose", QUESTION_END,
            Reply::Fixed("I'm here to help you navigate employee data and answer your questions with a dash of fun. What's your purpose today?")),
    ];
}

/// A recognized conversational intent and its reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMatch {
    /// Stable intent name, e.g. `greeting`.
    pub name: String,
    /// Reply text.
    pub reply: String,
}

/// Classifies small talk using the local clock for date and time replies.
#[must_use]
pub fn classify(question: &str) -> Option<IntentMatch> {
    classify_at(question, &Local::now())
}

/// Classifies small talk against a fixed clock.
#[must_use]
pub fn classify_at<Tz: TimeZone>(question: &str, now: &DateTime<Tz>) -> Option<IntentMatch>
where
    Tz::Offset: std::fmt::Display,
{
    let question = question.trim();
    INTENTS
        .iter()
        .find(|intent| intent.pattern.is_match(question))
        .map(|intent| IntentMatch {
            name: intent.name.to_string(),
            reply: match intent.reply {
                Reply::Fixed(text) => text.to_string(),
                Reply::Date => format!("Today is {}.", now.format("%A, %B %-d, %Y")),
                Reply::Time => format!("It's {}.", now.format("%-I:%M %p")),
                Reply::Day => format!("Today is {}.", now.format("%A")),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 11, 12, 15, 0).unwrap()
    }

    fn name_of(question: &str) -> Option<String> {
        classify_at(question, &fixed_clock()).map(|m| m.name)
    }

    #[test]
    fn test_greetings_are_anchored() {
        assert_eq!(name_of("Hello there").as_deref(), Some("greeting"));
        assert_eq!(name_of("  HI").as_deref(), Some("greeting"));
        assert_eq!(name_of("say hi"), None);
        assert_eq!(name_of("hire date of employee 5"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(name_of("what's up?").as_deref(), Some("how_are_you"));
        assert_eq!(name_of("your name?").as_deref(), Some("name"));
    }

    #[test]
    fn test_clock_replies() {
        let date = classify_at("what's the date?", &fixed_clock()).unwrap();
        assert_eq!(date.reply, "Today is Friday, July 11, 2025.");
        let time = classify_at("current time", &fixed_clock()).unwrap();
        assert_eq!(time.reply, "It's 12:15 PM.");
        let day = classify_at("what day is it", &fixed_clock()).unwrap();
        assert_eq!(day.reply, "Today is Friday.");
    }

    #[test]
    fn test_data_questions_pass_through() {
        for q in [
            "average salary for analyst",
            "list departments",
            "employee 123",
            "your employees by department",
            "how many males",
            "top 5 salary",
        ] {
            assert_eq!(name_of(q), None, "{q}");
        }
    }
}
