//! Rule-based intent router for chat questions
//!
//! Questions are matched against an ordered rule list; the first rule that
//! matches decides the intent. Order matters: the broad "name" keyword must
//! come after the count/table/location rules, otherwise "how many customers
//! have a name" would be answered as a name-column question.

use serde::{Deserialize, Serialize};

use crate::types::ChatFacts;

/// Closed set of chat intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    CustomerCount,
    ListTables,
    Location,
    NameColumns,
    ContactColumns,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::CustomerCount => "customer_count",
            Intent::ListTables => "list_tables",
            Intent::Location => "location",
            Intent::NameColumns => "name_columns",
            Intent::ContactColumns => "contact_columns",
            Intent::Unknown => "unknown",
        }
    }
}

/// How a rule tests the normalized question
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Empty input or exactly one of the tokens
    EmptyOrExact(&'static [&'static str]),
    /// Contains any of the phrases
    ContainsAny(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::EmptyOrExact(tokens) => {
                normalized.is_empty() || tokens.iter().any(|t| *t == normalized)
            }
            Matcher::ContainsAny(phrases) => phrases.iter().any(|p| normalized.contains(p)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    pub matcher: Matcher,
}

const GREETINGS: &[&str] = &["hi", "hello", "hey", "hii", "hi there", "hey there"];

/// Evaluated top to bottom, first match wins
pub const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Greeting,
        matcher: Matcher::EmptyOrExact(GREETINGS),
    },
    Rule {
        intent: Intent::CustomerCount,
        matcher: Matcher::ContainsAny(&[
            "how many customer",
            "customer count",
            "number of customer",
            "total customer",
        ]),
    },
    Rule {
        intent: Intent::ListTables,
        matcher: Matcher::ContainsAny(&[
            "what table",
            "list table",
            "which table",
            "tables do we have",
            "tables are there",
        ]),
    },
    Rule {
        intent: Intent::Location,
        matcher: Matcher::ContainsAny(&["state", "city", "where are customer", "location"]),
    },
    Rule {
        intent: Intent::NameColumns,
        matcher: Matcher::ContainsAny(&["first name", "last name", "name"]),
    },
    Rule {
        intent: Intent::ContactColumns,
        matcher: Matcher::ContainsAny(&["email", "contact", "phone"]),
    },
];

/// Trim and lowercase
pub fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

pub fn classify(question: &str) -> Intent {
    let normalized = normalize(question);
    RULES
        .iter()
        .find(|rule| rule.matcher.matches(&normalized))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unknown)
}

/// Answer text for an intent, filled from the facts
pub fn render(intent: Intent, facts: &ChatFacts) -> String {
    match intent {
        Intent::Greeting => {
            let mut parts = vec!["Hi! I'm your local data assistant. No API key required!".to_string()];
            if facts.customer_count > 0 {
                parts.push(format!(
                    "We have **{}** customers in the database.",
                    facts.customer_count
                ));
            }
            if !facts.tables.is_empty() {
                parts.push(format!("Available tables: {}.", facts.tables.join(", ")));
            }
            parts.push(
                "Ask me things like: 'How many customers?', 'Which states have customers?', \
                 or 'What tables do we have?'"
                    .to_string(),
            );
            parts.join(" ")
        }
        Intent::CustomerCount => {
            if facts.customer_count > 0 {
                format!(
                    "There are exactly **{}** customers recorded in your database.",
                    facts.customer_count
                )
            } else {
                "The customers table is currently empty or not loaded yet.".to_string()
            }
        }
        Intent::ListTables => {
            if facts.tables.is_empty() {
                "No tables are currently available in the database.".to_string()
            } else {
                format!(
                    "Available database tables: **{}**. You can ask me specific questions about their contents.",
                    facts.tables.join(", ")
                )
            }
        }
        Intent::Location => {
            if facts.customer_count == 0 {
                return "Customer location data is not available.".to_string();
            }
            let mut msg = format!(
                "We currently have **{}** customers spread across **{}** states and **{}** unique cities.",
                facts.customer_count, facts.customer_states, facts.customer_cities
            );
            if !facts.top_states.is_empty() {
                msg.push_str(&format!(
                    " The states with the highest number of customers are: {}.",
                    facts.top_states.join(", ")
                ));
            }
            msg
        }
        Intent::NameColumns => "Customer names are stored in the 'first_name' and 'last_name' \
                                columns of the 'customers' table."
            .to_string(),
        Intent::ContactColumns => "Contact information such as emails and phone numbers are \
                                   available in the 'customers' table."
            .to_string(),
        Intent::Unknown => {
            let mut suggestions = Vec::with_capacity(3);
            if facts.customer_count > 0 {
                suggestions.push("'How many customers do we have?'");
            }
            if !facts.tables.is_empty() {
                suggestions.push("'What tables are in the database?'");
            }
            suggestions.push("'Which states have the most customers?'");
            format!(
                "I'm a local AI assistant and I don't know the answer to that yet. Try asking: {}",
                suggestions.join(", ")
            )
        }
    }
}

/// Classify and answer in one step. Pure: same input, same output.
pub fn route(question: &str, facts: &ChatFacts) -> String {
    render(classify(question), facts)
}
