//! Keyword rule tables
//!
//! Every classification in the crate is an ordered list of [`KeywordRule`]s
//! evaluated top to bottom; the first rule with a matching keyword wins.
//! Matching is case-insensitive substring search, so "bus" also hits
//! "business". That looseness is relied upon by the upstream text and kept.

use crate::model::ActivityType;

/// One row of a rule table
#[derive(Debug)]
pub struct KeywordRule<T> {
    pub keywords: &'static [&'static str],
    pub value: T,
}

impl<T> KeywordRule<T> {
    pub const fn new(keywords: &'static [&'static str], value: T) -> Self {
        Self { keywords, value }
    }

    /// `lower` must already be lowercased
    pub fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|kw| lower.contains(kw))
    }
}

/// First rule whose keywords occur in `text`
pub fn first_match<'a, T>(rules: &'a [KeywordRule<T>], text: &str) -> Option<&'a T> {
    let lower = text.to_lowercase();
    rules.iter().find(|rule| rule.matches(&lower)).map(|rule| &rule.value)
}

/// Whether any keyword occurs in `text`
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

/// Result of classifying one itinerary line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClass {
    pub kind: ActivityType,
    /// Label prepended to the description, e.g. "Breakfast"
    pub label: &'static str,
}

impl LineClass {
    /// Prefix the description with the label unless it already carries it
    pub fn apply_prefix(&self, description: &str) -> String {
        let prefix = format!("{}:", self.label);
        if description.contains(&prefix) {
            description.to_string()
        } else {
            format!("{} {}", prefix, description)
        }
    }
}

const fn line(kind: ActivityType, label: &'static str) -> LineClass {
    LineClass { kind, label }
}

/// Meal-specific rules come before the generic food rule so the label
/// reflects the meal; all dining rules precede transport, cost and duration.
static LINE_RULES: [KeywordRule<LineClass>; 7] = [
    KeywordRule::new(&["breakfast"], line(ActivityType::Dining, "Breakfast")),
    KeywordRule::new(&["lunch"], line(ActivityType::Dining, "Lunch")),
    KeywordRule::new(&["dinner"], line(ActivityType::Dining, "Dinner")),
    KeywordRule::new(
        &["meal", "restaurant", "café", "cafe", "food", "cuisine"],
        line(ActivityType::Dining, "Food"),
    ),
    KeywordRule::new(
        &["transport", "subway", "walk", "taxi", "bus", "train"],
        line(ActivityType::Transportation, "Transport"),
    ),
    KeywordRule::new(
        &["cost", "price", "fee", "$", "budget", "euro"],
        line(ActivityType::Cost, "Cost"),
    ),
    KeywordRule::new(
        &["duration", "time", "hours", "minutes"],
        line(ActivityType::Duration, "Duration"),
    ),
];

const ACTIVITY: LineClass = line(ActivityType::Activity, "Activity");

/// Classify a trimmed, de-bulleted line
pub fn classify(line: &str) -> LineClass {
    first_match(&LINE_RULES, line).copied().unwrap_or(ACTIVITY)
}
