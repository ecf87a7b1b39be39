//! Heading-based segmentation of upstream Markdown-ish text
//!
//! Segments follow text order. Text before the first recognized heading is
//! dropped, and zero matches yield an empty list so callers can fall back.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Period;

/// Marker the planning agents append when they finish a response
const COMPLETION_MARKER: &str = "TASK_COMPLETE";

static DAY_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*##[ \t]+Day[ \t]+(\d+)\b[ \t]*:?[ \t]*([^\n]*)")
        .expect("valid regex")
});

/// Any `### Word:` heading; non-period words still terminate a period body
static SUB_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*###[ \t]+(\w+)[ \t]*:").expect("valid regex"));

static MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(#{1,6})[ \t]+([^\n]*)$").expect("valid regex"));

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t\r]*\n").expect("valid regex"));

static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-•*+]|\d+[.)])\s+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct DaySegment {
    pub number: u32,
    /// Heading text after `Day n:`
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSegment {
    pub period: Period,
    pub body: String,
}

/// A Markdown heading and the text up to the next heading of any level
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingSection {
    pub level: usize,
    pub title: String,
    pub body: String,
}

/// Split a narrative into `## Day n` sections
pub fn segment_days(text: &str) -> Vec<DaySegment> {
    let matches: Vec<_> = DAY_HEADING.captures_iter(text).collect();
    let mut segments = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(num)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(number) = num.as_str().parse::<u32>() else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        segments.push(DaySegment {
            number,
            title: caps
                .get(2)
                .map(|t| t.as_str().trim().to_string())
                .unwrap_or_default(),
            body: text[whole.end()..end].trim().to_string(),
        });
    }

    segments
}

/// Split a day body into `### Morning:` / `### Afternoon:` / `### Evening:` sections
pub fn segment_periods(day_body: &str) -> Vec<PeriodSegment> {
    let matches: Vec<_> = SUB_HEADING.captures_iter(day_body).collect();
    let mut segments = Vec::new();

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(period) = Period::parse(word.as_str()) else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(day_body.len());

        segments.push(PeriodSegment {
            period,
            body: day_body[whole.end()..end].trim().to_string(),
        });
    }

    segments
}

/// Split text into sections at every Markdown heading up to `max_level`
pub fn segment_headings(text: &str, max_level: usize) -> Vec<HeadingSection> {
    let matches: Vec<_> = MD_HEADING
        .captures_iter(text)
        .filter(|caps| caps.get(1).map(|h| h.as_str().len() <= max_level).unwrap_or(false))
        .collect();
    let mut sections = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(hashes), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        sections.push(HeadingSection {
            level: hashes.as_str().len(),
            title: clean_inline(title.as_str()).trim_end_matches(':').trim().to_string(),
            body: text[whole.end()..end].trim().to_string(),
        });
    }

    sections
}

/// First blank-line-delimited paragraph
pub fn first_paragraph(text: &str) -> &str {
    BLANK_LINE.split(text).next().unwrap_or("").trim()
}

/// Non-empty blank-line-delimited paragraphs, trimmed
pub fn paragraphs(text: &str) -> Vec<&str> {
    BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Remove the agents' completion marker and surrounding whitespace
pub fn strip_completion_marker(text: &str) -> String {
    text.lines()
        .filter(|line| line.trim() != COMPLETION_MARKER)
        .collect::<Vec<_>>()
        .join("\n")
        .replace(COMPLETION_MARKER, "")
        .trim()
        .to_string()
}

/// Drop bold markers
pub fn clean_inline(text: &str) -> String {
    text.replace("**", "").replace("__", "").trim().to_string()
}

/// Drop a leading list marker (`-`, `•`, `*`, `1.`) and bold markers
pub fn strip_bullet(line: &str) -> String {
    let without_bullet = LEADING_BULLET.replace(line, "");
    clean_inline(&without_bullet)
}

/// Whether the line is formatted as a list item
pub fn is_bullet(line: &str) -> bool {
    LEADING_BULLET.is_match(line)
}

/// At most `max` characters of `text`, cut on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_split_on_level_two_headings() {
        let text = "Intro text\n\n## Day 1: Arrival\nLand.\n## Day 2: Old Town\nWalk.\n";
        let days = segment_days(text);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].number, 1);
        assert_eq!(days[0].title, "Arrival");
        assert_eq!(days[0].body, "Land.");
        assert_eq!(days[1].number, 2);
        assert_eq!(days[1].body, "Walk.");
    }

    #[test]
    fn days_follow_text_order_not_numeric_order() {
        let text = "## Day 3: Last\nc\n## Day 1: First\na\n## Day 2: Middle\nb";
        let numbers: Vec<u32> = segment_days(text).iter().map(|d| d.number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn level_three_day_heading_is_not_a_day() {
        assert!(segment_days("### Day 1: nope\ntext").is_empty());
        assert!(segment_days("No headings at all").is_empty());
    }

    #[test]
    fn periods_end_at_any_sub_heading() {
        let body = "Arrival\n### Morning:\n- coffee\n### Afternoon:\n- museum\n### Notes:\nbring water\n### Evening:\n- dinner";
        let periods = segment_periods(body);

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].period, Period::Morning);
        assert_eq!(periods[0].body, "- coffee");
        assert_eq!(periods[1].body, "- museum");
        assert_eq!(periods[2].period, Period::Evening);
        assert_eq!(periods[2].body, "- dinner");
    }

    #[test]
    fn headings_capture_bodies() {
        let text = "# Stays\nintro\n## **Luxury Accommodation**\n- Grand Hotel\n### Insider Tips\n- book early";
        let sections = segment_headings(text, 3);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].title, "Luxury Accommodation");
        assert_eq!(sections[1].level, 2);
        assert_eq!(sections[2].body, "- book early");
    }

    #[test]
    fn overview_is_first_paragraph() {
        assert_eq!(first_paragraph("Intro.\n\n## Day 1"), "Intro.");
        assert_eq!(first_paragraph(""), "");
    }

    #[test]
    fn crlf_blank_lines_split_paragraphs() {
        assert_eq!(first_paragraph("Intro.\r\n\r\n## Day 1: Arrival\r\n"), "Intro.");
        assert_eq!(paragraphs("One\r\n \r\nTwo"), vec!["One", "Two"]);
    }

    #[test]
    fn completion_marker_is_removed() {
        assert_eq!(strip_completion_marker("Some text\n\nTASK_COMPLETE\n"), "Some text");
    }

    #[test]
    fn bullets_are_stripped() {
        assert_eq!(strip_bullet("- **Breakfast** at a cafe"), "Breakfast at a cafe");
        assert_eq!(strip_bullet("2. Visit the castle"), "Visit the castle");
        assert!(is_bullet("• item"));
        assert!(!is_bullet("plain"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("Çöp şiş", 3), "Çöp");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
