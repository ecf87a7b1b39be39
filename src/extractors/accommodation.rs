//! Accommodation categories from the accommodation agent's notes

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ExtractContext;
use crate::model::AccommodationCategory;
use crate::text::{contains_any, first_match, segment_headings, KeywordRule};

static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\$\s?\d[\d,]*(?:\s*[-–]\s*\$?\s?\d[\d,]*)?|€\s?\d[\d,]*(?:\s*[-–]\s*€?\s?\d[\d,]*)?|\d[\d,]*(?:\s*[-–]\s*\d[\d,]*)?\s*(?:€|(?:EUR|USD|TRY|TL)\b)|\d[\d,]*\s*(?:per night|/night)",
    )
    .expect("valid regex")
});

/// Canonical stay category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StayCategory {
    name: &'static str,
    kind: &'static str,
}

static CATEGORY_RULES: [KeywordRule<StayCategory>; 4] = [
    KeywordRule::new(
        &["luxury", "premium", "upscale", "5-star", "five-star", "high-end"],
        StayCategory { name: "Luxury Accommodation", kind: "Luxury Hotel" },
    ),
    KeywordRule::new(
        &["boutique", "design"],
        StayCategory { name: "Boutique & Design Hotels", kind: "Boutique Hotel" },
    ),
    KeywordRule::new(
        &["budget", "hostel", "affordable", "cheap", "backpacker"],
        StayCategory { name: "Budget-Friendly Options", kind: "Budget Hotel" },
    ),
    KeywordRule::new(
        &["rental", "apartment", "airbnb", "vacation home"],
        StayCategory { name: "Vacation Rentals & Apartments", kind: "Vacation Rental" },
    ),
];

const TIP_HEADINGS: &[&str] = &["insider tip", "booking tip", "tips"];

/// First price-looking substring, or "Varies"
pub fn price_range(text: &str) -> String {
    PRICE
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "Varies".to_string())
}

/// Remove a bold-labelled insider-tips block (`**Insider Tips:**` up to the next blank line)
pub fn strip_insider_tips(body: &str) -> String {
    let mut kept = Vec::new();
    let mut skipping = false;

    for line in body.lines() {
        let trimmed = line.trim();
        let label = trimmed
            .replace("**", "")
            .trim_end_matches(':')
            .trim()
            .to_lowercase();
        if trimmed.starts_with("**") && (label == "insider tips" || label == "insider tip") {
            skipping = true;
            continue;
        }
        if skipping {
            if trimmed.is_empty() {
                skipping = false;
            } else {
                continue;
            }
        }
        kept.push(line);
    }

    kept.join("\n").trim().to_string()
}

struct OpenCategory {
    category: StayCategory,
    level: usize,
    body: String,
}

/// Extract accommodation categories from Markdown headings.
///
/// Headings map onto four canonical categories; nested non-tip headings stay
/// in their category's body and insider-tip subsections are dropped (they are
/// reported by the tips extractor). Without any category heading the whole
/// text becomes a single "Accommodation Options" entry.
pub fn extract_accommodation(text: &str, ctx: &ExtractContext) -> Vec<AccommodationCategory> {
    if text.trim().is_empty() {
        return synthesize(ctx);
    }

    let mut open: Vec<OpenCategory> = Vec::new();
    let mut current: Option<usize> = None;
    let mut skip_level: Option<usize> = None;

    for section in segment_headings(text, 3) {
        if let Some(level) = skip_level {
            if section.level > level {
                continue;
            }
            skip_level = None;
        }

        if contains_any(&section.title, TIP_HEADINGS) {
            skip_level = Some(section.level);
            continue;
        }

        if let Some(category) = first_match(&CATEGORY_RULES, &section.title).copied() {
            let body = strip_insider_tips(&section.body);
            match open.iter().position(|o| o.category == category) {
                Some(idx) => {
                    append_block(&mut open[idx].body, &body);
                    current = Some(idx);
                }
                None => {
                    open.push(OpenCategory {
                        category,
                        level: section.level,
                        body,
                    });
                    current = Some(open.len() - 1);
                }
            }
            continue;
        }

        match current {
            Some(idx) if section.level > open[idx].level => {
                let block = format!(
                    "{} {}\n{}",
                    "#".repeat(section.level),
                    section.title,
                    strip_insider_tips(&section.body)
                );
                append_block(&mut open[idx].body, block.trim());
            }
            _ => current = None,
        }
    }

    if open.is_empty() {
        debug!("accommodation: no category headings, using whole text");
        let body = strip_insider_tips(text);
        return vec![AccommodationCategory {
            name: "Accommodation Options".to_string(),
            kind: "Various Accommodations".to_string(),
            price_range: price_range(&body),
            description: body,
            is_category: false,
        }];
    }

    open.into_iter()
        .map(|o| AccommodationCategory {
            name: o.category.name.to_string(),
            kind: o.category.kind.to_string(),
            price_range: price_range(&o.body),
            description: o.body,
            is_category: true,
        })
        .collect()
}

fn append_block(body: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    if !body.is_empty() {
        body.push_str("\n\n");
    }
    body.push_str(block);
}

fn synthesize(ctx: &ExtractContext) -> Vec<AccommodationCategory> {
    if !ctx.config.fallback_policy.synthesizes() {
        return vec![];
    }
    vec![AccommodationCategory {
        name: format!("Local Hotels in {}", ctx.place_name()),
        kind: "Various Accommodations".to_string(),
        price_range: "Varies".to_string(),
        description: "No specific accommodation details provided.".to_string(),
        is_category: false,
    }]
}
