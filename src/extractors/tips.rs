//! Travel tips from the accommodation notes

use std::sync::LazyLock;

use regex::Regex;

use super::ExtractContext;
use crate::dedupe::dedupe_by_prefix;
use crate::model::{Tip, TipCategory};
use crate::text::{first_match, is_bullet, strip_bullet, KeywordRule};

static TIP_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tips?|advice|notes?|insider)\b").expect("valid regex")
});

/// "Insider Tip:", "Note -" and similar lead-ins
static TIP_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:insider\s+)?(?:tips?|advice|notes?)\s*[:\-–]\s*").expect("valid regex")
});

static COST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\$\s?\d[\d,.]*(?:\s*[-–]\s*\$?\s?\d[\d,.]*)?(?:\s+per\s+\w+)?|€\s?\d[\d,.]*|\d[\d,.]*(?:\s*[-–]\s*\d[\d,.]*)?\s*(?:usd|eur|euros?|dollars?|try|tl|lira)\b",
    )
    .expect("valid regex")
});

static CATEGORY_RULES: [KeywordRule<TipCategory>; 4] = [
    KeywordRule::new(&["hotel", "stay", "room", "accommodation"], TipCategory::Hotel),
    KeywordRule::new(&["restaurant", "food", "eat", "meal"], TipCategory::Dining),
    KeywordRule::new(&["transport", "bus", "taxi", "metro"], TipCategory::Transportation),
    KeywordRule::new(&["shop", "buy", "market"], TipCategory::Shopping),
];

const MIN_BULLET_LEN: usize = 15;
const MIN_DESCRIPTION_LEN: usize = 10;

pub fn tip_category(text: &str) -> TipCategory {
    first_match(&CATEGORY_RULES, text)
        .copied()
        .unwrap_or(TipCategory::Cultural)
}

/// First money-looking substring, or "Varies"
pub fn tip_cost(text: &str) -> String {
    COST.find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "Varies".to_string())
}

/// Lines that read as tips: they mention a tip word or are bullets long
/// enough to carry advice. Near-duplicates within a category are dropped.
pub fn extract_tips(text: &str, ctx: &ExtractContext) -> Vec<Tip> {
    let candidates: Vec<Tip> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            TIP_SIGNAL.is_match(line) || (is_bullet(line) && line.chars().count() > MIN_BULLET_LEN)
        })
        .filter_map(|line| {
            let cleaned = strip_bullet(line);
            let description = TIP_LABEL.replace(&cleaned, "").trim().to_string();
            if description.chars().count() <= MIN_DESCRIPTION_LEN {
                return None;
            }
            Some(Tip {
                category: tip_category(&description),
                cost: tip_cost(&description),
                description,
            })
        })
        .collect();

    let tips = dedupe_by_prefix(
        candidates,
        ctx.config.tip_prefix_len,
        |tip| tip.category,
        |tip| tip.description.as_str(),
    );

    if tips.is_empty() && ctx.config.fallback_policy.synthesizes() {
        return vec![Tip {
            category: TipCategory::Hotel,
            description: format!(
                "Book accommodation in {} in advance during peak seasons for better rates.",
                ctx.place_name()
            ),
            cost: "Varies".to_string(),
        }];
    }
    tips
}
