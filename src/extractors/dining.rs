//! Dining extraction from the food agent's notes
//!
//! Entries are grouped by [`DiningCategory`]; each group is introduced by a
//! category pseudo-entry (`is_category: true`) and groups appear in the order
//! their first item was found.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::ExtractContext;
use crate::model::{DiningCategory, DiningEntry};
use crate::text::{
    contains_any, first_match, is_bullet, paragraphs, segment_headings, strip_bullet,
    truncate_chars, KeywordRule,
};

static BOLD_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-•*+]\s+|\d+[.)]\s+)?\*\*([^*]+?)\*\*\s*[:\-–—]?\s*(.*)$")
        .expect("valid regex")
});

/// `Name: description`, `Name - description`, optionally with a parenthetical after the name
static DELIMITED_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-ZÀ-ÝÇĞİŞÖÜ][^:–—]{1,59}?)(?:\s*\([^)]*\))?\s*(?::|\s-\s|\s–\s|\s—\s)\s*(.+)$")
        .expect("valid regex")
});

/// Heading text to category; order is the tie-break
static CATEGORY_RULES: [KeywordRule<DiningCategory>; 5] = [
    KeywordRule::new(
        &["dish", "must-try", "must try", "specialt", "signature"],
        DiningCategory::LocalDishes,
    ),
    KeywordRule::new(
        &["restaurant", "high-end", "mid-range", "budget", "fine dining", "eater", "where to eat"],
        DiningCategory::Restaurants,
    ),
    KeywordRule::new(
        &["market", "street food", "culinary district", "food hall", "bazaar"],
        DiningCategory::FoodMarkets,
    ),
    KeywordRule::new(
        &["experience", "cooking class", "food tour", "tasting", "workshop"],
        DiningCategory::CulinaryExperiences,
    ),
    KeywordRule::new(&["etiquette", "tipping", "custom", "manners"], DiningCategory::Etiquette),
];

/// Item text that forces a category regardless of the enclosing heading
static OVERRIDE_RULES: [KeywordRule<DiningCategory>; 3] = [
    KeywordRule::new(&["tipping", "etiquette", "customary to"], DiningCategory::Etiquette),
    KeywordRule::new(&["cooking class", "food tour"], DiningCategory::CulinaryExperiences),
    KeywordRule::new(&["food market", "night market"], DiningCategory::FoodMarkets),
];

static CUISINE_RULES: [KeywordRule<&str>; 15] = [
    KeywordRule::new(&["seafood", "fish"], "Seafood"),
    KeywordRule::new(
        &["turkish", "kebab", "döner", "doner", "köfte", "pide", "baklava", "meze", "börek"],
        "Turkish",
    ),
    KeywordRule::new(&["japanese", "sushi", "ramen", "izakaya"], "Japanese"),
    KeywordRule::new(&["italian", "pasta", "pizza", "trattoria", "gelato"], "Italian"),
    KeywordRule::new(&["spanish", "tapas", "paella"], "Spanish"),
    KeywordRule::new(&["mexican", "taco", "mole"], "Mexican"),
    KeywordRule::new(&["indian", "curry", "masala", "biryani"], "Indian"),
    KeywordRule::new(&["chinese", "dim sum", "dumpling"], "Chinese"),
    KeywordRule::new(&["vietnamese", "pho", "banh mi"], "Vietnamese"),
    KeywordRule::new(&["thai", "som tam"], "Thai"),
    KeywordRule::new(&["french", "bistro", "croissant", "brasserie"], "French"),
    KeywordRule::new(&["vegetarian", "vegan"], "Vegetarian"),
    KeywordRule::new(&["café", "cafe", "coffee", "bakery", "pastr"], "Café & Bakery"),
    KeywordRule::new(&["street food"], "Street Food"),
    KeywordRule::new(&["local", "traditional", "regional"], "Local"),
];

/// Bold names that are price-tier or section labels, not places or dishes
const HEADER_WORDS: &[&str] = &["high-end", "mid-range", "budget", "restaurants", "markets"];

/// Dish vocabulary for the salvage tier
const DISH_KEYWORDS: &[&str] = &[
    "kebab", "döner", "köfte", "pide", "baklava", "börek", "manti", "lahmacun", "simit",
    "dolma", "çöp şiş", "tandir", "tava", "sushi", "ramen", "tempura", "tapas", "paella",
    "pasta", "pizza", "croissant", "dim sum", "pho", "tacos", "curry", "dumplings",
];

/// Cuisine inferred from the text, "Other" when nothing matches
pub fn infer_cuisine(text: &str) -> String {
    first_match(&CUISINE_RULES, text)
        .copied()
        .unwrap_or("Other")
        .to_string()
}

/// Category named by a heading, if any
pub fn category_for_heading(heading: &str) -> Option<DiningCategory> {
    first_match(&CATEGORY_RULES, heading).copied()
}

/// Extract dining entries, trying headed sections, then bold/delimited
/// pairs, then dish keywords.
pub fn extract_dining(food: &str, ctx: &ExtractContext) -> Vec<DiningEntry> {
    if food.trim().is_empty() {
        return synthesize(ctx);
    }

    let items = extract_from_sections(food);
    if !items.is_empty() {
        debug!(count = items.len(), "dining: category sections");
        return with_category_headers(items);
    }

    let items = extract_pairs(food);
    if !items.is_empty() {
        debug!(count = items.len(), "dining: bold/delimited pairs");
        return with_category_headers(items);
    }

    let items = salvage_dishes(food);
    if !items.is_empty() {
        debug!(count = items.len(), "dining: dish keyword salvage");
        return with_category_headers(items);
    }

    synthesize(ctx)
}

/// Items under headings that name a dining category
fn extract_from_sections(food: &str) -> Vec<DiningEntry> {
    let mut items = Vec::new();
    let mut current: Option<(DiningCategory, String)> = None;

    for section in segment_headings(food, 4) {
        match category_for_heading(&section.title) {
            Some(category) => current = Some((category, section.title.clone())),
            // Sub-headings such as a neighbourhood name stay in the enclosing category
            None if section.level <= 2 => current = None,
            None => {}
        }
        let Some((category, heading)) = current.as_ref() else {
            continue;
        };

        for line in section.body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !(is_bullet(line) || line.starts_with("**")) {
                continue;
            }
            if let Some(entry) = item_from_line(line, *category, heading) {
                items.push(entry);
            }
        }
    }

    items
}

fn item_from_line(line: &str, category: DiningCategory, heading: &str) -> Option<DiningEntry> {
    let (name, description) = split_name_description(line)?;
    let combined = format!("{} {}", name, description);
    let category = first_match(&OVERRIDE_RULES, &combined)
        .copied()
        .unwrap_or(category);

    Some(DiningEntry {
        kind: kind_for(category, heading, &description),
        cuisine: infer_cuisine(&combined),
        name,
        description,
        category,
        is_category: false,
    })
}

/// Split a list line into name and description; a line with no delimiter
/// becomes a name-only entry
fn split_name_description(line: &str) -> Option<(String, String)> {
    if let Some(caps) = BOLD_PAIR.captures(line) {
        let name = caps.get(1)?.as_str().trim().to_string();
        let description = caps.get(2).map(|d| d.as_str().trim()).unwrap_or("");
        return Some((name, description.replace("**", "")));
    }

    let text = strip_bullet(line);
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = DELIMITED_PAIR.captures(&text) {
        let name = caps.get(1)?.as_str().trim().to_string();
        let description = caps.get(2)?.as_str().trim().to_string();
        return Some((name, description));
    }
    Some((truncate_chars(&text, 80), text))
}

fn kind_for(category: DiningCategory, heading: &str, description: &str) -> String {
    let kind = match category {
        DiningCategory::LocalDishes => "Local Dish",
        DiningCategory::FoodMarkets => "Food Market",
        DiningCategory::CulinaryExperiences => "Culinary Experience",
        DiningCategory::Etiquette => "Etiquette",
        DiningCategory::Restaurants => {
            let heading = heading.to_lowercase();
            let description = description.to_lowercase();
            if heading.contains("high-end") || heading.contains("fine dining") {
                "High-End"
            } else if heading.contains("mid-range") {
                "Mid-Range"
            } else if heading.contains("budget") {
                "Budget"
            } else if description.contains("street food") {
                "Street Food"
            } else if description.contains("market") {
                "Food Market"
            } else if description.contains("fine dining") {
                "Fine Dining"
            } else {
                "Restaurant"
            }
        }
    };
    kind.to_string()
}

/// Bold `**Name**: description` lines, then `Name - description` lines
fn extract_pairs(food: &str) -> Vec<DiningEntry> {
    let mut items = Vec::new();

    for line in food.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('#') {
            continue;
        }
        let pair = if let Some(caps) = BOLD_PAIR.captures(line) {
            caps.get(1).map(|n| {
                (
                    n.as_str().trim().to_string(),
                    caps.get(2)
                        .map(|d| d.as_str().trim().replace("**", ""))
                        .unwrap_or_default(),
                )
            })
        } else {
            let text = strip_bullet(line);
            DELIMITED_PAIR.captures(&text).and_then(|caps| {
                Some((
                    caps.get(1)?.as_str().trim().to_string(),
                    caps.get(2)?.as_str().trim().to_string(),
                ))
            })
        };

        let Some((name, description)) = pair else {
            continue;
        };
        if name.chars().count() < 3 || contains_any(&name, HEADER_WORDS) {
            continue;
        }

        let combined = format!("{} {}", name, description);
        let category = first_match(&OVERRIDE_RULES, &combined)
            .or_else(|| first_match(&CATEGORY_RULES, &combined))
            .copied()
            .unwrap_or(DiningCategory::LocalDishes);

        items.push(DiningEntry {
            kind: kind_for(category, "", &description),
            cuisine: infer_cuisine(&combined),
            name,
            description,
            category,
            is_category: false,
        });
    }

    items
}

/// One entry per dish keyword found, described by its first paragraph
fn salvage_dishes(food: &str) -> Vec<DiningEntry> {
    let paragraphs = paragraphs(food);
    let mut items = Vec::new();

    for keyword in DISH_KEYWORDS {
        let Some(paragraph) = paragraphs
            .iter()
            .find(|p| p.to_lowercase().contains(keyword))
        else {
            continue;
        };
        items.push(DiningEntry {
            name: capitalize(keyword),
            kind: "Local Dish".to_string(),
            cuisine: infer_cuisine(paragraph),
            description: truncate_chars(&paragraph.replace("**", ""), 150),
            category: DiningCategory::LocalDishes,
            is_category: false,
        });
    }

    items
}

fn synthesize(ctx: &ExtractContext) -> Vec<DiningEntry> {
    if !ctx.config.fallback_policy.synthesizes() {
        return vec![];
    }
    let place = ctx.place_name();
    with_category_headers(vec![
        DiningEntry {
            name: format!("{} Street Food", place),
            kind: "Street Food".to_string(),
            cuisine: "Local".to_string(),
            description: "Authentic street food experience with various local delicacies."
                .to_string(),
            category: DiningCategory::FoodMarkets,
            is_category: false,
        },
        DiningEntry {
            name: format!("Traditional {} Restaurant", place),
            kind: "Restaurant".to_string(),
            cuisine: "Local".to_string(),
            description: "Traditional dining experience with authentic local flavors.".to_string(),
            category: DiningCategory::Restaurants,
            is_category: false,
        },
    ])
}

/// Group items by category (first-seen order) and prefix each group with its header entry
fn with_category_headers(items: Vec<DiningEntry>) -> Vec<DiningEntry> {
    let mut order: Vec<DiningCategory> = Vec::new();
    for item in &items {
        if !order.contains(&item.category) {
            order.push(item.category);
        }
    }

    let mut out = Vec::with_capacity(items.len() + order.len());
    for category in order {
        out.push(DiningEntry {
            name: category.label().to_string(),
            kind: "Category".to_string(),
            cuisine: String::new(),
            description: String::new(),
            category,
            is_category: true,
        });
        out.extend(items.iter().filter(|i| i.category == category).cloned());
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractionConfig, FallbackPolicy};

    fn ctx(config: &ExtractionConfig) -> ExtractContext<'_> {
        ExtractContext::new("Ankara, Turkey", config)
    }

    fn names(entries: &[DiningEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn groups_items_under_category_headings() {
        let food = r#"# Food in Ankara

## Must-Try Local Dishes
- **Ankara Tava**: Lamb cooked with rice and vegetables.
- **Simit**: Sesame bread ring sold on every corner.

## Restaurants
### High-End
- **Trilye**: Prestigious seafood restaurant.
### Budget
- **Lezzet Durak**: Affordable Turkish home-style cooking.

## Dining Etiquette
- Tipping around 10% is customary.
"#;
        let config = ExtractionConfig::default();
        let dining = extract_dining(food, &ctx(&config));

        assert_eq!(
            names(&dining),
            vec![
                "Must-Try Local Dishes",
                "Ankara Tava",
                "Simit",
                "Restaurants",
                "Trilye",
                "Lezzet Durak",
                "Dining Etiquette",
                "Tipping around 10% is customary.",
            ]
        );
        assert!(dining[0].is_category);
        assert_eq!(dining[4].kind, "High-End");
        assert_eq!(dining[4].cuisine, "Seafood");
        assert_eq!(dining[5].kind, "Budget");
        assert_eq!(dining[5].cuisine, "Turkish");
    }

    #[test]
    fn tipping_item_is_forced_into_etiquette() {
        let food = "## Restaurants\n- **Karaca**: Cozy spot; tipping 5-10% is expected.\n- **Nefis Pide**: Famous pide.";
        let config = ExtractionConfig::default();
        let dining = extract_dining(food, &ctx(&config));

        assert_eq!(
            names(&dining),
            vec!["Dining Etiquette", "Karaca", "Restaurants", "Nefis Pide"]
        );
        assert_eq!(dining[1].category, DiningCategory::Etiquette);
    }

    #[test]
    fn bold_pairs_without_headings() {
        let food = "**Mid-Range Options**\n**Mantı**: Turkish dumplings topped with garlic yogurt.\n**Kızılay Market**: Stalls with spices and street food.";
        let config = ExtractionConfig::default();
        let dining = extract_dining(food, &ctx(&config));

        let real: Vec<_> = dining.iter().filter(|d| !d.is_category).collect();
        assert_eq!(real.len(), 2);
        assert_eq!(real[0].name, "Mantı");
        assert_eq!(real[0].category, DiningCategory::LocalDishes);
        assert_eq!(real[0].cuisine, "Turkish");
        assert_eq!(real[1].category, DiningCategory::FoodMarkets);
    }

    #[test]
    fn delimited_pairs_without_bold() {
        let food = "Iskender Kebab - Sliced döner over bread with yogurt\nAdana Kebab: Spicy minced meat on a skewer";
        let config = ExtractionConfig::default();
        let dining = extract_dining(food, &ctx(&config));
        let real: Vec<_> = dining.iter().filter(|d| !d.is_category).map(|d| d.name.as_str()).collect();
        assert_eq!(real, vec!["Iskender Kebab", "Adana Kebab"]);
    }

    #[test]
    fn salvages_dish_keywords_from_prose() {
        let food = "you will love the baklava here.\n\nthe pide is baked in wood ovens.";
        let config = ExtractionConfig::default();
        let dining = extract_dining(food, &ctx(&config));

        assert_eq!(names(&dining), vec!["Must-Try Local Dishes", "Pide", "Baklava"]);
        assert_eq!(dining[1].description, "the pide is baked in wood ovens.");
    }

    #[test]
    fn nothing_found_is_empty_by_default() {
        let config = ExtractionConfig::default();
        assert!(extract_dining("nothing useful here", &ctx(&config)).is_empty());
        assert!(extract_dining("", &ctx(&config)).is_empty());
    }

    #[test]
    fn synthesize_policy_fills_generic_entries() {
        let config = ExtractionConfig {
            fallback_policy: FallbackPolicy::Synthesize,
            ..ExtractionConfig::default()
        };
        let dining = extract_dining("", &ctx(&config));
        assert!(dining.iter().any(|d| d.name == "Ankara Street Food"));
    }

    #[test]
    fn cuisine_defaults_to_other() {
        assert_eq!(infer_cuisine("A lovely place"), "Other");
        assert_eq!(infer_cuisine("Fresh seafood and kebab"), "Seafood");
    }
}
