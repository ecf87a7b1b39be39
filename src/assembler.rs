//! Builds a [`DisplayItinerary`] from a [`RawPlan`]
//!
//! Assembly is total. Every extractor runs on its own field; one that fails
//! leaves its section empty and the rest of the itinerary is still produced.

use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extractors::{
    extract_accommodation, extract_blog_posts, extract_days, extract_dining, extract_images,
    extract_sources, extract_tips, extract_transportation, search_results_text, ExtractContext,
};
use crate::model::{DisplayItinerary, RawPlan};
use crate::text::{first_paragraph, strip_completion_marker};

const NO_OVERVIEW: &str = "No overview provided";
const NO_BUDGET: &str = "Budget information not provided";

/// Assemble with the default configuration
pub fn assemble(raw: &RawPlan) -> DisplayItinerary {
    assemble_with(raw, &ExtractionConfig::default())
}

pub fn assemble_with(raw: &RawPlan, config: &ExtractionConfig) -> DisplayItinerary {
    let ctx = ExtractContext::new(&raw.destination, config);

    let itinerary = strip_completion_marker(&raw.itinerary);
    let food = strip_completion_marker(&raw.food);
    let accommodation = strip_completion_marker(&raw.accommodation);
    let attractions = strip_completion_marker(&raw.attractions);
    let insights = raw
        .insights_text()
        .map(strip_completion_marker)
        .unwrap_or_default();

    let overview = match first_paragraph(&itinerary) {
        "" => NO_OVERVIEW.to_string(),
        paragraph => paragraph.to_string(),
    };
    let budget = raw
        .budget
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(NO_BUDGET)
        .to_string();

    // Every text field can cite sources, not just the insights
    let all_text = [
        itinerary.as_str(),
        food.as_str(),
        accommodation.as_str(),
        attractions.as_str(),
        insights.as_str(),
        search_results_text(raw.search_results.as_ref()).unwrap_or(""),
    ]
    .iter()
    .filter(|t| !t.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("\n\n");

    let out = DisplayItinerary {
        destination: raw.destination.clone(),
        trip_length: raw.trip_length,
        budget,
        overview,
        interests: raw.interests.clone(),
        days: extract_days(&itinerary, raw.trip_length, config.max_placeholder_days),
        dining: extract_dining(&food, &ctx),
        accommodations: extract_accommodation(&accommodation, &ctx),
        transportation: extract_transportation(&attractions, &ctx),
        tips: extract_tips(&accommodation, &ctx),
        sources: isolate("sources", extract_sources(&all_text, raw.search_results.as_ref())),
        images: isolate("images", extract_images(raw, &ctx)),
        blog_posts: isolate(
            "blog_posts",
            extract_blog_posts(&insights, raw.search_results.as_ref(), &ctx),
        ),
    };

    debug!(
        id = %raw.id,
        days = out.days.len(),
        dining = out.dining.len(),
        accommodations = out.accommodations.len(),
        tips = out.tips.len(),
        sources = out.sources.len(),
        images = out.images.len(),
        "assembled itinerary"
    );
    out
}

/// An extractor failure becomes an empty section
fn isolate<T>(section: &'static str, result: Result<Vec<T>, ExtractError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(section, error = %err, "extractor failed, leaving section empty");
            vec![]
        }
    }
}
