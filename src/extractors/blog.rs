//! Blog-style reading from the insights text and search hits

use serde_json::Value;
use tracing::debug;

use super::sources::{search_hits, source_host};
use super::ExtractContext;
use crate::dedupe::dedupe_by_key;
use crate::error::ExtractError;
use crate::model::BlogPost;
use crate::text::{clean_inline, is_bullet, paragraphs, truncate_chars};

const MAX_TITLE_LEN: usize = 80;
const MIN_PARAGRAPH_LEN: usize = 100;
const INSIGHTS_SOURCE: &str = "Travel Insights";

/// (title, content) templates for padding; `{place}` is the destination
const TOPICS: &[(&str, &str)] = &[
    (
        "Exploring {place}: A First-Timer's Guide",
        "Neighbourhoods, landmarks and practical advice for a first visit to {place}.",
    ),
    (
        "The Food Lover's Guide to {place}",
        "Signature dishes, markets and where locals eat in {place}.",
    ),
    (
        "Hidden Gems of {place}",
        "Lesser-known corners of {place} that most itineraries skip.",
    ),
    (
        "Getting Around {place} Like a Local",
        "Public transport, walking routes and taxis in {place}.",
    ),
    (
        "Where to Stay in {place}",
        "Choosing a neighbourhood and a budget for your stay in {place}.",
    ),
    (
        "A Perfect Weekend in {place}",
        "Two days in {place}, from morning coffee to late dinners.",
    ),
];

/// Posts from search hits, then titled sections of `insights` (or long
/// paragraphs when it has no titles). When nothing is extracted, generic
/// topics stand in if insights text was present or the policy synthesizes.
pub fn extract_blog_posts(
    insights: &str,
    search_results: Option<&Value>,
    ctx: &ExtractContext,
) -> Result<Vec<BlogPost>, ExtractError> {
    let mut posts: Vec<BlogPost> = search_hits(search_results)?
        .into_iter()
        .filter(|hit| !hit.title.is_empty())
        .map(|hit| BlogPost {
            source: source_host(&hit.link),
            title: hit.title,
            content: hit.snippet,
            url: Some(hit.link),
        })
        .collect();

    let titled = titled_posts(insights);
    if titled.is_empty() {
        posts.extend(paragraph_posts(insights));
    } else {
        posts.extend(titled);
    }

    let mut posts = dedupe_by_key(posts, |post| post.title.to_lowercase());

    if posts.is_empty() && (!insights.trim().is_empty() || ctx.config.fallback_policy.synthesizes()) {
        debug!(count = ctx.config.min_blog_posts, "blog: no posts, padding with generic topics");
        let place = ctx.place_name();
        posts = TOPICS
            .iter()
            .take(ctx.config.min_blog_posts)
            .map(|(title, content)| BlogPost {
                title: title.replace("{place}", place),
                content: content.replace("{place}", place),
                url: None,
                source: "Travel Guide".to_string(),
            })
            .collect();
    }

    Ok(posts)
}

/// Short lines that read as headings
fn heading_title(line: &str) -> Option<String> {
    if line.chars().count() > MAX_TITLE_LEN || is_bullet(line) {
        return None;
    }
    let bold_only = line.starts_with("**")
        && line.trim_end_matches(':').ends_with("**")
        && line.matches("**").count() == 2;
    if !(line.starts_with('#') || bold_only || line.ends_with(':')) {
        return None;
    }
    let title = clean_inline(line.trim_start_matches('#'))
        .trim_end_matches(':')
        .trim()
        .to_string();
    (!title.is_empty()).then_some(title)
}

/// Title line followed by body lines, ending at a blank line or the next title
fn titled_posts(text: &str) -> Vec<BlogPost> {
    let mut posts = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    fn flush(current: &mut Option<(String, Vec<String>)>, posts: &mut Vec<BlogPost>) {
        if let Some((title, body)) = current.take() {
            if !body.is_empty() {
                posts.push(BlogPost {
                    title,
                    content: body.join("\n"),
                    url: None,
                    source: INSIGHTS_SOURCE.to_string(),
                });
            }
        }
    }

    for line in text.lines().map(str::trim) {
        if let Some(title) = heading_title(line) {
            flush(&mut current, &mut posts);
            current = Some((title, Vec::new()));
            continue;
        }
        if line.is_empty() {
            // A blank line straight after the title does not end the post
            if current.as_ref().is_some_and(|(_, body)| !body.is_empty()) {
                flush(&mut current, &mut posts);
            }
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(clean_inline(line));
        }
    }
    flush(&mut current, &mut posts);

    posts
}

/// Long paragraphs, titled by their opening sentence
fn paragraph_posts(text: &str) -> Vec<BlogPost> {
    paragraphs(text)
        .into_iter()
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_LEN)
        .map(|p| {
            let content = clean_inline(p);
            let sentence = content
                .split_once(". ")
                .map(|(first, _)| first)
                .unwrap_or(&content);
            BlogPost {
                title: truncate_chars(sentence.trim_end_matches('.'), MAX_TITLE_LEN),
                content: content.clone(),
                url: None,
                source: INSIGHTS_SOURCE.to_string(),
            }
        })
        .collect()
}
