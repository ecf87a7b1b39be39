//! Cited sources and search hits

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::dedupe::dedupe_by_key;
use crate::error::ExtractError;
use crate::model::Source;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\((https?://[^\s)]+)\)").expect("valid regex")
});

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).expect("valid regex"));

/// Opens a sources section: a `## References` or `**Sources**` line, or
/// `Sources:` with the links following on the same line
static SOURCES_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t#*_]*(?:sources|references)[ \t*_]*(?::[ \t*_]*|[ \t*_\r]*$)")
        .expect("valid regex")
});

static NEXT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("valid regex"));

static SECTION_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t\r]*\n").expect("valid regex"));

/// One web search result as returned alongside a plan
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Parse `search_results` hits. Free-text results yield no hits; any other
/// non-array shape is an error.
pub fn search_hits(value: Option<&Value>) -> Result<Vec<SearchHit>, ExtractError> {
    let items = match value {
        None | Some(Value::Null) | Some(Value::String(_)) => return Ok(vec![]),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ExtractError::UnexpectedShape {
                field: "search_results",
                detail: format!("expected array of hits, got {}", json_kind(other)),
            })
        }
    };

    let hits = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::trim);
            let link = text("link").or_else(|| text("url")).filter(|l| !l.is_empty())?;
            Some(SearchHit {
                title: text("title").unwrap_or("").to_string(),
                link: link.to_string(),
                snippet: text("snippet")
                    .or_else(|| text("description"))
                    .unwrap_or("")
                    .to_string(),
            })
        })
        .collect();
    Ok(hits)
}

/// Free-text `search_results`, if that is what upstream sent
pub fn search_results_text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Host without a leading `www.`
pub fn source_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

/// Readable title from the last path segment, else the host
pub fn title_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(s).to_string());

    match segment {
        Some(stem) if stem.chars().any(char::is_alphabetic) => stem
            .split(['-', '_', '+'])
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
        _ => source_host(url),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn trim_url(raw: &str) -> &str {
    raw.trim_end_matches(['.', ',', ';', ':', '!', '?', '*'])
}

/// Markdown links and bare URLs in text order
fn links_in(text: &str) -> Vec<Source> {
    let mut found: Vec<(usize, Source)> = Vec::new();

    for caps in MARKDOWN_LINK.captures_iter(text) {
        let (Some(whole), Some(title), Some(url)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let url = trim_url(url.as_str());
        found.push((
            whole.start(),
            Source {
                title: title.as_str().trim().to_string(),
                url: url.to_string(),
                source: source_host(url),
            },
        ));
    }

    for m in BARE_URL.find_iter(text) {
        let url = trim_url(m.as_str());
        if Url::parse(url).is_err() {
            continue;
        }
        found.push((
            m.start(),
            Source {
                title: title_from_url(url),
                url: url.to_string(),
                source: source_host(url),
            },
        ));
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, source)| source).collect()
}

/// Body of the first sources section, up to the next Markdown heading or blank line
fn sources_section(text: &str) -> Option<&str> {
    let heading = SOURCES_HEADING.find(text)?;
    let rest = text[heading.end()..].trim_start();
    let end = [NEXT_HEADING.find(rest), SECTION_BREAK.find(rest)]
        .into_iter()
        .flatten()
        .map(|m| m.start())
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Sources from search hits, then from a sources section of `text` (or any
/// URL in `text` when there is no such section), deduplicated by URL.
pub fn extract_sources(text: &str, search_results: Option<&Value>) -> Result<Vec<Source>, ExtractError> {
    let mut sources: Vec<Source> = search_hits(search_results)?
        .into_iter()
        .map(|hit| Source {
            title: if hit.title.is_empty() {
                title_from_url(&hit.link)
            } else {
                hit.title
            },
            source: source_host(&hit.link),
            url: hit.link,
        })
        .collect();

    let section_links = sources_section(text).map(links_in).unwrap_or_default();
    if section_links.is_empty() {
        debug!("sources: no sources section, scanning all text");
        sources.extend(links_in(text));
    } else {
        sources.extend(section_links);
    }

    Ok(dedupe_by_key(sources, |s| s.url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_sources_section() {
        let text = r#"See https://example.com/ignored-page for more.

## Sources:
- [Ankara Travel Guide](https://www.lonelyplanet.com/turkey/ankara)
- https://www.goturkiye.com/ankara-castle.
"#;
        let sources = extract_sources(text, None).unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Ankara Travel Guide");
        assert_eq!(sources[0].source, "lonelyplanet.com");
        assert_eq!(sources[1].url, "https://www.goturkiye.com/ankara-castle");
        assert_eq!(sources[1].title, "Ankara Castle");
    }

    #[test]
    fn inline_sources_line_is_a_section() {
        let text = "Photo https://img.example.com/meze.jpg\n\nAnkara notes.\n\nSources: https://www.lonelyplanet.com/turkey/ankara, [GoTürkiye](https://www.goturkiye.com/ankara)\n\nSee also https://example.com/later";
        let sources = extract_sources(text, None).unwrap();

        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://www.lonelyplanet.com/turkey/ankara", "https://www.goturkiye.com/ankara"]
        );
    }

    #[test]
    fn falls_back_to_any_url() {
        let text = "Read https://blog.example.org/posts/best_kebab_2024.html and https://blog.example.org/posts/best_kebab_2024.html again";
        let sources = extract_sources(text, None).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Best Kebab 2024");
        assert_eq!(sources[0].source, "blog.example.org");
    }

    #[test]
    fn search_hits_come_first() {
        let hits = json!([
            {"title": "Visit Ankara", "link": "https://example.com/a", "snippet": "..."},
            {"title": "No link"},
            "not an object"
        ]);
        let sources = extract_sources("https://example.com/a", Some(&hits)).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Visit Ankara");
    }

    #[test]
    fn unexpected_search_shape_is_an_error() {
        let err = extract_sources("", Some(&json!({"link": "x"}))).unwrap_err();
        assert!(matches!(err, ExtractError::UnexpectedShape { field: "search_results", .. }));
    }

    #[test]
    fn title_falls_back_to_host() {
        assert_eq!(title_from_url("https://www.example.com/"), "example.com");
        assert_eq!(source_host("not a url"), "");
    }
}
