//! Destination images
//!
//! The dedicated `images` field wins. Without it every string anywhere in the
//! raw response is scanned for image-file URLs, down to a bounded depth.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::sources::{json_kind, source_host};
use super::ExtractContext;
use crate::dedupe::dedupe_by_key;
use crate::error::ExtractError;
use crate::model::{Image, RawPlan};
use crate::text::strip_bullet;

static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>()\[\]]+?\.(?:jpe?g|png|gif|webp)\b(?:\?[^\s"'<>()\[\]]*)?"#)
        .expect("valid regex")
});

pub fn extract_images(raw: &RawPlan, ctx: &ExtractContext) -> Result<Vec<Image>, ExtractError> {
    let mut images = images_field(raw.images.as_ref())?;

    if images.is_empty() {
        let value = serde_json::to_value(raw).map_err(|source| ExtractError::Json {
            field: "plan",
            source,
        })?;
        let caption = format!("Photo of {}", ctx.place_name());
        let mut urls = Vec::new();
        scan_value(&value, 0, ctx.config.image_scan_depth, &mut urls);
        debug!(found = urls.len(), "images: scanned raw response");
        images = urls
            .into_iter()
            .map(|url| Image {
                source: source_host(&url),
                caption: caption.clone(),
                url,
            })
            .collect();
    }

    let images = dedupe_by_key(images, |image| image.url.clone());
    if images.is_empty() && ctx.config.fallback_policy.synthesizes() {
        return Ok(ctx
            .config
            .stock_images_for(ctx.destination)
            .into_iter()
            .map(|stock| Image {
                url: stock.url.clone(),
                caption: stock.caption.clone(),
                source: source_host(&stock.url),
            })
            .collect());
    }
    Ok(images)
}

/// Images from the dedicated field: newline-delimited URLs, a JSON array
/// (possibly JSON-encoded inside a string) of URLs or image search hits
fn images_field(value: Option<&Value>) -> Result<Vec<Image>, ExtractError> {
    match value {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::String(text)) if text.trim_start().starts_with('[') => {
            let parsed: Value = serde_json::from_str(text).map_err(|source| ExtractError::Json {
                field: "images",
                source,
            })?;
            images_field(Some(&parsed))
        }
        Some(Value::String(text)) => Ok(text
            .lines()
            .map(strip_bullet)
            .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
            .map(|url| Image {
                source: source_host(&url),
                caption: String::new(),
                url,
            })
            .collect()),
        Some(Value::Array(items)) => Ok(items.iter().filter_map(image_from_item).collect()),
        Some(other) => Err(ExtractError::UnexpectedShape {
            field: "images",
            detail: format!("expected string or array, got {}", json_kind(other)),
        }),
    }
}

fn image_from_item(item: &Value) -> Option<Image> {
    match item {
        Value::String(url) if url.starts_with("http") => Some(Image {
            url: url.trim().to_string(),
            caption: String::new(),
            source: source_host(url.trim()),
        }),
        Value::Object(obj) => {
            let text = |key: &str| {
                obj.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };
            let url = text("link")
                .or_else(|| text("url"))
                .or_else(|| text("original"))
                .or_else(|| text("thumbnail"))?;
            let source = text("context")
                .or_else(|| text("source"))
                .map(|s| {
                    let host = source_host(s);
                    if host.is_empty() {
                        s.to_string()
                    } else {
                        host
                    }
                })
                .unwrap_or_else(|| source_host(url));
            Some(Image {
                url: url.to_string(),
                caption: text("title").unwrap_or("").to_string(),
                source,
            })
        }
        _ => None,
    }
}

/// Collect image URLs from every string in `value`, not descending past `max_depth`
fn scan_value(value: &Value, depth: usize, max_depth: usize, out: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            out.extend(IMAGE_URL.find_iter(text).map(|m| m.as_str().to_string()));
        }
        Value::Array(items) if depth < max_depth => {
            for item in items {
                scan_value(item, depth + 1, max_depth, out);
            }
        }
        Value::Object(map) if depth < max_depth => {
            for item in map.values() {
                scan_value(item, depth + 1, max_depth, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractionConfig, FallbackPolicy};
    use serde_json::json;

    fn plan(value: serde_json::Value) -> RawPlan {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn newline_delimited_field() {
        let raw = plan(json!({
            "destination": "Ankara",
            "images": "https://example.com/a.jpg\n- https://www.example.com/b.png\nnot a url"
        }));
        let config = ExtractionConfig::default();
        let images = extract_images(&raw, &ExtractContext::new("Ankara", &config)).unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[1].url, "https://www.example.com/b.png");
        assert_eq!(images[1].source, "example.com");
    }

    #[test]
    fn image_search_hits() {
        let raw = plan(json!({
            "images": [
                {"title": "Ankara Castle", "link": "https://cdn.example.com/castle.jpg", "context": "https://www.visitankara.com/castle"},
                {"title": "No url"},
                "https://cdn.example.com/mausoleum.webp"
            ]
        }));
        let config = ExtractionConfig::default();
        let images = extract_images(&raw, &ExtractContext::new("Ankara", &config)).unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].caption, "Ankara Castle");
        assert_eq!(images[0].source, "visitankara.com");
    }

    #[test]
    fn scans_text_fields_and_dedupes() {
        let raw = plan(json!({
            "itinerary": "Start at https://img.example.com/kale.jpg?w=800 today.",
            "food": "Same photo: https://img.example.com/kale.jpg?w=800",
            "custom": {"nested": ["https://img.example.com/ulus.JPEG"]}
        }));
        let config = ExtractionConfig::default();
        let images = extract_images(&raw, &ExtractContext::new("Ankara", &config)).unwrap();

        let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://img.example.com/kale.jpg?w=800"));
        assert!(urls.contains(&"https://img.example.com/ulus.JPEG"));
    }

    #[test]
    fn scan_depth_is_bounded() {
        let raw = plan(json!({
            "deep": {"a": {"b": {"c": "https://img.example.com/deep.png"}}}
        }));
        let config = ExtractionConfig {
            image_scan_depth: 2,
            ..ExtractionConfig::default()
        };
        let images = extract_images(&raw, &ExtractContext::new("Ankara", &config)).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn malformed_json_string_is_an_error() {
        let raw = plan(json!({"images": "[\"https://x.com/a.jpg\""}));
        let config = ExtractionConfig::default();
        let err = extract_images(&raw, &ExtractContext::new("Ankara", &config)).unwrap_err();
        assert!(matches!(err, ExtractError::Json { field: "images", .. }));
    }

    #[test]
    fn stock_images_only_when_synthesizing() {
        let raw = plan(json!({"destination": "Ankara, Turkey"}));
        let config = ExtractionConfig::default();
        let ctx = ExtractContext::new("Ankara, Turkey", &config);
        assert!(extract_images(&raw, &ctx).unwrap().is_empty());

        let config = ExtractionConfig {
            fallback_policy: FallbackPolicy::Synthesize,
            ..ExtractionConfig::default()
        };
        let ctx = ExtractContext::new("Ankara, Turkey", &config);
        let images = extract_images(&raw, &ctx).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].source, "images.unsplash.com");
    }
}
