//! Extraction and client configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What extractors do when every tier comes up empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Fill gaps with generic, destination-templated entries
    Synthesize,
    /// Leave the section empty so the view can show "no data"
    #[default]
    Empty,
}

impl FallbackPolicy {
    pub fn synthesizes(&self) -> bool {
        matches!(self, FallbackPolicy::Synthesize)
    }
}

/// Stock images offered for a destination keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockImage {
    /// Lowercase substring matched against the destination
    pub keyword: String,
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub fallback_policy: FallbackPolicy,
    /// Maximum nesting depth walked when scanning the raw response for images
    pub image_scan_depth: usize,
    /// Number of generic topics that stand in when no blog post is extracted
    pub min_blog_posts: usize,
    /// Shared description prefix length that marks two tips as duplicates
    pub tip_prefix_len: usize,
    /// Upper bound on days synthesized from `trip_length` when no day headings parse
    pub max_placeholder_days: u32,
    pub stock_images: Vec<StockImage>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_policy: FallbackPolicy::Empty,
            image_scan_depth: 5,
            min_blog_posts: 5,
            tip_prefix_len: 20,
            max_placeholder_days: 90,
            stock_images: default_stock_images(),
        }
    }
}

fn default_stock_images() -> Vec<StockImage> {
    vec![
        StockImage {
            keyword: "ankara".to_string(),
            url: "https://images.unsplash.com/photo-1589557909852-aca127073054?auto=format&fit=crop&w=1200&h=600&q=80".to_string(),
            caption: "Anıtkabir, Ankara".to_string(),
        },
        StockImage {
            keyword: "istanbul".to_string(),
            url: "https://images.unsplash.com/photo-1524231757912-21f4fe3a7200?auto=format&fit=crop&w=1200&h=600&q=80".to_string(),
            caption: "Blue Mosque, Istanbul".to_string(),
        },
    ]
}

impl ExtractionConfig {
    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `ITINERARY_FALLBACK_POLICY` and `ITINERARY_IMAGE_SCAN_DEPTH`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(policy) = std::env::var("ITINERARY_FALLBACK_POLICY") {
            config.fallback_policy = match policy.trim().to_lowercase().as_str() {
                "synthesize" => FallbackPolicy::Synthesize,
                "empty" => FallbackPolicy::Empty,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "ITINERARY_FALLBACK_POLICY",
                        value: policy,
                    })
                }
            };
        }

        if let Ok(depth) = std::env::var("ITINERARY_IMAGE_SCAN_DEPTH") {
            config.image_scan_depth =
                depth.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ITINERARY_IMAGE_SCAN_DEPTH",
                    value: depth.clone(),
                })?;
        }

        Ok(config)
    }

    /// Stock images whose keyword appears in the destination
    pub fn stock_images_for(&self, destination: &str) -> Vec<&StockImage> {
        let lower = destination.to_lowercase();
        self.stock_images
            .iter()
            .filter(|img| !img.keyword.is_empty() && lower.contains(&img.keyword))
            .collect()
    }
}

/// Settings for the travel-plan HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Polls before giving up on a plan that never reports completion
    pub max_polls: u32,
    pub bearer_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            poll_interval_ms: 2000,
            max_polls: 100,
            bearer_token: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TRAVEL_API_BASE_URL` and `TRAVEL_API_TOKEN`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var("TRAVEL_API_BASE_URL") {
            if !base.trim().is_empty() {
                config.base_url = base.trim().trim_end_matches('/').to_string();
            }
        }
        config.bearer_token = std::env::var("TRAVEL_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ExtractionConfig::from_json(r#"{"fallback_policy": "synthesize"}"#).unwrap();
        assert_eq!(config.fallback_policy, FallbackPolicy::Synthesize);
        assert_eq!(config.image_scan_depth, 5);
        assert_eq!(config.tip_prefix_len, 20);
        assert_eq!(config.max_placeholder_days, 90);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(ExtractionConfig::from_json(r#"{"fallback_policy": "maybe"}"#).is_err());
    }

    #[test]
    fn stock_images_match_by_keyword() {
        let config = ExtractionConfig::default();
        assert_eq!(config.stock_images_for("Ankara, Turkey").len(), 1);
        assert!(config.stock_images_for("Lisbon").is_empty());
    }
}
