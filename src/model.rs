//! Wire and display types
//!
//! `RawPlan` is whatever the travel-plan endpoint returned; every field is
//! optional and tolerant of nulls or wrong JSON types. `DisplayItinerary` is
//! the render-ready result of [`crate::assemble`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Trip length assumed when the response carries none.
pub const DEFAULT_TRIP_LENGTH: u32 = 3;

/// Raw travel plan as returned by `GET /agents/travel-plan/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlan {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub destination: String,
    /// Day-structured narrative from the planner agent
    #[serde(default, deserialize_with = "lenient_string")]
    pub itinerary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub food: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accommodation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub attractions: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub reviews: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub insights: Option<String>,
    /// Newline-delimited URLs, a JSON array of URLs, or image search hits
    #[serde(default)]
    pub images: Option<Value>,
    /// Search hits (`{title, link, snippet}`) or free text
    #[serde(default)]
    pub search_results: Option<Value>,
    #[serde(default = "default_trip_length", deserialize_with = "lenient_trip_length")]
    pub trip_length: u32,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub interests: Vec<String>,
    /// Fields this crate does not know about; still scanned for image URLs
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for RawPlan {
    fn default() -> Self {
        Self {
            id: String::new(),
            destination: String::new(),
            itinerary: String::new(),
            food: String::new(),
            accommodation: String::new(),
            attractions: String::new(),
            reviews: None,
            insights: None,
            images: None,
            search_results: None,
            trip_length: DEFAULT_TRIP_LENGTH,
            budget: None,
            interests: vec![],
            extra: serde_json::Map::new(),
        }
    }
}

impl RawPlan {
    /// Insights prose, preferring `insights` over the older `reviews` field
    pub fn insights_text(&self) -> Option<&str> {
        self.insights
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.reviews.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

fn default_trip_length() -> u32 {
    DEFAULT_TRIP_LENGTH
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            Some(parts.join("\n"))
        }
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value_to_text(value).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value_to_text(value))
}

fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter_map(value_to_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => vec![],
    })
}

fn lenient_trip_length<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(d)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|first| first.parse::<u64>().ok()),
        _ => None,
    };
    Ok(parsed
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(DEFAULT_TRIP_LENGTH))
}

/// Render-ready itinerary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItinerary {
    pub destination: String,
    pub trip_length: u32,
    pub budget: String,
    pub overview: String,
    pub interests: Vec<String>,
    pub days: Vec<Day>,
    pub dining: Vec<DiningEntry>,
    pub accommodations: Vec<AccommodationCategory>,
    pub transportation: Vec<TransportOption>,
    pub tips: Vec<Tip>,
    pub sources: Vec<Source>,
    pub images: Vec<Image>,
    pub blog_posts: Vec<BlogPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Day {
    pub number: u32,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub time: Period,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: String,
}

/// Time-of-day heading inside a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Morning, Period::Afternoon, Period::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "Morning",
            Period::Afternoon => "Afternoon",
            Period::Evening => "Evening",
        }
    }

    pub fn parse(s: &str) -> Option<Period> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Some(Period::Morning),
            "afternoon" => Some(Period::Afternoon),
            "evening" => Some(Period::Evening),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityType {
    Activity,
    Dining,
    Transportation,
    Cost,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cuisine: String,
    pub description: String,
    pub category: DiningCategory,
    pub is_category: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiningCategory {
    LocalDishes,
    Restaurants,
    FoodMarkets,
    CulinaryExperiences,
    Etiquette,
}

impl DiningCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DiningCategory::LocalDishes => "Must-Try Local Dishes",
            DiningCategory::Restaurants => "Restaurants",
            DiningCategory::FoodMarkets => "Food Markets & Culinary Districts",
            DiningCategory::CulinaryExperiences => "Culinary Experiences",
            DiningCategory::Etiquette => "Dining Etiquette",
        }
    }
}

impl Serialize for DiningCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price_range: String,
    pub description: String,
    pub is_category: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportOption {
    #[serde(rename = "type")]
    pub kind: TransportKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Taxi,
    Bus,
    SubwayMetro,
    Walking,
    BikingCycling,
    Generic,
}

impl TransportKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::Taxi => "Taxi",
            TransportKind::Bus => "Bus",
            TransportKind::SubwayMetro => "Subway/Metro",
            TransportKind::Walking => "Walking",
            TransportKind::BikingCycling => "Biking/Cycling",
            TransportKind::Generic => "Transportation",
        }
    }
}

impl Serialize for TransportKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tip {
    pub category: TipCategory,
    pub description: String,
    pub cost: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipCategory {
    Hotel,
    Dining,
    Transportation,
    Shopping,
    Cultural,
}

impl TipCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            TipCategory::Hotel => "🏨",
            TipCategory::Dining => "🍽️",
            TipCategory::Transportation => "🚕",
            TipCategory::Shopping => "🛍️",
            TipCategory::Cultural => "🏛️",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TipCategory::Hotel => "Hotel Tips",
            TipCategory::Dining => "Dining Tips",
            TipCategory::Transportation => "Transportation Tips",
            TipCategory::Shopping => "Shopping Tips",
            TipCategory::Cultural => "Cultural Tips",
        }
    }
}

impl fmt::Display for TipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.name())
    }
}

impl Serialize for TipCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub url: String,
    pub caption: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogPost {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub source: String,
}

/// Questionnaire answers posted to `POST /agents/travel-plan`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPreferences {
    pub destination: String,
    pub trip_length: u32,
    #[serde(default = "default_budget")]
    pub budget: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub get_insights: bool,
    #[serde(default)]
    pub get_images: bool,
}

fn default_budget() -> String {
    "moderate".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanCreated {
    pub id: String,
}

/// Progress report from `GET /agents/travel-plan/{id}/status`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub overall_progress: f64,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentStatus>,
    #[serde(default)]
    pub completed: bool,
}

impl StatusSnapshot {
    pub fn is_complete(&self) -> bool {
        self.completed || self.overall_progress >= 100.0
    }

    /// Agent ids currently reporting work in progress, in id order
    pub fn active_agents(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|(_, status)| status.is_active)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Agents that reported an error
    pub fn failed_agents(&self) -> Vec<(&str, &str)> {
        self.agents
            .iter()
            .filter_map(|(id, status)| status.error.as_deref().map(|e| (id.as_str(), e)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub logs: Vec<AgentLogEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentLogEntry {
    pub timestamp: String,
    pub text: String,
}
