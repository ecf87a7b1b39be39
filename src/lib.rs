//! Itinerary parser for multi-agent travel plans
//!
//! Turns the loosely structured Markdown produced by planning agents into a
//! render-ready itinerary:
//! - Day-by-day activities (morning/afternoon/evening, classified)
//! - Dining, accommodation, transportation and tips
//! - Sources, images and blog-style reading
//!
//! Also provides a blocking client for the travel-plan API, a TTL cache of
//! assembled itineraries, and a JSON-in/JSON-out C ABI.

pub mod assembler;
pub mod cache;
pub mod client;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod extractors;
pub mod ffi;
pub mod model;
pub mod text;

pub use assembler::{assemble, assemble_with};
pub use cache::ItineraryCache;
pub use client::{is_placeholder_id, PollOutcome, TravelClient};
pub use config::{ClientConfig, ExtractionConfig, FallbackPolicy};
pub use error::{ClientError, ConfigError, ExtractError};
pub use model::*;
