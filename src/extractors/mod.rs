//! Entity extractors
//!
//! Each module turns one upstream text field (or the raw plan as a whole)
//! into a list of display entities.

mod accommodation;
mod blog;
mod days;
mod dining;
mod images;
mod sources;
mod tips;
mod transportation;

pub use accommodation::*;
pub use blog::*;
pub use days::*;
pub use dining::*;
pub use images::*;
pub use sources::*;
pub use tips::*;
pub use transportation::*;

use crate::config::ExtractionConfig;

/// Destination and settings shared by the extractors of one assembly run
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub destination: &'a str,
    pub config: &'a ExtractionConfig,
}

impl<'a> ExtractContext<'a> {
    pub fn new(destination: &'a str, config: &'a ExtractionConfig) -> Self {
        Self {
            destination,
            config,
        }
    }

    /// Destination up to the first comma: "Ankara, Turkey" -> "Ankara"
    pub fn place_name(&self) -> &'a str {
        let place = self.destination.split(',').next().unwrap_or("").trim();
        if place.is_empty() {
            "the destination"
        } else {
            place
        }
    }
}
