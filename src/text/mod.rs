//! Text segmentation and line classification shared by the extractors

pub mod classify;
pub mod segment;

pub use classify::*;
pub use segment::*;
