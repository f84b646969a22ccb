//! Domain logic
//!
//! - `itinerary` - prompt construction and the tolerant model-output pipeline
//!   that turns free-form text into a renderable plan

pub mod itinerary;
