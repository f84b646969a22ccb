//! Itinerary extraction and normalization
//!
//! Turns free-form model output into a renderable travel plan.
//!
//! # Pipeline
//!
//! 1. [`extract_response_text`] - pull the text payload out of an API response body
//! 2. [`strip_code_fences`] - drop a Markdown fence wrapping the text
//! 3. [`extract_json_object`] - find the JSON object (markers, then brace scan)
//! 4. [`normalize_visit_sequence`] - coerce `visit_sequence` into a list of records
//! 5. [`synthesize`] - derive missing days, visits and meal picks
//! 6. [`layout`] - grid positions and leg estimates
//! 7. [`maps`] - search and directions links
//!
//! [`build_plan`] runs steps 3-7 for one request.
//!
//! # Example
//!
//! ```
//! use treasuremap_server::domain::itinerary::{LayoutConfig, PlanRequest, build_plan};
//!
//! let raw = r#"Here you go:
//! ===JSON_START===
//! {"visit_sequence": [{"order": 1, "location_name": "Belem Tower"}]}
//! ===JSON_END==="#;
//!
//! let request = PlanRequest { destination: "Lisbon".into(), ..Default::default() };
//! let view = build_plan(&request, raw, &LayoutConfig::default());
//! assert_eq!(view.visit_nodes[0].location_name, "Belem Tower");
//! assert_eq!(view.itinerary.len(), 1);
//! ```

mod extract;
mod fence;
mod locate;
mod prompt;
mod sample;
mod types;
mod visits;

pub mod layout;
pub mod maps;
pub mod plan;
pub mod synthesize;

pub use extract::{PathSegment, RESPONSE_TEXT_PATHS, extract_response_text, first_success};
pub use fence::strip_code_fences;
pub use layout::{GridLayout, LayoutConfig};
pub use locate::{JSON_END_MARKER, JSON_START_MARKER, extract_json_object};
pub use maps::MapLinks;
pub use plan::{PlanRequest, PlanView, build_plan};
pub use prompt::build_prompt;
pub use sample::SAMPLE_RESPONSE;
pub use types::{
    DailyMeals, DayPlan, JsonMap, LegEstimate, MealPick, ParsedItinerary, Recommendation,
    TravelInstruction, VisitNode,
};
pub use visits::normalize_visit_sequence;
