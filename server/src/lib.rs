//! TreasureMap: a travel itinerary planner backed by a Gemini text model
//!
//! The model is asked for a JSON itinerary; whatever comes back is run through
//! a tolerant extraction pipeline (`domain::itinerary`) and rendered as HTML.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
