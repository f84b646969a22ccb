//! Prompt construction for itinerary generation

use serde_json::json;

use super::locate::{JSON_END_MARKER, JSON_START_MARKER};
use super::plan::PlanRequest;

fn schema_example() -> String {
    let example = json!({
        "destination_name": "Place, Country",
        "maps_query": "Place,Country",
        "itinerary": [
            {"day_number": 1, "summary": "Sample day", "activities": ["Activity 1", "Activity 2"], "approximate_cost": 100}
        ],
        "visit_sequence": [
            {
                "order": 1,
                "location_name": "Activity 1",
                "suggested_time": "Morning",
                "estimated_duration": "1 hour",
                "note": "Tip",
                "latitude": null,
                "longitude": null,
                "nearby_food_recommendations": [
                    {"name": "Sample Eatery", "rating": 4.2, "distance_m": 200, "price_level": "₹", "reason": "Local favorite"}
                ]
            }
        ],
        "popular_dinner_recommendations": [
            {"name": "Sample Eatery", "reason": "Tasty local food", "rating": 4.2, "price_level": "₹"}
        ],
        "popular_stays": [
            {"name": "Sample Hotel", "reason": "Convenient", "rating": 4.0, "price_level": "₹₹"}
        ],
        "travel_instructions": [
            {"from": "origin", "to": "destination", "transport": "train/taxi", "approx_time": "Varies", "notes": "Short note"}
        ]
    });
    serde_json::to_string_pretty(&example).unwrap_or_else(|_| example.to_string())
}

/// Prompt asking for exactly one marker-wrapped JSON object.
pub fn build_prompt(request: &PlanRequest) -> String {
    let origin = if request.origin.is_empty() {
        "not provided"
    } else {
        request.origin.as_str()
    };

    format!(
        r#"
You are a travel planner assistant. Return ONLY a JSON object between the markers below:

{JSON_START_MARKER}
<JSON>
{JSON_END_MARKER}

Inputs:
- destination: "{destination}"
- preferences: "{preferences}"
- days: "{days}"
- budget: "{budget}"
- origin: "{origin}"

Schema example:
{schema}

Requirements:
- Return exactly one JSON object between the markers. Do not include any other text.
- Ensure visit_sequence is an ordered array with numeric 'order' fields.
- For each visit_sequence item include at least one nearby_food_recommendation if possible.
- Include latitude and longitude for each visit_sequence item when known.
- Use plain JSON (no markdown, no code fences). If you must include fences, they will be stripped.
"#,
        destination = request.destination,
        preferences = request.preferences,
        days = request.days,
        budget = request.budget,
        schema = schema_example(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::itinerary::locate::extract_json_object;

    #[test]
    fn test_prompt_contains_inputs_and_markers() {
        let request = PlanRequest {
            destination: "Paris".into(),
            days: "2".into(),
            ..PlanRequest::default()
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("- destination: \"Paris\""));
        assert!(prompt.contains("- days: \"2\""));
        assert!(prompt.contains("- origin: \"not provided\""));
        assert!(prompt.contains(JSON_START_MARKER));
        assert!(prompt.contains(JSON_END_MARKER));
    }

    #[test]
    fn test_schema_example_is_valid_json() {
        let parsed: serde_json::Value = serde_json::from_str(&schema_example()).unwrap();
        assert_eq!(parsed["visit_sequence"][0]["order"], 1);
    }

    #[test]
    fn test_prompt_schema_falls_through_to_brace_scan() {
        // <JSON> between the markers is not an object
        let prompt = build_prompt(&PlanRequest::default());
        let found = extract_json_object(&prompt).unwrap();
        assert_eq!(found.get("destination_name").and_then(|v| v.as_str()), Some("Place, Country"));
    }
}
