//! Normalized itinerary schema
//!
//! Field names in model output are not stable, so every record reads its
//! fields through a synonym list and accepts numbers encoded as strings.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::locate::extract_json_object;
use super::visits::normalize_visit_sequence;

pub type JsonMap = Map<String, JsonValue>;

// Record key synonyms
const NAME_KEYS: &[&str] = &["name", "title", "place", "restaurant", "hotel"];
const REASON_KEYS: &[&str] = &["reason", "description", "why", "notes", "note"];
const RATING_KEYS: &[&str] = &["rating", "stars", "score"];
const PRICE_KEYS: &[&str] = &["price_level", "price", "price_range", "cost"];
const DISTANCE_KEYS: &[&str] = &["distance_m", "distance", "distance_meters"];

// Top-level list synonyms
const FOOD_LIST_KEYS: &[&str] = &[
    "popular_dinner_recommendations",
    "dinner_recommendations",
    "popular_foods",
    "restaurants",
];
const STAY_LIST_KEYS: &[&str] = &["popular_stays", "stays", "hotels", "accommodations"];

const VISIT_NAME_KEYS: &[&str] = &["location_name", "name", "place", "title"];
const ACTIVITY_NAME_KEYS: &[&str] = &["name", "title", "activity", "location_name"];
const NEARBY_FOOD_KEYS: &[&str] = &["nearby_food_recommendations", "nearby_food", "food"];

/// First non-null value among `keys`.
pub fn lookup<'a>(map: &'a JsonMap, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter()
        .find_map(|k| map.get(*k).filter(|v| !v.is_null()))
}

/// Non-blank string, or a number rendered as text.
pub fn value_as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON number or numeric string.
pub fn value_as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integer, float (truncated) or integer string.
pub fn value_as_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn string_field(map: &JsonMap, keys: &[&str]) -> String {
    lookup(map, keys).and_then(value_as_string).unwrap_or_default()
}

/// Coerce a value into a list of objects: lists keep their object
/// elements, a single object becomes a one-element list, strings are parsed.
pub fn object_list(value: &JsonValue) -> Vec<JsonMap> {
    match value {
        JsonValue::Array(items) => items.iter().filter_map(|v| v.as_object().cloned()).collect(),
        JsonValue::Object(map) => vec![map.clone()],
        JsonValue::String(text) => match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::String(_)) | Err(_) => extract_json_object(text)
                .map(|obj| vec![obj])
                .unwrap_or_default(),
            Ok(parsed) => object_list(&parsed),
        },
        _ => Vec::new(),
    }
}

/// A restaurant, stay or nearby-food suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: Option<String>,
    pub reason: Option<String>,
    pub rating: Option<f64>,
    pub price_level: Option<String>,
    pub distance_m: Option<f64>,
}

impl Recommendation {
    pub fn from_map(map: &JsonMap) -> Self {
        Self {
            name: lookup(map, NAME_KEYS).and_then(value_as_string),
            reason: lookup(map, REASON_KEYS).and_then(value_as_string),
            rating: lookup(map, RATING_KEYS).and_then(value_as_f64),
            price_level: lookup(map, PRICE_KEYS).and_then(value_as_string),
            distance_m: lookup(map, DISTANCE_KEYS).and_then(value_as_f64),
        }
    }

    pub fn list_from_value(value: &JsonValue) -> Vec<Self> {
        object_list(value).iter().map(Self::from_map).collect()
    }
}

/// One day of the itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub day_number: i64,
    pub summary: String,
    pub activities: Vec<String>,
    pub approximate_cost: Option<f64>,
}

impl DayPlan {
    /// `index` is the zero-based position, used when `day_number` is missing.
    pub fn from_value(index: usize, value: &JsonValue) -> Option<Self> {
        let fallback_day = index as i64 + 1;
        match value {
            JsonValue::Object(map) => Some(Self {
                day_number: lookup(map, &["day_number", "day"])
                    .and_then(value_as_i64)
                    .unwrap_or(fallback_day),
                summary: string_field(map, &["summary", "title", "theme"]),
                activities: lookup(map, &["activities", "plan"])
                    .map(activity_names)
                    .unwrap_or_default(),
                approximate_cost: lookup(map, &["approximate_cost", "cost"])
                    .and_then(value_as_f64),
            }),
            JsonValue::String(s) if !s.trim().is_empty() => Some(Self {
                day_number: fallback_day,
                summary: s.trim().to_string(),
                activities: Vec::new(),
                approximate_cost: None,
            }),
            _ => None,
        }
    }
}

/// Activity labels; objects contribute their name. Unnamed entries are kept
/// as empty strings so positions stay stable for visit synthesis.
fn activity_names(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Object(map) => string_field(map, ACTIVITY_NAME_KEYS),
                other => value_as_string(other).unwrap_or_default(),
            })
            .collect(),
        other => value_as_string(other).into_iter().collect(),
    }
}

/// One stop in the ordered visit sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitNode {
    pub order: i64,
    pub location_name: String,
    pub suggested_time: String,
    pub estimated_duration: String,
    pub note: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nearby_food_recommendations: Vec<Recommendation>,
    /// Grid position, assigned by the layout engine.
    pub x: i32,
    pub y: i32,
}

impl VisitNode {
    /// `index` is the zero-based position; it supplies the default order.
    ///
    /// A missing name stays empty until [`sort_by_order`](super::synthesize::sort_by_order) numbers it.
    pub fn from_record(index: usize, record: &JsonMap) -> Self {
        let latitude = lookup(record, &["latitude", "lat"])
            .and_then(value_as_f64)
            .filter(|v| (-90.0..=90.0).contains(v));
        let longitude = lookup(record, &["longitude", "lng", "lon"])
            .and_then(value_as_f64)
            .filter(|v| (-180.0..=180.0).contains(v));
        let location_name = lookup(record, VISIT_NAME_KEYS)
            .and_then(value_as_string)
            .unwrap_or_default();

        Self {
            order: lookup(record, &["order"])
                .and_then(value_as_i64)
                .unwrap_or(index as i64 + 1),
            location_name,
            suggested_time: string_field(record, &["suggested_time", "time"]),
            estimated_duration: string_field(record, &["estimated_duration", "duration"]),
            note: string_field(record, &["note", "notes", "tip"]),
            latitude,
            longitude,
            nearby_food_recommendations: lookup(record, NEARBY_FOOD_KEYS)
                .map(Recommendation::list_from_value)
                .unwrap_or_default(),
            x: 0,
            y: 0,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// One travel segment suggested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TravelInstruction {
    pub from: String,
    pub to: String,
    pub transport: String,
    pub approx_time: String,
    pub notes: String,
    pub map_link: Option<String>,
}

impl TravelInstruction {
    pub fn from_map(map: &JsonMap) -> Self {
        Self {
            from: string_field(map, &["from", "origin", "start"]),
            to: string_field(map, &["to", "destination", "end"]),
            transport: string_field(map, &["transport", "mode", "transport_mode"]),
            approx_time: string_field(map, &["approx_time", "time", "duration"]),
            notes: string_field(map, &["notes", "note", "details"]),
            map_link: None,
        }
    }

    /// A list of objects, or free text with one leg per line.
    pub fn list_from_value(value: &JsonValue) -> Vec<Self> {
        match value {
            JsonValue::String(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Self {
                    notes: line.to_string(),
                    ..Self::default()
                })
                .collect(),
            other => object_list(other).iter().map(Self::from_map).collect(),
        }
    }
}

/// A food pick attached to the visit it was suggested for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPick {
    pub visit_location: String,
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub distance_m: Option<f64>,
    pub price_level: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMeals {
    pub day_number: usize,
    pub meals: Vec<MealPick>,
}

/// Straight-line estimate between two consecutive visits with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegEstimate {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub minutes: u32,
}

/// The normalized model output, before synthesis fills gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedItinerary {
    pub destination_name: Option<String>,
    pub maps_query: Option<String>,
    pub itinerary: Vec<DayPlan>,
    pub visit_sequence: Vec<VisitNode>,
    pub popular_dinner_recommendations: Vec<Recommendation>,
    pub popular_stays: Vec<Recommendation>,
    pub travel_instructions: Vec<TravelInstruction>,
}

impl ParsedItinerary {
    pub fn from_object(obj: &JsonMap) -> Self {
        let itinerary = match obj.get("itinerary") {
            Some(JsonValue::Array(days)) => days
                .iter()
                .enumerate()
                .filter_map(|(i, day)| DayPlan::from_value(i, day))
                .collect(),
            _ => Vec::new(),
        };

        let visit_sequence = obj
            .get("visit_sequence")
            .map(normalize_visit_sequence)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, record)| VisitNode::from_record(i, record))
            .collect();

        Self {
            destination_name: obj.get("destination_name").and_then(value_as_string),
            maps_query: obj.get("maps_query").and_then(value_as_string),
            itinerary,
            visit_sequence,
            popular_dinner_recommendations: lookup(obj, FOOD_LIST_KEYS)
                .map(Recommendation::list_from_value)
                .unwrap_or_default(),
            popular_stays: lookup(obj, STAY_LIST_KEYS)
                .map(Recommendation::list_from_value)
                .unwrap_or_default(),
            travel_instructions: obj
                .get("travel_instructions")
                .map(TravelInstruction::list_from_value)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: JsonValue) -> JsonMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_recommendation_synonyms() {
        let rec = Recommendation::from_map(&map(json!({
            "title": "Le Comptoir",
            "description": "Bistro classics",
            "stars": "4.5",
            "price": 3,
            "distance": 250
        })));
        assert_eq!(rec.name.as_deref(), Some("Le Comptoir"));
        assert_eq!(rec.reason.as_deref(), Some("Bistro classics"));
        assert_eq!(rec.rating, Some(4.5));
        assert_eq!(rec.price_level.as_deref(), Some("3"));
        assert_eq!(rec.distance_m, Some(250.0));
    }

    #[test]
    fn test_recommendation_canonical_key_wins() {
        let rec = Recommendation::from_map(&map(json!({"name": "A", "title": "B"})));
        assert_eq!(rec.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_object_list_shapes() {
        assert_eq!(object_list(&json!([{"a": 1}, 2, "x"])).len(), 1);
        assert_eq!(object_list(&json!({"a": 1})).len(), 1);
        assert_eq!(object_list(&json!("[{\"a\": 1}, {\"b\": 2}]")).len(), 2);
        assert_eq!(object_list(&json!("see {\"a\": 1}")).len(), 1);
        assert!(object_list(&json!("nothing")).is_empty());
        assert!(object_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_day_plan_tolerant() {
        let day = DayPlan::from_value(
            0,
            &json!({"day": "3", "summary": "Museums", "activities": ["Louvre", {"name": "Orsay"}, {"x": 1}], "approximate_cost": "120"}),
        )
        .unwrap();
        assert_eq!(day.day_number, 3);
        assert_eq!(day.activities, vec!["Louvre", "Orsay", ""]);
        assert_eq!(day.approximate_cost, Some(120.0));

        let day = DayPlan::from_value(1, &json!("Rest day")).unwrap();
        assert_eq!(day.day_number, 2);
        assert_eq!(day.summary, "Rest day");
        assert!(DayPlan::from_value(0, &json!(5)).is_none());
    }

    #[test]
    fn test_visit_node_defaults() {
        let node = VisitNode::from_record(2, &map(json!({"order": "x"})));
        assert_eq!(node.order, 3);
        assert!(node.location_name.is_empty());
        assert!(node.coordinates().is_none());
    }

    #[test]
    fn test_visit_node_coordinates() {
        let node = VisitNode::from_record(
            0,
            &map(json!({"order": 2.0, "name": "Louvre", "lat": "48.8606", "lng": 2.3376})),
        );
        assert_eq!(node.order, 2);
        assert_eq!(node.location_name, "Louvre");
        assert_eq!(node.coordinates(), Some((48.8606, 2.3376)));

        let bad = VisitNode::from_record(0, &map(json!({"latitude": 123.0, "longitude": 2.0})));
        assert!(bad.latitude.is_none());
        assert!(bad.coordinates().is_none());
    }

    #[test]
    fn test_visit_node_nearby_food_from_string() {
        let node = VisitNode::from_record(
            0,
            &map(json!({"nearby_food_recommendations": "[{\"name\": \"Cafe\"}]"})),
        );
        assert_eq!(node.nearby_food_recommendations.len(), 1);
        assert_eq!(node.nearby_food_recommendations[0].name.as_deref(), Some("Cafe"));
    }

    #[test]
    fn test_travel_instructions_from_text() {
        let legs = TravelInstruction::list_from_value(&json!("Take the RER B\n\n  Walk to the hotel  "));
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].notes, "Take the RER B");
        assert_eq!(legs[1].notes, "Walk to the hotel");
        assert!(legs[0].from.is_empty());
    }

    #[test]
    fn test_parsed_itinerary_list_synonyms() {
        let parsed = ParsedItinerary::from_object(&map(json!({
            "restaurants": [{"name": "R1"}],
            "hotels": [{"name": "H1"}, {"name": "H2"}],
            "travel_instructions": [{"from": "A", "to": "B", "mode": "metro"}]
        })));
        assert_eq!(parsed.popular_dinner_recommendations.len(), 1);
        assert_eq!(parsed.popular_stays.len(), 2);
        assert_eq!(parsed.travel_instructions[0].transport, "metro");
        assert!(parsed.itinerary.is_empty());
        assert!(parsed.visit_sequence.is_empty());
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(value_as_i64(&json!(" 7 ")), Some(7));
        assert_eq!(value_as_i64(&json!(3.9)), Some(3));
        assert_eq!(value_as_i64(&json!("3.5")), None);
        assert_eq!(value_as_f64(&json!("NaN")), None);
        assert_eq!(value_as_string(&json!("  ")), None);
        assert_eq!(value_as_string(&json!(1.5)).as_deref(), Some("1.5"));
    }
}
