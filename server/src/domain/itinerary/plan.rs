//! Orchestration from raw model text to a renderable plan

use serde::{Deserialize, Serialize};

use super::layout::{GridLayout, LayoutConfig, layout_nodes, leg_estimates};
use super::locate::extract_json_object;
use super::maps::MapLinks;
use super::synthesize::{
    daily_meals, days_n, itinerary_from_visits, sort_by_order, visits_from_itinerary,
};
use super::types::{
    DailyMeals, DayPlan, JsonMap, LegEstimate, ParsedItinerary, Recommendation,
    TravelInstruction, VisitNode,
};

/// Form fields of a plan submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanRequest {
    pub destination: String,
    pub preferences: String,
    pub days: String,
    pub budget: String,
    pub origin: String,
}

impl PlanRequest {
    pub fn trimmed(self) -> Self {
        Self {
            destination: self.destination.trim().to_string(),
            preferences: self.preferences.trim().to_string(),
            days: self.days.trim().to_string(),
            budget: self.budget.trim().to_string(),
            origin: self.origin.trim().to_string(),
        }
    }

    fn origin(&self) -> Option<&str> {
        (!self.origin.is_empty()).then_some(self.origin.as_str())
    }
}

/// Everything the result page renders.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub request: PlanRequest,
    pub destination_name: String,
    pub days_n: usize,
    pub itinerary: Vec<DayPlan>,
    pub visit_nodes: Vec<VisitNode>,
    pub daily_meals: Vec<DailyMeals>,
    pub legs: Vec<LegEstimate>,
    pub popular_dinner_recommendations: Vec<Recommendation>,
    pub popular_stays: Vec<Recommendation>,
    pub travel_instructions: Vec<TravelInstruction>,
    pub links: MapLinks,
    pub grid: GridLayout,
    pub raw_response: String,
    pub parsed: JsonMap,
}

pub fn build_plan(request: &PlanRequest, raw_text: &str, layout: &LayoutConfig) -> PlanView {
    let parsed = extract_json_object(raw_text).unwrap_or_else(|| {
        tracing::debug!(len = raw_text.len(), "No JSON object found in model output");
        JsonMap::new()
    });
    let ParsedItinerary {
        destination_name,
        maps_query,
        itinerary,
        visit_sequence,
        popular_dinner_recommendations,
        popular_stays,
        mut travel_instructions,
    } = ParsedItinerary::from_object(&parsed);

    let days = days_n(&request.days, itinerary.len());

    let mut visits = if visit_sequence.is_empty() && !itinerary.is_empty() {
        visits_from_itinerary(&itinerary, &popular_dinner_recommendations)
    } else {
        visit_sequence
    };
    sort_by_order(&mut visits);

    let itinerary = if itinerary.is_empty() && !visits.is_empty() {
        itinerary_from_visits(&visits, days)
    } else {
        itinerary
    };
    let meals = daily_meals(&visits, days, &popular_dinner_recommendations);
    let grid = layout_nodes(&mut visits, layout);
    let legs = leg_estimates(&visits);

    let search_target = destination_name
        .as_deref()
        .or(maps_query.as_deref())
        .unwrap_or(&request.destination);
    let directions_target = maps_query
        .as_deref()
        .or(destination_name.as_deref())
        .unwrap_or(&request.destination);
    let links = MapLinks::build(search_target, directions_target, request.origin(), &visits);
    links.enrich_legs(&mut travel_instructions, &visits);

    tracing::debug!(
        days,
        visits = visits.len(),
        itinerary_days = itinerary.len(),
        "Built plan"
    );

    PlanView {
        destination_name: search_target.to_string(),
        request: request.clone(),
        days_n: days,
        itinerary,
        visit_nodes: visits,
        daily_meals: meals,
        legs,
        popular_dinner_recommendations,
        popular_stays,
        travel_instructions,
        links,
        grid,
        raw_response: raw_text.to_string(),
        parsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(destination: &str, days: &str) -> PlanRequest {
        PlanRequest {
            destination: destination.into(),
            days: days.into(),
            ..PlanRequest::default()
        }
    }

    #[test]
    fn test_trimmed() {
        let req = PlanRequest {
            destination: "  Paris ".into(),
            origin: "\tLyon\n".into(),
            ..PlanRequest::default()
        }
        .trimmed();
        assert_eq!(req.destination, "Paris");
        assert_eq!(req.origin(), Some("Lyon"));
        assert_eq!(PlanRequest::default().origin(), None);
    }

    #[test]
    fn test_unparsable_output_still_renders() {
        let view = build_plan(&request("Lisbon", "2"), "Sorry, I cannot help.", &LayoutConfig::default());
        assert!(view.itinerary.is_empty());
        assert!(view.visit_nodes.is_empty());
        assert_eq!(view.daily_meals.len(), 2);
        assert_eq!(view.destination_name, "Lisbon");
        assert!(view.links.maps_search_link.is_some());
        assert!(view.links.maps_directions_link.is_none());
        assert_eq!(view.grid.rows, 1);
    }

    #[test]
    fn test_visits_sorted_before_day_buckets() {
        let raw = r#"{"visit_sequence": [
            {"order": 3, "location_name": "C"},
            {"order": 1, "location_name": "A"},
            {"order": 2, "location_name": "B"}
        ]}"#;
        let view = build_plan(&request("X", "2"), raw, &LayoutConfig::default());
        let names: Vec<&str> = view.visit_nodes.iter().map(|v| v.location_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(view.itinerary[0].activities, vec!["A", "B"]);
        assert_eq!(view.itinerary[1].activities, vec!["C"]);
        assert_eq!(view.visit_nodes[1].x, 470);
    }

    #[test]
    fn test_visits_built_from_itinerary() {
        let raw = r#"{"itinerary": [{"day_number": 1, "activities": ["Alfama", "Belem"]}],
                      "restaurants": [{"name": "Tasca"}]}"#;
        let view = build_plan(&request("Lisbon", ""), raw, &LayoutConfig::default());
        assert_eq!(view.days_n, 1);
        assert_eq!(view.visit_nodes.len(), 2);
        assert_eq!(view.daily_meals[0].meals.len(), 2);
        assert_eq!(view.daily_meals[0].meals[1].visit_location, "Belem");
        assert_eq!(view.daily_meals[0].meals[1].name.as_deref(), Some("Tasca"));
    }
}
