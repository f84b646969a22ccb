//! External map-service links

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::form_urlencoded;

use super::types::{TravelInstruction, VisitNode};

pub const MAPS_BASE_URL: &str = "https://www.google.com/maps";
const TRAVEL_MODE: &str = "driving";

static COORDINATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-?\d+(\.\d+)?\s*,\s*-?\d+(\.\d+)?\s*$").expect("valid coordinate regex")
});

/// Encode a place for a query parameter. `"lat, lon"` pairs pass through
/// with spaces removed; everything else is form-urlencoded.
pub fn encode_place(place: &str) -> String {
    let place = place.trim();
    if COORDINATE_RE.is_match(place) {
        return place.replace(' ', "");
    }
    form_urlencoded::byte_serialize(place.as_bytes()).collect()
}

fn coordinate_pair((lat, lon): (f64, f64)) -> String {
    format!("{lat},{lon}")
}

pub fn search_link(query: &str) -> Option<String> {
    let query = query.trim();
    (!query.is_empty()).then(|| format!("{MAPS_BASE_URL}/search/?api=1&query={}", encode_place(query)))
}

pub fn directions_link(origin: Option<&str>, destination: &str, waypoints: &[String]) -> String {
    let mut url = format!("{MAPS_BASE_URL}/dir/?api=1");
    if let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) {
        url.push_str("&origin=");
        url.push_str(&encode_place(origin));
    }
    url.push_str("&destination=");
    url.push_str(&encode_place(destination));
    if !waypoints.is_empty() {
        let encoded: Vec<String> = waypoints.iter().map(|w| encode_place(w)).collect();
        url.push_str("&waypoints=");
        url.push_str(&encoded.join("|"));
    }
    url.push_str("&travelmode=");
    url.push_str(TRAVEL_MODE);
    url
}

/// Route through every visit with coordinates. With a user origin the
/// visits are all stops after it; without one the first visit starts the
/// route.
pub fn route_link(origin: Option<&str>, visits: &[VisitNode]) -> Option<String> {
    let mut points: Vec<String> = visits
        .iter()
        .filter_map(VisitNode::coordinates)
        .map(coordinate_pair)
        .collect();
    let destination = points.pop()?;
    let origin = origin.map(str::trim).filter(|o| !o.is_empty());

    Some(match origin {
        Some(origin) => directions_link(Some(origin), &destination, &points),
        None if points.is_empty() => directions_link(None, &destination, &[]),
        None => {
            let start = points.remove(0);
            directions_link(Some(&start), &destination, &points)
        }
    })
}

fn find_visit<'a>(visits: &'a [VisitNode], name: &str) -> Option<&'a VisitNode> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    visits
        .iter()
        .find(|v| v.location_name.trim().eq_ignore_ascii_case(name))
}

/// Directions for one travel leg: coordinates when both endpoints match a
/// located visit, else the place names, else `fallback`.
pub fn leg_link(leg: &TravelInstruction, visits: &[VisitNode], fallback: Option<&str>) -> Option<String> {
    let from = find_visit(visits, &leg.from).and_then(VisitNode::coordinates);
    let to = find_visit(visits, &leg.to).and_then(VisitNode::coordinates);
    if let (Some(from), Some(to)) = (from, to) {
        return Some(directions_link(Some(&coordinate_pair(from)), &coordinate_pair(to), &[]));
    }

    let (from, to) = (leg.from.trim(), leg.to.trim());
    if !from.is_empty() && !to.is_empty() {
        return Some(directions_link(Some(from), to, &[]));
    }
    fallback.map(str::to_string)
}

/// All page-level links for one plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapLinks {
    pub maps_link: Option<String>,
    pub maps_search_link: Option<String>,
    pub maps_iframe_src: Option<String>,
    pub maps_directions_link: Option<String>,
}

impl MapLinks {
    /// `directions_target` prefers the maps query; `search_target` prefers
    /// the display name. Both fall back to the user's destination upstream.
    pub fn build(
        search_target: &str,
        directions_target: &str,
        origin: Option<&str>,
        visits: &[VisitNode],
    ) -> Self {
        let maps_link = (!directions_target.trim().is_empty())
            .then(|| directions_link(origin, directions_target, &[]));
        let maps_search_link = search_link(search_target);

        Self {
            maps_link,
            maps_iframe_src: maps_search_link.clone(),
            maps_search_link,
            maps_directions_link: route_link(origin, visits),
        }
    }

    /// Attach a `map_link` to every travel leg.
    pub fn enrich_legs(&self, legs: &mut [TravelInstruction], visits: &[VisitNode]) {
        let fallback = self
            .maps_directions_link
            .as_deref()
            .or(self.maps_link.as_deref());
        for leg in legs {
            leg.map_link = leg_link(leg, visits, fallback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(name: &str, lat: f64, lon: f64) -> VisitNode {
        let mut v = unlocated(name);
        v.latitude = Some(lat);
        v.longitude = Some(lon);
        v
    }

    fn unlocated(name: &str) -> VisitNode {
        VisitNode {
            order: 0,
            location_name: name.to_string(),
            suggested_time: String::new(),
            estimated_duration: String::new(),
            note: String::new(),
            latitude: None,
            longitude: None,
            nearby_food_recommendations: Vec::new(),
            x: 0,
            y: 0,
        }
    }

    fn leg(from: &str, to: &str) -> TravelInstruction {
        TravelInstruction {
            from: from.to_string(),
            to: to.to_string(),
            ..TravelInstruction::default()
        }
    }

    #[test]
    fn test_encode_place() {
        assert_eq!(encode_place("Mathura, India"), "Mathura%2C+India");
        assert_eq!(encode_place(" 27.49 , 77.67 "), "27.49,77.67");
        assert_eq!(encode_place("-33.8,151"), "-33.8,151");
        assert_eq!(encode_place("Café & Co"), "Caf%C3%A9+%26+Co");
    }

    #[test]
    fn test_search_link() {
        assert_eq!(
            search_link("Paris").as_deref(),
            Some("https://www.google.com/maps/search/?api=1&query=Paris")
        );
        assert!(search_link("  ").is_none());
    }

    #[test]
    fn test_directions_link_encodes_once() {
        let url = directions_link(Some("New Delhi"), "Mathura,India", &["a b".into(), "1,2".into()]);
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=New+Delhi\
             &destination=Mathura%2CIndia&waypoints=a+b|1,2&travelmode=driving"
        );
        assert!(!url.contains("%25"));
    }

    #[test]
    fn test_route_link() {
        let visits = vec![
            located("a", 1.0, 2.0),
            unlocated("b"),
            located("c", 3.0, 4.0),
            located("d", 5.5, 6.5),
        ];
        assert_eq!(
            route_link(None, &visits).as_deref(),
            Some("https://www.google.com/maps/dir/?api=1&origin=1,2&destination=5.5,6.5&waypoints=3,4&travelmode=driving")
        );
        assert_eq!(
            route_link(Some("Home"), &visits).as_deref(),
            Some("https://www.google.com/maps/dir/?api=1&origin=Home&destination=5.5,6.5&waypoints=1,2|3,4&travelmode=driving")
        );
        assert!(route_link(None, &[unlocated("x")]).is_none());

        let single = route_link(None, &[located("a", 1.0, 2.0)]).unwrap();
        assert!(!single.contains("origin="));
    }

    #[test]
    fn test_leg_link_preference() {
        let visits = vec![located("Louvre", 48.86, 2.33), located("Orsay", 48.85, 2.32)];

        let by_coords = leg_link(&leg("louvre", "ORSAY"), &visits, None).unwrap();
        assert!(by_coords.contains("origin=48.86,2.33&destination=48.85,2.32"));

        let by_name = leg_link(&leg("Gare du Nord", "Louvre"), &visits, None).unwrap();
        assert!(by_name.contains("origin=Gare+du+Nord&destination=Louvre"));

        let fallback = leg_link(&leg("", "Louvre"), &visits, Some("https://x"));
        assert_eq!(fallback.as_deref(), Some("https://x"));
        assert!(leg_link(&leg("", ""), &visits, None).is_none());
    }

    #[test]
    fn test_map_links_build() {
        let links = MapLinks::build("Mathura, India", "Mathura,India", Some(""), &[]);
        assert_eq!(
            links.maps_link.as_deref(),
            Some("https://www.google.com/maps/dir/?api=1&destination=Mathura%2CIndia&travelmode=driving")
        );
        assert_eq!(links.maps_iframe_src, links.maps_search_link);
        assert!(links.maps_directions_link.is_none());

        let mut legs = vec![leg("", "")];
        links.enrich_legs(&mut legs, &[]);
        assert_eq!(legs[0].map_link, links.maps_link);
    }
}
