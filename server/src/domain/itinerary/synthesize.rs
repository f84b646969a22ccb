//! Gap filling between the itinerary, the visit sequence and meal picks

use super::types::{DailyMeals, DayPlan, MealPick, Recommendation, VisitNode};

pub const MAX_DAYS: usize = 30;

/// Default recommendations attached to synthesized visits and used when a
/// visit carries none of its own.
const DEFAULT_FOOD_PICKS: usize = 2;
const MEALS_PER_VISIT: usize = 3;
const EMPTY_DAY_ACTIVITY: &str = "Free time / local exploration";

/// Requested day count when the form value is all digits, else the
/// itinerary length, else 1. Always within `1..=MAX_DAYS`.
pub fn days_n(requested: &str, itinerary_len: usize) -> usize {
    let requested = requested.trim();
    let parsed = (!requested.is_empty() && requested.bytes().all(|b| b.is_ascii_digit()))
        .then(|| requested.parse::<usize>().unwrap_or(MAX_DAYS));

    parsed
        .filter(|&n| n > 0)
        .unwrap_or(if itinerary_len > 0 { itinerary_len } else { 1 })
        .clamp(1, MAX_DAYS)
}

/// Day bucket for the visit at `position` out of `len`, using ceiling-sized buckets.
pub fn bucket_index(position: usize, len: usize, days_n: usize) -> usize {
    let days_n = days_n.max(1);
    let bucket_size = len.div_ceil(days_n).max(1);
    (position / bucket_size).min(days_n - 1)
}

fn buckets<'a>(visits: &'a [VisitNode], days_n: usize) -> Vec<Vec<&'a VisitNode>> {
    let days_n = days_n.max(1);
    let mut buckets = vec![Vec::new(); days_n];
    for (i, visit) in visits.iter().enumerate() {
        buckets[bucket_index(i, visits.len(), days_n)].push(visit);
    }
    buckets
}

/// Stable sort by `order`; ties keep their original position.
///
/// Unnamed visits become `Place N`, numbered by their sorted position.
pub fn sort_by_order(visits: &mut [VisitNode]) {
    visits.sort_by_key(|v| v.order);
    for (i, visit) in visits.iter_mut().enumerate() {
        if visit.location_name.trim().is_empty() {
            visit.location_name = format!("Place {}", i + 1);
        }
    }
}

/// One visit per activity across all days, in itinerary order.
pub fn visits_from_itinerary(itinerary: &[DayPlan], popular_foods: &[Recommendation]) -> Vec<VisitNode> {
    let defaults: Vec<Recommendation> = popular_foods.iter().take(DEFAULT_FOOD_PICKS).cloned().collect();

    itinerary
        .iter()
        .flat_map(|day| day.activities.iter())
        .enumerate()
        .map(|(i, activity)| {
            let order = i as i64 + 1;
            let location_name = if activity.trim().is_empty() {
                format!("Place {order}")
            } else {
                activity.clone()
            };
            VisitNode {
                order,
                location_name,
                suggested_time: String::new(),
                estimated_duration: String::new(),
                note: String::new(),
                latitude: None,
                longitude: None,
                nearby_food_recommendations: defaults.clone(),
                x: 0,
                y: 0,
            }
        })
        .collect()
}

/// One day per bucket; an empty bucket gets a free-time placeholder.
pub fn itinerary_from_visits(visits: &[VisitNode], days_n: usize) -> Vec<DayPlan> {
    buckets(visits, days_n)
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| {
            let (summary, activities) = if bucket.is_empty() {
                ("Free / explore".to_string(), vec![EMPTY_DAY_ACTIVITY.to_string()])
            } else {
                (
                    format!("Visit {} site(s)", bucket.len()),
                    bucket.iter().map(|v| v.location_name.clone()).collect(),
                )
            };
            DayPlan {
                day_number: i as i64 + 1,
                summary,
                activities,
                approximate_cost: None,
            }
        })
        .collect()
}

/// Meal picks per day, taken from each bucketed visit.
pub fn daily_meals(visits: &[VisitNode], days_n: usize, popular_foods: &[Recommendation]) -> Vec<DailyMeals> {
    buckets(visits, days_n)
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| {
            let meals = bucket
                .into_iter()
                .flat_map(|visit| {
                    let source = if visit.nearby_food_recommendations.is_empty() {
                        &popular_foods[..popular_foods.len().min(DEFAULT_FOOD_PICKS)]
                    } else {
                        &visit.nearby_food_recommendations[..]
                    };
                    source.iter().take(MEALS_PER_VISIT).map(|food| MealPick {
                        visit_location: visit.location_name.clone(),
                        name: food.name.clone(),
                        rating: food.rating,
                        distance_m: food.distance_m,
                        price_level: food.price_level.clone(),
                        reason: food.reason.clone(),
                    })
                })
                .collect();
            DailyMeals {
                day_number: i + 1,
                meals,
            }
        })
        .collect()
}
