//! Grid layout for the visit roadmap and great-circle leg estimates

use serde::Serialize;

use super::types::{LegEstimate, VisitNode};

pub const CANVAS_WIDTH: i32 = 940;
pub const MIN_CANVAS_HEIGHT: i32 = 220;
pub const ROW_HEIGHT: i32 = 160;
pub const ROW_GAP: i32 = 10;
pub const MARGIN_X: i32 = 60;
pub const MARGIN_TOP: i32 = 20;
pub const DEFAULT_MAX_COLS: usize = 4;

const EARTH_RADIUS_KM: f64 = 6371.0;
const AVERAGE_SPEED_KMH: f64 = 30.0;
const MIN_TRAVEL_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    pub max_cols: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_cols: DEFAULT_MAX_COLS,
        }
    }
}

/// Canvas dimensions of a computed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub width: i32,
    pub height: i32,
}

impl GridLayout {
    pub fn for_count(count: usize, config: &LayoutConfig) -> Self {
        let count = count.max(1);
        let cols = count.min(config.max_cols.max(1));
        let rows = count.div_ceil(cols);
        Self {
            cols,
            rows,
            width: CANVAS_WIDTH,
            height: MIN_CANVAS_HEIGHT.max(rows as i32 * ROW_HEIGHT + 40),
        }
    }

    fn col_step(&self) -> i32 {
        if self.cols > 1 {
            (CANVAS_WIDTH - MARGIN_X * 2) / (self.cols as i32 - 1)
        } else {
            0
        }
    }

    /// Position of the node at `index`; row-major, independent of geography.
    pub fn position(&self, index: usize) -> (i32, i32) {
        let col = (index % self.cols) as i32;
        let row = (index / self.cols) as i32;
        let x = if self.cols > 1 {
            MARGIN_X + col * self.col_step()
        } else {
            CANVAS_WIDTH / 2
        };
        let y = MARGIN_TOP + row * ROW_HEIGHT + row * ROW_GAP;
        (x, y)
    }
}

/// Assign `x`/`y` to every visit in sequence order.
pub fn layout_nodes(visits: &mut [VisitNode], config: &LayoutConfig) -> GridLayout {
    let grid = GridLayout::for_count(visits.len(), config);
    for (i, visit) in visits.iter_mut().enumerate() {
        (visit.x, visit.y) = grid.position(i);
    }
    grid
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn travel_minutes(distance_km: f64) -> u32 {
    let minutes = (distance_km / AVERAGE_SPEED_KMH * 60.0).round();
    (minutes.max(0.0) as u32).max(MIN_TRAVEL_MINUTES)
}

/// Estimates for consecutive pairs where both ends have coordinates.
pub fn leg_estimates(visits: &[VisitNode]) -> Vec<LegEstimate> {
    visits
        .windows(2)
        .filter_map(|pair| {
            let (lat1, lon1) = pair[0].coordinates()?;
            let (lat2, lon2) = pair[1].coordinates()?;
            let distance_km = haversine_km(lat1, lon1, lat2, lon2);
            Some(LegEstimate {
                from: pair[0].location_name.clone(),
                to: pair[1].location_name.clone(),
                distance_km,
                minutes: travel_minutes(distance_km),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, coords: Option<(f64, f64)>) -> VisitNode {
        VisitNode {
            order: 0,
            location_name: name.to_string(),
            suggested_time: String::new(),
            estimated_duration: String::new(),
            note: String::new(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            nearby_food_recommendations: Vec::new(),
            x: 0,
            y: 0,
        }
    }

    #[test]
    fn test_grid_dimensions() {
        let config = LayoutConfig::default();
        let grid = GridLayout::for_count(6, &config);
        assert_eq!((grid.cols, grid.rows), (4, 2));
        assert_eq!(grid.height, 360);

        let grid = GridLayout::for_count(0, &config);
        assert_eq!((grid.cols, grid.rows), (1, 1));
        assert_eq!(grid.height, MIN_CANVAS_HEIGHT);
    }

    #[test]
    fn test_columns_cycle_rows_advance() {
        let config = LayoutConfig { max_cols: 3 };
        let mut visits: Vec<VisitNode> = (0..7).map(|i| node(&i.to_string(), None)).collect();
        let grid = layout_nodes(&mut visits, &config);
        assert_eq!(grid.rows, 3);

        // usable width 820 over 2 steps
        let xs: Vec<i32> = visits.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![60, 470, 880, 60, 470, 880, 60]);
        let ys: Vec<i32> = visits.iter().map(|v| v.y).collect();
        assert_eq!(ys, vec![20, 20, 20, 190, 190, 190, 360]);
    }

    #[test]
    fn test_single_column_is_centered() {
        let config = LayoutConfig { max_cols: 1 };
        let mut visits = vec![node("a", None), node("b", None)];
        layout_nodes(&mut visits, &config);
        assert_eq!((visits[0].x, visits[0].y), (470, 20));
        assert_eq!((visits[1].x, visits[1].y), (470, 190));
    }

    #[test]
    fn test_zero_max_cols_is_treated_as_one() {
        let grid = GridLayout::for_count(3, &LayoutConfig { max_cols: 0 });
        assert_eq!((grid.cols, grid.rows), (1, 3));
    }

    #[test]
    fn test_haversine() {
        assert_eq!(haversine_km(48.85, 2.35, 48.85, 2.35), 0.0);
        // Paris to London is roughly 344 km
        let d = haversine_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((d - 343.5).abs() < 2.0, "got {d}");
    }

    #[test]
    fn test_travel_minutes() {
        assert_eq!(travel_minutes(0.0), MIN_TRAVEL_MINUTES);
        assert_eq!(travel_minutes(1.0), MIN_TRAVEL_MINUTES);
        assert_eq!(travel_minutes(15.0), 30);
        assert_eq!(travel_minutes(30.0), 60);
    }

    #[test]
    fn test_leg_estimates_skip_unknown_coordinates() {
        let visits = vec![
            node("a", Some((27.4921, 77.6745))),
            node("b", Some((27.5807, 77.7061))),
            node("c", None),
            node("d", Some((27.5, 77.7))),
        ];
        let legs = leg_estimates(&visits);
        assert_eq!(legs.len(), 1);
        assert_eq!((legs[0].from.as_str(), legs[0].to.as_str()), ("a", "b"));
        assert!(legs[0].distance_km > 9.0 && legs[0].distance_km < 11.0);
        assert_eq!(legs[0].minutes, travel_minutes(legs[0].distance_km));
    }
}
