use std::cmp::Ordering;
use clap::ValueEnum;
use crate::models::client_config::ClientConfig;
use crate::models::restaurant::{Coordinates, RestaurantRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Nearest first; restaurants without a distance go last
    #[default]
    Distance,
    /// Best rated first
    Rating,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

/// Returns a sorted copy; the input is left as it was. Both orders are stable.
pub fn sort_restaurants(restaurants: &[RestaurantRecord], key: SortKey) -> Vec<RestaurantRecord> {
    let mut sorted = restaurants.to_vec();
    match key {
        SortKey::Distance => sorted.sort_by(|a, b| {
            match (a.distance_miles(), b.distance_miles()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortKey::Rating => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
    sorted
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    pub position: Coordinates,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub markers: Vec<MapMarker>,
}

/// `None` when no map key is configured, so callers render nothing rather than fail.
pub fn map_view(
    restaurants: &[RestaurantRecord],
    center: Coordinates,
    config: &ClientConfig,
) -> Option<MapView> {
    if !config.map_enabled() {
        return None;
    }
    Some(MapView {
        center,
        markers: restaurants
            .iter()
            .map(|r| MapMarker {
                id: r.id.clone(),
                name: r.name.clone(),
                position: r.coordinates,
            })
            .collect(),
    })
}
