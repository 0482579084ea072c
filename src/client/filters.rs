//! Filter panel state: a draft the user edits and the last snapshot they applied.

use std::collections::BTreeSet;
use crate::models::restaurant::METERS_PER_MILE;
use crate::models::search_request::{MinRating, PRICE_LEVELS};

pub const DEFAULT_DISTANCE_MILES: u8 = 5;
pub const MIN_DISTANCE_MILES: u8 = 1;
pub const MAX_DISTANCE_MILES: u8 = 25;
/// Radius searched before the user has applied any filters.
pub const DEFAULT_RADIUS_METERS: f64 = 8000.0;

pub const CUISINE_TYPES: [&str; 10] = [
    "Italian", "Chinese", "Japanese", "Mexican", "Indian",
    "Thai", "American", "French", "Korean", "Mediterranean",
];

#[derive(Clone, Debug, PartialEq)]
pub struct FilterCriteria {
    pub distance_miles: u8,
    pub price_levels: BTreeSet<u8>,
    pub open_now: bool,
    pub min_rating: MinRating,
    /// Kept for display only; the provider has no cuisine filter.
    pub cuisines: BTreeSet<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            distance_miles: DEFAULT_DISTANCE_MILES,
            price_levels: PRICE_LEVELS.into_iter().collect(),
            open_now: false,
            min_rating: MinRating::Any,
            cuisines: BTreeSet::new(),
        }
    }
}

/// The filter fields that travel with a search request.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedFilters {
    pub radius: f64,
    pub price: Vec<u8>,
    pub open_now: bool,
    pub min_rating: MinRating,
}

impl Default for AppliedFilters {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS_METERS,
            price: PRICE_LEVELS.to_vec(),
            open_now: false,
            min_rating: MinRating::Any,
        }
    }
}

impl From<&FilterCriteria> for AppliedFilters {
    fn from(criteria: &FilterCriteria) -> Self {
        Self {
            radius: f64::from(criteria.distance_miles) * METERS_PER_MILE,
            price: criteria.price_levels.iter().copied().collect(),
            open_now: criteria.open_now,
            min_rating: criteria.min_rating,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FilterState {
    draft: FilterCriteria,
    applied: AppliedFilters,
    editing: bool,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the panel with a fresh, default draft.
    pub fn open(&mut self) {
        self.draft = FilterCriteria::default();
        self.editing = true;
    }

    /// Closes the panel, throwing the draft away.
    pub fn close(&mut self) {
        self.draft = FilterCriteria::default();
        self.editing = false;
    }

    pub fn is_open(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn applied(&self) -> &AppliedFilters {
        &self.applied
    }

    pub fn set_distance(&mut self, miles: u8) {
        self.draft.distance_miles = miles.clamp(MIN_DISTANCE_MILES, MAX_DISTANCE_MILES);
    }

    /// Returns false and leaves the draft alone for anything outside 1..=4.
    pub fn toggle_price(&mut self, level: u8) -> bool {
        if !PRICE_LEVELS.contains(&level) {
            return false;
        }
        if !self.draft.price_levels.remove(&level) {
            self.draft.price_levels.insert(level);
        }
        true
    }

    pub fn set_min_rating(&mut self, min_rating: MinRating) {
        self.draft.min_rating = min_rating;
    }

    pub fn set_open_now(&mut self, open_now: bool) {
        self.draft.open_now = open_now;
    }

    pub fn toggle_open_now(&mut self) {
        self.draft.open_now = !self.draft.open_now;
    }

    pub fn toggle_cuisine(&mut self, cuisine: &str) {
        let cuisine = cuisine.trim();
        if cuisine.is_empty() {
            return;
        }
        if !self.draft.cuisines.remove(cuisine) {
            self.draft.cuisines.insert(cuisine.to_string());
        }
    }

    /// Resets the draft only; nothing is applied.
    pub fn clear_all(&mut self) {
        self.draft = FilterCriteria::default();
    }

    /// Promotes the draft into the applied filters and closes the panel.
    pub fn apply(&mut self) -> &AppliedFilters {
        self.applied = AppliedFilters::from(&self.draft);
        self.editing = false;
        &self.applied
    }
}
