use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use crate::error::ValidationError;
use crate::models::restaurant::Coordinates;

/// Location used when a request carries neither a place name nor coordinates.
pub const DEFAULT_LOCATION: &str = "New York, NY";
pub const PRICE_LEVELS: [u8; 4] = [1, 2, 3, 4];

/// Body of `POST /search`, exactly as the client sends it.
///
/// Everything is optional and loosely typed so that a bad value is reported as a
/// field problem by [`SearchRequestPayload::validate`] instead of a decode failure.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequestPayload {
    pub term: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub price: Option<Vec<i64>>,
    pub open_now: Option<bool>,
    pub min_rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchLocation {
    Coordinates(Coordinates),
    Place(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MinRating {
    #[default]
    Any,
    Three,
    Four,
}

impl MinRating {
    pub fn value(self) -> u8 {
        match self {
            MinRating::Any => 0,
            MinRating::Three => 3,
            MinRating::Four => 4,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(MinRating::Any)
        } else if value == 3.0 {
            Some(MinRating::Three)
        } else if value == 4.0 {
            Some(MinRating::Four)
        } else {
            None
        }
    }

    /// Whether a business with `rating` survives this threshold.
    pub fn admits(self, rating: f64) -> bool {
        match self {
            MinRating::Any => true,
            threshold => rating >= f64::from(threshold.value()),
        }
    }
}

impl fmt::Display for MinRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinRating::Any => write!(f, "any"),
            other => write!(f, "{}+", other.value()),
        }
    }
}

impl FromStr for MinRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(MinRating::from_value)
            .ok_or_else(|| format!("minimum rating must be one of 0, 3 or 4, got `{}`", s))
    }
}

/// A search that passed validation and can be sent to the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub term: String,
    pub location: SearchLocation,
    /// Meters, as requested. Clamped to the provider maximum only when the query is built.
    pub radius: Option<f64>,
    /// Ascending and de-duplicated; empty means no price filter.
    pub price: Vec<u8>,
    pub open_now: bool,
    pub min_rating: MinRating,
}

impl SearchRequestPayload {
    /// Substitutes [`DEFAULT_LOCATION`] when the request names no place and no coordinate at all.
    pub fn with_fallback_location(mut self) -> Self {
        let has_place = self.location.as_deref().map_or(false, |l| !l.trim().is_empty());
        if !has_place && self.latitude.is_none() && self.longitude.is_none() {
            self.location = Some(DEFAULT_LOCATION.to_string());
        }
        self
    }

    pub fn validate(self) -> Result<SearchRequest, ValidationError> {
        let mut errors = ValidationError::default();

        let term = self.term.as_deref().map(str::trim).unwrap_or_default();
        if term.is_empty() {
            errors.push("term", "must not be empty");
        }

        if let Some(lat) = self.latitude {
            if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
                errors.push("latitude", "must be between -90 and 90");
            }
        }
        if let Some(lng) = self.longitude {
            if !(lng.is_finite() && (-180.0..=180.0).contains(&lng)) {
                errors.push("longitude", "must be between -180 and 180");
            }
        }

        let place = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(SearchLocation::Coordinates(Coordinates { lat, lng })),
            (Some(_), None) => {
                errors.push("longitude", "is required when latitude is given");
                None
            }
            (None, Some(_)) => {
                errors.push("latitude", "is required when longitude is given");
                None
            }
            (None, None) => match place {
                Some(place) => Some(SearchLocation::Place(place.to_string())),
                None => {
                    errors.push("location", "a location or latitude and longitude are required");
                    None
                }
            },
        };

        if let Some(radius) = self.radius {
            if !(radius.is_finite() && radius > 0.0) {
                errors.push("radius", "must be a positive number of meters");
            }
        }

        let mut price = Vec::new();
        for level in self.price.unwrap_or_default() {
            match u8::try_from(level).ok().filter(|l| PRICE_LEVELS.contains(l)) {
                Some(level) => price.push(level),
                None => errors.push("price", format!("{} is not a price level between 1 and 4", level)),
            }
        }
        price.sort_unstable();
        price.dedup();

        let min_rating = match self.min_rating {
            None => MinRating::Any,
            Some(value) => MinRating::from_value(value).unwrap_or_else(|| {
                errors.push("minRating", "must be one of 0, 3 or 4");
                MinRating::Any
            }),
        };

        match location {
            Some(location) if errors.is_empty() => Ok(SearchRequest {
                term: term.to_string(),
                location,
                radius: self.radius,
                price,
                open_now: self.open_now.unwrap_or(false),
                min_rating,
            }),
            _ => Err(errors),
        }
    }
}
