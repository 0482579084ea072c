//! Raw payload returned by the provider's business search endpoint.
//!
//! Every field the provider may leave out is optional here; turning these into
//! something the UI can render happens in one place,
//! [`RestaurantRecord::from_business`](crate::models::restaurant::RestaurantRecord::from_business).

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct YelpSearchResponse {
    #[serde(default)]
    pub businesses: Option<Vec<Business>>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Business {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    /// Meters from the search origin.
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub location: Option<BusinessLocation>,
    #[serde(default)]
    pub display_phone: Option<String>,
    #[serde(default)]
    pub is_closed: Option<bool>,
    #[serde(default)]
    pub coordinates: Option<BusinessCoordinates>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Category {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct BusinessLocation {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct BusinessCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}
