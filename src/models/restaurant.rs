use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::warn;
use crate::models::yelp::Business;

pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1504674900247-0877df9cc836?w=400";
pub const METERS_PER_MILE: f64 = 1609.34;
pub const UNKNOWN_DISTANCE: &str = "N/A";
pub const DEFAULT_PRICE_LEVEL: u8 = 2;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A restaurant as the UI renders it, built fresh from each provider response.
#[skip_serializing_none]
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub rating: f64,
    pub review_count: u32,
    pub price_level: u8,
    pub cuisine: Vec<String>,
    pub distance: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub is_open: bool,
    pub coordinates: Coordinates,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct SearchResponse {
    pub restaurants: Vec<RestaurantRecord>,
}

impl RestaurantRecord {
    /// Normalizes one provider business. Returns `None` for entries that can't
    /// be keyed or placed on a map.
    pub fn from_business(business: Business) -> Option<Self> {
        let Some(id) = non_empty(business.id) else {
            warn!("Skipping provider business without an id");
            return None;
        };
        let coordinates = match business.coordinates {
            Some(c) => match (c.latitude, c.longitude) {
                (Some(lat), Some(lng)) => Coordinates { lat, lng },
                _ => {
                    warn!("Skipping provider business {} with partial coordinates", id);
                    return None;
                }
            },
            None => {
                warn!("Skipping provider business {} without coordinates", id);
                return None;
            }
        };

        let address = business
            .location
            .map(|location| {
                [location.address1, location.city, location.state]
                    .into_iter()
                    .filter_map(non_empty)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        Some(Self {
            id,
            name: business.name.unwrap_or_default(),
            image: non_empty(business.image_url)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            rating: business.rating.unwrap_or(0.0),
            review_count: business.review_count.unwrap_or(0),
            price_level: price_level(business.price.as_deref()),
            cuisine: business
                .categories
                .unwrap_or_default()
                .into_iter()
                .filter_map(|category| non_empty(category.title))
                .collect(),
            distance: format_distance(business.distance),
            address,
            phone: non_empty(business.display_phone),
            is_open: business.is_closed == Some(false),
            coordinates,
        })
    }

    /// Leading number of the distance label, `None` for "N/A" or anything else unparsable.
    pub fn distance_miles(&self) -> Option<f64> {
        self.distance
            .split_whitespace()
            .next()
            .and_then(|miles| miles.parse::<f64>().ok())
            .filter(|miles| miles.is_finite())
    }
}

pub fn price_level(price: Option<&str>) -> u8 {
    match price {
        Some(symbols) if !symbols.is_empty() => symbols.chars().count() as u8,
        _ => DEFAULT_PRICE_LEVEL,
    }
}

pub fn format_distance(meters: Option<f64>) -> String {
    match meters {
        Some(meters) if meters.is_finite() => format!("{:.1} mi", meters / METERS_PER_MILE),
        _ => UNKNOWN_DISTANCE.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    fn business(value: serde_json::Value) -> Business {
        serde_json::from_value(value).unwrap()
    }

    fn full_business() -> serde_json::Value {
        json!({
            "id": "joes-pizza-nyc",
            "name": "Joe's Pizza",
            "image_url": "https://img.test/joes.jpg",
            "rating": 4.5,
            "review_count": 1820,
            "price": "$$",
            "categories": [{"alias": "pizza", "title": "Pizza"}, {"alias": "italian", "title": "Italian"}],
            "distance": 2092.142,
            "location": {"address1": "7 Carmine St", "city": "New York", "state": "NY"},
            "display_phone": "(212) 366-1182",
            "is_closed": false,
            "coordinates": {"latitude": 40.7305, "longitude": -74.0021}
        })
    }

    #[test]
    fn maps_every_field_of_a_complete_business() {
        let record = RestaurantRecord::from_business(business(full_business())).unwrap();

        assert_eq!(record.id, "joes-pizza-nyc");
        assert_eq!(record.name, "Joe's Pizza");
        assert_eq!(record.image, "https://img.test/joes.jpg");
        assert_eq!(record.rating, 4.5);
        assert_eq!(record.review_count, 1820);
        assert_eq!(record.price_level, 2);
        assert_eq!(record.cuisine, vec!["Pizza", "Italian"]);
        assert_eq!(record.distance, "1.3 mi");
        assert_eq!(record.address, "7 Carmine St, New York, NY");
        assert_eq!(record.phone.as_deref(), Some("(212) 366-1182"));
        assert!(record.is_open);
        assert_eq!(record.coordinates, Coordinates { lat: 40.7305, lng: -74.0021 });
    }

    #[test]
    fn fills_defaults_for_missing_optional_fields() {
        let record = RestaurantRecord::from_business(business(json!({
            "id": "bare",
            "name": "Bare Bones",
            "coordinates": {"latitude": 1.0, "longitude": 2.0}
        })))
        .unwrap();

        assert_eq!(record.image, PLACEHOLDER_IMAGE_URL);
        assert_eq!(record.price_level, DEFAULT_PRICE_LEVEL);
        assert_eq!(record.distance, UNKNOWN_DISTANCE);
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.review_count, 0);
        assert!(record.cuisine.is_empty());
        assert_eq!(record.address, "");
        assert_eq!(record.phone, None);
        assert!(!record.is_open);
    }

    #[test]
    fn empty_image_url_falls_back_to_placeholder() {
        let mut raw = full_business();
        raw["image_url"] = json!("");
        let record = RestaurantRecord::from_business(business(raw)).unwrap();
        assert_eq!(record.image, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn price_level_counts_currency_symbols() {
        assert_eq!(price_level(Some("$")), 1);
        assert_eq!(price_level(Some("$$$$")), 4);
        assert_eq!(price_level(Some("€€€")), 3);
        assert_eq!(price_level(Some("")), 2);
        assert_eq!(price_level(None), 2);
    }

    #[test]
    fn open_flag_requires_explicit_not_closed() {
        let mut raw = full_business();
        raw["is_closed"] = json!(true);
        assert!(!RestaurantRecord::from_business(business(raw.clone())).unwrap().is_open);

        raw.as_object_mut().unwrap().remove("is_closed");
        assert!(!RestaurantRecord::from_business(business(raw)).unwrap().is_open);
    }

    #[test]
    fn categories_without_a_title_are_dropped() {
        let mut raw = full_business();
        raw["categories"] = json!([
            {"alias": "pizza"},
            {"alias": "bar", "title": ""},
            {"alias": "italian", "title": "Italian"}
        ]);
        let record = RestaurantRecord::from_business(business(raw)).unwrap();
        assert_eq!(record.cuisine, vec!["Italian"]);
    }

    #[test]
    fn address_skips_missing_parts() {
        let mut raw = full_business();
        raw["location"] = json!({"address1": null, "city": "Brooklyn", "state": "NY"});
        let record = RestaurantRecord::from_business(business(raw)).unwrap();
        assert_eq!(record.address, "Brooklyn, NY");
    }

    #[test]
    fn skips_businesses_that_cannot_be_placed() {
        let mut raw = full_business();
        raw["coordinates"] = json!({"latitude": 40.0});
        assert!(RestaurantRecord::from_business(business(raw)).is_none());

        let mut raw = full_business();
        raw.as_object_mut().unwrap().remove("id");
        assert!(RestaurantRecord::from_business(business(raw)).is_none());
    }

    #[test]
    fn distance_label_parses_back_to_miles() {
        let mut record = RestaurantRecord::from_business(business(full_business())).unwrap();
        assert_eq!(record.distance_miles(), Some(1.3));

        record.distance = UNKNOWN_DISTANCE.to_string();
        assert_eq!(record.distance_miles(), None);
    }

    #[test]
    fn serializes_with_camel_case_keys_and_omits_missing_phone() {
        let mut record = RestaurantRecord::from_business(business(full_business())).unwrap();
        record.phone = None;
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["reviewCount"], json!(1820));
        assert_eq!(value["priceLevel"], json!(2));
        assert_eq!(value["isOpen"], json!(true));
        assert_eq!(value["coordinates"], json!({"lat": 40.7305, "lng": -74.0021}));
        assert!(value.get("phone").is_none());
    }
}
