use std::time::Duration;
use anyhow::bail;
use clap::Parser;
use dotenv::dotenv;
use tracing::warn;
use restaurant_finder::client::filters::{FilterState, CUISINE_TYPES};
use restaurant_finder::client::geolocation::{FixedPosition, GeolocationResolver};
use restaurant_finder::client::presenter::{map_view, sort_restaurants, SortKey, ViewMode};
use restaurant_finder::client::session::{SearchClient, SearchOutcome, SearchSession};
use restaurant_finder::models::client_config::ClientConfig;
use restaurant_finder::models::restaurant::{Coordinates, RestaurantRecord};
use restaurant_finder::models::search_request::{MinRating, PRICE_LEVELS};

#[derive(Parser, Debug)]
#[clap(name = "restaurant-search", about = "Search nearby restaurants through a restaurant finder server")]
struct Args {
    /// What to eat, e.g. "pizza" or "korean bbq"
    term: String,

    #[clap(env = "RESTAURANT_FINDER_URL", long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Device latitude; without a position the search centres on New York City
    #[clap(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    #[clap(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    #[clap(long, default_value_t = 10)]
    locate_timeout_secs: u64,

    /// Search radius in miles (1-25)
    #[clap(long)]
    distance: Option<u8>,

    /// Price level to include (1-4), repeatable. Defaults to every level
    #[clap(long = "price", value_parser = clap::value_parser!(u8).range(1..=4))]
    prices: Vec<u8>,

    #[clap(long)]
    open_now: bool,

    /// Minimum rating: 0, 3 or 4
    #[clap(long)]
    min_rating: Option<MinRating>,

    /// Cuisine label, repeatable. Shown in the summary only
    #[clap(long = "cuisine")]
    cuisines: Vec<String>,

    #[clap(long, value_enum, default_value_t = SortKey::Distance)]
    sort: SortKey,

    #[clap(long, value_enum, default_value_t = ViewMode::List)]
    view: ViewMode,
}

impl Args {
    fn has_filters(&self) -> bool {
        self.distance.is_some()
            || !self.prices.is_empty()
            || self.open_now
            || self.min_rating.is_some()
            || !self.cuisines.is_empty()
    }

    fn filter_state(&self) -> FilterState {
        let mut filters = FilterState::new();
        if !self.has_filters() {
            return filters;
        }

        filters.open();
        if let Some(miles) = self.distance {
            filters.set_distance(miles);
        }
        if !self.prices.is_empty() {
            for level in PRICE_LEVELS {
                let selected = filters.draft().price_levels.contains(&level);
                if selected != self.prices.contains(&level) {
                    filters.toggle_price(level);
                }
            }
        }
        filters.set_open_now(self.open_now);
        if let Some(min_rating) = self.min_rating {
            filters.set_min_rating(min_rating);
        }
        for cuisine in &self.cuisines {
            if !CUISINE_TYPES.iter().any(|known| known.eq_ignore_ascii_case(cuisine)) {
                warn!("`{}` is not one of the listed cuisine types", cuisine);
            }
            filters.toggle_cuisine(cuisine);
        }
        filters.apply();
        filters
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    restaurant_finder::init_logging("warn");

    let args = Args::parse();
    let filters = args.filter_state();

    let position = args
        .latitude
        .zip(args.longitude)
        .map(|(lat, lng)| FixedPosition(Coordinates { lat, lng }));
    let resolver = GeolocationResolver::new(position)
        .with_timeout(Duration::from_secs(args.locate_timeout_secs));
    let location = resolver.resolve().await;

    let client = SearchClient::new(args.server.as_str())?;
    let client_config = if args.view == ViewMode::Map {
        client.client_config().await.unwrap_or_else(|e| {
            warn!("Could not load client config due to: {}", e);
            ClientConfig::default()
        })
    } else {
        ClientConfig::default()
    };
    let session = SearchSession::new(client);

    let restaurants = match session.search(&args.term, location, filters.applied()).await {
        SearchOutcome::Updated(restaurants) => restaurants,
        SearchOutcome::Failed { notice, error } => {
            warn!("Search failed: {}", error);
            bail!(notice);
        }
        SearchOutcome::Skipped => bail!("Enter something to search for"),
        SearchOutcome::Superseded => return Ok(()),
    };

    let sorted = sort_restaurants(&restaurants, args.sort);
    println!("Results for \"{}\": {} restaurants found", args.term.trim(), sorted.len());
    if !filters.draft().cuisines.is_empty() {
        let cuisines: Vec<&str> = filters.draft().cuisines.iter().map(String::as_str).collect();
        println!("(cuisine selection {} is not applied to results)", cuisines.join(", "));
    }

    match args.view {
        ViewMode::List => {
            for (i, restaurant) in sorted.iter().enumerate() {
                print_restaurant(i + 1, restaurant);
            }
        }
        ViewMode::Map => match map_view(&sorted, resolver.current_or_fallback(), &client_config) {
            Some(view) => {
                println!("Map centred on {:.4}, {:.4}", view.center.lat, view.center.lng);
                for marker in view.markers {
                    println!(
                        "  ● {:<32} {:>9.5}, {:>10.5}",
                        marker.name, marker.position.lat, marker.position.lng
                    );
                }
            }
            None => println!("Map view unavailable: no map key configured on the server"),
        },
    }
    Ok(())
}

fn print_restaurant(position: usize, restaurant: &RestaurantRecord) {
    println!(
        "{:>2}. {}  ★ {:.1} ({})  {}  {}  {}",
        position,
        restaurant.name,
        restaurant.rating,
        restaurant.review_count,
        "$".repeat(usize::from(restaurant.price_level)),
        restaurant.distance,
        if restaurant.is_open { "open" } else { "closed" },
    );
    let mut details = vec![restaurant.cuisine.join(", "), restaurant.address.clone()];
    if let Some(phone) = &restaurant.phone {
        details.push(phone.clone());
    }
    let details: Vec<String> = details.into_iter().filter(|d| !d.is_empty()).collect();
    if !details.is_empty() {
        println!("    {}", details.join(" · "));
    }
}
