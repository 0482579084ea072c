use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use restaurant_finder::config::Config;
use restaurant_finder::controller::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    restaurant_finder::init_logging("info,tower_http=debug");

    let config = Config::parse();
    info!("Starting restaurant finder in {} mode", config.environment);

    let app_state = AppState::new(config)?;
    controller::serve(app_state).await
}
