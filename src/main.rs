use dotenv::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use recipe_finder::api::MealDbClient;
use recipe_finder::bot::{schema, Command, SharedApi};
use recipe_finder::config::Config;
use recipe_finder::db::SqliteStore;
use recipe_finder::session::Sessions;

#[tokio::main]
async fn main() {
    // Load all env variables from .env file.
    dotenv().ok();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();
    log::info!("Starting bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => panic!("Invalid configuration: {}", e),
    };

    log::info!("Loading favorites store");
    let store = match SqliteStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => panic!("Failed to open {} with error {}", config.db_path, e),
    };
    let api: SharedApi = match MealDbClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => panic!("Failed to build the recipe API client: {}", e),
    };
    log::info!("Using recipe API at {}", config.api_base_url);
    let sessions = Arc::new(Sessions::new(store, config.favorites_key.clone(), config.max_sessions));

    let bot = Bot::from_env();
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Could not register the command list: {}", e);
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![sessions, api])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
