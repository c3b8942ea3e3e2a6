//! Habit tracker backend
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the HTTP CRUD boundary with rate limiting
//! - A once-a-minute scan that queues reminders for due habits
//! - A delivery worker pushing reminders through the Telegram Bot API
//! - Teloxide for the optional bot front-end

mod config;
mod entity;
mod error;
mod notify;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;
mod validation;

use std::sync::Arc;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, plugins::App, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "habits=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting Habit Tracker v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_env()?;
  let app_state = Arc::new(AppState::new(config).await?);

  let mut app = App::new()
    .register(plugins::server::Plugin)
    .register(plugins::reminder::Reminder)
    .register(plugins::delivery::Delivery);

  if app_state.telegram.is_configured() {
    app = app.register(plugins::telegram::Plugin);
  } else {
    warn!("No bot token configured, Telegram bot disabled");
  }

  app.run(app_state).await;
  Ok(())
}
