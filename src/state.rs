use migration::{Migrator, MigratorTrait};

use crate::{
  config::Config,
  notify::{Queue, RetryPolicy, Telegram},
  prelude::*,
  sv,
};

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub habit: sv::Habit<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub queue: Queue,
  pub telegram: Telegram,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.db_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Self::with_db(db, config)
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> anyhow::Result<Self> {
    let telegram = Telegram::new(&config.notify)?;
    if !telegram.is_configured() {
      warn!("TELEGRAM_BOT_TOKEN not set, reminders will be skipped");
    }

    Ok(Self { db, queue: Queue::new(), telegram, config })
  }

  pub fn sv(&self) -> Services<'_> {
    Services { user: sv::User::new(&self.db), habit: sv::Habit::new(&self.db) }
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    (&self.config.notify).into()
  }

  pub fn is_admin(&self, email: &str) -> bool {
    self.config.admins.contains(&email.trim().to_lowercase())
  }
}
