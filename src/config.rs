use std::{collections::HashSet, env};

use crate::prelude::*;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Notify {
  pub api_url: String,
  pub bot_token: Option<String>,
  pub connect_timeout: Duration,
  pub read_timeout: Duration,
  pub max_attempts: u32,
  pub backoff: Duration,
}

impl Default for Notify {
  fn default() -> Self {
    Self {
      api_url: TELEGRAM_API_URL.into(),
      bot_token: None,
      connect_timeout: Duration::from_secs(5),
      read_timeout: Duration::from_secs(10),
      max_attempts: 3,
      backoff: Duration::from_secs(5),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub db_url: String,
  pub port: u16,
  /// Emails registered as staff
  pub admins: HashSet<String>,
  pub scan_interval: Duration,
  pub notify: Notify,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      db_url: "sqlite:habits.db?mode=rwc".into(),
      port: 3000,
      admins: HashSet::new(),
      scan_interval: Duration::from_secs(60),
      notify: Notify::default(),
    }
  }
}

fn duration_var(name: &str, default: Duration) -> anyhow::Result<Duration> {
  match env::var(name) {
    Ok(raw) => humantime::parse_duration(raw.trim())
      .with_context(|| format!("{name} is not a valid duration: `{raw}`")),
    Err(_) => Ok(default),
  }
}

fn parsed_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(name) {
    Ok(raw) => {
      raw.trim().parse().with_context(|| format!("{name} is invalid: `{raw}`"))
    }
    Err(_) => Ok(default),
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = Config::default();
    let notify = defaults.notify;

    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
      .ok()
      .map(|token| token.trim().to_string())
      .filter(|token| !token.is_empty());

    let max_attempts = parsed_var("NOTIFY_MAX_ATTEMPTS", notify.max_attempts)?;
    if max_attempts == 0 {
      anyhow::bail!("NOTIFY_MAX_ATTEMPTS must be at least 1");
    }

    let scan_interval = duration_var("SCAN_INTERVAL", defaults.scan_interval)?;
    if scan_interval.is_zero() {
      anyhow::bail!("SCAN_INTERVAL must be positive");
    }

    Ok(Self {
      db_url: env::var("DATABASE_URL").unwrap_or(defaults.db_url),
      port: parsed_var("PORT", defaults.port)?,
      admins: env::var("ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect(),
      scan_interval,
      notify: Notify {
        api_url: env::var("TELEGRAM_API_URL").unwrap_or(notify.api_url),
        bot_token,
        connect_timeout: duration_var(
          "NOTIFY_CONNECT_TIMEOUT",
          notify.connect_timeout,
        )?,
        read_timeout: duration_var("NOTIFY_READ_TIMEOUT", notify.read_timeout)?,
        max_attempts,
        backoff: duration_var("NOTIFY_BACKOFF", notify.backoff)?,
      },
    })
  }
}
