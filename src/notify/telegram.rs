use json::Value;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::{config, prelude::*};

/// Why a single send attempt failed. Every variant is retryable.
#[derive(Debug, Error)]
pub enum SendError {
  #[error("request timed out")]
  Timeout,
  #[error("connection error: {0}")]
  Connect(String),
  #[error("request error: {0}")]
  Request(String),
  #[error("unexpected status {0}")]
  Status(StatusCode),
  #[error("malformed response: {0}")]
  Parse(String),
  #[error("rejected by api: {0}")]
  Rejected(String),
}

impl From<reqwest::Error> for SendError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      SendError::Timeout
    } else if err.is_connect() {
      SendError::Connect(err.to_string())
    } else if err.is_decode() {
      SendError::Parse(err.to_string())
    } else {
      SendError::Request(err.to_string())
    }
  }
}

/// Outcome of one send attempt.
#[derive(Debug)]
pub enum Delivery {
  Sent,
  /// Nothing to deliver to: no address or no bot credential.
  Skipped,
  Retry(SendError),
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
  ok: bool,
  #[serde(default)]
  description: Option<String>,
}

/// Bot API client for `sendMessage`.
#[derive(Debug, Clone)]
pub struct Telegram {
  client: Client,
  api_url: String,
  token: Option<String>,
}

impl Telegram {
  pub fn new(config: &config::Notify) -> anyhow::Result<Self> {
    let client = Client::builder()
      .connect_timeout(config.connect_timeout)
      .read_timeout(config.read_timeout)
      .build()
      .context("Failed to build Telegram HTTP client")?;

    Ok(Self {
      client,
      api_url: config.api_url.trim_end_matches('/').to_string(),
      token: config.bot_token.clone(),
    })
  }

  pub fn is_configured(&self) -> bool {
    self.token.is_some()
  }

  fn endpoint(&self, token: &str) -> String {
    format!("{}/bot{}/sendMessage", self.api_url, token)
  }

  pub async fn send(&self, chat_id: Option<&str>, text: &str) -> Delivery {
    let Some(chat_id) = chat_id.map(str::trim).filter(|id| !id.is_empty())
    else {
      info!("No Telegram address, skipping notification");
      return Delivery::Skipped;
    };

    let Some(token) = &self.token else {
      warn!("TELEGRAM_BOT_TOKEN not set, skipping notification to {chat_id}");
      return Delivery::Skipped;
    };

    // numeric ids go out as integers, anything else (e.g. @channel) as text
    let chat: Value = match chat_id.parse::<i64>() {
      Ok(id) => id.into(),
      Err(_) => chat_id.into(),
    };

    let body = json::json!({
      "chat_id": chat,
      "text": text,
      "parse_mode": "Markdown",
    });

    let res = match self.client.post(self.endpoint(token)).json(&body).send().await
    {
      Ok(res) => res,
      Err(err) => return retry(chat_id, err.into()),
    };

    let status = res.status();
    if !status.is_success() {
      return retry(chat_id, SendError::Status(status));
    }

    match res.json::<ApiResponse>().await {
      Ok(ApiResponse { ok: true, .. }) => {
        info!("Telegram message sent to {chat_id}");
        Delivery::Sent
      }
      Ok(ApiResponse { description, .. }) => retry(
        chat_id,
        SendError::Rejected(description.unwrap_or_else(|| "ok: false".into())),
      ),
      Err(err) => retry(chat_id, err.into()),
    }
  }
}

fn retry(chat_id: &str, err: SendError) -> Delivery {
  warn!("Telegram message to {chat_id} failed: {err}");
  Delivery::Retry(err)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notify::fake::{FakeApi, Reply};

  #[tokio::test]
  async fn test_send_posts_markdown_message() {
    let api = FakeApi::start(Reply::Ok).await;
    let telegram = Telegram::new(&api.config()).unwrap();

    let delivery = telegram.send(Some("12345"), "*hi*").await;

    assert!(matches!(delivery, Delivery::Sent));
    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["chat_id"], 12345);
    assert_eq!(requests[0]["text"], "*hi*");
    assert_eq!(requests[0]["parse_mode"], "Markdown");
    assert_eq!(api.paths(), vec!["bot123:TEST".to_string()]);
  }

  #[tokio::test]
  async fn test_empty_address_is_skipped() {
    let api = FakeApi::start(Reply::Ok).await;
    let telegram = Telegram::new(&api.config()).unwrap();

    assert!(matches!(telegram.send(Some(""), "hi").await, Delivery::Skipped));
    assert!(matches!(telegram.send(None, "hi").await, Delivery::Skipped));
    assert_eq!(api.hits(), 0);
  }

  #[tokio::test]
  async fn test_missing_token_is_skipped() {
    let api = FakeApi::start(Reply::Ok).await;
    let config = config::Notify { bot_token: None, ..api.config() };
    let telegram = Telegram::new(&config).unwrap();

    assert!(matches!(telegram.send(Some("1"), "hi").await, Delivery::Skipped));
    assert_eq!(api.hits(), 0);
  }

  #[tokio::test]
  async fn test_api_rejection_is_retryable() {
    let api = FakeApi::start(Reply::NotOk).await;
    let telegram = Telegram::new(&api.config()).unwrap();

    let delivery = telegram.send(Some("1"), "hi").await;
    assert!(matches!(delivery, Delivery::Retry(SendError::Rejected(_))));
  }

  #[tokio::test]
  async fn test_error_status_is_retryable() {
    let api = FakeApi::start(Reply::Status(StatusCode::BAD_GATEWAY)).await;
    let telegram = Telegram::new(&api.config()).unwrap();

    let delivery = telegram.send(Some("1"), "hi").await;
    assert!(matches!(
      delivery,
      Delivery::Retry(SendError::Status(StatusCode::BAD_GATEWAY))
    ));
  }

  #[tokio::test]
  async fn test_slow_api_times_out() {
    let api = FakeApi::start(Reply::Hang).await;
    let telegram = Telegram::new(&api.config()).unwrap();

    let delivery = telegram.send(Some("1"), "hi").await;
    assert!(matches!(delivery, Delivery::Retry(SendError::Timeout)));
  }
}
