//! Drains the send queue, one background task per notification.

use std::sync::Arc;

use crate::{
  notify::{self, Terminal},
  prelude::*,
  state::AppState,
};

pub struct Delivery;

#[async_trait]
impl super::Plugin for Delivery {
  fn name(&self) -> &'static str {
    "delivery"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let policy = app.retry_policy();

    while let Some(task) = app.queue.recv().await {
      let app = app.clone();

      tokio::spawn(async move {
        let outcome = notify::deliver(&app.telegram, &task, policy).await;
        if let Terminal::Sent { attempts } = outcome
          && attempts > 1
        {
          info!("Notification delivered after {attempts} attempts");
        }
      });
    }

    anyhow::bail!("Delivery queue closed")
  }
}
