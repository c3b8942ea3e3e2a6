//! Bot front-end: tells users the chat id to store as their reminder address.

mod command;

use std::sync::Arc;

use command::Command;
use teloxide::{
  Bot,
  dispatching::{Dispatcher, HandlerExt, UpdateFilterExt},
  prelude::*,
  types::{Message, ParseMode, Update},
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "telegram"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let token = app
      .config
      .notify
      .bot_token
      .clone()
      .context("TELEGRAM_BOT_TOKEN not set")?;

    run_bot(Bot::new(token).set_api_url(api_url(&app)?)).await;
    Ok(())
  }
}

fn api_url(app: &AppState) -> anyhow::Result<reqwest::Url> {
  reqwest::Url::parse(&app.config.notify.api_url)
    .context("TELEGRAM_API_URL is not a valid URL")
}

pub async fn run_bot(bot: Bot) {
  info!("Starting Telegram bot...");

  let handler = teloxide::dptree::entry().branch(
    Update::filter_message()
      .filter_command::<Command>()
      .endpoint(|bot: Bot, msg: Message, cmd: Command| async move {
        let text = command::reply(&cmd, msg.chat.id.0);
        bot.send_message(msg.chat.id, text).parse_mode(ParseMode::Html).await?;
        Ok::<_, teloxide::RequestError>(())
      }),
  );

  Dispatcher::builder(bot, handler).build().dispatch().await;
}
