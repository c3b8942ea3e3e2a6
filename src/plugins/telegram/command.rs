use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
  /// Show your chat id
  Start,
  /// How to receive reminders
  Help,
}

const HELP: &str = "\
<b>⏰ Habit reminders</b>

Store the chat id below as <code>telegram_id</code> on your account \
(<code>PATCH /api/users/&lt;id&gt;</code>) and reminders for your habits \
will arrive here at their scheduled time.";

pub fn reply(cmd: &Command, chat_id: i64) -> String {
  match cmd {
    Command::Start => format!(
      "👋 Welcome!\n\nYour chat id: <code>{chat_id}</code>\n\nSend /help for setup."
    ),
    Command::Help => format!("{HELP}\n\nYour chat id: <code>{chat_id}</code>"),
  }
}
