use crate::{entity::habit, prelude::*};

pub fn format_time(time: NaiveTime) -> String {
  time.format("%H:%M").to_string()
}

/// Escapes the characters Telegram's legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if matches!(ch, '_' | '*' | '`' | '[') {
      out.push('\\');
    }
    out.push(ch);
  }
  out
}

pub fn reminder_text(habit: &habit::Model) -> String {
  format!(
    "⏰ *Reminder*: {} at {} ({} sec)",
    escape_markdown(&habit.action),
    escape_markdown(&habit.place),
    habit.duration
  )
}

pub fn completed_text(habit: &habit::Model) -> String {
  format!("✅ *Habit completed*: {}", escape_markdown(&habit.action))
}
