use super::{Enqueue, SendTask};
use crate::{prelude::*, sv};

/// Enqueues a reminder for every habit due in the minute of `now` whose
/// owner has a Telegram address. Returns the number of tasks enqueued.
///
/// Matching is exact to the minute; a skipped minute is never caught up.
pub async fn scan<Q>(db: &DatabaseConnection, queue: &Q, now: DateTime) -> Result<usize>
where
  Q: Enqueue + ?Sized,
{
  let due = sv::Habit::new(db).due_at(now).await?;
  debug!(
    "{} habit(s) due at {}",
    due.len(),
    utils::format_time(now.time())
  );

  let mut enqueued = 0;
  for (habit, owner) in due {
    let Some(chat_id) = owner
      .and_then(|user| user.telegram_id)
      .filter(|id| !id.trim().is_empty())
    else {
      debug!("Habit {} owner has no Telegram address", habit.id);
      continue;
    };

    queue.enqueue(SendTask {
      chat_id: Some(chat_id),
      text: utils::reminder_text(&habit),
    });
    enqueued += 1;
  }

  Ok(enqueued)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    entity::habit,
    notify::fake::Captured,
    sv::tests::setup_test_db,
    validation::{Draft, tests::draft},
  };

  fn at(hour: u32, minute: u32, second: u32) -> DateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
      .unwrap()
      .and_hms_opt(hour, minute, second)
      .unwrap()
  }

  async fn completed_at(db: &DatabaseConnection, habit: habit::Model, when: DateTime) {
    habit::ActiveModel { last_completed: Set(Some(when)), ..habit.into() }
      .update(db)
      .await
      .unwrap();
  }

  async fn seed(db: &DatabaseConnection, telegram_id: Option<&str>) -> habit::Model {
    let user = sv::User::new(db)
      .register("a@example.com", telegram_id.map(Into::into), false)
      .await
      .unwrap();
    sv::Habit::new(db)
      .create(
        user.id,
        Draft {
          place: "Park".into(),
          action: "Walk".into(),
          duration: 60,
          ..draft()
        },
      )
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn test_due_habit_is_enqueued() {
    let db = setup_test_db().await;
    seed(&db, Some("777")).await;
    let queue = Captured::default();

    let count = scan(&db, &queue, at(8, 0, 42)).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(
      queue.tasks(),
      vec![SendTask {
        chat_id: Some("777".into()),
        text: "⏰ *Reminder*: Walk at Park (60 sec)".into(),
      }]
    );
  }

  #[tokio::test]
  async fn test_other_minute_is_ignored() {
    let db = setup_test_db().await;
    seed(&db, Some("777")).await;
    let queue = Captured::default();

    assert_eq!(scan(&db, &queue, at(8, 1, 0)).await.unwrap(), 0);
    assert_eq!(scan(&db, &queue, at(7, 59, 59)).await.unwrap(), 0);
    assert!(queue.tasks().is_empty());
  }

  #[tokio::test]
  async fn test_completed_today_is_skipped() {
    let db = setup_test_db().await;
    let habit = seed(&db, Some("777")).await;
    completed_at(&db, habit, at(6, 15, 0)).await;
    let queue = Captured::default();

    assert_eq!(scan(&db, &queue, at(8, 0, 0)).await.unwrap(), 0);
    assert!(queue.tasks().is_empty());
  }

  #[tokio::test]
  async fn test_completed_yesterday_is_due() {
    let db = setup_test_db().await;
    let habit = seed(&db, Some("777")).await;
    completed_at(&db, habit, at(23, 59, 0) - TimeDelta::days(1)).await;
    let queue = Captured::default();

    assert_eq!(scan(&db, &queue, at(8, 0, 0)).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_owner_without_address_is_skipped() {
    let db = setup_test_db().await;
    seed(&db, None).await;
    let queue = Captured::default();

    assert_eq!(scan(&db, &queue, at(8, 0, 0)).await.unwrap(), 0);
    assert!(queue.tasks().is_empty());
  }
}
