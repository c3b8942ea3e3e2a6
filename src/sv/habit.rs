use std::str::FromStr;

use crate::{
  entity::{habit, user},
  notify::{Enqueue, SendTask},
  prelude::*,
  validation::{self, Draft, Lookup, Violation},
};

const PLACE_MAX: usize = 100;
const ACTION_MAX: usize = 200;
const REWARD_MAX: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
  Time,
  TimeDesc,
  CreatedAt,
  #[default]
  CreatedAtDesc,
}

impl FromStr for Order {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "time" => Ok(Order::Time),
      "-time" => Ok(Order::TimeDesc),
      "created_at" => Ok(Order::CreatedAt),
      "-created_at" => Ok(Order::CreatedAtDesc),
      other => Err(Error::InvalidArgs(format!(
        "unknown ordering `{other}`, expected time, -time, created_at or -created_at"
      ))),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
  pub is_pleasant: Option<bool>,
  pub is_public: Option<bool>,
  pub order: Order,
}

fn check_text(field: &str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidArgs(format!("{field} must not be empty")));
  }
  if value.chars().count() > max {
    return Err(Error::InvalidArgs(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

fn check_lengths(draft: &Draft) -> Result<()> {
  check_text("place", &draft.place, PLACE_MAX)?;
  check_text("action", &draft.action, ACTION_MAX)?;
  if let Some(reward) = draft.reward() {
    check_text("reward", reward, REWARD_MAX)?;
  }
  Ok(())
}

pub struct Habit<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Habit<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<habit::Model>> {
    Ok(habit::Entity::find_by_id(id).one(self.db).await?)
  }

  /// Habits of other users read as missing.
  pub async fn owned(&self, id: i32, owner: &user::Model) -> Result<habit::Model> {
    match self.by_id(id).await? {
      Some(habit) if habit.user_id == owner.id => Ok(habit),
      _ => Err(Error::HabitNotFound),
    }
  }

  pub async fn list(
    &self,
    owner_id: i32,
    filter: &Filter,
  ) -> Result<Vec<habit::Model>> {
    let mut query =
      habit::Entity::find().filter(habit::Column::UserId.eq(owner_id));

    if let Some(is_pleasant) = filter.is_pleasant {
      query = query.filter(habit::Column::IsPleasant.eq(is_pleasant));
    }
    if let Some(is_public) = filter.is_public {
      query = query.filter(habit::Column::IsPublic.eq(is_public));
    }

    query = match filter.order {
      Order::Time => query.order_by_asc(habit::Column::Time),
      Order::TimeDesc => query.order_by_desc(habit::Column::Time),
      Order::CreatedAt => query.order_by_asc(habit::Column::CreatedAt),
      Order::CreatedAtDesc => query.order_by_desc(habit::Column::CreatedAt),
    };

    Ok(query.order_by_asc(habit::Column::Id).all(self.db).await?)
  }

  pub async fn public(&self) -> Result<Vec<habit::Model>> {
    let habits = habit::Entity::find()
      .filter(habit::Column::IsPublic.eq(true))
      .order_by_desc(habit::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(habits)
  }

  pub async fn create(&self, owner_id: i32, draft: Draft) -> Result<habit::Model> {
    let draft = Draft { id: None, ..draft };
    check_lengths(&draft)?;
    validation::validate(&draft, self).await?;

    let habit = habit::ActiveModel {
      user_id: Set(owner_id),
      place: Set(draft.place.trim().to_string()),
      time: Set(draft.time),
      action: Set(draft.action.trim().to_string()),
      is_pleasant: Set(draft.is_pleasant),
      related_habit_id: Set(draft.related_habit_id),
      frequency: Set(draft.frequency),
      reward: Set(draft.reward().map(String::from)),
      duration: Set(draft.duration),
      is_public: Set(draft.is_public),
      created_at: Set(Utc::now().naive_utc()),
      last_completed: Set(None),
      ..Default::default()
    };

    Ok(habit.insert(self.db).await?)
  }

  pub async fn update(
    &self,
    id: i32,
    owner: &user::Model,
    draft: Draft,
  ) -> Result<habit::Model> {
    let existing = self.owned(id, owner).await?;

    let draft = Draft { id: Some(id), ..draft };
    check_lengths(&draft)?;
    validation::validate(&draft, self).await?;

    let txn = self.db.begin().await?;

    // Habits linking here rely on it staying pleasant.
    if existing.is_pleasant && !draft.is_pleasant {
      let linked = habit::Entity::find()
        .filter(habit::Column::RelatedHabitId.eq(id))
        .filter(habit::Column::Id.ne(id))
        .one(&txn)
        .await?;
      if linked.is_some() {
        return Err(Violation::PleasantHabitInUse.into());
      }
    }

    let habit = habit::ActiveModel {
      place: Set(draft.place.trim().to_string()),
      time: Set(draft.time),
      action: Set(draft.action.trim().to_string()),
      is_pleasant: Set(draft.is_pleasant),
      related_habit_id: Set(draft.related_habit_id),
      frequency: Set(draft.frequency),
      reward: Set(draft.reward().map(String::from)),
      duration: Set(draft.duration),
      is_public: Set(draft.is_public),
      ..existing.into()
    };

    let habit = habit.update(&txn).await?;
    txn.commit().await?;
    Ok(habit)
  }

  /// Owners delete their own habits, staff may delete any.
  pub async fn delete(&self, id: i32, user: &user::Model) -> Result<()> {
    let habit = self.by_id(id).await?.ok_or(Error::HabitNotFound)?;
    if habit.user_id != user.id && !user.is_staff {
      return Err(Error::HabitNotFound);
    }

    habit::Entity::delete_by_id(id).exec(self.db).await?;
    Ok(())
  }

  /// Stamps `last_completed` and queues a confirmation to the owner.
  ///
  /// Repeated calls are not deduplicated: each one moves the timestamp and
  /// queues another message.
  pub async fn mark_completed(
    &self,
    id: i32,
    owner: &user::Model,
    queue: &dyn Enqueue,
  ) -> Result<habit::Model> {
    let habit = self.owned(id, owner).await?;

    let habit = habit::ActiveModel {
      last_completed: Set(Some(Utc::now().naive_utc())),
      ..habit.into()
    }
    .update(self.db)
    .await?;

    queue.enqueue(SendTask {
      chat_id: owner.telegram_id.clone(),
      text: utils::completed_text(&habit),
    });

    Ok(habit)
  }

  /// Habits due in the minute of `now` that were not completed on that day,
  /// with their owners.
  pub async fn due_at(
    &self,
    now: DateTime,
  ) -> Result<Vec<(habit::Model, Option<user::Model>)>> {
    let (hour, minute) = (now.hour(), now.minute());
    let Some((from, to)) = NaiveTime::from_hms_opt(hour, minute, 0)
      .zip(NaiveTime::from_hms_milli_opt(hour, minute, 59, 999))
    else {
      return Ok(Vec::new());
    };
    let day_start = now.date().and_time(NaiveTime::MIN);

    let due = habit::Entity::find()
      .filter(habit::Column::Time.between(from, to))
      .filter(
        Condition::any()
          .add(habit::Column::LastCompleted.is_null())
          .add(habit::Column::LastCompleted.lt(day_start)),
      )
      .find_also_related(user::Entity)
      .all(self.db)
      .await?;

    Ok(due)
  }
}

#[async_trait]
impl Lookup for Habit<'_> {
  async fn is_pleasant(&self, id: i32) -> Result<Option<bool>> {
    Ok(self.by_id(id).await?.map(|habit| habit.is_pleasant))
  }
}
