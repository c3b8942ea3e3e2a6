use chrono::NaiveTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: i32,
  pub place: String,
  /// Time of day (UTC) the reminder is due
  pub time: NaiveTime,
  pub action: String,
  pub is_pleasant: bool,
  pub related_habit_id: Option<i32>,
  /// Period in days, 1..=7
  pub frequency: i32,
  pub reward: Option<String>,
  /// Seconds needed to perform the action, 1..=120
  pub duration: i32,
  pub is_public: bool,
  pub created_at: DateTime,
  pub last_completed: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id",
    on_delete = "Cascade"
  )]
  User,
  #[sea_orm(
    belongs_to = "Entity",
    from = "Column::RelatedHabitId",
    to = "Column::Id",
    on_delete = "SetNull"
  )]
  RelatedHabit,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
