use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub email: String,
  /// Telegram chat id used as the reminder address
  pub telegram_id: Option<String>,
  pub is_staff: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::habit::Entity")]
  Habits,
}

impl Related<super::habit::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Habits.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
