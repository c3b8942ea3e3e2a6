use sea_orm_migration::prelude::*;

use super::m20251020_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Habits::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Habits::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Habits::UserId).integer().not_null())
          .col(ColumnDef::new(Habits::Place).string_len(100).not_null())
          .col(ColumnDef::new(Habits::Time).time().not_null())
          .col(ColumnDef::new(Habits::Action).string_len(200).not_null())
          .col(
            ColumnDef::new(Habits::IsPleasant).boolean().not_null().default(false),
          )
          .col(ColumnDef::new(Habits::RelatedHabitId).integer().null())
          .col(
            ColumnDef::new(Habits::Frequency)
              .integer()
              .not_null()
              .default(1)
              .check(Expr::col(Habits::Frequency).between(1, 7)),
          )
          .col(ColumnDef::new(Habits::Reward).string_len(200).null())
          .col(
            ColumnDef::new(Habits::Duration)
              .integer()
              .not_null()
              .check(Expr::col(Habits::Duration).lte(120)),
          )
          .col(ColumnDef::new(Habits::IsPublic).boolean().not_null().default(false))
          .col(ColumnDef::new(Habits::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Habits::LastCompleted).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_habits_user")
              .from(Habits::Table, Habits::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_habits_related")
              .from(Habits::Table, Habits::RelatedHabitId)
              .to(Habits::Table, Habits::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_habits_user")
          .table(Habits::Table)
          .col(Habits::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_habits_time")
          .table(Habits::Table)
          .col(Habits::Time)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Habits::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Habits {
  Table,
  Id,
  UserId,
  Place,
  Time,
  Action,
  IsPleasant,
  RelatedHabitId,
  Frequency,
  Reward,
  Duration,
  IsPublic,
  CreatedAt,
  LastCompleted,
}
