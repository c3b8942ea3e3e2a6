use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::Deserialize;

use super::{auth::CurrentUser, payload::Payload};
use crate::{
  entity::habit,
  prelude::*,
  state::AppState,
  sv::habit::{Filter, Order},
  validation::Draft,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
  pub is_pleasant: Option<bool>,
  pub is_public: Option<bool>,
  pub ordering: Option<String>,
}

impl ListQuery {
  fn into_filter(self) -> Result<Filter> {
    let order = match self.ordering.as_deref() {
      Some(ordering) => ordering.parse()?,
      None => Order::default(),
    };
    Ok(Filter { is_pleasant: self.is_pleasant, is_public: self.is_public, order })
  }
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Query(query): Query<ListQuery>,
) -> Result<Json<Vec<habit::Model>>> {
  let filter = query.into_filter()?;
  Ok(Json(app.sv().habit.list(user.id, &filter).await?))
}

pub async fn public(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<habit::Model>>> {
  Ok(Json(app.sv().habit.public().await?))
}

pub async fn create(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Payload(draft): Payload<Draft>,
) -> Result<(StatusCode, Json<habit::Model>)> {
  let habit = app.sv().habit.create(user.id, draft).await?;
  info!("User {} created habit {}", user.id, habit.id);
  Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn retrieve(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i32>,
) -> Result<Json<habit::Model>> {
  Ok(Json(app.sv().habit.owned(id, &user).await?))
}

pub async fn update(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i32>,
  Payload(draft): Payload<Draft>,
) -> Result<Json<habit::Model>> {
  Ok(Json(app.sv().habit.update(id, &user, draft).await?))
}

pub async fn delete(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i32>,
) -> Result<StatusCode> {
  app.sv().habit.delete(id, &user).await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn complete(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i32>,
) -> Result<Json<habit::Model>> {
  let habit = app.sv().habit.mark_completed(id, &user, &app.queue).await?;
  Ok(Json(habit))
}
