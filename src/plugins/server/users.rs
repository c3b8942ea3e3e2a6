use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;

use super::{auth::CurrentUser, payload::Payload};
use crate::{entity::user, prelude::*, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterReq {
  pub email: String,
  #[serde(default)]
  pub telegram_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReq {
  pub telegram_id: Option<String>,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<RegisterReq>,
) -> Result<(StatusCode, Json<user::Model>)> {
  let is_staff = app.is_admin(&req.email);
  let user = app.sv().user.register(&req.email, req.telegram_id, is_staff).await?;
  info!("Registered user {} (staff: {})", user.id, user.is_staff);
  Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<user::Model>>> {
  if !user.is_staff {
    return Err(Error::Forbidden);
  }
  Ok(Json(app.sv().user.all().await?))
}

pub async fn retrieve(
  State(app): State<Arc<AppState>>,
  caller: CurrentUser,
  Path(id): Path<i32>,
) -> Result<Json<user::Model>> {
  caller.ensure_can_manage(id)?;
  let user = app.sv().user.by_id(id).await?.ok_or(Error::UserNotFound)?;
  Ok(Json(user))
}

pub async fn update(
  State(app): State<Arc<AppState>>,
  caller: CurrentUser,
  Path(id): Path<i32>,
  Payload(req): Payload<UpdateReq>,
) -> Result<Json<user::Model>> {
  caller.ensure_can_manage(id)?;
  Ok(Json(app.sv().user.set_telegram_id(id, req.telegram_id).await?))
}

pub async fn delete(
  State(app): State<Arc<AppState>>,
  caller: CurrentUser,
  Path(id): Path<i32>,
) -> Result<StatusCode> {
  caller.ensure_can_manage(id)?;
  app.sv().user.delete(id).await?;
  info!("User {id} deleted by {}", caller.0.id);
  Ok(StatusCode::NO_CONTENT)
}
