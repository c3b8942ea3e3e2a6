use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{entity::user, prelude::*, state::AppState};

/// Set by the identity provider in front of this service.
pub const USER_HEADER: &str = "x-user-id";

/// Caller resolved from [`USER_HEADER`].
pub struct CurrentUser(pub user::Model);

impl CurrentUser {
  /// Users may manage their own account, staff may manage any.
  pub fn ensure_can_manage(&self, user_id: i32) -> Result<()> {
    if self.0.id == user_id || self.0.is_staff {
      Ok(())
    } else {
      Err(Error::Forbidden)
    }
  }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self, Self::Rejection> {
    let id = parts
      .headers
      .get(USER_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.trim().parse::<i32>().ok())
      .ok_or(Error::Unauthorized)?;

    let user = app.sv().user.by_id(id).await?.ok_or(Error::Unauthorized)?;
    Ok(Self(user))
  }
}
