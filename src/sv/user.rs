use crate::{entity::user, prelude::*};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

/// Chat ids are numeric, negative for groups.
fn check_telegram_id(telegram_id: Option<String>) -> Result<Option<String>> {
  let Some(id) = telegram_id.map(|id| id.trim().to_string()) else {
    return Ok(None);
  };
  if id.is_empty() {
    return Ok(None);
  }
  if id.parse::<i64>().is_err() {
    return Err(Error::InvalidArgs(format!(
      "telegram_id must be a numeric chat id, got `{id}`"
    )));
  }
  Ok(Some(id))
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn register(
    &self,
    email: &str,
    telegram_id: Option<String>,
    is_staff: bool,
  ) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
      return Err(Error::InvalidArgs("email is not valid".into()));
    }
    let telegram_id = check_telegram_id(telegram_id)?;

    let existing = user::Entity::find()
      .filter(user::Column::Email.eq(&email))
      .one(self.db)
      .await?;
    if existing.is_some() {
      return Err(Error::EmailTaken);
    }

    let user = user::ActiveModel {
      email: Set(email),
      telegram_id: Set(telegram_id),
      is_staff: Set(is_staff),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    Ok(user.insert(self.db).await?)
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn all(&self) -> Result<Vec<user::Model>> {
    let users = user::Entity::find()
      .order_by_asc(user::Column::Id)
      .all(self.db)
      .await?;
    Ok(users)
  }

  pub async fn set_telegram_id(
    &self,
    id: i32,
    telegram_id: Option<String>,
  ) -> Result<user::Model> {
    let telegram_id = check_telegram_id(telegram_id)?;
    let user = self.by_id(id).await?.ok_or(Error::UserNotFound)?;

    let user = user::ActiveModel { telegram_id: Set(telegram_id), ..user.into() }
      .update(self.db)
      .await?;
    Ok(user)
  }

  /// Owned habits go with the user (FK cascade).
  pub async fn delete(&self, id: i32) -> Result<()> {
    let res = user::Entity::delete_by_id(id).exec(self.db).await?;
    if res.rows_affected == 0 {
      return Err(Error::UserNotFound);
    }
    Ok(())
  }
}
