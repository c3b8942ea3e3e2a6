use axum::{
  Json,
  extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::prelude::*;

/// JSON body whose rejections use the API error shape.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
  S: Send + Sync,
  T: DeserializeOwned,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    match Json::<T>::from_request(req, state).await {
      Ok(Json(value)) => Ok(Self(value)),
      Err(rejection) => {
        debug!("Rejected request body: {rejection}");
        Err(Error::InvalidArgs(rejection_message(&rejection)))
      }
    }
  }
}

fn rejection_message(rejection: &JsonRejection) -> String {
  match rejection {
    JsonRejection::MissingJsonContentType(_) => {
      "Expected a JSON request body".to_string()
    }
    _ => rejection.body_text(),
  }
}
