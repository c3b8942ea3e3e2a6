mod auth;
mod habits;
mod payload;
mod users;

use std::{net::SocketAddr, sync::Arc};

use axum::{
  Router,
  routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

async fn health() -> &'static str {
  "OK"
}

pub fn routes() -> Router<Arc<AppState>> {
  Router::new()
    .route("/health", get(health))
    .route("/api/users", post(users::register).get(users::list))
    .route(
      "/api/users/{id}",
      get(users::retrieve).patch(users::update).delete(users::delete),
    )
    .route("/api/habits", get(habits::list).post(habits::create))
    .route("/api/habits/public", get(habits::public))
    .route(
      "/api/habits/{id}",
      get(habits::retrieve).put(habits::update).delete(habits::delete),
    )
    .route("/api/habits/{id}/complete", patch(habits::complete))
}

#[async_trait]
impl super::Plugin for Plugin {
  fn name(&self) -> &'static str {
    "server"
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let port = app.config.port;

    let router = routes()
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app)
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
  };
  use json::Value;
  use tower::ServiceExt;

  use super::{auth::USER_HEADER, *};
  use crate::{config::Config, sv::tests::setup_test_db};

  async fn app() -> Arc<AppState> {
    let config = Config {
      admins: ["admin@example.com".to_string()].into(),
      ..Config::default()
    };
    Arc::new(AppState::with_db(setup_test_db().await, config).unwrap())
  }

  async fn call(
    app: &Arc<AppState>,
    method: Method,
    uri: &str,
    user: Option<i32>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      req = req.header(USER_HEADER, user.to_string());
    }
    let req = match body {
      Some(body) => req
        .header("content-type", "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let res = routes().with_state(app.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
  }

  async fn register(app: &Arc<AppState>, email: &str) -> i32 {
    let (status, body) = call(
      app,
      Method::POST,
      "/api/users",
      None,
      Some(json::json!({ "email": email, "telegram_id": "555" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap() as i32
  }

  fn habit_body() -> Value {
    json::json!({
      "place": "Home",
      "time": "08:00:00",
      "action": "Drink water",
      "duration": 30,
      "is_public": false,
      "frequency": 1
    })
  }

  #[tokio::test]
  async fn test_create_and_fetch_habit() {
    let app = app().await;
    let user = register(&app, "a@example.com").await;

    let (status, created) =
      call(&app, Method::POST, "/api/habits", Some(user), Some(habit_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["action"], "Drink water");

    let uri = format!("/api/habits/{}", created["id"]);
    let (status, fetched) = call(&app, Method::GET, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let (status, list) = call(&app, Method::GET, "/api/habits", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_violation_is_reported() {
    let app = app().await;
    let user = register(&app, "a@example.com").await;

    let mut pleasant = habit_body();
    pleasant["is_pleasant"] = true.into();
    let (_, pleasant) =
      call(&app, Method::POST, "/api/habits", Some(user), Some(pleasant)).await;

    let mut body = habit_body();
    body["reward"] = "Coffee".into();
    body["related_habit"] = pleasant["id"].clone();

    let (status, error) =
      call(&app, Method::POST, "/api/habits", Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["success"], false);
    assert_eq!(
      error["error"],
      "Choose one: a reward or a related habit, not both"
    );
  }

  #[tokio::test]
  async fn test_malformed_body_is_bad_request() {
    let app = app().await;
    let user = register(&app, "a@example.com").await;

    let mut body = habit_body();
    body["time"] = "breakfast".into();
    let (status, error) =
      call(&app, Method::POST, "/api/habits", Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["success"], false);
    assert!(error["error"].as_str().unwrap().contains("time"));

    let (status, error) = call(
      &app,
      Method::POST,
      "/api/users",
      None,
      Some(json::json!({ "telegram_id": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["success"], false);

    let (status, error) =
      call(&app, Method::PUT, "/api/habits/1", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "Expected a JSON request body");
  }

  #[tokio::test]
  async fn test_identity_required() {
    let app = app().await;

    let (status, _) =
      call(&app, Method::GET, "/api/habits", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
      call(&app, Method::GET, "/api/habits", Some(404), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, public) =
      call(&app, Method::GET, "/api/habits/public", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(public.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_complete_enqueues_notification() {
    let app = app().await;
    let user = register(&app, "a@example.com").await;

    let (_, habit) =
      call(&app, Method::POST, "/api/habits", Some(user), Some(habit_body())).await;

    let uri = format!("/api/habits/{}/complete", habit["id"]);
    let (status, done) = call(&app, Method::PATCH, &uri, Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!done["last_completed"].is_null());

    let task = app.queue.recv().await.unwrap();
    assert_eq!(task.chat_id.as_deref(), Some("555"));
    assert!(task.text.contains("Drink water"));
  }

  #[tokio::test]
  async fn test_user_permissions() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let admin = register(&app, "admin@example.com").await;

    let (status, _) = call(&app, Method::GET, "/api/users", Some(alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) =
      call(&app, Method::GET, "/api/users", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 3);

    let bob_uri = format!("/api/users/{bob}");
    let (status, _) = call(
      &app,
      Method::PATCH,
      &bob_uri,
      Some(alice),
      Some(json::json!({ "telegram_id": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = call(
      &app,
      Method::PATCH,
      &bob_uri,
      Some(bob),
      Some(json::json!({ "telegram_id": "42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["telegram_id"], "42");

    let (status, _) = call(&app, Method::DELETE, &bob_uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, &bob_uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
