//! Test doubles for the Bot API and the task queue.

use std::{
  net::SocketAddr,
  sync::{Arc, Mutex},
};

use axum::{
  Json, Router,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::post,
};
use json::Value;

use super::{Enqueue, SendTask};
use crate::{config, prelude::*};

/// Queue that only records what was enqueued.
#[derive(Default)]
pub struct Captured(Mutex<Vec<SendTask>>);

impl Captured {
  pub fn tasks(&self) -> Vec<SendTask> {
    self.0.lock().unwrap().clone()
  }
}

impl Enqueue for Captured {
  fn enqueue(&self, task: SendTask) {
    self.0.lock().unwrap().push(task);
  }
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
  Ok,
  NotOk,
  Status(StatusCode),
  /// Never answers within the client's read timeout.
  Hang,
}

#[derive(Clone)]
struct Shared {
  reply: Reply,
  requests: Arc<Mutex<Vec<(String, Value)>>>,
}

pub struct FakeApi {
  addr: SocketAddr,
  shared: Shared,
}

impl FakeApi {
  pub async fn start(reply: Reply) -> Self {
    let shared = Shared { reply, requests: Arc::default() };

    let router = Router::new()
      .route("/{bot}/sendMessage", post(send_message))
      .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });

    Self { addr, shared }
  }

  pub fn config(&self) -> config::Notify {
    config::Notify {
      api_url: format!("http://{}", self.addr),
      bot_token: Some("123:TEST".into()),
      connect_timeout: Duration::from_secs(1),
      read_timeout: Duration::from_millis(200),
      max_attempts: 3,
      backoff: Duration::ZERO,
    }
  }

  pub fn requests(&self) -> Vec<Value> {
    let requests = self.shared.requests.lock().unwrap();
    requests.iter().map(|(_, body)| body.clone()).collect()
  }

  pub fn paths(&self) -> Vec<String> {
    let requests = self.shared.requests.lock().unwrap();
    requests.iter().map(|(path, _)| path.clone()).collect()
  }

  pub fn hits(&self) -> usize {
    self.shared.requests.lock().unwrap().len()
  }
}

async fn send_message(
  State(shared): State<Shared>,
  Path(bot): Path<String>,
  Json(body): Json<Value>,
) -> Response {
  shared.requests.lock().unwrap().push((bot, body));

  let ok = json::json!({ "ok": true, "result": { "message_id": 1 } });
  match shared.reply {
    Reply::Ok => Json(ok).into_response(),
    Reply::NotOk => {
      Json(json::json!({ "ok": false, "description": "Bad Request: chat not found" }))
        .into_response()
    }
    Reply::Status(status) => (status, "upstream failure").into_response(),
    Reply::Hang => {
      time::sleep(Duration::from_secs(5)).await;
      Json(ok).into_response()
    }
  }
}
