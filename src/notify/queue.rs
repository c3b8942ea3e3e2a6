use tokio::sync::{Mutex, mpsc};

use super::{Delivery, SendError, Telegram};
use crate::{config, prelude::*};

/// One reminder to push through the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTask {
  pub chat_id: Option<String>,
  pub text: String,
}

/// Accepts send tasks for background delivery. Never blocks the caller.
pub trait Enqueue: Send + Sync {
  fn enqueue(&self, task: SendTask);
}

/// In-process task queue drained by the delivery plugin.
pub struct Queue {
  tx: mpsc::UnboundedSender<SendTask>,
  rx: Mutex<mpsc::UnboundedReceiver<SendTask>>,
}

impl Queue {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { tx, rx: Mutex::new(rx) }
  }

  /// Waits for the next task. Only one consumer holds the receiver at a time.
  pub async fn recv(&self) -> Option<SendTask> {
    self.rx.lock().await.recv().await
  }
}

impl Default for Queue {
  fn default() -> Self {
    Self::new()
  }
}

impl Enqueue for Queue {
  fn enqueue(&self, task: SendTask) {
    if self.tx.send(task).is_err() {
      warn!("Delivery queue closed, dropping notification");
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Total attempts, including the first one.
  pub max_attempts: u32,
  /// Delay after the first failure, doubled after each further one.
  pub backoff: Duration,
}

impl RetryPolicy {
  pub fn delay(&self, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    self.backoff.saturating_mul(factor)
  }
}

impl From<&config::Notify> for RetryPolicy {
  fn from(config: &config::Notify) -> Self {
    Self { max_attempts: config.max_attempts.max(1), backoff: config.backoff }
  }
}

#[derive(Debug)]
pub enum Terminal {
  Sent { attempts: u32 },
  Skipped,
  Exhausted { attempts: u32, error: SendError },
}

/// Runs a task until it is sent, skipped or out of attempts.
pub async fn deliver(
  telegram: &Telegram,
  task: &SendTask,
  policy: RetryPolicy,
) -> Terminal {
  let mut attempt = 0;

  loop {
    attempt += 1;

    match telegram.send(task.chat_id.as_deref(), &task.text).await {
      Delivery::Sent => return Terminal::Sent { attempts: attempt },
      Delivery::Skipped => return Terminal::Skipped,
      Delivery::Retry(error) if attempt >= policy.max_attempts => {
        error!(
          "Giving up on notification to {:?} after {attempt} attempts: {error}",
          task.chat_id
        );
        return Terminal::Exhausted { attempts: attempt, error };
      }
      Delivery::Retry(_) => {
        let delay = policy.delay(attempt);
        debug!("Retrying notification in {delay:?} (attempt {attempt})");
        time::sleep(delay).await;
      }
    }
  }
}
