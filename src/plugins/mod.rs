pub mod delivery;
pub mod reminder;
pub mod server;
pub mod telegram;

use std::sync::Arc;

use crate::{prelude::*, state::AppState};

const RESTART_DELAY: Duration = Duration::from_secs(5);

#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Supervisor that keeps every registered plugin running.
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub async fn run(self, app: Arc<AppState>) {
    let mut handles = Vec::with_capacity(self.plugins.len());

    for plugin in self.plugins {
      let app = app.clone();
      handles.push(tokio::spawn(supervise(plugin, app)));
    }

    for handle in handles {
      let _ = handle.await;
    }
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  info!("SYSTEM: Service `{name}` initialized");

  loop {
    let app = app.clone();
    let plugin = plugin.clone();

    let handle = tokio::spawn(async move { plugin.start(app).await });

    match handle.await {
      Ok(Ok(())) => {
        warn!("Service `{name}` stopped unexpectedly (Ok).");
      }
      Ok(Err(err)) => {
        error!("Service `{name}` crashed with error: {err:#}.");
      }
      Err(join_err) if join_err.is_cancelled() => {
        info!("Service `{name}` shutdown.");
        break;
      }
      Err(_) => {
        error!("Service `{name}` PANICKED!");
      }
    }

    time::sleep(RESTART_DELAY).await;
    info!("SYSTEM: Restarting service `{name}`...");
  }
}
