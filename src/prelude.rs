pub use std::time::Duration;

pub use anyhow::Context;
pub use async_trait::async_trait;
pub use chrono::{NaiveDateTime as DateTime, NaiveTime, TimeDelta, Timelike, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Condition, Database,
  DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
  TransactionTrait,
};
pub use tokio::time;
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Result};
pub(crate) use crate::utils;
