//! Reminder delivery.
//!
//! [`scan`] finds habits due this minute and enqueues one [`SendTask`] per
//! reachable owner. The delivery worker drains the [`Queue`] and runs each
//! task through [`deliver`], which owns the attempt ceiling and backoff while
//! [`Telegram::send`] performs a single attempt.

mod queue;
mod scan;
mod telegram;

pub use queue::{Enqueue, Queue, RetryPolicy, SendTask, Terminal, deliver};
pub use scan::scan;
pub use telegram::{Delivery, SendError, Telegram};

#[cfg(test)]
pub(crate) mod fake;
