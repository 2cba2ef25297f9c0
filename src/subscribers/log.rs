//! # LogWriter — event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO maid: task added maid="session" key=task-3 kind=disposable
//! INFO maid: drain started maid="session" tasks=3
//! WARN maid: discharge failed maid="session" key=task-3 kind=disposable reason="boom"
//! INFO maid: drained maid="session" failed=1
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;
use tracing::{info, warn};

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let maid = e.maid.as_deref().unwrap_or("unknown");
        let key = e.key.map(|k| k.to_string()).unwrap_or_default();
        let kind = e.task_kind.map(|k| k.as_label()).unwrap_or("");
        match e.kind {
            EventKind::TaskAdded => {
                info!(target: "maid", maid, key = %key, kind, "task added");
            }
            EventKind::TaskRemoved => {
                info!(target: "maid", maid, key = %key, kind, "task removed");
            }
            EventKind::LateTaskDischarged => match e.reason.as_deref() {
                None => info!(target: "maid", maid, key = %key, kind, "late task discharged"),
                Some(reason) => {
                    warn!(target: "maid", maid, key = %key, kind, reason, "late task failed")
                }
            },
            EventKind::DrainStarted => {
                info!(target: "maid", maid, tasks = e.count.unwrap_or(0), "drain started");
            }
            EventKind::TaskDischarged => {
                info!(target: "maid", maid, key = %key, kind, "task discharged");
            }
            EventKind::DischargeFailed => {
                let reason = e.reason.as_deref().unwrap_or("unknown");
                warn!(target: "maid", maid, key = %key, kind, reason, "discharge failed");
            }
            EventKind::Drained => {
                info!(target: "maid", maid, failed = e.count.unwrap_or(0), "drained");
            }
            EventKind::BindingFired => {
                info!(target: "maid", maid, "binding fired");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
