// ─── Background Tasks ───
// User actions run as tokio tasks; their status flows back to a single
// foreground consumer through one channel.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::core::downloader::InstallObserver;
use crate::core::error::{LauncherError, LauncherResult};

pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum LauncherEvent {
    Status { task: TaskId, message: String },
    Progress { task: TaskId, fraction: f32 },
    Log { task: TaskId, line: String },
    Finished { task: TaskId, message: String },
    Failed { task: TaskId, error: String },
}

impl LauncherEvent {
    pub fn task(&self) -> TaskId {
        match self {
            LauncherEvent::Status { task, .. }
            | LauncherEvent::Progress { task, .. }
            | LauncherEvent::Log { task, .. }
            | LauncherEvent::Finished { task, .. }
            | LauncherEvent::Failed { task, .. } => *task,
        }
    }

    /// True for the last event a task emits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LauncherEvent::Finished { .. } | LauncherEvent::Failed { .. }
        )
    }
}

/// Forwards observer callbacks into the event channel. Sends after the
/// consumer has gone away are dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    task: TaskId,
    tx: mpsc::UnboundedSender<LauncherEvent>,
}

impl InstallObserver for ChannelObserver {
    fn on_status(&self, message: &str) {
        let _ = self.tx.send(LauncherEvent::Status {
            task: self.task,
            message: message.to_string(),
        });
    }

    fn on_progress(&self, fraction: f32) {
        let _ = self.tx.send(LauncherEvent::Progress {
            task: self.task,
            fraction: fraction.clamp(0.0, 1.0),
        });
    }

    fn on_log(&self, line: &str) {
        let _ = self.tx.send(LauncherEvent::Log {
            task: self.task,
            line: line.to_string(),
        });
    }
}

pub struct TaskQueue {
    tx: mpsc::UnboundedSender<LauncherEvent>,
    rx: mpsc::UnboundedReceiver<LauncherEvent>,
    next_id: TaskId,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, next_id: 1 }
    }

    /// Run `action` in the background. Its result is reported as a
    /// terminal `Finished`/`Failed` event; no error escapes the task, and a
    /// panic inside the action is reported as `Failed` too.
    pub fn spawn<F, Fut>(&mut self, name: &str, action: F) -> TaskId
    where
        F: FnOnce(ChannelObserver) -> Fut,
        Fut: Future<Output = LauncherResult<String>> + Send + 'static,
    {
        let task = self.next_id;
        self.next_id += 1;

        let observer = ChannelObserver {
            task,
            tx: self.tx.clone(),
        };
        let tx = self.tx.clone();
        let fut = action(observer);
        let name = name.to_string();

        debug!("Starting task #{} ({})", task, name);
        tokio::spawn(async move {
            let result = match tokio::spawn(fut).await {
                Ok(result) => result,
                Err(join) => Err(LauncherError::from(join)),
            };
            let event = match result {
                Ok(message) => LauncherEvent::Finished { task, message },
                Err(e) => {
                    error!("Task #{} ({}) failed: {}", task, name, e);
                    LauncherEvent::Failed {
                        task,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });
        task
    }

    pub async fn next_event(&mut self) -> Option<LauncherEvent> {
        self.rx.recv().await
    }
}

/// Keeps at most one pending delayed action. Scheduling again replaces the
/// pending one; an action whose delay has elapsed runs to completion.
///
/// For interactive front ends that re-run work on every edit, such as
/// validating a username field while it is typed. The CLI issues one
/// command per invocation and does not use it.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<Fut>(&mut self, action: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
