//! # Settle-Once Tasks
//!
//! A [`Task`] is the memoized, eventually-settled outcome of resolving one key.
//! It is created *pending* and moves exactly once to *resolved* or *rejected*.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  settle (consumes)  ┌──────────────────────┐  wait()  ┌──────────┐
//! │ Deferred │────────────────────▶│ watch::Sender<State> │─────────▶│ Task(s)  │
//! └──────────┘                     └──────────────────────┘          └──────────┘
//! ```
//!
//! The write side ([`Deferred`]) is consumed by `resolve`/`reject`, so a task
//! cannot be settled twice through the type system. The read side ([`Task`])
//! is a cheap clone that any number of dependents can await.
//!
//! Dropping a [`Deferred`] without settling it rejects the task with
//! [`ErrorKind::Unknown`] so that dependents never wait on work that no longer
//! exists.
//!
//! ## Usage
//!
//! ```rust
//! use dload_core::task::{Deferred, TaskStatus};
//!
//! # tokio_test::block_on(async {
//! let deferred = Deferred::new(Some("jquery".to_string()));
//! let task = deferred.task();
//! assert!(task.is_pending());
//!
//! deferred.resolve(Some(TaskStatus::Preload));
//! assert_eq!(task.await, Ok(Some(TaskStatus::Preload)));
//! # });
//! ```

use crate::error::ErrorKind;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

/// Optional payload of a resolved task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The resource was already present; nothing was fetched
    Preload,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Preload => crate::constants::status::PRELOAD,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What awaiting a task yields
pub type TaskOutcome = std::result::Result<Option<TaskStatus>, ErrorKind>;

/// Lifecycle of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Resolved(Option<TaskStatus>),
    Rejected(ErrorKind),
}

impl TaskState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TaskState::Resolved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, TaskState::Rejected(_))
    }

    /// The settled outcome, or `None` while pending
    pub fn outcome(&self) -> Option<TaskOutcome> {
        match self {
            TaskState::Pending => None,
            TaskState::Resolved(status) => Some(Ok(*status)),
            TaskState::Rejected(kind) => Some(Err(*kind)),
        }
    }
}

impl From<TaskOutcome> for TaskState {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            Ok(status) => TaskState::Resolved(status),
            Err(kind) => TaskState::Rejected(kind),
        }
    }
}

struct TaskInner {
    id: Uuid,
    key: Option<String>,
    state: watch::Sender<TaskState>,
}

/// Read side of a settle-once task
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

impl Task {
    fn with_state(key: Option<String>, state: TaskState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(TaskInner {
                id: Uuid::new_v4(),
                key,
                state: sender,
            }),
        }
    }

    /// An already-resolved task, for declaring externally loaded resources
    pub fn resolved(status: Option<TaskStatus>) -> Self {
        Self::with_state(None, TaskState::Resolved(status))
    }

    /// An already-rejected task
    pub fn rejected(kind: ErrorKind) -> Self {
        Self::with_state(None, TaskState::Rejected(kind))
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Cache key this task was reserved under, if any
    pub fn key(&self) -> Option<&str> {
        self.inner.key.as_deref()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TaskState {
        self.inner.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        !self.inner.state.borrow().is_settled()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.state.borrow().is_settled()
    }

    /// Whether two handles refer to the same underlying task
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Wait until the task settles
    pub async fn wait(&self) -> TaskOutcome {
        let mut receiver = self.inner.state.subscribe();
        let outcome = match receiver.wait_for(TaskState::is_settled).await {
            Ok(state) => state.outcome(),
            // The sender lives as long as `self`, so the channel cannot close here
            Err(_) => None,
        };
        outcome.unwrap_or(Err(ErrorKind::Unknown))
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("key", &self.inner.key)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl IntoFuture for Task {
    type Output = TaskOutcome;
    type IntoFuture = BoxFuture<'static, TaskOutcome>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.wait().await }.boxed()
    }
}

/// Write side of a task. Settling consumes it.
pub struct Deferred {
    task: Task,
}

impl Deferred {
    /// Create a pending task, optionally labelled with its cache key
    pub fn new(key: Option<String>) -> Self {
        Self {
            task: Task::with_state(key, TaskState::Pending),
        }
    }

    /// Read handle for the task this deferred settles
    pub fn task(&self) -> Task {
        self.task.clone()
    }

    pub fn resolve(self, status: Option<TaskStatus>) {
        self.settle(Ok(status));
    }

    pub fn reject(self, kind: ErrorKind) {
        self.settle(Err(kind));
    }

    pub fn settle(self, outcome: TaskOutcome) {
        self.transition(TaskState::from(outcome));
    }

    /// Move out of `Pending`; returns whether this call did the settling
    fn transition(&self, next: TaskState) -> bool {
        self.task.inner.state.send_if_modified(|state| {
            if state.is_settled() {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        if self.transition(TaskState::Rejected(ErrorKind::Unknown)) {
            warn!(
                task_id = %self.task.id(),
                key = ?self.task.key(),
                "⚠️ Deferred dropped before settling; task rejected as unknown"
            );
        }
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").field("task", &self.task).finish()
    }
}

/// Join tasks: succeeds once every task resolves, fails with the first
/// rejection to arrive. An empty set succeeds immediately.
pub async fn join_all<I>(tasks: I) -> std::result::Result<(), ErrorKind>
where
    I: IntoIterator<Item = Task>,
{
    try_join_all(tasks.into_iter().map(|task| async move { task.wait().await }))
        .await
        .map(|_| ())
}
