//! Fixed-size worker pools with FIFO queuing and fault recovery.
//!
//! ```text
//! caller ──Submit──▶ ┌────────────┐ ──request──▶ worker 0
//!                    │ dispatcher │ ──request──▶ worker 1
//! caller ◀──reply─── └────────────┘ ◀─Completed/Faulted──
//! ```
//!
//! Each pool runs N worker threads plus one dispatcher thread that owns the
//! queue, the busy flags and the map from task id to caller. Responses are
//! matched to callers by the `taskId` they carry. A worker that panics is
//! replaced in place and its task is rejected with [`PoolError::WorkerFault`];
//! the pool never grows or shrinks.
//!
//! There is no cancellation and no timeout. [`WorkerPool::shutdown`] rejects
//! everything still queued or running.

mod dispatcher;
pub mod handler;
pub mod pools;
pub mod task;
mod worker;

pub use handler::{TaskHandler, ToolHandler, WorkerKind};
pub use pools::ToolPools;
pub use task::{
    HealOutput, HealParams, InpaintOutput, InpaintParams, Operation, RemoveObjectParams,
    TaskError, TaskId, TaskOutput, TaskRequest, TaskResponse,
};

use dispatcher::{Dispatcher, PoolMessage};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker error: {0}")]
    WorkerFault(String),
    #[error("worker pool is shut down")]
    Shutdown,
    #[error("task {0} is already in flight")]
    DuplicateTaskId(TaskId),
    #[error("{0}")]
    Task(String),
    #[error("failed to start worker threads: {0}")]
    Spawn(String),
}

/// Snapshot of a pool's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub total_workers: usize,
    pub active_workers: usize,
    pub queued_tasks: usize,
    pub pool_size: usize,
}

/// Pending result of a submitted task.
#[must_use = "a task handle does nothing unless waited on"]
pub struct TaskHandle {
    task_id: TaskId,
    reply: Receiver<Result<TaskResponse, PoolError>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Block until the task resolves. A `success: false` envelope is still `Ok`.
    pub fn wait(self) -> Result<TaskResponse, PoolError> {
        self.reply.recv().unwrap_or(Err(PoolError::Shutdown))
    }

    /// Block until the task resolves and unwrap its payload.
    pub fn wait_output(self) -> Result<TaskOutput, PoolError> {
        let response = self.wait()?;
        match (response.success, response.data) {
            (true, Some(output)) => Ok(output),
            (true, None) => Err(PoolError::Task("response carried no data".into())),
            (false, _) => Err(PoolError::Task(
                response.error.unwrap_or_else(|| "task failed".into()),
            )),
        }
    }
}

pub struct WorkerPool {
    name: String,
    size: usize,
    tx: Sender<PoolMessage>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start a pool of `size` workers (at least one) running `handler`.
    pub fn new(size: usize, handler: Arc<dyn TaskHandler>) -> Result<Self, PoolError> {
        Self::named("pool", size, handler)
    }

    /// Like [`WorkerPool::new`], with `name` used for thread names and logs.
    pub fn named(name: &str, size: usize, handler: Arc<dyn TaskHandler>) -> Result<Self, PoolError> {
        let size = size.max(1);
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::start(name, size, handler, tx.clone())
            .map_err(|e| PoolError::Spawn(e.to_string()))?;
        let thread = std::thread::Builder::new()
            .name(format!("{name}-dispatcher"))
            .spawn(move || dispatcher.run(rx))
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            size,
            tx,
            dispatcher: Mutex::new(Some(thread)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Submit with a pool-allocated task id. The dispatcher skips ids that
    /// are still outstanding, including caller-chosen ones. On a pool that is
    /// shut down the handle's id is 0 and `wait` reports Shutdown.
    pub fn submit(&self, operation: Operation) -> TaskHandle {
        let (reply, rx) = mpsc::channel();
        let (assigned, assigned_rx) = mpsc::channel();
        let task_id = self
            .tx
            .send(PoolMessage::SubmitNext {
                operation,
                reply,
                assigned,
            })
            .ok()
            .and_then(|()| assigned_rx.recv().ok())
            .unwrap_or(0);
        TaskHandle { task_id, reply: rx }
    }

    /// Submit with a caller-chosen task id. An id that is still outstanding
    /// is rejected with [`PoolError::DuplicateTaskId`].
    pub fn submit_with_id(&self, task_id: TaskId, operation: Operation) -> TaskHandle {
        let (reply, rx) = mpsc::channel();
        let request = TaskRequest { operation, task_id };
        // If the dispatcher is gone the reply sender is dropped with the
        // message and `wait` reports Shutdown.
        let _ = self.tx.send(PoolMessage::Submit { request, reply });
        TaskHandle { task_id, reply: rx }
    }

    pub fn stats(&self) -> Result<PoolStats, PoolError> {
        let (tx, rx) = mpsc::channel();
        self.tx
            .send(PoolMessage::Stats(tx))
            .map_err(|_| PoolError::Shutdown)?;
        rx.recv().map_err(|_| PoolError::Shutdown)
    }

    /// Stop the dispatcher, rejecting queued and in-flight tasks. Idempotent.
    pub fn shutdown(&self) {
        let thread = self
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(thread) = thread {
            let _ = self.tx.send(PoolMessage::Shutdown);
            let _ = thread.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
