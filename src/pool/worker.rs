//! Worker threads.
//!
//! A worker owns nothing but its inbox. It pulls one request at a time, runs
//! the handler behind `catch_unwind`, and reports back to the dispatcher.
//! After a panic it reports the fault and exits; the dispatcher replaces it.

use super::dispatcher::PoolMessage;
use super::handler::TaskHandler;
use super::task::{TaskRequest, TaskResponse};
use log::debug;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

pub(crate) struct WorkerThread {
    thread: Option<JoinHandle<()>>,
    inbox: Sender<TaskRequest>,
}

impl WorkerThread {
    pub fn spawn(
        name: &str,
        slot: usize,
        handler: Arc<dyn TaskHandler>,
        events: Sender<PoolMessage>,
    ) -> std::io::Result<Self> {
        let (inbox, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(format!("{name}-worker-{slot}"))
            .spawn(move || thread_body(slot, handler, rx, events))?;

        Ok(Self {
            thread: Some(thread),
            inbox,
        })
    }

    /// Hand a request to the worker. Gives the request back if the worker
    /// is gone.
    pub fn send(&self, request: TaskRequest) -> Result<(), TaskRequest> {
        self.inbox.send(request).map_err(|e| e.0)
    }

    /// Close the inbox and wait for the thread to exit.
    pub fn join(mut self) {
        let thread = self.thread.take();
        drop(self);
        if let Some(thread) = thread {
            let _ = thread.join();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

fn thread_body(
    slot: usize,
    handler: Arc<dyn TaskHandler>,
    inbox: Receiver<TaskRequest>,
    events: Sender<PoolMessage>,
) {
    // Exits when the dispatcher drops our inbox sender
    while let Ok(request) = inbox.recv() {
        let task_id = request.task_id;
        debug!("worker {slot} running task {task_id} ({})", request.operation.name());

        let message = match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&request))) {
            Ok(Ok(output)) => PoolMessage::Completed {
                slot,
                response: TaskResponse::ok(task_id, output),
            },
            Ok(Err(err)) => PoolMessage::Completed {
                slot,
                response: TaskResponse::failed(task_id, &err),
            },
            Err(payload) => {
                let _ = events.send(PoolMessage::Faulted {
                    slot,
                    task_id,
                    reason: panic_message(payload.as_ref()),
                });
                return;
            }
        };

        if events.send(message).is_err() {
            return;
        }
    }
}
