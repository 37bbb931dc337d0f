//! The dispatcher thread: sole owner of worker state.
//!
//! Callers and workers never touch the queue or the busy flags. They send a
//! [`PoolMessage`] and the dispatcher applies it, one message at a time.

use super::handler::TaskHandler;
use super::task::{Operation, TaskId, TaskRequest, TaskResponse};
use super::worker::WorkerThread;
use super::{PoolError, PoolStats};
use log::{debug, error, info, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

pub(crate) type Reply = Sender<Result<TaskResponse, PoolError>>;

pub(crate) enum PoolMessage {
    Submit { request: TaskRequest, reply: Reply },
    /// Submit under the next free id, reported back on `assigned`.
    SubmitNext {
        operation: Operation,
        reply: Reply,
        assigned: Sender<TaskId>,
    },
    Completed { slot: usize, response: TaskResponse },
    Faulted {
        slot: usize,
        task_id: TaskId,
        reason: String,
    },
    Stats(Sender<PoolStats>),
    Shutdown,
}

struct Slot {
    worker: WorkerThread,
    busy: Option<TaskId>,
}

pub(crate) struct Dispatcher {
    name: String,
    handler: Arc<dyn TaskHandler>,
    events: Sender<PoolMessage>,
    slots: Vec<Slot>,
    queue: VecDeque<TaskRequest>,
    pending: HashMap<TaskId, Reply>,
    next_id: TaskId,
}

impl Dispatcher {
    /// Start `size` workers. `events` is the sending half of the channel the
    /// dispatcher will read from.
    pub fn start(
        name: &str,
        size: usize,
        handler: Arc<dyn TaskHandler>,
        events: Sender<PoolMessage>,
    ) -> std::io::Result<Self> {
        let slots = (0..size)
            .map(|slot| {
                WorkerThread::spawn(name, slot, Arc::clone(&handler), events.clone())
                    .map(|worker| Slot { worker, busy: None })
            })
            .collect::<std::io::Result<Vec<_>>>()?;
        info!("{name} pool started with {size} workers");

        Ok(Self {
            name: name.to_string(),
            handler,
            events,
            slots,
            queue: VecDeque::new(),
            pending: HashMap::new(),
            next_id: 1,
        })
    }

    pub fn run(mut self, inbox: Receiver<PoolMessage>) {
        while let Ok(message) = inbox.recv() {
            match message {
                PoolMessage::Submit { request, reply } => self.submit(request, reply),
                PoolMessage::SubmitNext {
                    operation,
                    reply,
                    assigned,
                } => {
                    let task_id = self.allocate_id();
                    let _ = assigned.send(task_id);
                    self.submit(TaskRequest { operation, task_id }, reply);
                }
                PoolMessage::Completed { slot, response } => self.complete(slot, response),
                PoolMessage::Faulted {
                    slot,
                    task_id,
                    reason,
                } => self.fault(slot, task_id, &reason),
                PoolMessage::Stats(reply) => {
                    let _ = reply.send(self.stats());
                }
                PoolMessage::Shutdown => break,
            }
            self.pump();
        }
        self.shutdown();
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            total_workers: self.slots.len(),
            active_workers: self.slots.iter().filter(|s| s.busy.is_some()).count(),
            queued_tasks: self.queue.len(),
            pool_size: self.slots.len(),
        }
    }

    /// Next id not held by an outstanding task.
    fn allocate_id(&mut self) -> TaskId {
        while self.pending.contains_key(&self.next_id) {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let task_id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        task_id
    }

    fn submit(&mut self, request: TaskRequest, reply: Reply) {
        let task_id = request.task_id;
        if self.pending.contains_key(&task_id) {
            let _ = reply.send(Err(PoolError::DuplicateTaskId(task_id)));
            return;
        }
        self.pending.insert(task_id, reply);
        debug!(
            "{}: queued task {task_id} ({}), {} ahead",
            self.name,
            request.operation.name(),
            self.queue.len()
        );
        self.queue.push_back(request);
    }

    fn complete(&mut self, slot: usize, response: TaskResponse) {
        if let Some(s) = self.slots.get_mut(slot) {
            s.busy = None;
        }
        match self.pending.remove(&response.task_id) {
            Some(reply) => {
                debug!("{}: task {} done", self.name, response.task_id);
                let _ = reply.send(Ok(response));
            }
            None => warn!(
                "{}: dropping response for unknown task {}",
                self.name, response.task_id
            ),
        }
    }

    /// Reject the worker's task and put a fresh worker in its slot.
    fn fault(&mut self, slot: usize, task_id: TaskId, reason: &str) {
        error!(
            "{}: worker {slot} faulted on task {task_id}: {reason}",
            self.name
        );

        if slot < self.slots.len() {
            match WorkerThread::spawn(
                &self.name,
                slot,
                Arc::clone(&self.handler),
                self.events.clone(),
            ) {
                Ok(fresh) => {
                    let dead = std::mem::replace(&mut self.slots[slot].worker, fresh);
                    dead.join();
                }
                // The dead worker stays; the next dispatch to it faults again
                Err(e) => error!("{}: could not restart worker {slot}: {e}", self.name),
            }
            self.slots[slot].busy = None;
        }

        if let Some(reply) = self.pending.remove(&task_id) {
            let _ = reply.send(Err(PoolError::WorkerFault(reason.to_string())));
        }
    }

    /// Hand queued tasks to idle workers, oldest first.
    fn pump(&mut self) {
        while !self.queue.is_empty() {
            let Some(slot) = self.slots.iter().position(|s| s.busy.is_none()) else {
                return;
            };
            let Some(request) = self.queue.pop_front() else {
                return;
            };

            let task_id = request.task_id;
            debug!("{}: dispatching task {task_id} to worker {slot}", self.name);
            self.slots[slot].busy = Some(task_id);
            if self.slots[slot].worker.send(request).is_err() {
                self.fault(slot, task_id, "worker channel closed");
            }
        }
    }

    fn shutdown(self) {
        let rejected = self.queue.len();
        for reply in self.pending.into_values() {
            let _ = reply.send(Err(PoolError::Shutdown));
        }
        for slot in self.slots {
            // A busy worker finishes its current call on its own and exits
            if slot.busy.is_none() {
                slot.worker.join();
            }
        }
        info!(
            "{} pool shut down ({rejected} queued tasks rejected)",
            self.name
        );
    }
}
