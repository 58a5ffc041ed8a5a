//! Background tasks and the events they report back to the UI loop
//!
//! Every spawned task gets a [`Ticket`]. A screen remembers the ticket it is
//! waiting on and ignores results carrying any other ticket, so a response
//! that arrives after its screen was left is simply dropped.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::AdminApi;
use crate::cache::QueryCache;

/// Identity of one spawned background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type TaskOutput = Box<dyn Any + Send>;

/// Events delivered to the UI loop from outside the key handler
pub enum AppEvent {
    TaskFinished { ticket: Ticket, output: TaskOutput },
}

impl fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEvent::TaskFinished { ticket, .. } => {
                f.debug_struct("TaskFinished").field("ticket", ticket).finish()
            }
        }
    }
}

/// Recover a task's typed result; `None` if it was spawned with another type
pub fn take_output<T: 'static>(output: TaskOutput) -> Option<T> {
    output.downcast::<T>().ok().map(|boxed| *boxed)
}

/// Spawns futures on the tokio runtime and reports their results as [`AppEvent`]s
#[derive(Clone)]
pub struct TaskRunner {
    tx: mpsc::UnboundedSender<AppEvent>,
    next: Arc<AtomicU64>,
}

impl TaskRunner {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Self {
            tx,
            next: Arc::new(AtomicU64::new(1)),
        };
        (runner, rx)
    }

    pub fn spawn<Fut, T>(&self, task: Fut) -> Ticket
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let ticket = Ticket(self.next.fetch_add(1, Ordering::Relaxed));
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let output: TaskOutput = Box::new(task.await);
            if tx.send(AppEvent::TaskFinished { ticket, output }).is_err() {
                debug!("UI loop gone, dropping result of task {}", ticket);
            }
        });

        ticket
    }
}

/// Shared handles every screen works with
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn AdminApi>,
    pub cache: QueryCache,
    pub tasks: TaskRunner,
}

impl Services {
    pub fn new(api: Arc<dyn AdminApi>) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tasks, events) = TaskRunner::new();
        let services = Self {
            api,
            cache: QueryCache::new(),
            tasks,
        };
        (services, events)
    }
}
