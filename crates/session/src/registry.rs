//! Callback registry and event dispatch pool.
//!
//! Subscriptions map an event name to an ordered list of callbacks. The
//! reader loop hands each matching event to a bounded pool of worker
//! tasks instead of spawning per callback, so an event flood cannot grow
//! tasks without bound and a slow subscriber never blocks the read path.
//! A saturated queue applies backpressure rather than dropping events.
//!
//! Ordering: callbacks for one event instance run in subscription order
//! within a single job; ordering across different event names is not
//! guaranteed.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

/// Subscriber callback, invoked with the event's `params`.
pub type EventCallback = Arc<dyn Fn(Value) + Send + Sync>;

struct DispatchJob {
    callbacks: Vec<EventCallback>,
    params: Value,
}

pub struct CallbackRegistry {
    subscribers: DashMap<String, Vec<EventCallback>>,
    queue: mpsc::Sender<DispatchJob>,
}

impl CallbackRegistry {
    /// Creates the registry and spawns its worker pool. Must be called
    /// from within a tokio runtime.
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let (queue, receiver) = mpsc::channel(queue_depth.max(1));
        spawn_workers(workers.max(1), receiver);
        Self {
            subscribers: DashMap::new(),
            queue,
        }
    }

    /// Appends `callback` to the subscriber list for `event`, creating
    /// the list on first use. There is no unsubscribe.
    pub fn on(&self, event: impl Into<String>, callback: EventCallback) {
        self.subscribers.entry(event.into()).or_default().push(callback);
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscribers
            .get(event)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Fans one event instance out to its subscribers. Fire-and-forget
    /// from the caller's perspective: this returns once the job is
    /// queued, not once callbacks have run.
    pub async fn dispatch(&self, event: &str, params: Value) {
        let callbacks = match self.subscribers.get(event) {
            Some(entry) => entry.value().clone(),
            None => return,
        };
        if callbacks.is_empty() {
            return;
        }
        let job = DispatchJob { callbacks, params };
        if self.queue.send(job).await.is_err() {
            tracing::warn!(event, "dispatch pool is gone, dropping event");
        }
    }
}

fn spawn_workers(workers: usize, receiver: mpsc::Receiver<DispatchJob>) {
    let receiver = Arc::new(Mutex::new(receiver));
    for worker in 0..workers {
        let receiver = Arc::clone(&receiver);
        tokio::spawn(async move {
            loop {
                // Hold the lock only while waiting for a job, never while
                // running callbacks.
                let job = { receiver.lock().await.recv().await };
                let Some(job) = job else { break };
                for callback in &job.callbacks {
                    callback(job.params.clone());
                }
            }
            tracing::trace!(worker, "dispatch worker stopped");
        });
    }
}
