//! Outbox: fire-and-forget delivery of session writes to persistence.
//!
//! Core transitions finish in memory first, then drop a message here.
//! A worker thread drains the queue into a [`PersistenceSink`]. Delivery
//! failures are logged and counted; they never reach the session and
//! never roll anything back.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use jiff::Timestamp;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{DecisionRecord, PlanEntry, WeekKey};

/// A write request for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxMessage {
    /// A decision was recorded.
    Decision {
        session_id: Uuid,
        record: DecisionRecord,
    },

    /// An accepted decision was retracted during review.
    Retraction {
        session_id: Uuid,
        meal_id: String,
        retracted_at: Timestamp,
    },

    /// The plan was finalized for `week`.
    Plan {
        session_id: Uuid,
        user_id: String,
        week: WeekKey,
        entries: Vec<PlanEntry>,
    },
}

impl OutboxMessage {
    fn kind(&self) -> &'static str {
        match self {
            Self::Decision { .. } => "decision",
            Self::Retraction { .. } => "retraction",
            Self::Plan { .. } => "plan",
        }
    }
}

/// Where outbox messages end up. Runs on the worker thread.
pub trait PersistenceSink: Send + 'static {
    type Error: std::fmt::Display;

    fn deliver(&mut self, message: &OutboxMessage) -> Result<(), Self::Error>;
}

/// Handle to the queue. Dropping it drains the queue and joins the worker.
#[derive(Debug)]
pub struct Outbox {
    tx: Option<Sender<OutboxMessage>>,
    worker: Option<JoinHandle<()>>,
    failures: Arc<AtomicUsize>,
}

impl Outbox {
    /// Starts the worker thread draining into `sink`.
    pub fn spawn<S: PersistenceSink>(mut sink: S) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<OutboxMessage>();
        let failures = Arc::new(AtomicUsize::new(0));
        let worker_failures = Arc::clone(&failures);

        let worker = thread::Builder::new()
            .name("mealswipe-outbox".into())
            .spawn(move || {
                for message in rx {
                    match sink.deliver(&message) {
                        Ok(()) => debug!(kind = message.kind(), "delivered"),
                        Err(e) => {
                            worker_failures.fetch_add(1, Ordering::Relaxed);
                            warn!(kind = message.kind(), error = %e, "background write failed");
                        }
                    }
                }
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            failures,
        })
    }

    /// Queues a message. Never blocks and never fails the caller.
    pub fn send(&self, message: OutboxMessage) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(message) {
            warn!(kind = e.0.kind(), "outbox worker is gone; write dropped");
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Deliveries that failed so far.
    pub fn failed_deliveries(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Drains everything queued, stops the worker, and returns the final
    /// failure count.
    pub fn shutdown(mut self) -> usize {
        self.drain();
        self.failed_deliveries()
    }

    fn drain(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("outbox worker panicked");
        }
    }
}

impl Drop for Outbox {
    fn drop(&mut self) {
        self.drain();
    }
}
