//! Broadcast fan-out of accepted events to live subscribers.
//!
//! The hub is an actor: one control task owns the set of active sessions
//! and is the only place it is mutated. Register, unregister and broadcast
//! requests are funneled through a single command channel, so the set needs
//! no lock. Delivery to each session is a non-blocking enqueue onto that
//! session's bounded queue; a session whose queue is full is evicted on the
//! spot instead of being retried, so one slow consumer never delays the rest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use sismo_types::Event;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Default capacity of each session's private outbound queue.
pub const DEFAULT_SESSION_QUEUE_CAPACITY: usize = 256;

/// Identifier of one subscriber session.
pub type SessionId = Uuid;

/// A serialized message, shared by every session it is delivered to.
pub type Payload = Arc<str>;

/// Typed envelope for messages pushed to subscribers.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Envelope<'a> {
    #[serde(rename = "new_earthquake")]
    NewEarthquake(&'a Event),
}

impl Envelope<'_> {
    /// Serializes the envelope into a shareable payload.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the event cannot be encoded.
    pub fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        serde_json::to_string(self).map(Payload::from)
    }
}

enum Command {
    Register {
        id: SessionId,
        queue: mpsc::Sender<Payload>,
    },
    Unregister(SessionId),
    Broadcast(Payload),
    Shutdown,
}

/// Handle to the hub's control task. Cheap to clone.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicUsize>,
    queue_capacity: usize,
}

/// A newly registered session: its id and the receiving end of its queue.
pub struct Subscription {
    pub id: SessionId,
    pub queue: mpsc::Receiver<Payload>,
}

impl Hub {
    /// Starts the control task and returns a handle to it.
    ///
    /// The task runs until [`shutdown`](Self::shutdown) is called or every
    /// handle is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `queue_capacity` is zero.
    pub fn spawn(queue_capacity: usize) -> (Self, JoinHandle<()>) {
        assert!(queue_capacity > 0, "session queue capacity must be positive");

        let (commands, rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicUsize::new(0));

        let control = ControlLoop {
            sessions: HashMap::new(),
            connected: connected.clone(),
        };
        let task = tokio::spawn(control.run(rx));

        let hub = Self {
            commands,
            connected,
            queue_capacity,
        };
        (hub, task)
    }

    /// Creates a private queue for a new session and registers it.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let id = Uuid::new_v4();
        self.register(id, tx);
        Subscription { id, queue: rx }
    }

    /// Adds a session to the active set.
    pub fn register(&self, id: SessionId, queue: mpsc::Sender<Payload>) {
        self.send(Command::Register { id, queue });
    }

    /// Removes a session and closes its queue. Idempotent.
    pub fn unregister(&self, id: SessionId) {
        self.send(Command::Unregister(id));
    }

    /// Delivers an event to every active session.
    ///
    /// Fire-and-forget: per-session delivery failures are handled by the
    /// hub and never reported to the caller.
    pub fn broadcast(&self, event: &Event) {
        match Envelope::NewEarthquake(event).to_payload() {
            Ok(payload) => self.broadcast_payload(payload),
            Err(e) => {
                tracing::error!(id = %event.id, "failed to serialize event envelope: {}", e);
            }
        }
    }

    /// Delivers an already serialized message to every active session.
    pub fn broadcast_payload(&self, payload: Payload) {
        self.send(Command::Broadcast(payload));
    }

    /// Number of sessions in the active set as of the last processed command.
    pub fn connected_count(&self) -> usize {
        self.connected.load(Ordering::Acquire)
    }

    /// Stops the control task after it has processed every command queued
    /// before this one. All session queues are closed on exit.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("hub control task has stopped; command ignored");
        }
    }
}

struct ControlLoop {
    sessions: HashMap<SessionId, mpsc::Sender<Payload>>,
    connected: Arc<AtomicUsize>,
}

impl ControlLoop {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Register { id, queue } => {
                    self.sessions.insert(id, queue);
                    self.publish_count();
                    tracing::info!(
                        session_id = %id,
                        active = self.sessions.len(),
                        "subscriber connected"
                    );
                }
                Command::Unregister(id) => {
                    if let Some(queue) = self.sessions.remove(&id) {
                        self.publish_count();
                        drop(queue);
                        tracing::info!(
                            session_id = %id,
                            active = self.sessions.len(),
                            "subscriber disconnected"
                        );
                    }
                }
                Command::Broadcast(payload) => self.broadcast(payload),
                Command::Shutdown => break,
            }
        }

        let closed = self.sessions.len();
        let sessions = std::mem::take(&mut self.sessions);
        self.publish_count();
        drop(sessions);
        tracing::info!(closed, "hub stopped");
    }

    fn broadcast(&mut self, payload: Payload) {
        let mut stale = Vec::new();

        for (id, queue) in &self.sessions {
            match queue.try_send(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(session_id = %id, "evicting slow subscriber: queue full");
                    stale.push(*id);
                }
                Err(TrySendError::Closed(_)) => stale.push(*id),
            }
        }

        if stale.is_empty() {
            return;
        }

        // Queues close when their senders drop, after the count is published.
        let evicted: Vec<_> = stale
            .iter()
            .filter_map(|id| self.sessions.remove(id))
            .collect();
        self.publish_count();
        drop(evicted);
    }

    fn publish_count(&self) {
        self.connected.store(self.sessions.len(), Ordering::Release);
    }
}
