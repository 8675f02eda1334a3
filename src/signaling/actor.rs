use std::collections::HashMap;

use async_channel::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::types::{ConnectionId, OutboundMessage, SignalingError};

/// Outbound queue producer held by the hub for each registered connection
pub type OutboundSender = async_channel::Sender<OutboundMessage>;

/// Result of fanning one message out to the registry
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub evicted: Vec<ConnectionId>,
}

/// Set of live connections and their outbound queues.
///
/// Owned by the hub actor; every method runs to completion before the next
/// command is processed, so eviction during a broadcast is atomic with respect
/// to register/unregister.
#[derive(Debug, Default)]
pub struct Registry {
    members: HashMap<ConnectionId, OutboundSender>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn members(&self) -> Vec<ConnectionId> {
        self.members.keys().copied().collect()
    }

    /// Returns false (and keeps the existing entry) if `id` is already registered.
    pub fn register(&mut self, id: ConnectionId, tx: OutboundSender) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        self.members.insert(id, tx);
        true
    }

    /// Removes `id` and closes its queue. Returns false if it was not registered.
    pub fn unregister(&mut self, id: &ConnectionId) -> bool {
        match self.members.remove(id) {
            Some(tx) => {
                tx.close();
                true
            }
            None => false,
        }
    }

    /// Non-blocking fan-out to every member except `sender`.
    ///
    /// A receiver whose queue is full or whose consumer has gone away is
    /// evicted on the spot: its queue is closed and it leaves the registry.
    /// Messages from a sender that is not (or no longer) a member are dropped.
    pub fn broadcast(
        &mut self,
        message: &OutboundMessage,
        sender: ConnectionId,
    ) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        if !self.contains(&sender) {
            return outcome;
        }

        self.members.retain(|id, tx| {
            if *id == sender {
                return true;
            }
            match tx.try_send(message.clone()) {
                Ok(()) => {
                    outcome.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tx.close();
                    outcome.evicted.push(*id);
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    outcome.evicted.push(*id);
                    false
                }
            }
        });

        outcome
    }
}

/// Commands sent to the hub actor
pub(crate) enum HubCommand {
    Register {
        id: ConnectionId,
        tx: OutboundSender,
    },
    Unregister {
        id: ConnectionId,
    },
    Broadcast {
        message: OutboundMessage,
        sender: ConnectionId,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Members {
        reply: oneshot::Sender<Vec<ConnectionId>>,
    },
}

pub(crate) async fn hub_actor(mut rx: mpsc::Receiver<HubCommand>) {
    let mut registry = Registry::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            HubCommand::Register { id, tx } => {
                if registry.register(id, tx) {
                    info!("Client {} connected. Total clients: {}", id, registry.len());
                } else {
                    warn!("Client {} is already registered, ignoring", id);
                }
            }

            HubCommand::Unregister { id } => {
                if registry.unregister(&id) {
                    info!("Client {} disconnected. Total clients: {}", id, registry.len());
                }
            }

            HubCommand::Broadcast { message, sender } => {
                if !registry.contains(&sender) {
                    debug!("Dropping broadcast from unregistered client {}", sender);
                    continue;
                }
                let outcome = registry.broadcast(&message, sender);
                debug!(
                    "Broadcast from {} delivered to {} clients",
                    sender, outcome.delivered
                );
                for id in &outcome.evicted {
                    warn!(
                        "Client {} evicted (outbound queue full or closed). Total clients: {}",
                        id,
                        registry.len()
                    );
                }
            }

            HubCommand::Count { reply } => {
                let _ = reply.send(registry.len());
            }

            HubCommand::Members { reply } => {
                let _ = reply.send(registry.members());
            }
        }
    }

    debug!("Hub command channel closed, stopping");
}

/// Handle to communicate with the hub actor
#[derive(Clone)]
pub struct HubHandle {
    pub(crate) tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Spawn a hub actor on the current runtime and return a handle to it
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<HubCommand>(capacity);
        tokio::spawn(hub_actor(rx));
        Self { tx }
    }

    /// Add a connection to the broadcast domain
    pub async fn register(
        &self,
        id: ConnectionId,
        tx: OutboundSender,
    ) -> Result<(), SignalingError> {
        self.tx
            .send(HubCommand::Register { id, tx })
            .await
            .map_err(|_| SignalingError::HubClosed)
    }

    /// Remove a connection and close its outbound queue; no-op if already gone
    pub async fn unregister(&self, id: ConnectionId) {
        let _ = self.tx.send(HubCommand::Unregister { id }).await;
    }

    /// Fan `message` out to every registered connection except `sender`
    pub async fn broadcast(
        &self,
        message: OutboundMessage,
        sender: ConnectionId,
    ) -> Result<(), SignalingError> {
        self.tx
            .send(HubCommand::Broadcast { message, sender })
            .await
            .map_err(|_| SignalingError::HubClosed)
    }

    pub async fn connection_count(&self) -> Result<usize, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HubCommand::Count { reply: reply_tx })
            .await
            .map_err(|_| SignalingError::HubClosed)?;
        reply_rx.await.map_err(|_| SignalingError::HubClosed)
    }

    pub async fn members(&self) -> Result<Vec<ConnectionId>, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(HubCommand::Members { reply: reply_tx })
            .await
            .map_err(|_| SignalingError::HubClosed)?;
        reply_rx.await.map_err(|_| SignalingError::HubClosed)
    }
}
