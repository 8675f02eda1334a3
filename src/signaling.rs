//! WebSocket signaling relay: every envelope a client sends is fanned out to all other clients

mod actor;
mod config;
mod connection;
mod messages;
mod server;
mod types;

pub use actor::{BroadcastOutcome, HubHandle, OutboundSender, Registry};
pub use config::{
    DEFAULT_SIGNALING_PORT, HUB_COMMAND_CAPACITY, OUTBOUND_QUEUE_CAPACITY, OriginPolicy,
    ServerConfig,
};
pub use connection::serve_connection;
pub use messages::{Envelope, MsgType};
pub use server::{INDEX_TEXT, SignalingServer};
pub use types::{ConnectionId, OutboundMessage, SignalingError};
