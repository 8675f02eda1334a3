use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_SIGNALING_PORT: u16 = 8080;

/// Pending frames a connection may have queued before it is considered too slow and evicted
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Capacity of the hub's command queue
pub const HUB_COMMAND_CAPACITY: usize = 1024;

/// Which `Origin` headers may open a signaling channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Accept every upgrade regardless of origin
    #[default]
    Any,

    /// Accept only upgrades whose `Origin` header matches one of these exactly
    AllowList(Vec<String>),
}

impl OriginPolicy {
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match self {
            OriginPolicy::Any => true,
            OriginPolicy::AllowList(allowed) => {
                origin.is_some_and(|origin| allowed.iter().any(|a| a == origin))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub queue_capacity: usize,
    pub origin_policy: OriginPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_SIGNALING_PORT)),
            queue_capacity: OUTBOUND_QUEUE_CAPACITY,
            origin_policy: OriginPolicy::Any,
        }
    }
}
