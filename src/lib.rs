//! buzznet: broadcast protocol core for wireless buzzer units
//!
//! Every unit shares one single-hop broadcast radio; exactly one unit, the
//! master, additionally bridges traffic to a host application. This library
//! implements the protocol on top of those transports: the fixed-size wire
//! record, application-level addressing over an always-broadcast medium,
//! fire-and-forget command dispatch, and the virtual-clock synchronization
//! that converges all units onto the master's time base despite packet loss
//! and variable delivery latency.

pub mod button;
pub mod clock;
pub mod commands;
pub mod core;
pub mod dispatch;
pub mod indicator;
pub mod network;
pub mod node;
pub mod protocol;

// Re-export commonly used items
pub use crate::core::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
