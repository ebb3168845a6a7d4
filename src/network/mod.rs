//! Transport handles and routing module
//!
//! This module carries the two unreliable broadcast channels the core
//! depends on (the radio every unit shares, and the bridge only the master
//! owns) plus the router that applies the addressing and forwarding
//! contract to traffic in both directions.

mod bridge;
mod radio;
mod router;

pub use self::bridge::{BridgeEvent, BridgeHandle};
pub use self::radio::{RadioEvent, RadioHandle};
pub use self::router::{Router, RouterHandle};
