//! Built-in command handlers
//!
//! Each handler is a leaf: it computes a result, builds a reply message
//! when one is due, and hands it to the router. Handlers run as isolated
//! units of work under the dispatcher's contract.

mod clock;
mod led;
mod ping;

use crate::dispatch::{Dispatcher, Priority};
use crate::protocol::Mnemonic;

/// Diagnostic echo
pub const PING: Mnemonic = *b"PING";
/// Set indicator colors
pub const SLED: Mnemonic = *b"SLED";
/// Clear all indicators
pub const CLED: Mnemonic = *b"CLED";
/// Report the indicator count
pub const GLED: Mnemonic = *b"GLED";
/// Report the virtual clock reading
pub const GCLK: Mnemonic = *b"GCLK";
/// Reset the time base
pub const RCLK: Mnemonic = *b"RCLK";
/// Offer a clock sample
pub const SCLK: Mnemonic = *b"SCLK";
/// Run the master's clock propagation burst
pub const ACLK: Mnemonic = *b"ACLK";
/// Button press event (emitted, never registered)
pub const BPRS: Mnemonic = *b"BPRS";

/// Registers every built-in command
///
/// `SCLK` carries a time sample and runs at high priority so scheduling
/// jitter stays minimal; everything else runs at default priority.
pub fn register_builtin(dispatcher: &mut Dispatcher) {
    dispatcher.register(PING, Priority::Default, ping::ping);
    dispatcher.register(GCLK, Priority::Default, clock::get_clock);
    dispatcher.register(RCLK, Priority::Default, clock::reset_clock);
    dispatcher.register(SCLK, Priority::High, clock::set_clock);
    dispatcher.register(ACLK, Priority::Default, clock::auto_sync);
    dispatcher.register(SLED, Priority::Default, led::set_indicators);
    dispatcher.register(CLED, Priority::Default, led::clear_indicators);
    dispatcher.register(GLED, Priority::Default, led::indicator_count);
}
