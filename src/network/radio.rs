use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::warn;

use crate::core::UnitAddr;
use crate::protocol::Message;

/// An inbound frame delivered by the radio driver
///
/// The medium is a single broadcast domain: every unit in range receives
/// every transmission. The source address is informational only; routing
/// decisions are made on the frame's target field.
#[derive(Debug, Clone)]
pub struct RadioEvent {
    /// Raw frame bytes as received
    pub frame: Bytes,
    /// Hardware address of the transmitting unit
    pub source: UnitAddr,
}

/// Egress handle for the radio channel
///
/// Every transmission physically broadcasts; best-effort, no ack. A send
/// that cannot be handed to the driver is logged and dropped; redundancy
/// for time-critical traffic is the caller's job, not a retry layer's.
#[derive(Clone)]
pub struct RadioHandle {
    frame_tx: mpsc::Sender<Bytes>,
}

impl RadioHandle {
    /// Creates a handle feeding the given driver queue
    pub fn new(frame_tx: mpsc::Sender<Bytes>) -> Self {
        RadioHandle { frame_tx }
    }

    /// Encodes and transmits a message, never blocking
    pub fn send(&self, message: &Message) {
        if let Err(e) = self.frame_tx.try_send(message.to_frame()) {
            warn!(error = %e, "radio send failed, frame dropped");
        }
    }
}
