//! Indicator light collaborator interface
//!
//! The core only produces requests; animation sequences and hardware
//! control live outside this crate.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;

/// A request toward the indicator collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorRequest {
    /// Set the lights to the given raw color payload
    Set(Bytes),
    /// Turn all lights off
    Clear,
    /// Feedback animation: a host connected to the bridge
    BridgeConnected,
    /// Feedback animation: the host disconnected from the bridge
    BridgeDisconnected,
}

/// Egress handle toward the indicator collaborator
#[derive(Clone)]
pub struct IndicatorHandle {
    tx: mpsc::Sender<IndicatorRequest>,
}

impl IndicatorHandle {
    /// Creates a handle feeding the given queue
    pub fn new(tx: mpsc::Sender<IndicatorRequest>) -> Self {
        IndicatorHandle { tx }
    }

    /// Hands a request to the collaborator, never blocking
    ///
    /// Indicator updates are cosmetic; a request that does not fit in the
    /// queue is dropped.
    pub fn request(&self, request: IndicatorRequest) {
        if self.tx.try_send(request).is_err() {
            debug!("indicator queue full, request dropped");
        }
    }
}
