use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::warn;

use crate::protocol::Message;

/// An event delivered by the bridge transport on the master unit
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// The host wrote a frame to the bridge characteristic
    Inbound(Bytes),
    /// A host connected to the bridge
    Connected,
    /// The host disconnected from the bridge
    Disconnected,
}

/// Egress handle for the bridge channel, present only on the master
#[derive(Clone)]
pub struct BridgeHandle {
    frame_tx: mpsc::Sender<Bytes>,
}

impl BridgeHandle {
    /// Creates a handle feeding the given transport queue
    pub fn new(frame_tx: mpsc::Sender<Bytes>) -> Self {
        BridgeHandle { frame_tx }
    }

    /// Encodes and sends a message to the connected host, never blocking
    pub fn send(&self, message: &Message) {
        if let Err(e) = self.frame_tx.try_send(message.to_frame()) {
            warn!(error = %e, "bridge send failed, frame dropped");
        }
    }

    /// Inbound-side delivery attempt
    ///
    /// A no-op unless the message asks to be forwarded to the bridge.
    pub fn deliver(&self, message: &Message) {
        if message.forward_to_bridge {
            self.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UnitAddr;

    #[tokio::test]
    async fn test_deliver_honors_forward_flag() {
        let (tx, mut rx) = mpsc::channel(4);
        let bridge = BridgeHandle::new(tx);

        let plain = Message::new(UnitAddr::BROADCAST, 0, false, "RCLK").unwrap();
        bridge.deliver(&plain);
        assert!(rx.try_recv().is_err());

        let forwarded = Message::new(UnitAddr::BRIDGE, 1, true, "PONG").unwrap();
        bridge.deliver(&forwarded);
        let frame = rx.recv().await.unwrap();
        assert_eq!(Message::from_frame(&frame).unwrap(), forwarded);
    }
}
