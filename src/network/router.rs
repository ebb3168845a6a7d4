use tracing::debug;

use crate::core::UnitAddr;
use crate::dispatch::DispatchHandle;
use crate::protocol::Message;
use super::bridge::BridgeHandle;
use super::radio::RadioHandle;

/// Outbound half of the routing contract, cheap to clone into handlers
///
/// One flag plus one address field give three effective delivery patterns
/// (host-only reply, device broadcast, device unicast) without a routing
/// table.
#[derive(Clone)]
pub struct RouterHandle {
    is_master: bool,
    radio: RadioHandle,
    bridge: Option<BridgeHandle>,
}

impl RouterHandle {
    /// Creates the outbound routing handle
    ///
    /// Only the master owns a bridge channel; every other unit passes
    /// `None`.
    pub fn new(is_master: bool, radio: RadioHandle, bridge: Option<BridgeHandle>) -> Self {
        RouterHandle {
            is_master,
            radio,
            bridge,
        }
    }

    /// Whether this unit is the master
    pub fn is_master(&self) -> bool {
        self.is_master
    }

    pub(crate) fn bridge(&self) -> Option<&BridgeHandle> {
        self.bridge.as_ref()
    }

    /// Transmits a message on the channel(s) its fields select
    ///
    /// A host-bound message (forwarding set, non-broadcast target) leaving
    /// the master goes to the bridge only; it never echoes onto the shared
    /// radio domain. Everything else broadcasts on the radio.
    pub fn send(&self, message: &Message) {
        if message.forward_to_bridge && self.is_master {
            if let Some(bridge) = &self.bridge {
                bridge.send(message);
            }
            if !message.target.is_broadcast() {
                return;
            }
        }
        self.radio.send(message);
    }
}

/// Inbound router: applies the addressing contract to every received frame
#[derive(Clone)]
pub struct Router {
    addr: UnitAddr,
    outbound: RouterHandle,
    dispatch: DispatchHandle,
}

impl Router {
    /// Creates the inbound router for one unit
    pub fn new(addr: UnitAddr, outbound: RouterHandle, dispatch: DispatchHandle) -> Self {
        Router {
            addr,
            outbound,
            dispatch,
        }
    }

    /// Decodes and routes one raw inbound frame
    ///
    /// Malformed frames are dropped here; nothing propagates to the caller.
    pub fn handle_frame(&self, frame: &[u8]) {
        match Message::from_frame(frame) {
            Ok(message) => self.handle_inbound(message),
            Err(e) => debug!(error = %e, len = frame.len(), "malformed frame dropped"),
        }
    }

    /// Routes one decoded inbound message
    ///
    /// The master first gives the bridge a chance to pick the message up
    /// (a no-op unless the forward flag is set). Local execution happens
    /// only for our own unicast address or broadcast-all; a frame for
    /// another unit or for the bridge sentinel needs no relay, since the
    /// medium already reached every unit physically.
    pub fn handle_inbound(&self, message: Message) {
        if self.outbound.is_master() {
            if let Some(bridge) = self.outbound.bridge() {
                bridge.deliver(&message);
            }
        }

        if message.target == self.addr || message.target.is_broadcast() {
            self.dispatch.handle(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockSync;
    use crate::core::NodeConfig;
    use crate::dispatch::{CommandContext, Dispatcher, Priority};
    use crate::indicator::IndicatorHandle;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct Harness {
        router: Router,
        outbound: RouterHandle,
        radio_rx: mpsc::Receiver<Bytes>,
        bridge_rx: Option<mpsc::Receiver<Bytes>>,
        dispatched_rx: mpsc::Receiver<Message>,
        addr: UnitAddr,
    }

    fn harness(is_master: bool) -> Harness {
        let config = NodeConfig::default();
        let addr = config.addr;

        let (radio_tx, radio_rx) = mpsc::channel(64);
        let radio = RadioHandle::new(radio_tx);

        let (bridge, bridge_rx) = if is_master {
            let (tx, rx) = mpsc::channel(64);
            (Some(BridgeHandle::new(tx)), Some(rx))
        } else {
            (None, None)
        };

        let outbound = RouterHandle::new(is_master, radio, bridge);

        let (dispatched_tx, dispatched_rx) = mpsc::channel(64);
        let mut dispatcher = Dispatcher::new();
        for mnemonic in [*b"PING", *b"GCLK"] {
            let dispatched_tx = dispatched_tx.clone();
            dispatcher.register(mnemonic, Priority::Default, move |_ctx, msg| {
                let dispatched_tx = dispatched_tx.clone();
                async move {
                    let _ = dispatched_tx.send(msg).await;
                }
            });
        }

        let (indicator_tx, _indicator_rx) = mpsc::channel(8);
        let ctx = CommandContext {
            addr,
            is_master,
            indicator_count: config.indicator_count,
            auto_sync: config.auto_sync,
            clock: Arc::new(ClockSync::new(is_master)),
            router: outbound.clone(),
            indicator: IndicatorHandle::new(indicator_tx),
        };
        let dispatch = dispatcher.start(ctx, 8);

        Harness {
            router: Router::new(addr, outbound.clone(), dispatch),
            outbound,
            radio_rx,
            bridge_rx,
            dispatched_rx,
            addr,
        }
    }

    async fn expect_dispatch(h: &mut Harness) -> Message {
        timeout(Duration::from_secs(1), h.dispatched_rx.recv())
            .await
            .expect("expected a dispatch")
            .unwrap()
    }

    #[tokio::test]
    async fn test_inbound_dispatches_own_unicast() {
        let mut h = harness(false);
        let msg = Message::new(h.addr, 1, false, "PING").unwrap();
        h.router.handle_inbound(msg.clone());
        assert_eq!(expect_dispatch(&mut h).await, msg);
    }

    #[tokio::test]
    async fn test_inbound_dispatches_broadcast() {
        let mut h = harness(false);
        let msg = Message::new(UnitAddr::BROADCAST, 1, false, "PING").unwrap();
        h.router.handle_inbound(msg);
        expect_dispatch(&mut h).await;
    }

    #[tokio::test]
    async fn test_inbound_ignores_other_unicast_and_sentinel() {
        let mut h = harness(false);
        let other = UnitAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

        h.router
            .handle_inbound(Message::new(other, 1, false, "PING").unwrap());
        h.router
            .handle_inbound(Message::new(UnitAddr::BRIDGE, 2, false, "PING").unwrap());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(h.dispatched_rx.try_recv().is_err());
        // No relay either: the medium already reached every unit
        assert!(h.radio_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_master_forwards_flagged_inbound_to_bridge() {
        let mut h = harness(true);
        let other = UnitAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

        // Flagged, addressed elsewhere: bridge pickup only, no dispatch
        let msg = Message::new(other, 1, true, "PONG").unwrap();
        h.router.handle_inbound(msg.clone());

        let frame = h.bridge_rx.as_mut().unwrap().recv().await.unwrap();
        assert_eq!(Message::from_frame(&frame).unwrap(), msg);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(h.dispatched_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_master_does_not_forward_unflagged_inbound() {
        let mut h = harness(true);
        let msg = Message::new(UnitAddr::BROADCAST, 1, false, "PING").unwrap();
        h.router.handle_inbound(msg);

        expect_dispatch(&mut h).await;
        assert!(h.bridge_rx.as_mut().unwrap().try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped() {
        let mut h = harness(false);
        h.router.handle_frame(&[0u8; 10]);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(h.dispatched_rx.try_recv().is_err());
        assert!(h.radio_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_outbound_host_reply_skips_radio_on_master() {
        let mut h = harness(true);
        let reply = Message::new(UnitAddr::BRIDGE, 1, true, "PONG").unwrap();
        h.outbound.send(&reply);

        let frame = h.bridge_rx.as_mut().unwrap().recv().await.unwrap();
        assert_eq!(Message::from_frame(&frame).unwrap(), reply);
        assert!(h.radio_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_outbound_flagged_broadcast_goes_both_ways() {
        let mut h = harness(true);
        let msg = Message::new(UnitAddr::BROADCAST, 1, true, "BPRS").unwrap();
        h.outbound.send(&msg);

        assert!(h.bridge_rx.as_mut().unwrap().recv().await.is_some());
        assert!(h.radio_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_outbound_flagged_send_on_non_master_uses_radio() {
        let mut h = harness(false);
        let msg = Message::new(UnitAddr::BRIDGE, 1, true, "PONG").unwrap();
        h.outbound.send(&msg);

        let frame = h.radio_rx.recv().await.unwrap();
        assert_eq!(Message::from_frame(&frame).unwrap(), msg);
    }

    #[tokio::test]
    async fn test_outbound_plain_send_uses_radio_only() {
        let mut h = harness(true);
        let msg = Message::new(UnitAddr::BROADCAST, 1, false, "RCLK").unwrap();
        h.outbound.send(&msg);

        assert!(h.radio_rx.recv().await.is_some());
        assert!(h.bridge_rx.as_mut().unwrap().try_recv().is_err());
    }
}
