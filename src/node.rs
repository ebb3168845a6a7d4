//! Node assembly
//!
//! Wires the clock, dispatcher, router and transport handles into one
//! running unit and spawns its background tasks. The platform drivers sit
//! on the other side of [`NodeIo`]: they feed inbound events in and drain
//! outbound frames for transmission.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::button::{ButtonHandle, ButtonReporter};
use crate::clock::ClockSync;
use crate::commands;
use crate::core::NodeConfig;
use crate::dispatch::{CommandContext, Dispatcher};
use crate::indicator::{IndicatorHandle, IndicatorRequest};
use crate::network::{BridgeEvent, BridgeHandle, RadioEvent, RadioHandle, Router, RouterHandle};

/// The edges a platform integration drives
///
/// Inbound senders and outbound receivers are created once at startup and
/// never reassigned. On a non-master unit the bridge edges are `None`.
pub struct NodeIo {
    /// Frames received by the radio driver go in here
    pub radio_in: mpsc::Sender<RadioEvent>,
    /// Frames the radio driver must transmit come out here
    pub radio_out: mpsc::Receiver<Bytes>,
    /// Bridge transport events go in here (master only)
    pub bridge_in: Option<mpsc::Sender<BridgeEvent>>,
    /// Frames for the connected host come out here (master only)
    pub bridge_out: Option<mpsc::Receiver<Bytes>>,
    /// Requests toward the indicator collaborator
    pub indicator: mpsc::Receiver<IndicatorRequest>,
    /// Entry point for the debounced-input producer
    pub button: ButtonHandle,
    /// Shared virtual clock state, readable for diagnostics
    pub clock: Arc<ClockSync>,
}

/// Starts a unit with the built-in command set
///
/// Spawns the receive loops, the dispatch worker and the button reporter,
/// and returns the platform edges.
pub fn start(config: NodeConfig) -> NodeIo {
    let mut dispatcher = Dispatcher::new();
    commands::register_builtin(&mut dispatcher);
    start_with(config, dispatcher)
}

/// Starts a unit with a custom command registry
pub fn start_with(config: NodeConfig, dispatcher: Dispatcher) -> NodeIo {
    info!(addr = %config.addr, is_master = config.is_master, "starting unit");

    let clock = Arc::new(ClockSync::new(config.is_master));

    let (radio_out_tx, radio_out) = mpsc::channel(config.channel_capacity);
    let radio = RadioHandle::new(radio_out_tx);

    let (bridge, bridge_out) = if config.is_master {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        (Some(BridgeHandle::new(tx)), Some(rx))
    } else {
        (None, None)
    };

    let (indicator_tx, indicator) = mpsc::channel(config.channel_capacity);
    let indicator_handle = IndicatorHandle::new(indicator_tx);

    let outbound = RouterHandle::new(config.is_master, radio, bridge);

    let ctx = CommandContext {
        addr: config.addr,
        is_master: config.is_master,
        indicator_count: config.indicator_count,
        auto_sync: config.auto_sync,
        clock: Arc::clone(&clock),
        router: outbound.clone(),
        indicator: indicator_handle.clone(),
    };
    let dispatch = dispatcher.start(ctx, config.dispatch_depth);

    let router = Router::new(config.addr, outbound.clone(), dispatch);

    let (radio_in, radio_in_rx) = mpsc::channel(config.channel_capacity);
    tokio::spawn(radio_recv_loop(radio_in_rx, router.clone()));

    let bridge_in = if config.is_master {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        tokio::spawn(bridge_recv_loop(rx, router, indicator_handle));
        Some(tx)
    } else {
        None
    };

    let (press_tx, press_rx) = mpsc::channel(1);
    let button = ButtonHandle::new(Arc::clone(&clock), press_tx);
    tokio::spawn(ButtonReporter::new(press_rx, outbound, config.addr, config.button).run());

    NodeIo {
        radio_in,
        radio_out,
        bridge_in,
        bridge_out,
        indicator,
        button,
        clock,
    }
}

async fn radio_recv_loop(mut rx: mpsc::Receiver<RadioEvent>, router: Router) {
    while let Some(event) = rx.recv().await {
        debug!(source = %event.source, len = event.frame.len(), "radio frame received");
        router.handle_frame(&event.frame);
    }
}

async fn bridge_recv_loop(
    mut rx: mpsc::Receiver<BridgeEvent>,
    router: Router,
    indicator: IndicatorHandle,
) {
    while let Some(event) = rx.recv().await {
        match event {
            BridgeEvent::Inbound(frame) => {
                debug!(len = frame.len(), "bridge frame received");
                router.handle_frame(&frame);
            }
            BridgeEvent::Connected => {
                info!("host connected to bridge");
                indicator.request(IndicatorRequest::BridgeConnected);
            }
            BridgeEvent::Disconnected => {
                info!("host disconnected from bridge");
                indicator.request(IndicatorRequest::BridgeDisconnected);
            }
        }
    }
}
