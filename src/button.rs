//! Button press event reporting
//!
//! The debounced-input collaborator only tells us *that* the button fired;
//! this module captures the virtual clock at that instant, wraps it into a
//! `BPRS` message and transmits it redundantly so a single lost frame does
//! not lose the press. The pending-press queue holds one entry: presses
//! arriving while a burst is in flight are coalesced, which also swallows
//! residual mechanical bounce.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::clock::ClockSync;
use crate::core::{ButtonConfig, UnitAddr};
use crate::network::RouterHandle;
use crate::protocol::Message;

/// Entry point for the debounced-input producer
///
/// Safe to call from any context; never blocks.
#[derive(Clone)]
pub struct ButtonHandle {
    clock: Arc<ClockSync>,
    press_tx: mpsc::Sender<i64>,
}

impl ButtonHandle {
    pub(crate) fn new(clock: Arc<ClockSync>, press_tx: mpsc::Sender<i64>) -> Self {
        ButtonHandle { clock, press_tx }
    }

    /// Records a press at the current virtual clock reading
    ///
    /// An unsynced unit still reports the press, carrying the sentinel
    /// reading.
    pub fn pressed(&self) {
        let at = self.clock.current_clock();
        if self.press_tx.try_send(at).is_err() {
            // A burst is already pending; this press coalesces into it
            debug!("press coalesced into pending burst");
        }
    }
}

/// Background task turning presses into redundant `BPRS` transmissions
pub(crate) struct ButtonReporter {
    press_rx: mpsc::Receiver<i64>,
    router: RouterHandle,
    addr: UnitAddr,
    config: ButtonConfig,
    next_id: u8,
}

impl ButtonReporter {
    pub(crate) fn new(
        press_rx: mpsc::Receiver<i64>,
        router: RouterHandle,
        addr: UnitAddr,
        config: ButtonConfig,
    ) -> Self {
        ButtonReporter {
            press_rx,
            router,
            addr,
            config,
            next_id: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Some(at) = self.press_rx.recv().await {
            let cmd_id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);

            let payload = format!("BPRS {} {}", self.addr, at);
            let message = match Message::new(UnitAddr::BRIDGE, cmd_id, true, payload) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "could not build BPRS event");
                    continue;
                }
            };

            for _ in 0..self.config.burst {
                self.router.send(&message);
                sleep(self.config.burst_delay).await;
            }

            // Drop anything that piled up during the burst
            while self.press_rx.try_recv().is_ok() {}
        }
    }
}
