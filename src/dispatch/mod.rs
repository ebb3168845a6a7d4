//! Command dispatch module
//!
//! Maps the 4-byte mnemonic at the head of every payload to a registered
//! handler, and runs each handler as its own task so the receive path never
//! waits on command execution. Two bounded lanes feed a scheduling worker;
//! the high lane is drained first, which keeps the time-critical clock-set
//! command from queueing behind slower work.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::clock::ClockSync;
use crate::core::{AutoSyncConfig, UnitAddr};
use crate::indicator::IndicatorHandle;
use crate::network::RouterHandle;
use crate::protocol::{Message, Mnemonic};

/// Scheduling priority of a registered command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Ordinary commands
    Default,
    /// Time-critical commands, eligible to run ahead of queued default work
    High,
}

/// Everything a command handler may touch, cloned into each unit of work
#[derive(Clone)]
pub struct CommandContext {
    /// This unit's hardware address
    pub addr: UnitAddr,
    /// Whether this unit is the master
    pub is_master: bool,
    /// Number of indicator lights on this unit
    pub indicator_count: u16,
    /// Clock auto-sync parameters
    pub auto_sync: AutoSyncConfig,
    /// Shared virtual clock state
    pub clock: Arc<ClockSync>,
    /// Outbound routing handle for replies and broadcasts
    pub router: RouterHandle,
    /// Indicator collaborator handle
    pub indicator: IndicatorHandle,
}

type Handler = Arc<dyn Fn(CommandContext, Message) -> BoxFuture<'static, ()> + Send + Sync>;

struct Registration {
    priority: Priority,
    handler: Handler,
}

struct Job {
    handler: Handler,
    msg: Message,
}

/// Mnemonic-to-handler registry, populated before the node starts
#[derive(Default)]
pub struct Dispatcher {
    registry: HashMap<Mnemonic, Registration>,
}

impl Dispatcher {
    /// Creates an empty registry
    pub fn new() -> Self {
        Dispatcher {
            registry: HashMap::new(),
        }
    }

    /// Registers a handler for a mnemonic, replacing any previous one
    pub fn register<F, Fut>(&mut self, mnemonic: Mnemonic, priority: Priority, handler: F)
    where
        F: Fn(CommandContext, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |ctx, msg| -> BoxFuture<'static, ()> {
            Box::pin(handler(ctx, msg))
        });
        self.registry
            .insert(mnemonic, Registration { priority, handler });
    }

    /// Consumes the registry and starts the scheduling worker
    pub fn start(self, ctx: CommandContext, lane_depth: usize) -> DispatchHandle {
        let (high_tx, high_rx) = mpsc::channel(lane_depth);
        let (default_tx, default_rx) = mpsc::channel(lane_depth);

        tokio::spawn(run_worker(ctx, high_rx, default_rx));

        DispatchHandle {
            registry: Arc::new(self.registry),
            high_tx,
            default_tx,
        }
    }
}

/// Fire-and-forget entry point into the dispatcher
#[derive(Clone)]
pub struct DispatchHandle {
    registry: Arc<HashMap<Mnemonic, Registration>>,
    high_tx: mpsc::Sender<Job>,
    default_tx: mpsc::Sender<Job>,
}

impl DispatchHandle {
    /// Schedules the handler matching the message's mnemonic
    ///
    /// Returns before the handler runs; the message is moved into the unit
    /// of work, so the caller's buffer can be reused immediately. A message
    /// with no matching registration is silently ignored. When a lane is
    /// full the command is shed rather than blocking the receive path.
    pub fn handle(&self, msg: Message) {
        let Some(mnemonic) = msg.mnemonic() else {
            debug!("message without mnemonic ignored");
            return;
        };

        let Some(registration) = self.registry.get(&mnemonic) else {
            debug!(
                mnemonic = %String::from_utf8_lossy(&mnemonic),
                "unknown mnemonic ignored"
            );
            return;
        };

        let job = Job {
            handler: Arc::clone(&registration.handler),
            msg,
        };

        let lane = match registration.priority {
            Priority::High => &self.high_tx,
            Priority::Default => &self.default_tx,
        };

        if lane.try_send(job).is_err() {
            warn!(
                mnemonic = %String::from_utf8_lossy(&mnemonic),
                "dispatch lane full, command dropped"
            );
        }
    }
}

async fn run_worker(
    ctx: CommandContext,
    mut high_rx: mpsc::Receiver<Job>,
    mut default_rx: mpsc::Receiver<Job>,
) {
    loop {
        tokio::select! {
            biased;

            Some(job) = high_rx.recv() => spawn_job(ctx.clone(), job),
            Some(job) = default_rx.recv() => spawn_job(ctx.clone(), job),
            else => break,
        }
    }
}

fn spawn_job(ctx: CommandContext, job: Job) {
    // Each command runs isolated in its own task; a panicking handler
    // cannot take the registry or the worker down with it.
    tokio::spawn(async move {
        (job.handler)(ctx, job.msg).await;
    });
}
