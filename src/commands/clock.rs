use tokio::time::sleep;
use tracing::{debug, warn};

use crate::core::UnitAddr;
use crate::dispatch::CommandContext;
use crate::protocol::Message;

/// Replies with this unit's address and virtual clock reading, host-bound
///
/// An unsynced unit reports the sentinel value; the host treats it as
/// "no time base", not as a timestamp.
pub(crate) async fn get_clock(ctx: CommandContext, msg: Message) {
    let payload = format!("GCLK {} {}", ctx.addr, ctx.clock.current_clock());
    match Message::reply_to(&msg, payload) {
        Ok(reply) => ctx.router.send(&reply),
        Err(e) => warn!(error = %e, "could not build GCLK reply"),
    }
}

/// Resets the time base; no reply
pub(crate) async fn reset_clock(ctx: CommandContext, _msg: Message) {
    ctx.clock.reset_clock();
}

/// Offers the received clock sample to this unit's clock
pub(crate) async fn set_clock(ctx: CommandContext, msg: Message) {
    let args = msg.args();
    match args.split_ascii_whitespace().next().map(str::parse::<i64>) {
        Some(Ok(sample)) => {
            ctx.clock.adopt_clock_sample(sample);
        }
        _ => debug!(args = %args, "SCLK with unparseable argument dropped"),
    }
}

/// Runs the master's clock propagation burst
///
/// Only the master may be the time giver; on any other unit this is a
/// no-op. The master resets to a fresh time base, tells everyone to drop
/// theirs, then broadcasts redundant samples so each receiver can keep its
/// lowest-latency one. Packet loss is countered by the repetition, not by
/// acks.
pub(crate) async fn auto_sync(ctx: CommandContext, msg: Message) {
    if !ctx.is_master {
        return;
    }

    ctx.clock.reset_clock();

    broadcast(&ctx, msg.cmd_id, "RCLK".to_string());
    sleep(ctx.auto_sync.settle_delay).await;

    for _ in 0..ctx.auto_sync.rounds {
        broadcast(&ctx, msg.cmd_id, format!("SCLK {}", ctx.clock.current_clock()));
        sleep(ctx.auto_sync.resend_delay).await;
    }

    match Message::reply_to(&msg, "ACLK success") {
        Ok(ack) => ctx.router.send(&ack),
        Err(e) => warn!(error = %e, "could not build ACLK acknowledgment"),
    }
}

fn broadcast(ctx: &CommandContext, cmd_id: u8, payload: String) {
    match Message::new(UnitAddr::BROADCAST, cmd_id, false, payload) {
        Ok(message) => ctx.router.send(&message),
        Err(e) => warn!(error = %e, "could not build clock broadcast"),
    }
}
