use tracing::warn;

use crate::dispatch::CommandContext;
use crate::protocol::Message;

/// Replies `PONG` with this unit's address, host-bound
pub(crate) async fn ping(ctx: CommandContext, msg: Message) {
    match Message::reply_to(&msg, format!("PONG {}", ctx.addr)) {
        Ok(reply) => ctx.router.send(&reply),
        Err(e) => warn!(error = %e, "could not build PONG reply"),
    }
}
