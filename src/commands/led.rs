use bytes::Bytes;
use tracing::warn;

use crate::dispatch::CommandContext;
use crate::indicator::IndicatorRequest;
use crate::protocol::Message;

/// Forwards a set-colors request to the indicator collaborator; no reply
pub(crate) async fn set_indicators(ctx: CommandContext, msg: Message) {
    let colors = Bytes::copy_from_slice(msg.args_bytes());
    ctx.indicator.request(IndicatorRequest::Set(colors));
}

/// Forwards a clear request to the indicator collaborator; no reply
pub(crate) async fn clear_indicators(ctx: CommandContext, _msg: Message) {
    ctx.indicator.request(IndicatorRequest::Clear);
}

/// Replies with this unit's address and indicator count, host-bound
pub(crate) async fn indicator_count(ctx: CommandContext, msg: Message) {
    let payload = format!("GLED {} {}", ctx.addr, ctx.indicator_count);
    match Message::reply_to(&msg, payload) {
        Ok(reply) => ctx.router.send(&reply),
        Err(e) => warn!(error = %e, "could not build GLED reply"),
    }
}
