use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::core::Error;
use super::message::Message;
use super::FRAME_LEN;

/// Frame codec for stream-oriented transports
///
/// Both channels carry fixed-size frames, so the codec simply cuts the
/// stream into [`FRAME_LEN`] chunks and hands each one to
/// [`Message::from_frame`].
#[derive(Clone, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Creates a new frame codec
    pub fn new() -> Self {
        FrameCodec
    }
}

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FRAME_LEN {
            // Need more data to read a full frame
            return Ok(None);
        }

        let frame = src.split_to(FRAME_LEN);
        Message::from_frame(&frame).map(Some)
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(FRAME_LEN);
        dst.put_slice(&item.to_frame());
        Ok(())
    }
}
