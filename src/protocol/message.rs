use std::borrow::Cow;

use bytes::{BufMut, Bytes, BytesMut};

use crate::core::{Error, Result, UnitAddr};
use super::{DATA_LEN, FRAME_LEN, MAX_TEXT_LEN, MNEMONIC_LEN};

/// A 4-byte ASCII command mnemonic, the leading bytes of every payload
pub type Mnemonic = [u8; MNEMONIC_LEN];

/// The wire record exchanged on both the radio and the bridge channel
///
/// A message is an ephemeral value object: built for one send, or decoded
/// from one inbound frame, then discarded after dispatch. The payload is
/// mnemonic-prefixed text, NUL-terminated on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Destination address class (unicast, broadcast-all or bridge sentinel)
    pub target: UnitAddr,
    /// Correlation id: echoed on replies, fresh and monotonic for events
    pub cmd_id: u8,
    /// Whether the master should also deliver this message to the bridge
    pub forward_to_bridge: bool,
    /// Payload text, unpadded; the frame codec adds the NUL and padding
    data: Vec<u8>,
}

impl Message {
    /// Creates a message with the given payload
    ///
    /// Fails if the payload does not leave room for the NUL terminator.
    pub fn new(
        target: UnitAddr,
        cmd_id: u8,
        forward_to_bridge: bool,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let data = payload.into();
        if data.len() > MAX_TEXT_LEN {
            return Err(Error::frame(format!(
                "payload of {} bytes exceeds the {} byte limit",
                data.len(),
                MAX_TEXT_LEN
            )));
        }
        Ok(Message {
            target,
            cmd_id,
            forward_to_bridge,
            data,
        })
    }

    /// Creates a host-bound reply to `request`
    ///
    /// The reply targets the bridge sentinel with forwarding set, and echoes
    /// the request's correlation id so the host can pair it up.
    pub fn reply_to(request: &Message, payload: impl Into<Vec<u8>>) -> Result<Self> {
        Message::new(UnitAddr::BRIDGE, request.cmd_id, true, payload)
    }

    /// Returns the command mnemonic, if the payload carries one
    pub fn mnemonic(&self) -> Option<Mnemonic> {
        let head = self.data.get(..MNEMONIC_LEN)?;
        let mut mnemonic = [0u8; MNEMONIC_LEN];
        mnemonic.copy_from_slice(head);
        Some(mnemonic)
    }

    /// Returns the argument bytes following the mnemonic
    ///
    /// A single separating space, when present, is not part of the arguments.
    pub fn args_bytes(&self) -> &[u8] {
        let rest = self.data.get(MNEMONIC_LEN..).unwrap_or(&[]);
        rest.strip_prefix(b" ").unwrap_or(rest)
    }

    /// Returns the argument text following the mnemonic
    pub fn args(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.args_bytes())
    }

    /// Returns the whole payload as text
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Encodes this message into one fixed-size wire frame
    pub fn to_frame(&self) -> Bytes {
        let mut frame = BytesMut::with_capacity(FRAME_LEN);
        frame.put_slice(self.target.as_bytes());
        frame.put_u8(self.cmd_id);
        frame.put_u8(self.forward_to_bridge as u8);
        frame.put_slice(&self.data);
        // NUL terminator plus padding out to the fixed frame size
        frame.put_bytes(0, DATA_LEN - self.data.len());
        frame.freeze()
    }

    /// Decodes one wire frame
    ///
    /// Frames of any length other than [`FRAME_LEN`] are rejected.
    pub fn from_frame(frame: &[u8]) -> Result<Self> {
        if frame.len() != FRAME_LEN {
            return Err(Error::frame(format!(
                "expected {} byte frame, got {}",
                FRAME_LEN,
                frame.len()
            )));
        }

        let mut target = [0u8; 6];
        target.copy_from_slice(&frame[..6]);

        let payload = &frame[8..];
        let text_len = payload.iter().position(|&b| b == 0).unwrap_or(DATA_LEN);

        Ok(Message {
            target: UnitAddr(target),
            cmd_id: frame[6],
            forward_to_bridge: frame[7] != 0,
            data: payload[..text_len].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let msg = Message::new(
            UnitAddr::BROADCAST,
            42,
            false,
            "SCLK 123456".as_bytes().to_vec(),
        )
        .unwrap();

        let frame = msg.to_frame();
        assert_eq!(frame.len(), FRAME_LEN);

        let decoded = Message::from_frame(&frame).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.mnemonic(), Some(*b"SCLK"));
        assert_eq!(decoded.args(), "123456");
    }

    #[test]
    fn test_frame_layout() {
        let msg = Message::new(UnitAddr::BRIDGE, 7, true, "PING").unwrap();
        let frame = msg.to_frame();

        assert_eq!(&frame[..6], &[0u8; 6]);
        assert_eq!(frame[6], 7);
        assert_eq!(frame[7], 1);
        assert_eq!(&frame[8..12], b"PING");
        // NUL terminated right after the payload
        assert_eq!(frame[12], 0);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Message::from_frame(&[0u8; FRAME_LEN - 1]).is_err());
        assert!(Message::from_frame(&[0u8; FRAME_LEN + 1]).is_err());
        assert!(Message::from_frame(&[]).is_err());
    }

    #[test]
    fn test_rejects_oversized_payload() {
        let payload = vec![b'x'; MAX_TEXT_LEN + 1];
        assert!(Message::new(UnitAddr::BROADCAST, 0, false, payload).is_err());

        let payload = vec![b'x'; MAX_TEXT_LEN];
        assert!(Message::new(UnitAddr::BROADCAST, 0, false, payload).is_ok());
    }

    #[test]
    fn test_forward_flag_decodes_any_nonzero() {
        let msg = Message::new(UnitAddr::BRIDGE, 0, false, "PING").unwrap();
        let mut frame = BytesMut::from(&msg.to_frame()[..]);
        frame[7] = 0x7F;
        let decoded = Message::from_frame(&frame).unwrap();
        assert!(decoded.forward_to_bridge);
    }

    #[test]
    fn test_short_payload_has_no_mnemonic() {
        let msg = Message::new(UnitAddr::BROADCAST, 0, false, "AB").unwrap();
        assert_eq!(msg.mnemonic(), None);
        assert_eq!(msg.args_bytes(), b"");
    }

    #[test]
    fn test_reply_echoes_cmd_id() {
        let request = Message::new(UnitAddr::BROADCAST, 99, false, "PING").unwrap();
        let reply = Message::reply_to(&request, "PONG A4:CF:12:05:9E:01").unwrap();

        assert_eq!(reply.cmd_id, 99);
        assert_eq!(reply.target, UnitAddr::BRIDGE);
        assert!(reply.forward_to_bridge);
    }
}
