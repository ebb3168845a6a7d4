//! Wire protocol module
//!
//! This module defines the fixed-size frame layout shared by the radio and
//! bridge channels, the message model, and the frame codec.

pub mod codec;
pub mod message;

pub use self::codec::FrameCodec;
pub use self::message::{Message, Mnemonic};

// Constants
/// Total wire frame size in bytes, the smaller of the two channels' limits
pub const FRAME_LEN: usize = 247;

/// Size of the payload region within a frame
pub const DATA_LEN: usize = 239;

/// Length of a command mnemonic
pub const MNEMONIC_LEN: usize = 4;

/// Longest payload that still leaves room for the NUL terminator
pub const MAX_TEXT_LEN: usize = DATA_LEN - 1;
