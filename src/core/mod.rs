//! Core types shared across the buzzer protocol stack
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod types;

pub use self::error::{Error, Result};
pub use self::types::{AutoSyncConfig, ButtonConfig, NodeConfig, UnitAddr};

/// Length of a unit hardware address in bytes
pub const ADDR_LEN: usize = 6;
