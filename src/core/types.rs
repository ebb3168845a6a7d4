use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result, ADDR_LEN};

/// Hardware address of a unit on the radio medium
///
/// Two values are reserved: [`UnitAddr::BROADCAST`] (all `0xFF`) matches
/// every unit, and [`UnitAddr::BRIDGE`] (all zero) matches none; it marks
/// a message as host-bound, to be picked up by the master's bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitAddr(pub [u8; ADDR_LEN]);

impl UnitAddr {
    /// Broadcast-all address, matched by every unit
    pub const BROADCAST: UnitAddr = UnitAddr([0xFF; ADDR_LEN]);

    /// Bridge-only sentinel, matched by no unit's real address
    pub const BRIDGE: UnitAddr = UnitAddr([0x00; ADDR_LEN]);

    /// Generates a random locally administered unit address
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; ADDR_LEN];
        rng.fill(&mut bytes);
        // Locally administered, unicast
        bytes[0] = (bytes[0] | 0x02) & 0xFE;
        UnitAddr(bytes)
    }

    /// Returns true for the broadcast-all address
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Returns true for the bridge-only sentinel
    pub fn is_bridge(&self) -> bool {
        *self == Self::BRIDGE
    }

    /// Returns the raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDR_LEN] {
        &self.0
    }
}

impl fmt::Display for UnitAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for UnitAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; ADDR_LEN];
        let mut parts = s.split(':');
        for byte in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| Error::address(format!("too few octets in '{}'", s)))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|e| Error::address(format!("bad octet '{}': {}", part, e)))?;
        }
        if parts.next().is_some() {
            return Err(Error::address(format!("too many octets in '{}'", s)));
        }
        Ok(UnitAddr(bytes))
    }
}

impl From<[u8; ADDR_LEN]> for UnitAddr {
    fn from(bytes: [u8; ADDR_LEN]) -> Self {
        UnitAddr(bytes)
    }
}

/// Parameters for the master's redundant clock-propagation burst
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AutoSyncConfig {
    /// Number of redundant clock samples broadcast per sync
    pub rounds: u32,
    /// Delay between the clock reset broadcast and the first sample
    pub settle_delay: Duration,
    /// Delay between consecutive samples
    pub resend_delay: Duration,
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        AutoSyncConfig {
            rounds: 10,
            settle_delay: Duration::from_millis(10),
            resend_delay: Duration::from_millis(10),
        }
    }
}

/// Parameters for button press event reporting
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Number of redundant transmissions per press event
    pub burst: u32,
    /// Delay between transmissions of one burst
    pub burst_delay: Duration,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        ButtonConfig {
            burst: 3,
            burst_delay: Duration::from_millis(2),
        }
    }
}

/// Configuration for one buzzer unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This unit's hardware address
    pub addr: UnitAddr,
    /// Whether this unit owns the bridge channel and acts as time giver
    pub is_master: bool,
    /// Number of indicator lights installed on this unit
    pub indicator_count: u16,
    /// Clock auto-sync parameters
    pub auto_sync: AutoSyncConfig,
    /// Button press reporting parameters
    pub button: ButtonConfig,
    /// Depth of each dispatch lane before commands are shed
    pub dispatch_depth: usize,
    /// Capacity of the outbound frame queues toward the drivers
    pub channel_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            addr: UnitAddr::random(),
            is_master: false,
            indicator_count: 3,
            auto_sync: AutoSyncConfig::default(),
            button: ButtonConfig::default(),
            dispatch_depth: 32,
            channel_capacity: 32,
        }
    }
}
