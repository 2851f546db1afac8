use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bits a logical channel mask is allowed to use: six monitored rails.
pub const CHANNEL_MASK: u8 = 0x3F;

/// Channels per physical sensor chip.
pub const CHANNELS_PER_CHIP: u8 = 3;

/// The power rails monitored by the two sensor chips, one mask bit each.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// LDO power supply
    Ldo = 0x01,
    /// RFM95W 868MHz LoRa transceiver
    Rfm95w = 0x02,
    /// CC1101 433MHz transceiver
    Cc1101 = 0x04,
    /// EEPROM storage and sensors
    EepromSensors = 0x08,
    /// nRF 2.4GHz transceiver
    Nrf24l01 = 0x10,
    /// AT86 IEEE 802.15.4 transceiver
    At86 = 0x20,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Ldo,
        Channel::Rfm95w,
        Channel::Cc1101,
        Channel::EepromSensors,
        Channel::Nrf24l01,
        Channel::At86,
    ];

    /// The channel whose mask bit sits at the given logical bit position.
    pub fn from_bit(bit: u8) -> Option<Channel> {
        Channel::ALL.get(bit as usize).copied()
    }
}

/// The two physical sensor chips and their fixed slice of the logical mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipId {
    /// Serves logical bits 0..=2
    Chip0,
    /// Serves logical bits 3..=5
    Chip1,
}

impl ChipId {
    pub const ALL: [ChipId; 2] = [ChipId::Chip0, ChipId::Chip1];

    pub fn index(self) -> usize {
        match self {
            ChipId::Chip0 => 0,
            ChipId::Chip1 => 1,
        }
    }

    /// Right-shift that moves this chip's slice of the logical mask down to
    /// its chip-local bits.
    pub fn shift(self) -> u8 {
        match self {
            ChipId::Chip0 => 0,
            ChipId::Chip1 => CHANNELS_PER_CHIP,
        }
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip {}", self.index())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("channel mask {0:#04x} has bits set outside the six supported channels")]
pub struct InvalidChannelMask(pub u8);

/// A validated 6-bit logical channel mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask(u8);

impl ChannelMask {
    /// An empty mask is valid: it selects nothing and configures nothing.
    pub fn new(bits: u8) -> Result<ChannelMask, InvalidChannelMask> {
        if bits & !CHANNEL_MASK != 0 {
            return Err(InvalidChannelMask(bits));
        }
        Ok(ChannelMask(bits))
    }

    pub fn from_channels(channels: &[Channel]) -> ChannelMask {
        ChannelMask(channels.iter().fold(0, |mask, ch| mask | *ch as u8))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Split into the per-chip subsets, indexed by [`ChipId::index`].
    ///
    /// A chip whose subset comes back empty takes no part in this measurement
    /// cycle and must be left untouched by the caller.
    pub fn split(self) -> [ChipChannels; 2] {
        ChipId::ALL.map(|chip| ChipChannels((self.0 >> chip.shift()) & 0x07))
    }
}

/// The chip-local subset of channels enabled on one sensor chip (3 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipChannels(u8);

impl ChipChannels {
    /// Callers outside the crate obtain subsets through [`ChannelMask::split`].
    pub(crate) fn from_bits(bits: u8) -> ChipChannels {
        ChipChannels(bits & 0x07)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, channel: u8) -> bool {
        channel < CHANNELS_PER_CHIP && self.0 & (1 << channel) != 0
    }

    /// Number of enabled channels, each of the three bits tested on its own.
    pub fn count(self) -> u32 {
        (0..CHANNELS_PER_CHIP)
            .filter(|bit| self.0 & (1 << bit) != 0)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_roundtrips_every_valid_mask() {
        for mask in 0..=CHANNEL_MASK {
            let [s0, s1] = ChannelMask::new(mask).unwrap().split();
            assert_eq!(s0.bits() | (s1.bits() << 3), mask);
            assert_eq!(s0.bits() & !0x07, 0);
            assert_eq!(s1.bits() & !0x07, 0);
        }
    }

    #[test]
    fn upper_bits_are_rejected() {
        assert_eq!(ChannelMask::new(0x40), Err(InvalidChannelMask(0x40)));
        assert_eq!(ChannelMask::new(0xFF), Err(InvalidChannelMask(0xFF)));
        assert!(ChannelMask::new(CHANNEL_MASK).is_ok());
    }

    #[test]
    fn named_channels_cover_the_mask() {
        let all = ChannelMask::from_channels(&Channel::ALL);
        assert_eq!(all.bits(), CHANNEL_MASK);
        assert_eq!(Channel::from_bit(3), Some(Channel::EepromSensors));
        assert_eq!(Channel::from_bit(6), None);
    }

    #[test]
    fn channel_count_tests_each_bit() {
        let [s0, s1] = ChannelMask::new(0x2B).unwrap().split();
        assert_eq!(s0.count(), 2); // bits 0 and 1
        assert_eq!(s1.count(), 2); // bits 3 and 5
        assert!(s0.contains(1));
        assert!(!s0.contains(2));
        assert!(!s0.contains(3));
    }
}
