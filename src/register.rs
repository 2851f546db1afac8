//! Bit layout of the sensor chip's 16-bit configuration register.
//!
//! The field positions are a hardware contract fixed by the chip datasheet:
//!
//! ```text
//! 15   14   13   12   11..9   8..6     5..3      2..0
//! RST  CH1  CH2  CH3  AVG     BUS CT   SHUNT CT  MODE
//! ```

use crate::channel::ChipChannels;
use crate::config::{ConvTime, OpMode, SampleCount};

const CH_ENABLE_TOP: u16 = 14;
const AVG_SHIFT: u16 = 9;
const BUS_CT_SHIFT: u16 = 6;
const SHUNT_CT_SHIFT: u16 = 3;
const FIELD_MASK: u16 = 0x07;

/// The chip's measurement mode field (bits 2..0).
///
/// Triggered modes exist on the hardware but are never written by this crate;
/// decoding collapses them (and the reserved patterns) to [`ChipMode::PowerDown`]
/// so an unexpected word reads back as "not measuring".
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipMode {
    PowerDown = 0b000,
    ContinuousShunt = 0b101,
    ContinuousBus = 0b110,
    ContinuousShuntBus = 0b111,
}

impl From<OpMode> for ChipMode {
    fn from(op_mode: OpMode) -> Self {
        match op_mode {
            OpMode::Current => ChipMode::ContinuousShunt,
            OpMode::Voltage => ChipMode::ContinuousBus,
            OpMode::Both => ChipMode::ContinuousShuntBus,
        }
    }
}

impl From<u16> for ChipMode {
    fn from(bits: u16) -> Self {
        match bits & FIELD_MASK {
            0b101 => ChipMode::ContinuousShunt,
            0b110 => ChipMode::ContinuousBus,
            0b111 => ChipMode::ContinuousShuntBus,
            _ => ChipMode::PowerDown,
        }
    }
}

/// One chip's full configuration word.
///
/// Built fresh on every configure call from independently set fields and never
/// mutated afterwards; callers read it back through the named accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterConfig(u16);

impl RegisterConfig {
    pub fn new(
        channels: ChipChannels,
        mode: ChipMode,
        sadc: ConvTime,
        badc: ConvTime,
        samples: SampleCount,
    ) -> Self {
        let mut word = 0u16;
        // Chip channel 1 enables at bit 14, channel 3 at bit 12.
        for bit in 0..3u16 {
            if channels.bits() & (1 << bit) != 0 {
                word |= 1 << (CH_ENABLE_TOP - bit);
            }
        }
        word |= (samples as u16) << AVG_SHIFT;
        word |= (badc as u16) << BUS_CT_SHIFT;
        word |= (sadc as u16) << SHUNT_CT_SHIFT;
        word |= mode as u16;
        RegisterConfig(word)
    }

    pub fn channels(self) -> ChipChannels {
        let mut bits = 0u8;
        for bit in 0..3u16 {
            if self.0 & (1 << (CH_ENABLE_TOP - bit)) != 0 {
                bits |= 1 << bit;
            }
        }
        ChipChannels::from_bits(bits)
    }

    pub fn mode(self) -> ChipMode {
        ChipMode::from(self.0)
    }

    pub fn shunt_conv_time(self) -> ConvTime {
        ConvTime::from(((self.0 >> SHUNT_CT_SHIFT) & FIELD_MASK) as u8)
    }

    pub fn bus_conv_time(self) -> ConvTime {
        ConvTime::from(((self.0 >> BUS_CT_SHIFT) & FIELD_MASK) as u8)
    }

    pub fn sample_count(self) -> SampleCount {
        SampleCount::from(((self.0 >> AVG_SHIFT) & FIELD_MASK) as u8)
    }
}

impl From<RegisterConfig> for u16 {
    fn from(config: RegisterConfig) -> u16 {
        config.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelMask;

    fn subset(mask: u8) -> ChipChannels {
        ChannelMask::new(mask).unwrap().split()[0]
    }

    #[test]
    fn word_layout_matches_the_datasheet() {
        // Channels 1 and 3, 64 samples, bus 588us (3), shunt 1.1ms (4), both.
        let config = RegisterConfig::new(
            subset(0b101),
            ChipMode::ContinuousShuntBus,
            ConvTime::Us1100,
            ConvTime::Us588,
            SampleCount::S64,
        );
        let word: u16 = config.into();
        assert_eq!(
            word,
            (1 << 14) | (1 << 12) | (3 << 9) | (3 << 6) | (4 << 3) | 0b111
        );
    }

    #[test]
    fn accessors_decode_what_new_encoded() {
        let config = RegisterConfig::new(
            subset(0b011),
            ChipMode::ContinuousBus,
            ConvTime::Us140,
            ConvTime::Us8244,
            SampleCount::S1024,
        );
        assert_eq!(config.channels().bits(), 0b011);
        assert_eq!(config.mode(), ChipMode::ContinuousBus);
        assert_eq!(config.shunt_conv_time(), ConvTime::Us140);
        assert_eq!(config.bus_conv_time(), ConvTime::Us8244);
        assert_eq!(config.sample_count(), SampleCount::S1024);
    }

    #[test]
    fn op_modes_map_to_continuous_chip_modes() {
        assert_eq!(ChipMode::from(OpMode::Current), ChipMode::ContinuousShunt);
        assert_eq!(ChipMode::from(OpMode::Voltage), ChipMode::ContinuousBus);
        assert_eq!(ChipMode::from(OpMode::Both), ChipMode::ContinuousShuntBus);
    }

    #[test]
    fn unknown_mode_patterns_decode_as_power_down() {
        // Triggered modes (0b001..=0b011) and the reserved 0b100 are never
        // written by this crate.
        for bits in [0b000u16, 0b001, 0b010, 0b011, 0b100] {
            assert_eq!(ChipMode::from(bits), ChipMode::PowerDown);
        }
    }
}
