//! Caller-facing measurement configuration and its validation.
//!
//! Requests arrive with raw integer selectors (e.g. parsed from JSON) so that
//! out-of-range values are representable and rejected here with a
//! field-specific error, before any hardware is touched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::{ChannelMask, InvalidChannelMask};

/// What each enabled channel measures.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpMode {
    /// Only measure current (shunt conversions)
    Current = 0,
    /// Only measure voltage (bus conversions)
    Voltage = 1,
    /// Measure current and voltage
    Both = 2,
}

/// Hardware-supported conversion times for one shunt or bus conversion.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvTime {
    Us140 = 0,
    Us204 = 1,
    Us332 = 2,
    Us588 = 3,
    Us1100 = 4,
    Us2116 = 5,
    Us4156 = 6,
    Us8244 = 7,
}

impl From<u8> for ConvTime {
    fn from(selector: u8) -> Self {
        match selector & 0x07 {
            0 => ConvTime::Us140,
            1 => ConvTime::Us204,
            2 => ConvTime::Us332,
            3 => ConvTime::Us588,
            4 => ConvTime::Us1100,
            5 => ConvTime::Us2116,
            6 => ConvTime::Us4156,
            _ => ConvTime::Us8244,
        }
    }
}

/// Hardware-supported averaging counts.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleCount {
    S1 = 0,
    S4 = 1,
    S16 = 2,
    S64 = 3,
    S128 = 4,
    S256 = 5,
    S512 = 6,
    S1024 = 7,
}

impl From<u8> for SampleCount {
    fn from(selector: u8) -> Self {
        match selector & 0x07 {
            0 => SampleCount::S1,
            1 => SampleCount::S4,
            2 => SampleCount::S16,
            3 => SampleCount::S64,
            4 => SampleCount::S128,
            5 => SampleCount::S256,
            6 => SampleCount::S512,
            _ => SampleCount::S1024,
        }
    }
}

/// A measurement request as supplied by the caller, still unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRequest {
    /// Bitmap of logical channels to measure (bits 0..=5)
    pub channels: u8,
    /// 0 = current only, 1 = voltage only, 2 = both
    pub op_mode: u8,
    /// Shunt voltage conversion time selector (0..=7)
    pub shunt_conv_time: u8,
    /// Bus voltage conversion time selector (0..=7)
    pub bus_conv_time: u8,
    /// Averaging sample count selector (0..=7)
    pub sample_count: u8,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    InvalidChannelMask(#[from] InvalidChannelMask),
    #[error("operation mode {0} is not one of current (0), voltage (1) or both (2)")]
    InvalidOpMode(u8),
    #[error("shunt conversion time selector {0} is not a supported value (0..=7)")]
    InvalidShuntConvTime(u8),
    #[error("bus conversion time selector {0} is not a supported value (0..=7)")]
    InvalidBusConvTime(u8),
    #[error("sample count selector {0} is not a supported value (0..=7)")]
    InvalidSampleCount(u8),
}

/// The validated form of a [`MeasurementRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementParams {
    pub channels: ChannelMask,
    pub op_mode: OpMode,
    pub sadc: ConvTime,
    pub badc: ConvTime,
    pub samples: SampleCount,
}

impl MeasurementRequest {
    /// Check every field against the hardware-supported enumerations.
    ///
    /// An all-zero channel mask validates successfully: it is a documented
    /// no-op request, not an error.
    pub fn validate(&self) -> Result<MeasurementParams, RequestError> {
        let channels = ChannelMask::new(self.channels)?;
        let op_mode = match self.op_mode {
            0 => OpMode::Current,
            1 => OpMode::Voltage,
            2 => OpMode::Both,
            other => return Err(RequestError::InvalidOpMode(other)),
        };
        if self.shunt_conv_time > 7 {
            return Err(RequestError::InvalidShuntConvTime(self.shunt_conv_time));
        }
        if self.bus_conv_time > 7 {
            return Err(RequestError::InvalidBusConvTime(self.bus_conv_time));
        }
        if self.sample_count > 7 {
            return Err(RequestError::InvalidSampleCount(self.sample_count));
        }
        Ok(MeasurementParams {
            channels,
            op_mode,
            sadc: ConvTime::from(self.shunt_conv_time),
            badc: ConvTime::from(self.bus_conv_time),
            samples: SampleCount::from(self.sample_count),
        })
    }
}
