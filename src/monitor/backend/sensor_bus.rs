use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uom::si::f64::{ElectricCurrent, ElectricPotential};

use crate::channel::ChipId;
use crate::register::RegisterConfig;

/// One channel's latest averaged measurement, as delivered by the transport.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReading {
    pub time: DateTime<Utc>,
    pub shunt_current: ElectricCurrent,
    pub bus_voltage: ElectricPotential,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorBusError {
    #[error("failed to communicate with the sensor chip: {0}")]
    Communication(String),
    #[error("sensor chip did not acknowledge the transaction")]
    Nack,
}

/// Register-level transport to the two sensor chips.
///
/// Implementations own the bus wiring (I2C addressing, register encoding);
/// this crate only decides what to write and when to read.
#[async_trait::async_trait]
pub trait SensorBus: Send {
    /// Probe and initialize one chip to its power-on default state.
    async fn init(&mut self, chip: ChipId) -> Result<(), SensorBusError>;

    /// Write a full configuration word to one chip.
    async fn write_config(
        &mut self,
        chip: ChipId,
        config: RegisterConfig,
    ) -> Result<(), SensorBusError>;

    /// Hardware-reset one chip back to its power-on defaults.
    async fn reset(&mut self, chip: ChipId) -> Result<(), SensorBusError>;

    /// Read the latest output registers of one chip-local channel (0..=2).
    async fn read_channel(
        &mut self,
        chip: ChipId,
        channel: u8,
    ) -> Result<ChannelReading, SensorBusError>;
}
