use chrono::Utc;
use rand::random_range;
use uom::si::{
    electric_current::milliampere, electric_potential::volt, f64::ElectricCurrent,
    f64::ElectricPotential,
};

use crate::channel::ChipId;
use crate::monitor::backend::sensor_bus::{ChannelReading, SensorBus, SensorBusError};
use crate::register::RegisterConfig;

/// Simulated sensor bus: accepts every transaction and fabricates plausible
/// rail readings.
#[derive(Debug, Default)]
pub struct Sim;

impl ChannelReading {
    pub fn simulate() -> Self {
        ChannelReading {
            time: Utc::now(),
            shunt_current: ElectricCurrent::new::<milliampere>(random_range(0.0..=120.0)),
            bus_voltage: ElectricPotential::new::<volt>(random_range(2.9..=3.4)),
        }
    }
}

#[async_trait::async_trait]
impl SensorBus for Sim {
    async fn init(&mut self, chip: ChipId) -> Result<(), SensorBusError> {
        tracing::info!("sim: initialized {chip}");
        Ok(())
    }

    async fn write_config(
        &mut self,
        chip: ChipId,
        config: RegisterConfig,
    ) -> Result<(), SensorBusError> {
        tracing::info!("sim: {chip} config word {:#06x}", u16::from(config));
        Ok(())
    }

    async fn reset(&mut self, chip: ChipId) -> Result<(), SensorBusError> {
        tracing::info!("sim: reset {chip}");
        Ok(())
    }

    async fn read_channel(
        &mut self,
        _chip: ChipId,
        _channel: u8,
    ) -> Result<ChannelReading, SensorBusError> {
        Ok(ChannelReading::simulate())
    }
}
