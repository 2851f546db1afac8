pub mod sensor_bus;

#[cfg(feature = "sim")]
pub mod sim;
