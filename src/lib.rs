pub mod channel;
pub mod config;
pub mod interval;
pub mod monitor;
pub mod register;
pub mod sampler_task;
