//! I2C Temperature / Humidity Sensor Drivers
//!
//! This crate provides platform-agnostic drivers for three small I2C climate
//! sensors, built on top of the [`embedded-hal`] traits, plus a single
//! dispatch type that picks one of them at run time:
//!
//! - MCP9801: temperature register read, 12-bit resolution
//! - AHT10: calibrate / trigger / busy-poll state machine
//! - SHT30: single-shot measurement with a fixed conversion delay
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments (needs `alloc`, which [`tracing`] pulls in)
//! - Protocol tracing via [`tracing`]
//! - Optional logging support via `defmt`
//! - `cli` (default): the `i2c-thermo` command line tool for Linux
//!
//! # Dependencies
//! The drivers depend on the following `embedded-hal` traits:
//! - [`I2c`] for bus access
//! - [`DelayNs`] for conversion and polling delays
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`I2c`]: embedded_hal::i2c::I2c
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod aht10;
pub mod bus;
pub mod degree;
pub mod error;
pub mod mcp9801;
pub mod reading;
pub mod sensor;
pub mod sht30;

pub use aht10::{Aht10, Aht10Config};
pub use bus::SmbusDevice;
pub use degree::DegreeSymbol;
pub use error::{SensorError, Step};
pub use mcp9801::Mcp9801;
pub use reading::{Capability, RawData, Reading};
pub use sensor::{Sensor, SensorKind, SensorOptions, read_once};
pub use sht30::Sht30;
