use embedded_hal::{delay::DelayNs, i2c::I2c};
use tracing::{debug, warn};

use crate::{
    bus::SmbusDevice,
    error::{SensorError, Step},
    reading::{RawData, Reading},
};

/// Default slave address (A2..A0 tied high).
pub const DEFAULT_ADDRESS: u8 = 0x4F;

const TEMPERATURE_REGISTER: u8 = 0x00;
const CONFIG_REGISTER: u8 = 0x01;

/// Configuration value selecting 12-bit (0.0625 °C) resolution.
const CONFIG_12_BIT: u8 = 0x60;

/// Time the sensor needs to finish a 12-bit conversion after a resolution
/// change.
const CONVERSION_TIME_MS: u32 = 330;

/// Driver for the MCP9801 temperature sensor.
pub struct Mcp9801<I2C, D> {
    dev: SmbusDevice<I2C>,
    delay: D,
}

impl<I2C, D> Mcp9801<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a driver talking to the sensor at [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Creates a driver talking to the sensor at `address`.
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Mcp9801 {
            dev: SmbusDevice::new(i2c, address),
            delay,
        }
    }

    /// Reads the temperature.
    ///
    /// The resolution is forced to 12 bits first; if the sensor had to be
    /// reconfigured the read waits for a fresh conversion.
    ///
    /// # Errors
    ///
    /// * `SensorError::Transport` if the configuration register cannot be read.
    /// * `SensorError::Read` if any later transaction fails.
    pub fn read(&mut self) -> Result<Reading, SensorError<I2C::Error>> {
        let config = self
            .dev
            .read_byte_data(CONFIG_REGISTER)
            .map_err(SensorError::Transport)?;

        if config != CONFIG_12_BIT {
            warn!(
                "wrong config {:#04x}, setting it to {:#04x}",
                config, CONFIG_12_BIT
            );
            self.dev
                .write_byte_data(CONFIG_REGISTER, CONFIG_12_BIT)
                .map_err(SensorError::read(Step::Configure))?;
            self.delay.delay_ms(CONVERSION_TIME_MS);
        }

        let word = self
            .dev
            .read_word_data(TEMPERATURE_REGISTER)
            .map_err(SensorError::read(Step::ReadTemperature))?;
        debug!("mcp9801 raw {:#06x}", word);

        Ok(Reading::temperature_only(
            decode_temperature(word),
            RawData::Word(word),
        ))
    }

    /// Destroys the driver, returning the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }
}

/// Converts the SMBus temperature word to degrees Celsius.
///
/// The low byte holds the whole degrees, the top nibble of the high byte the
/// sixteenths.
pub fn decode_temperature(word: u16) -> f32 {
    f32::from(word & 0xFF) + f32::from(word >> 12) / 16.0
}
