use embedded_hal::{delay::DelayNs, i2c::I2c};
use tracing::{debug, trace};

use crate::{
    bus::SmbusDevice,
    error::{SensorError, Step},
    reading::{RawData, Reading},
};

/// Default slave address (ADDR pin low).
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Single-shot, high repeatability, clock stretching disabled.
const CMD_MEASURE: [u8; 2] = [0x24, 0x00];

/// Worst-case duration of a high repeatability measurement.
const MEASUREMENT_TIME_MS: u32 = 20;

/// Driver for the SHT30 temperature and humidity sensor.
///
/// Uses the no-clock-stretch single-shot command followed by a fixed delay;
/// the CRC bytes of the measurement are not checked.
pub struct Sht30<I2C, D> {
    dev: SmbusDevice<I2C>,
    delay: D,
}

impl<I2C, D> Sht30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a driver for the sensor at [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Creates a driver for the sensor at `address`.
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Sht30 {
            dev: SmbusDevice::new(i2c, address),
            delay,
        }
    }

    /// Starts a single-shot measurement and reads the result.
    ///
    /// # Errors
    ///
    /// `SensorError::Read` if the command or the read fails.
    pub fn read(&mut self) -> Result<Reading, SensorError<I2C::Error>> {
        debug!("sht30 single shot");
        let [command, argument] = CMD_MEASURE;
        self.dev
            .write_byte_data(command, argument)
            .map_err(SensorError::read(Step::Measure))?;

        self.delay.delay_ms(MEASUREMENT_TIME_MS);

        let mut data = [0; 6];
        self.dev
            .read_block_data(0x00, &mut data)
            .map_err(SensorError::read(Step::ReadMeasurement))?;
        trace!("sht30 raw {:02x?}", data);

        let (temperature, humidity) = decode_measurement(&data);
        Ok(Reading::climate(temperature, humidity, RawData::Block(data)))
    }

    /// Destroys the driver, returning the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }
}

/// Decodes a measurement block into `(temperature °C, humidity %RH)`.
///
/// Layout is `[T msb, T lsb, T crc, RH msb, RH lsb, RH crc]`.
pub fn decode_measurement(data: &[u8; 6]) -> (f32, f32) {
    let t = u16::from_be_bytes([data[0], data[1]]);
    let rh = u16::from_be_bytes([data[3], data[4]]);

    let temperature = -45.0 + 175.0 * f32::from(t) / 65535.0;
    let humidity = 100.0 * f32::from(rh) / 65535.0;
    (temperature, humidity)
}
