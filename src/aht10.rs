use embedded_hal::{delay::DelayNs, i2c::I2c};
use tracing::{debug, trace, warn};

use crate::{
    bus::SmbusDevice,
    error::{SensorError, Step},
    reading::{RawData, Reading},
};

/// Default slave address (ADDR pin low).
pub const DEFAULT_ADDRESS: u8 = 0x38;
/// Alternate slave address (ADDR pin high).
pub const ALTERNATE_ADDRESS: u8 = 0x39;

const CMD_CALIBRATE: u8 = 0xE1;
const CMD_TRIGGER: u8 = 0xAC;
const CMD_SOFT_RESET: u8 = 0xBA;

const CALIBRATE_PAYLOAD: [u8; 2] = [0x08, 0x00];
const TRIGGER_PAYLOAD: [u8; 2] = [0x33, 0x00];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const RESET_TIME_MS: u32 = 20;
const CALIBRATE_POLL_MS: u32 = 10;
const MEASURE_POLL_MS: u32 = 20;

/// Number of extra status polls after the first one before a busy-wait gives
/// up.
pub const BUSY_WAIT_RETRIES: u8 = 20;

/// 2^20, full scale of the 20-bit humidity and temperature fields.
const FULL_SCALE: f32 = 1_048_576.0;

/// Run-time knobs for the AHT10 start-up sequence.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Aht10Config {
    /// Send a soft reset before calibrating.
    pub soft_reset: bool,
    /// Abort when the calibrate command cannot be sent, instead of carrying
    /// on and letting the status check decide.
    pub strict_calibration: bool,
}

/// Driver for the AHT10 temperature and humidity sensor.
///
/// Note: the humidity reported by this part is not very accurate.
pub struct Aht10<I2C, D> {
    dev: SmbusDevice<I2C>,
    delay: D,
    config: Aht10Config,
}

impl<I2C, D> Aht10<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a driver for the sensor at [`DEFAULT_ADDRESS`] with the default
    /// configuration.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, DEFAULT_ADDRESS, Aht10Config::default())
    }

    /// Creates a driver for the sensor at `address`.
    pub fn with_config(i2c: I2C, delay: D, address: u8, config: Aht10Config) -> Self {
        Aht10 {
            dev: SmbusDevice::new(i2c, address),
            delay,
            config,
        }
    }

    /// Calibrates the sensor, triggers a measurement and reads it back.
    ///
    /// # Errors
    ///
    /// * `SensorError::Read` if a command or the measurement read fails.
    /// * `SensorError::Timeout` if the sensor stays busy too long.
    /// * `SensorError::Calibration` if the CALIBRATED bit is not set.
    pub fn read(&mut self) -> Result<Reading, SensorError<I2C::Error>> {
        if self.config.soft_reset {
            self.soft_reset()?;
        }

        self.calibrate()?;
        self.trigger()?;

        let mut data = [0; 6];
        self.dev
            .read_block_data(0x00, &mut data)
            .map_err(SensorError::read(Step::ReadMeasurement))?;
        trace!("aht10 raw {:02x?}", data);

        let (temperature, humidity) = decode_measurement(&data);
        Ok(Reading::climate(temperature, humidity, RawData::Block(data)))
    }

    /// Destroys the driver, returning the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }

    fn soft_reset(&mut self) -> Result<(), SensorError<I2C::Error>> {
        debug!("aht10 soft reset");
        self.dev
            .write_byte(CMD_SOFT_RESET)
            .map_err(SensorError::read(Step::SoftReset))?;
        self.delay.delay_ms(RESET_TIME_MS);
        self.wait_while_busy(CALIBRATE_POLL_MS, Step::SoftReset)?;
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), SensorError<I2C::Error>> {
        debug!("aht10 calibrate");
        if let Err(e) = self.dev.write_block_data(CMD_CALIBRATE, &CALIBRATE_PAYLOAD) {
            if self.config.strict_calibration {
                return Err(SensorError::Read {
                    step: Step::Calibrate,
                    source: e,
                });
            }
            warn!("send calibrate cmd failed: {:?}", e);
        }

        self.wait_while_busy(CALIBRATE_POLL_MS, Step::Calibrate)?;
        if self.status() & STATUS_CALIBRATED == 0 {
            return Err(SensorError::Calibration);
        }
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), SensorError<I2C::Error>> {
        debug!("aht10 trigger measurement");
        self.dev
            .write_block_data(CMD_TRIGGER, &TRIGGER_PAYLOAD)
            .map_err(SensorError::read(Step::Trigger))?;
        self.wait_while_busy(MEASURE_POLL_MS, Step::Trigger)?;
        Ok(())
    }

    /// Reads the status byte. A failed read is reported as all bits set, which
    /// the busy-wait treats as busy.
    fn status(&mut self) -> u8 {
        match self.dev.read_byte() {
            Ok(status) => status,
            Err(e) => {
                trace!("status read failed: {:?}", e);
                0xFF
            }
        }
    }

    /// Polls the status until BUSY clears, sleeping `interval_ms` after every
    /// busy observation.
    ///
    /// # Errors
    ///
    /// Returns `SensorError::Timeout` once the first poll and all
    /// [`BUSY_WAIT_RETRIES`] retries read busy.
    fn wait_while_busy(
        &mut self,
        interval_ms: u32,
        step: Step,
    ) -> Result<(), SensorError<I2C::Error>> {
        for attempt in 0..=BUSY_WAIT_RETRIES {
            if self.status() & STATUS_BUSY == 0 {
                return Ok(());
            }
            trace!("busy wait... {}", attempt);
            self.delay.delay_ms(interval_ms);
        }
        Err(SensorError::Timeout(step))
    }
}

/// Decodes a measurement block into `(temperature °C, humidity %RH)`.
///
/// Byte 0 is the status; humidity and temperature are 20-bit fields sharing
/// byte 3.
pub fn decode_measurement(data: &[u8; 6]) -> (f32, f32) {
    let h = (u32::from(data[1]) << 12) | (u32::from(data[2]) << 4) | (u32::from(data[3]) >> 4);
    let t = (u32::from(data[3] & 0x0F) << 16) | (u32::from(data[4]) << 8) | u32::from(data[5]);

    let humidity = h as f32 * 100.0 / FULL_SCALE;
    let temperature = t as f32 * 200.0 / FULL_SCALE - 50.0;
    (temperature, humidity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTx};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTx};

    const ADDR: u8 = DEFAULT_ADDRESS;

    fn status(value: u8) -> I2cTx {
        I2cTx::read(ADDR, vec![value])
    }

    fn calibrate_cmd() -> I2cTx {
        I2cTx::write(ADDR, vec![CMD_CALIBRATE, 0x08, 0x00])
    }

    fn trigger_cmd() -> I2cTx {
        I2cTx::write(ADDR, vec![CMD_TRIGGER, 0x33, 0x00])
    }

    fn measurement(data: [u8; 6]) -> I2cTx {
        I2cTx::write_read(ADDR, vec![0x00], data.to_vec())
    }

    #[test]
    fn test_decode_half_scale_humidity() {
        let (temperature, humidity) = decode_measurement(&[0x00, 0x80, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(humidity, 50.0);
        assert_eq!(temperature, -50.0);
    }

    #[test]
    fn test_decode_shared_nibble() {
        // h = 0x66666, t = 0x5999A
        let (temperature, humidity) = decode_measurement(&[0x1C, 0x66, 0x66, 0x65, 0x99, 0x9A]);
        assert_eq!(humidity, 0x66666 as f32 * 100.0 / FULL_SCALE);
        assert_eq!(temperature, 0x5999A as f32 * 200.0 / FULL_SCALE - 50.0);
        assert!((humidity - 40.0).abs() < 0.001);
        assert!((temperature - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_read_valid() {
        let data = [0x1C, 0x80, 0x00, 0x04, 0x00, 0x00];
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x88), // busy, calibrated
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x98),
            status(0x98),
            status(0x18),
            measurement(data),
        ]);
        let mut delay = CheckedDelay::new(&[
            DelayTx::delay_ms(10),
            DelayTx::delay_ms(20),
            DelayTx::delay_ms(20),
        ]);

        let mut aht = Aht10::new(i2c.clone(), &mut delay);
        let reading = aht.read().unwrap();

        assert_eq!(reading.humidity(), Some(50.0));
        assert_eq!(reading.temperature(), Some(0.0));
        assert_eq!(reading.raw(), RawData::Block(data));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_calibrate_busy_timeout() {
        // first poll plus every retry reads busy
        let mut expect = vec![calibrate_cmd()];
        expect.extend((0..=BUSY_WAIT_RETRIES).map(|_| status(STATUS_BUSY)));
        let mut i2c = I2cMock::new(&expect);

        let delay_expects: Vec<DelayTx> = (0..=BUSY_WAIT_RETRIES)
            .map(|_| DelayTx::delay_ms(10))
            .collect();
        let mut delay = CheckedDelay::new(&delay_expects);

        let mut aht = Aht10::new(i2c.clone(), &mut delay);
        assert_eq!(aht.read().unwrap_err(), SensorError::Timeout(Step::Calibrate));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_ready_on_last_retry() {
        let mut expect = vec![calibrate_cmd()];
        expect.extend((0..BUSY_WAIT_RETRIES).map(|_| status(STATUS_BUSY)));
        expect.extend([
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0x1C, 0x80, 0x00, 0x04, 0x00, 0x00]),
        ]);
        let mut i2c = I2cMock::new(&expect);

        let delay_expects: Vec<DelayTx> = (0..BUSY_WAIT_RETRIES)
            .map(|_| DelayTx::delay_ms(10))
            .collect();
        let mut delay = CheckedDelay::new(&delay_expects);

        let mut aht = Aht10::new(i2c.clone(), &mut delay);
        assert_eq!(aht.read().unwrap().temperature(), Some(0.0));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_trigger_busy_timeout() {
        let mut expect = vec![calibrate_cmd(), status(0x08), status(0x08), trigger_cmd()];
        expect.extend((0..=BUSY_WAIT_RETRIES).map(|_| status(0x88)));
        let mut i2c = I2cMock::new(&expect);

        let delay_expects: Vec<DelayTx> = (0..=BUSY_WAIT_RETRIES)
            .map(|_| DelayTx::delay_ms(20))
            .collect();
        let mut delay = CheckedDelay::new(&delay_expects);

        let mut aht = Aht10::new(i2c.clone(), &mut delay);
        assert_eq!(aht.read().unwrap_err(), SensorError::Timeout(Step::Trigger));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_failed_status_read_counts_as_busy() {
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x00).with_error(ErrorKind::Other),
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0; 6]),
        ]);
        let mut delay = CheckedDelay::new(&[DelayTx::delay_ms(10)]);

        let mut aht = Aht10::new(i2c.clone(), &mut delay);
        assert!(aht.read().is_ok());

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_calibration_bit_unset() {
        let mut i2c = I2cMock::new(&[calibrate_cmd(), status(0x08), status(0x00)]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert_eq!(aht.read().unwrap_err(), SensorError::Calibration);

        i2c.done();
    }

    #[test]
    fn test_calibration_checked_on_fresh_status() {
        // not busy but uncalibrated when the wait ends, calibrated on the re-read
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x00),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0; 6]),
        ]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert!(aht.read().is_ok());

        i2c.done();
    }

    #[test]
    fn test_failed_calibration_status_read_passes() {
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x08),
            status(0x00).with_error(ErrorKind::Other),
            trigger_cmd(),
            status(0x08),
            measurement([0x1C, 0x80, 0x00, 0x04, 0x00, 0x00]),
        ]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert_eq!(aht.read().unwrap().humidity(), Some(50.0));

        i2c.done();
    }

    #[test]
    fn test_calibrate_send_failure_tolerated() {
        let mut i2c = I2cMock::new(&[
            calibrate_cmd().with_error(ErrorKind::Other),
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0x1C, 0x80, 0x00, 0x04, 0x00, 0x00]),
        ]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert_eq!(aht.read().unwrap().humidity(), Some(50.0));

        i2c.done();
    }

    #[test]
    fn test_calibrate_send_failure_strict() {
        let mut i2c = I2cMock::new(&[calibrate_cmd().with_error(ErrorKind::Other)]);

        let config = Aht10Config {
            strict_calibration: true,
            ..Aht10Config::default()
        };
        let mut aht = Aht10::with_config(i2c.clone(), NoopDelay, ADDR, config);
        assert_eq!(
            aht.read().unwrap_err(),
            SensorError::Read {
                step: Step::Calibrate,
                source: ErrorKind::Other,
            }
        );

        i2c.done();
    }

    #[test]
    fn test_trigger_send_failure() {
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x08),
            status(0x08),
            trigger_cmd().with_error(ErrorKind::Other),
        ]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert_eq!(
            aht.read().unwrap_err(),
            SensorError::Read {
                step: Step::Trigger,
                source: ErrorKind::Other,
            }
        );

        i2c.done();
    }

    #[test]
    fn test_soft_reset_sequence() {
        let mut i2c = I2cMock::new(&[
            I2cTx::write(ADDR, vec![CMD_SOFT_RESET]),
            status(0x80),
            status(0x00),
            calibrate_cmd(),
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0; 6]),
        ]);
        let mut delay = CheckedDelay::new(&[DelayTx::delay_ms(20), DelayTx::delay_ms(10)]);

        let config = Aht10Config {
            soft_reset: true,
            ..Aht10Config::default()
        };
        let mut aht = Aht10::with_config(i2c.clone(), &mut delay, ADDR, config);
        let reading = aht.read().unwrap();
        assert_eq!(reading.temperature(), Some(-50.0));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_soft_reset_send_failure() {
        let mut i2c =
            I2cMock::new(&[I2cTx::write(ADDR, vec![CMD_SOFT_RESET]).with_error(ErrorKind::Other)]);

        let config = Aht10Config {
            soft_reset: true,
            ..Aht10Config::default()
        };
        let mut aht = Aht10::with_config(i2c.clone(), NoopDelay, ADDR, config);
        assert_eq!(
            aht.read().unwrap_err(),
            SensorError::Read {
                step: Step::SoftReset,
                source: ErrorKind::Other,
            }
        );

        i2c.done();
    }

    #[test]
    fn test_soft_reset_busy_timeout() {
        let mut expect = vec![I2cTx::write(ADDR, vec![CMD_SOFT_RESET])];
        expect.extend((0..=BUSY_WAIT_RETRIES).map(|_| status(STATUS_BUSY)));
        let mut i2c = I2cMock::new(&expect);

        let mut delay_expects = vec![DelayTx::delay_ms(20)];
        delay_expects.extend((0..=BUSY_WAIT_RETRIES).map(|_| DelayTx::delay_ms(10)));
        let mut delay = CheckedDelay::new(&delay_expects);

        let config = Aht10Config {
            soft_reset: true,
            ..Aht10Config::default()
        };
        let mut aht = Aht10::with_config(i2c.clone(), &mut delay, ADDR, config);
        assert_eq!(aht.read().unwrap_err(), SensorError::Timeout(Step::SoftReset));

        i2c.done();
        delay.done();
    }

    #[test]
    fn test_measurement_read_failure() {
        let mut i2c = I2cMock::new(&[
            calibrate_cmd(),
            status(0x08),
            status(0x08),
            trigger_cmd(),
            status(0x08),
            measurement([0; 6]).with_error(ErrorKind::Other),
        ]);

        let mut aht = Aht10::new(i2c.clone(), NoopDelay);
        assert_eq!(
            aht.read().unwrap_err(),
            SensorError::Read {
                step: Step::ReadMeasurement,
                source: ErrorKind::Other,
            }
        );

        i2c.done();
    }
}
