use core::{fmt, str::FromStr};

use embedded_hal::{delay::DelayNs, i2c::I2c};
use tracing::debug;

use crate::{
    aht10::{self, Aht10, Aht10Config},
    error::SensorError,
    mcp9801::{self, Mcp9801},
    reading::{Capability, Reading},
    sht30::{self, Sht30},
};

/// The supported sensor parts.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SensorKind {
    /// Microchip MCP9801, temperature only.
    #[default]
    Mcp9801,
    /// Aosong AHT10, temperature and humidity.
    Aht10,
    /// Sensirion SHT30, temperature and humidity.
    Sht30,
}

impl SensorKind {
    /// All supported kinds.
    pub const ALL: [SensorKind; 3] = [SensorKind::Mcp9801, SensorKind::Aht10, SensorKind::Sht30];

    /// The address the part answers on out of the box.
    pub const fn default_address(self) -> u8 {
        match self {
            SensorKind::Mcp9801 => mcp9801::DEFAULT_ADDRESS,
            SensorKind::Aht10 => aht10::DEFAULT_ADDRESS,
            SensorKind::Sht30 => sht30::DEFAULT_ADDRESS,
        }
    }

    /// Quantities a reading from this part carries.
    pub fn capability(self) -> Capability {
        match self {
            SensorKind::Mcp9801 => Capability::TEMPERATURE,
            SensorKind::Aht10 | SensorKind::Sht30 => Capability::TEMPERATURE | Capability::HUMIDITY,
        }
    }

    /// Lower-case part name.
    pub const fn name(self) -> &'static str {
        match self {
            SensorKind::Mcp9801 => "mcp9801",
            SensorKind::Aht10 => "aht10",
            SensorKind::Sht30 => "sht30",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown sensor name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownSensor;

impl fmt::Display for UnknownSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown sensor, expected one of mcp9801, aht10, sht30")
    }
}

impl core::error::Error for UnknownSensor {}

impl FromStr for SensorKind {
    type Err = UnknownSensor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownSensor)
    }
}

/// Settings applied when binding a sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SensorOptions {
    /// Overrides [`SensorKind::default_address`].
    pub address: Option<u8>,
    /// Start-up sequence for the AHT10; ignored by the other parts.
    pub aht10: Aht10Config,
}

/// One of the supported drivers, chosen at start-up.
pub enum Sensor<I2C, D> {
    /// Temperature register driver.
    Mcp9801(Mcp9801<I2C, D>),
    /// Calibrate / trigger / poll driver.
    Aht10(Aht10<I2C, D>),
    /// Fixed-delay single-shot driver.
    Sht30(Sht30<I2C, D>),
}

impl<I2C, D> Sensor<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Binds the bus to the sensor of the given kind.
    pub fn new(kind: SensorKind, i2c: I2C, delay: D, options: SensorOptions) -> Self {
        let address = options.address.unwrap_or(kind.default_address());
        debug!("binding {} at {:#04x}", kind.name(), address);

        match kind {
            SensorKind::Mcp9801 => Sensor::Mcp9801(Mcp9801::with_address(i2c, delay, address)),
            SensorKind::Aht10 => {
                Sensor::Aht10(Aht10::with_config(i2c, delay, address, options.aht10))
            }
            SensorKind::Sht30 => Sensor::Sht30(Sht30::with_address(i2c, delay, address)),
        }
    }

    /// The kind of the bound driver.
    pub fn kind(&self) -> SensorKind {
        match self {
            Sensor::Mcp9801(_) => SensorKind::Mcp9801,
            Sensor::Aht10(_) => SensorKind::Aht10,
            Sensor::Sht30(_) => SensorKind::Sht30,
        }
    }

    /// Takes one reading from the bound driver.
    pub fn read(&mut self) -> Result<Reading, SensorError<I2C::Error>> {
        match self {
            Sensor::Mcp9801(sensor) => sensor.read(),
            Sensor::Aht10(sensor) => sensor.read(),
            Sensor::Sht30(sensor) => sensor.read(),
        }
    }

    /// Destroys the driver, returning the bus and delay.
    pub fn release(self) -> (I2C, D) {
        match self {
            Sensor::Mcp9801(sensor) => sensor.release(),
            Sensor::Aht10(sensor) => sensor.release(),
            Sensor::Sht30(sensor) => sensor.release(),
        }
    }
}

/// Binds, reads once and releases.
///
/// The bus is handed back whether or not the read succeeded.
pub fn read_once<I2C, D>(
    kind: SensorKind,
    i2c: I2C,
    delay: D,
    options: SensorOptions,
) -> (Result<Reading, SensorError<I2C::Error>>, I2C)
where
    I2C: I2c,
    D: DelayNs,
{
    let mut sensor = Sensor::new(kind, i2c, delay, options);
    let result = sensor.read();
    let (i2c, _) = sensor.release();
    (result, i2c)
}
