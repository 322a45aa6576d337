use clap::Parser;
use i2c_thermo::{Aht10Config, SensorKind, SensorOptions};

use crate::output::Format;

/// Reads temperature (and humidity) from an I2C sensor and prints it.
#[derive(Parser, Debug)]
#[command(name = "i2c-thermo", version)]
#[command(about = "Gets air temperature in deg C and, where the sensor supports it, humidity in %")]
pub struct Cli {
    /// Sensor on the bus: mcp9801, aht10 or sht30
    #[arg(short, long, default_value_t = SensorKind::Mcp9801)]
    pub sensor: SensorKind,

    /// Bare format: print the temperature only
    #[arg(short, long)]
    pub temperature: bool,

    /// Bare format: print the humidity only
    #[arg(short = 'u', long)]
    pub humidity: bool,

    /// Print the raw register value as well
    #[arg(short, long)]
    pub raw: bool,

    /// I2C bus number, opened as /dev/i2c-N
    #[arg(long, default_value_t = 1)]
    pub bus: u8,

    /// Slave address override, hex (0x38) or decimal
    #[arg(short, long, value_parser = parse_address)]
    pub address: Option<u8>,

    /// AHT10: soft reset the sensor before calibrating
    #[arg(long)]
    pub soft_reset: bool,

    /// AHT10: abort if the calibrate command cannot be sent
    #[arg(long)]
    pub strict_calibration: bool,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn sensor_options(&self) -> SensorOptions {
        SensorOptions {
            address: self.address,
            aht10: Aht10Config {
                soft_reset: self.soft_reset,
                strict_calibration: self.strict_calibration,
            },
        }
    }

    pub fn format(&self) -> Format {
        Format {
            temperature: self.temperature,
            humidity: self.humidity,
            raw: self.raw,
        }
    }

    pub fn device_path(&self) -> String {
        format!("/dev/i2c-{}", self.bus)
    }
}

fn parse_address(s: &str) -> Result<u8, String> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| format!("invalid address {s:?}: {e}"))?;

    if value > 0x7F {
        return Err(format!("address {value:#04x} is not a 7-bit address"));
    }
    Ok(value)
}
