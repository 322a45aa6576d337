//! i2c-thermo: single-shot temperature / humidity reader
//!
//! Opens `/dev/i2c-N`, takes one reading from the selected sensor, closes the
//! bus and prints the result.
//!
//! Exit codes: 0 on success, 1 on argument or bus open errors, 2 on sensor
//! protocol errors.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::Parser;
use i2c_thermo::{Capability, DegreeSymbol, SensorError, read_once};
use linux_embedded_hal::{Delay, I2CError, I2cdev};
use tracing::{debug, trace};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod locale;
mod output;

use cli::Cli;

const EXIT_SETUP: u8 = 1;
const EXIT_SENSOR: u8 = 2;

enum Failure {
    Setup(anyhow::Error),
    Sensor(SensorError<I2CError>),
}

impl Failure {
    fn exit_code(&self) -> ExitCode {
        match self {
            Failure::Setup(_) => ExitCode::from(EXIT_SETUP),
            Failure::Sensor(_) => ExitCode::from(EXIT_SENSOR),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_SETUP)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match &failure {
                Failure::Setup(e) => eprintln!("Error: {e:#}"),
                Failure::Sensor(e) => eprintln!("Error: {e}"),
            }
            failure.exit_code()
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let kind = cli.sensor;
    if cli.humidity && !kind.capability().contains(Capability::HUMIDITY) {
        return Err(Failure::Setup(anyhow!("{kind} does not measure humidity")));
    }

    let path = cli.device_path();
    let i2c = I2cdev::new(&path)
        .with_context(|| format!("could not open {path}"))
        .map_err(Failure::Setup)?;
    debug!("opened {}", path);

    let (result, i2c) = read_once(kind, i2c, Delay, cli.sensor_options());
    drop(i2c);
    let reading = result.map_err(Failure::Sensor)?;

    let degree = DegreeSymbol::for_codeset(&locale::codeset());
    trace!("degree text {:?}", degree);

    let mut stdout = io::stdout().lock();
    output::write_reading(&mut stdout, kind, &reading, cli.format(), &degree)
        .and_then(|()| stdout.flush())
        .context("could not write to stdout")
        .map_err(Failure::Setup)
}
