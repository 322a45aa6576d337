use std::io::{self, Write};

use i2c_thermo::{DegreeSymbol, RawData, Reading, SensorKind};

/// Which parts of a reading to print.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Format {
    /// Bare temperature.
    pub temperature: bool,
    /// Bare humidity.
    pub humidity: bool,
    /// Raw register word or measurement block.
    pub raw: bool,
}

impl Format {
    fn bare(&self) -> bool {
        self.temperature || self.humidity
    }
}

/// Writes `reading` to `out`.
///
/// The degree text is written as raw bytes since it may not be UTF-8.
pub fn write_reading<W: Write>(
    out: &mut W,
    kind: SensorKind,
    reading: &Reading,
    format: Format,
    degree: &DegreeSymbol,
) -> io::Result<()> {
    if format.raw {
        write_raw(out, reading.raw())?;
    }

    if format.bare() {
        if let Some(t) = reading.temperature().filter(|_| format.temperature) {
            writeln!(out, "{t:.2}")?;
        }
        if let Some(h) = reading.humidity().filter(|_| format.humidity) {
            writeln!(out, "{h:.1}")?;
        }
        return Ok(());
    }

    if let Some(t) = reading.temperature() {
        let precision = match kind {
            SensorKind::Mcp9801 => 1,
            SensorKind::Aht10 | SensorKind::Sht30 => 2,
        };
        write!(out, "Temp={t:.precision$}")?;
        out.write_all(degree.as_bytes())?;
        writeln!(out)?;
    }
    if let Some(h) = reading.humidity() {
        writeln!(out, "Humi={h:.1}%")?;
    }
    Ok(())
}

fn write_raw<W: Write>(out: &mut W, raw: RawData) -> io::Result<()> {
    match raw {
        RawData::Word(word) => writeln!(out, "Raw=0x{word:04x}"),
        RawData::Block(block) => {
            write!(out, "Raw=")?;
            for (i, b) in block.iter().enumerate() {
                let sep = if i == 0 { "" } else { " " };
                write!(out, "{sep}0x{b:02x}")?;
            }
            writeln!(out)
        }
    }
}
