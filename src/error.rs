use core::fmt;

/// Protocol step a sensor driver was executing when it failed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// MCP9801 resolution check and rewrite.
    Configure,
    /// MCP9801 temperature register read.
    ReadTemperature,
    /// AHT10 soft reset.
    SoftReset,
    /// AHT10 calibration command and the busy-wait after it.
    Calibrate,
    /// AHT10 trigger-measurement command and the busy-wait after it.
    Trigger,
    /// AHT10 / SHT30 six byte measurement block read.
    ReadMeasurement,
    /// SHT30 single-shot measurement command.
    Measure,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Configure => "configure resolution",
            Step::ReadTemperature => "read temperature register",
            Step::SoftReset => "soft reset",
            Step::Calibrate => "calibrate",
            Step::Trigger => "trigger measurement",
            Step::ReadMeasurement => "read measurement",
            Step::Measure => "send measure command",
        };
        f.write_str(name)
    }
}

/// Possible errors from the sensor drivers.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, PartialEq, Eq)]
pub enum SensorError<E> {
    /// The first transaction with the device failed.
    Transport(E),
    /// A register/block read or write failed during a protocol step.
    Read {
        /// Step that issued the failing transaction.
        step: Step,
        /// Error reported by the bus.
        source: E,
    },
    /// A busy-wait loop exhausted its retry budget.
    Timeout(Step),
    /// The AHT10 never reported the CALIBRATED status bit.
    Calibration,
}

impl<E> SensorError<E> {
    /// Wraps a bus error raised during `step`.
    pub(crate) fn read(step: Step) -> impl FnOnce(E) -> Self {
        move |source| SensorError::Read { step, source }
    }
}

impl<E: fmt::Debug> fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Transport(e) => write!(f, "device not responding: {e:?}"),
            SensorError::Read { step, source } => write!(f, "{step} failed: {source:?}"),
            SensorError::Timeout(step) => write!(f, "{step} busy timeout"),
            SensorError::Calibration => f.write_str("calibration failed"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for SensorError<E> {}
