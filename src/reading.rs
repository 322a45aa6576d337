use core::ops::BitOr;

/// Set of physical quantities a reading carries.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Capability(u8);

impl Capability {
    /// No quantity.
    pub const NONE: Capability = Capability(0);
    /// Temperature in degrees Celsius.
    pub const TEMPERATURE: Capability = Capability(1 << 0);
    /// Relative humidity in percent.
    pub const HUMIDITY: Capability = Capability(1 << 1);

    /// Returns `true` if every quantity in `other` is also in `self`.
    pub const fn contains(self, other: Capability) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Capability {
    type Output = Capability;

    fn bitor(self, rhs: Capability) -> Capability {
        Capability(self.0 | rhs.0)
    }
}

/// Undecoded bytes as they came off the bus.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawData {
    /// A 16-bit register word (MCP9801 temperature register).
    Word(u16),
    /// A six byte measurement block (AHT10, SHT30).
    Block([u8; 6]),
}

/// A single measurement returned by one of the sensor drivers.
///
/// The accessors only yield quantities inside [`Reading::capability`];
/// anything else reads as `None`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    capability: Capability,
    temperature: Option<f32>,
    humidity: Option<f32>,
    raw: RawData,
}

impl Reading {
    pub(crate) fn temperature_only(temperature: f32, raw: RawData) -> Self {
        Reading {
            capability: Capability::TEMPERATURE,
            temperature: Some(temperature),
            humidity: None,
            raw,
        }
    }

    pub(crate) fn climate(temperature: f32, humidity: f32, raw: RawData) -> Self {
        Reading {
            capability: Capability::TEMPERATURE | Capability::HUMIDITY,
            temperature: Some(temperature),
            humidity: Some(humidity),
            raw,
        }
    }

    /// Quantities this reading carries.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> Option<f32> {
        self.gated(Capability::TEMPERATURE, self.temperature)
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> Option<f32> {
        self.gated(Capability::HUMIDITY, self.humidity)
    }

    /// The bytes the values were decoded from.
    pub fn raw(&self) -> RawData {
        self.raw
    }

    fn gated(&self, quantity: Capability, value: Option<f32>) -> Option<f32> {
        if self.capability.contains(quantity) {
            value
        } else {
            None
        }
    }
}
