use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Largest payload an SMBus block write carries.
pub const BLOCK_MAX: usize = 32;

/// An I2C bus bound to one slave address, exposing SMBus-shaped transactions.
///
/// This is the handle every sensor driver talks through. It owns the bus for
/// as long as the driver lives; [`SmbusDevice::release`] gives it back.
pub struct SmbusDevice<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C: I2c> SmbusDevice<I2C> {
    /// Binds `i2c` to the device at `address`.
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        SmbusDevice { i2c, address }
    }

    /// The bound slave address.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Reads a single byte without selecting a register first.
    pub fn read_byte(&mut self) -> Result<u8, I2C::Error> {
        let mut buf = [0; 1];
        self.i2c.read(self.address, &mut buf)?;
        Ok(buf[0])
    }

    /// Writes a single command byte.
    pub fn write_byte(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[value])
    }

    /// Reads one byte from `register`.
    pub fn read_byte_data(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0; 1];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(buf[0])
    }

    /// Reads a word from `register`.
    ///
    /// SMBus words are little-endian: the first byte on the wire is the low
    /// byte of the result.
    pub fn read_word_data(&mut self, register: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0; 2];
        self.i2c.write_read(self.address, &[register], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Writes `value` to `register`.
    pub fn write_byte_data(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    /// Writes `command` followed by `payload` in one transaction.
    ///
    /// Payloads longer than [`BLOCK_MAX`] are truncated, as an SMBus block
    /// write would.
    pub fn write_block_data(&mut self, command: u8, payload: &[u8]) -> Result<(), I2C::Error> {
        let len = payload.len().min(BLOCK_MAX);
        let mut buf = [0; BLOCK_MAX + 1];
        buf[0] = command;
        buf[1..=len].copy_from_slice(&payload[..len]);
        self.i2c.write(self.address, &buf[..=len])
    }

    /// Selects `register` and fills `buf` from it.
    pub fn read_block_data(&mut self, register: u8, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.address, &[register], buf)
    }

    /// Destroys the handle, returning the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
