//! Register-oriented access to devices on an I²C bus
//!
//! All transfers address a 7-bit device address and an 8-bit register
//! (the "command" byte written before the data phase). Reads use a
//! repeated START between register and data phase (`write_read`).
//!
//! Words are transferred high byte first: `read_word` returns the first
//! byte received as the high byte, `write_word` sends the high byte first.
//! Devices storing their words little-endian (like the BQ27421) need to swap.

use embedded_hal::i2c::I2c;

// OS-specific. for now linux only.
pub use linux_embedded_hal::{
	Delay as LinuxDelay,
	I2cdev,
};

pub trait I2cBus: I2c {
	fn read_word(&mut self, addr: u8, register: u8) -> Result<u16, Self::Error> {
		let mut buf = [0u8; 2];
		self.write_read(addr, &[register], &mut buf)?;
		Ok(u16::from_be_bytes(buf))
	}

	fn write_word(&mut self, addr: u8, register: u8, value: u16) -> Result<(), Self::Error> {
		let [high, low] = value.to_be_bytes();
		self.write(addr, &[register, high, low])
	}

	fn write_byte(&mut self, addr: u8, register: u8, value: u8) -> Result<(), Self::Error> {
		self.write(addr, &[register, value])
	}

	fn read_bytes(&mut self, addr: u8, register: u8, target: &mut [u8]) -> Result<(), Self::Error> {
		if target.is_empty() { return Ok(()); }
		self.write_read(addr, &[register], target)
	}

	fn write_bytes(&mut self, addr: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
		// register and data need to go out in a single message
		let mut buf = Vec::with_capacity(1 + data.len());
		buf.push(register);
		buf.extend_from_slice(data);
		self.write(addr, &buf)
	}
}

impl<B: ?Sized + I2c> I2cBus for B {}

/// Open a linux i2c-dev bus (e.g. `/dev/i2c-1`)
pub fn open_bus(path: &str) -> crate::AResult<I2cdev> {
	// TODO: exclusive open / file locking?
	I2cdev::new(path).map_err(|e| format_err!("{}", e))
}
