use embedded_hal::i2c::{
	self,
	ErrorKind,
};

use super::Register;

pub type GaugeResult<T> = Result<T, GaugeError>;

#[derive(Debug, Fail)]
pub enum GaugeError {
	#[fail(display = "I2C transfer for register {} failed: {:?} ({})", register, kind, detail)]
	Bus {
		register: Register,
		kind: ErrorKind,
		detail: String,
	},

	#[fail(display = "CFGUPMODE flag didn't change after {} polls", polls)]
	Timeout {
		polls: u32,
	},

	#[fail(display = "{} bytes at block offset {} cross the 32-byte block boundary", len, offset)]
	BlockOverrun {
		offset: u8,
		len: usize,
	},

	#[fail(display = "block checksum mismatch: device has 0x{:02x}, data sums to 0x{:02x}", stored, computed)]
	Checksum {
		stored: u8,
		computed: u8,
	},
}

impl GaugeError {
	pub(crate) fn bus<E: i2c::Error>(register: Register) -> impl FnOnce(E) -> GaugeError {
		move |e| GaugeError::Bus {
			register,
			kind: e.kind(),
			detail: format!("{:?}", e),
		}
	}
}
