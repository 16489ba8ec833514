use std::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{
	BLOCK_SIZE,
	Gauge,
	GaugeError,
	GaugeResult,
	Register,
};

/// Location of a field in data memory
///
/// Data memory is organized in classes (subclass ids) of one or more
/// 32-byte blocks; a field offset within the class selects the block
/// (`offset >> 5`) and the position within the block (`offset & 0x1f`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BlockAddress {
	pub data_class: u8,
	pub block: u8,
	pub block_offset: u8,
}

impl BlockAddress {
	pub fn new(data_class: u8, offset: u8) -> Self {
		BlockAddress {
			data_class,
			block: offset >> 5,
			block_offset: offset & 0x1f,
		}
	}

	/// Reject spans leaving the block; the device would silently access
	/// the checksum and control registers behind the window.
	pub fn check_span(&self, len: usize) -> GaugeResult<()> {
		if self.block_offset as usize + len > BLOCK_SIZE {
			return Err(GaugeError::BlockOverrun { offset: self.block_offset, len });
		}
		Ok(())
	}

	fn register(&self) -> Register {
		Register::block_data(self.block_offset)
	}
}

impl fmt::Display for BlockAddress {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "class {} block {} offset {}", self.data_class, self.block, self.block_offset)
	}
}

/// Checksum of a full block: `0xff - (sum of all bytes mod 256)`
pub fn block_checksum(block: &[u8; BLOCK_SIZE]) -> u8 {
	0xff - block.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Update a block checksum for a changed range of the block
///
/// `old` and `new` must cover the same range.
pub fn update_checksum(old_checksum: u8, old: &[u8], new: &[u8]) -> u8 {
	debug_assert_eq!(old.len(), new.len());
	let mut sum = 0xff - old_checksum;
	for &b in old {
		sum = sum.wrapping_sub(b);
	}
	for &b in new {
		sum = sum.wrapping_add(b);
	}
	0xff - sum
}

impl<B: I2c, D: DelayNs> Gauge<B, D> {
	fn select_block(&mut self, address: BlockAddress) -> GaugeResult<()> {
		trace!("selecting data memory {}", address);
		self.settle();
		self.write_register_byte(Register::DATA_CLASS, address.data_class)?;
		self.settle();
		self.write_register_byte(Register::DATA_BLOCK, address.block)?;
		self.settle();
		Ok(())
	}

	/// Read `target.len()` bytes of data memory at `offset` in `data_class`
	///
	/// Unseals the gauge if necessary; doesn't need CONFIG UPDATE mode.
	pub fn data_read(&mut self, data_class: u8, offset: u8, target: &mut [u8]) -> GaugeResult<()> {
		let address = BlockAddress::new(data_class, offset);
		address.check_span(target.len())?;

		self.unseal()?;
		self.select_block(address)?;
		self.read_register_bytes(address.register(), target)
	}

	/// Write `data` to data memory at `offset` in `data_class`
	///
	/// Enters CONFIG UPDATE mode (the gauge stays in it; see
	/// `exit_cfg_update`), reads the old content and checksum, and
	/// commits the new content by writing the updated checksum.
	pub fn data_write(&mut self, data_class: u8, offset: u8, data: &[u8]) -> GaugeResult<()> {
		let address = BlockAddress::new(data_class, offset);
		address.check_span(data.len())?;

		self.enter_cfg_update()?;

		let mut old = [0u8; BLOCK_SIZE];
		let old = &mut old[..data.len()];
		// also selects class and block for the write below
		self.data_read(data_class, offset, old)?;
		self.settle();

		let mut old_checksum = [0u8];
		self.read_register_bytes(Register::BLOCK_DATA_CHECKSUM, &mut old_checksum)?;
		let checksum = update_checksum(old_checksum[0], old, data);

		self.write_register_bytes(address.register(), data)?;
		self.settle();
		// the gauge applies the new data once it gets a matching checksum
		self.write_register_byte(Register::BLOCK_DATA_CHECKSUM, checksum)?;
		self.settle();

		info!("wrote {} bytes to data memory {}, checksum 0x{:02x} -> 0x{:02x}", data.len(), address, old_checksum[0], checksum);
		Ok(())
	}

	/// Read a whole data memory block and verify its checksum
	pub fn read_block(&mut self, data_class: u8, block: u8) -> GaugeResult<[u8; BLOCK_SIZE]> {
		let address = BlockAddress {
			data_class,
			block,
			block_offset: 0,
		};

		self.unseal()?;
		self.select_block(address)?;

		let mut stored = [0u8];
		self.read_register_bytes(Register::BLOCK_DATA_CHECKSUM, &mut stored)?;
		let mut data = [0u8; BLOCK_SIZE];
		self.read_register_bytes(Register::BLOCK_DATA, &mut data)?;

		let computed = block_checksum(&data);
		if stored[0] != computed {
			return Err(GaugeError::Checksum { stored: stored[0], computed });
		}
		Ok(data)
	}
}
