// In-memory BQ27421 used by the driver tests

use std::collections::HashMap;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{
	ErrorKind,
	ErrorType,
	I2c,
	NoAcknowledgeSource,
	Operation,
};

use super::{
	BLOCK_SIZE,
	ControlCommand,
	DEVICE_ADDRESS,
	Register,
	block_checksum,
};

const FLAG_CFGUPMODE: u16 = 0x0010;
const STATUS_SS: u16 = 0x2000;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Transfer {
	ReadWord { register: u8 },
	WriteWord { register: u8, value: u16 },
	WriteByte { register: u8, value: u8 },
	ReadBytes { register: u8, len: usize },
	WriteBytes { register: u8, data: Vec<u8> },
}

#[derive(Clone, Copy)]
struct Block {
	data: [u8; BLOCK_SIZE],
	checksum: u8,
}

impl Default for Block {
	fn default() -> Self {
		Block {
			data: [0; BLOCK_SIZE],
			checksum: 0xff,
		}
	}
}

/// Device model keeping register values the way the gauge reports them
/// (host order); the bus side sees them low byte first.
pub struct MockGauge {
	registers: HashMap<u8, u16>,
	control_result: u16,
	sealed: bool,
	unseal_pending: bool,
	cfg_update_mode: bool,
	enter_latency: u32,
	exit_latency: u32,
	enter_countdown: Option<u32>,
	exit_countdown: Option<u32>,
	blocks: HashMap<(u8, u8), Block>,
	data_class: u8,
	data_block: u8,
	window: Block,
	block_data_control: Option<u8>,
	commits: usize,
	rejected_commits: usize,
	transfers: Vec<Transfer>,
	attempts: usize,
	fail_at: Option<usize>,
}

impl MockGauge {
	pub fn new() -> Self {
		MockGauge {
			registers: HashMap::new(),
			control_result: 0,
			sealed: true,
			unseal_pending: false,
			cfg_update_mode: false,
			enter_latency: 0,
			exit_latency: 0,
			enter_countdown: None,
			exit_countdown: None,
			blocks: HashMap::new(),
			data_class: 0,
			data_block: 0,
			window: Block::default(),
			block_data_control: None,
			commits: 0,
			rejected_commits: 0,
			transfers: Vec::new(),
			attempts: 0,
			fail_at: None,
		}
	}

	pub fn set_register(&mut self, register: Register, value: u16) {
		self.registers.insert(register.0, value);
	}

	/// Word as it appears on the bus (first byte as high byte)
	pub fn raw_word(&self, register: Register) -> u16 {
		self.registers.get(&register.0).cloned().unwrap_or(0).swap_bytes()
	}

	/// Number of FLAGS reads after SET_CFGUPDATE that still report normal mode
	pub fn set_cfg_update_latency(&mut self, polls: u32) {
		self.enter_latency = polls;
	}

	/// Number of FLAGS reads after SOFT_RESET that still report CONFIG UPDATE mode
	pub fn set_cfg_exit_latency(&mut self, polls: u32) {
		self.exit_latency = polls;
	}

	pub fn force_cfg_update_mode(&mut self, enabled: bool) {
		self.cfg_update_mode = enabled;
		if enabled {
			self.sealed = false;
		}
	}

	pub fn is_cfg_update_mode(&self) -> bool {
		self.cfg_update_mode
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}

	/// Store a block with a matching checksum
	pub fn set_block(&mut self, data_class: u8, block: u8, data: [u8; BLOCK_SIZE]) {
		let checksum = block_checksum(&data);
		self.blocks.insert((data_class, block), Block { data, checksum });
	}

	pub fn set_block_checksum(&mut self, data_class: u8, block: u8, checksum: u8) {
		self.blocks.entry((data_class, block)).or_insert_with(Block::default).checksum = checksum;
	}

	pub fn block(&self, data_class: u8, block: u8) -> [u8; BLOCK_SIZE] {
		self.blocks.get(&(data_class, block)).cloned().unwrap_or_default().data
	}

	pub fn block_checksum_of(&self, data_class: u8, block: u8) -> u8 {
		self.blocks.get(&(data_class, block)).cloned().unwrap_or_default().checksum
	}

	pub fn block_data_control(&self) -> Option<u8> {
		self.block_data_control
	}

	pub fn commits(&self) -> usize {
		self.commits
	}

	pub fn rejected_commits(&self) -> usize {
		self.rejected_commits
	}

	/// Let the n-th transfer from now on (counting from 0) fail
	pub fn fail_transfer(&mut self, n: usize) {
		self.fail_at = Some(self.attempts + n);
	}

	pub fn transfers(&self) -> Vec<Transfer> {
		self.transfers.clone()
	}

	pub fn clear_transfers(&mut self) {
		self.transfers.clear();
	}

	/// Control commands sent so far (decoded)
	pub fn commands(&self) -> Vec<ControlCommand> {
		self.transfers.iter().filter_map(|t| match *t {
			Transfer::WriteWord { register: 0x00, value } => Some(ControlCommand(value.swap_bytes())),
			_ => None,
		}).collect()
	}

	fn begin(&mut self, addr: u8, transfer: Transfer) -> Result<(), ErrorKind> {
		let attempt = self.attempts;
		self.attempts += 1;
		if addr != DEVICE_ADDRESS {
			return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
		}
		if self.fail_at == Some(attempt) {
			self.fail_at = None;
			return Err(ErrorKind::Other);
		}
		self.transfers.push(transfer);
		Ok(())
	}

	fn load_window(&mut self) {
		self.window = self.blocks.get(&(self.data_class, self.data_block)).cloned().unwrap_or_default();
	}

	fn control(&mut self, command: ControlCommand) {
		let pending = self.unseal_pending;
		self.unseal_pending = false;
		self.control_result = 0;
		match command {
			ControlCommand::UNSEAL => {
				if pending {
					self.sealed = false;
				} else {
					self.unseal_pending = true;
				}
			},
			ControlCommand::SEALED => self.sealed = true,
			ControlCommand::CONTROL_STATUS => {
				self.control_result = if self.sealed { STATUS_SS } else { 0 };
			},
			ControlCommand::DEVICE_TYPE => self.control_result = 0x0421,
			ControlCommand::FW_VERSION => self.control_result = 0x0109,
			ControlCommand::SET_CFGUPDATE => {
				if !self.sealed && !self.cfg_update_mode {
					self.enter_countdown = Some(self.enter_latency);
				}
			},
			ControlCommand::SOFT_RESET => {
				if self.cfg_update_mode {
					self.exit_countdown = Some(self.exit_latency);
				}
			},
			_ => (),
		}
	}

	fn flags(&mut self) -> u16 {
		if let Some(n) = self.enter_countdown {
			if n == 0 {
				self.enter_countdown = None;
				self.cfg_update_mode = true;
			} else {
				self.enter_countdown = Some(n - 1);
			}
		}
		if let Some(n) = self.exit_countdown {
			if n == 0 {
				self.exit_countdown = None;
				self.cfg_update_mode = false;
			} else {
				self.exit_countdown = Some(n - 1);
			}
		}
		let base = self.registers.get(&Register::FLAGS.0).cloned().unwrap_or(0) & !FLAG_CFGUPMODE;
		if self.cfg_update_mode { base | FLAG_CFGUPMODE } else { base }
	}

	fn commit(&mut self, checksum: u8) {
		if self.cfg_update_mode && checksum == block_checksum(&self.window.data) {
			self.window.checksum = checksum;
			self.blocks.insert((self.data_class, self.data_block), self.window);
			self.commits += 1;
		} else {
			self.rejected_commits += 1;
			self.load_window();
		}
	}

	fn window_range(register: u8, len: usize) -> Result<usize, ErrorKind> {
		let start = register.wrapping_sub(Register::BLOCK_DATA.0) as usize;
		if register < Register::BLOCK_DATA.0 || start + len > BLOCK_SIZE + 1 {
			return Err(ErrorKind::Other);
		}
		Ok(start)
	}

	fn handle_write(&mut self, addr: u8, register: u8, data: &[u8]) -> Result<(), ErrorKind> {
		match *data {
			[high, low] if register < Register::BLOCK_DATA.0 => {
				let value = u16::from_be_bytes([high, low]);
				self.begin(addr, Transfer::WriteWord { register, value })?;
				if register == Register::CONTROL.0 {
					self.control(ControlCommand(value.swap_bytes()));
				} else {
					self.registers.insert(register, value.swap_bytes());
				}
			},
			[value] => {
				self.begin(addr, Transfer::WriteByte { register, value })?;
				match Register(register) {
					Register::DATA_CLASS => {
						self.data_class = value;
						self.load_window();
					},
					Register::DATA_BLOCK => {
						self.data_block = value;
						self.load_window();
					},
					Register::BLOCK_DATA_CHECKSUM => self.commit(value),
					Register::BLOCK_DATA_CONTROL => self.block_data_control = Some(value),
					_ => {
						let start = Self::window_range(register, 1)?;
						self.window.data[start] = value;
					},
				}
			},
			_ => {
				let start = Self::window_range(register, data.len())?;
				if data.is_empty() || start + data.len() > BLOCK_SIZE {
					return Err(ErrorKind::Other);
				}
				self.begin(addr, Transfer::WriteBytes { register, data: data.to_vec() })?;
				self.window.data[start..start + data.len()].copy_from_slice(data);
			},
		}
		Ok(())
	}

	fn handle_read(&mut self, addr: u8, register: u8, target: &mut [u8]) -> Result<(), ErrorKind> {
		if register < Register::BLOCK_DATA.0 {
			if target.len() != 2 {
				return Err(ErrorKind::Other);
			}
			self.begin(addr, Transfer::ReadWord { register })?;
			let value = match Register(register) {
				Register::CONTROL => self.control_result,
				Register::FLAGS => self.flags(),
				r => self.registers.get(&r.0).cloned().unwrap_or(0),
			};
			// low byte first
			target.copy_from_slice(&value.to_le_bytes());
			return Ok(());
		}
		let start = Self::window_range(register, target.len())?;
		self.begin(addr, Transfer::ReadBytes { register, len: target.len() })?;
		for (i, b) in target.iter_mut().enumerate() {
			let pos = start + i;
			*b = if pos < BLOCK_SIZE { self.window.data[pos] } else { self.window.checksum };
		}
		Ok(())
	}
}

impl ErrorType for MockGauge {
	type Error = ErrorKind;
}

/// Accepts what the register helpers send: a single write (register
/// followed by data) or a register write followed by a read.
impl I2c for MockGauge {
	fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
		match operations {
			[Operation::Write(w)] if !w.is_empty() => self.handle_write(address, w[0], &w[1..]),
			[Operation::Write(w), Operation::Read(r)] if w.len() == 1 => self.handle_read(address, w[0], r),
			_ => Err(ErrorKind::Other),
		}
	}
}

#[derive(Default)]
pub struct MockDelay {
	sleeps: Vec<Duration>,
}

impl MockDelay {
	pub fn sleeps(&self) -> Vec<Duration> {
		self.sleeps.clone()
	}
}

impl DelayNs for MockDelay {
	fn delay_ns(&mut self, ns: u32) {
		self.sleeps.push(Duration::from_nanos(ns as u64));
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn wrong_address_is_not_acknowledged() {
		let mut bus = MockGauge::new();
		let mut buf = [0u8; 2];
		assert_eq!(
			bus.write_read(0x56, &[Register::FLAGS.0], &mut buf),
			Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
		);
		assert!(bus.transfers().is_empty());
	}

	#[test]
	fn split_write_is_rejected() {
		let mut bus = MockGauge::new();
		let result = bus.transaction(DEVICE_ADDRESS, &mut [
			Operation::Write(&[0x4a]),
			Operation::Write(&[1, 2]),
		]);
		assert_eq!(result, Err(ErrorKind::Other));
		assert!(bus.transfers().is_empty());
	}
}
