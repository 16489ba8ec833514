use std::fmt;
use std::str;

/// 7-bit I²C address of the BQ27421
pub const DEVICE_ADDRESS: u8 = 0x55;

/// Size of a data memory block (and of the `BLOCK_DATA` window)
pub const BLOCK_SIZE: usize = 32;

/// Parse an integer in decimal or `0x` hexadecimal notation, with optional sign
pub fn parse_int(s: &str) -> crate::AResult<i64> {
	let (negative, digits) = match s.trim() {
		t if t.starts_with('-') => (true, &t[1..]),
		t => (false, t),
	};
	let value = if digits.starts_with("0x") || digits.starts_with("0X") {
		with_context!(("invalid hex number {:?}", s),
			Ok(i64::from_str_radix(&digits[2..], 16)?)
		)?
	} else {
		with_context!(("invalid number {:?}", s),
			Ok(digits.parse::<i64>()?)
		)?
	};
	Ok(if negative { -value } else { value })
}

fn parse_ranged(s: &str, max: i64, what: &str) -> crate::AResult<i64> {
	let value = parse_int(s)?;
	ensure!(value >= 0 && value <= max, "{} out of range (0..=0x{:x}): {:?}", what, max, s);
	Ok(value)
}

/// Standard command register
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Register(pub u8);

impl Register {
	pub const CONTROL: Register = Register(0x00);
	pub const TEMPERATURE: Register = Register(0x02);
	pub const VOLTAGE: Register = Register(0x04);
	pub const FLAGS: Register = Register(0x06);
	pub const NOMINAL_AVAILABLE_CAPACITY: Register = Register(0x08);
	pub const FULL_AVAILABLE_CAPACITY: Register = Register(0x0a);
	pub const REMAINING_CAPACITY: Register = Register(0x0c);
	pub const FULL_CHARGE_CAPACITY: Register = Register(0x0e);
	pub const AVERAGE_CURRENT: Register = Register(0x10);
	pub const STANDBY_CURRENT: Register = Register(0x12);
	pub const MAX_LOAD_CURRENT: Register = Register(0x14);
	pub const AVERAGE_POWER: Register = Register(0x18);
	pub const STATE_OF_CHARGE: Register = Register(0x1c);
	pub const INTERNAL_TEMPERATURE: Register = Register(0x1e);
	pub const STATE_OF_HEALTH: Register = Register(0x20);
	pub const REMAINING_CAPACITY_UNFILTERED: Register = Register(0x28);
	pub const REMAINING_CAPACITY_FILTERED: Register = Register(0x2a);
	pub const FULL_CHARGE_CAPACITY_UNFILTERED: Register = Register(0x2c);
	pub const FULL_CHARGE_CAPACITY_FILTERED: Register = Register(0x2e);
	pub const STATE_OF_CHARGE_UNFILTERED: Register = Register(0x30);
	pub const OP_CONFIG: Register = Register(0x3a);
	pub const DESIGN_CAPACITY: Register = Register(0x3c);
	// extended data commands for data memory access
	pub const DATA_CLASS: Register = Register(0x3e);
	pub const DATA_BLOCK: Register = Register(0x3f);
	pub const BLOCK_DATA: Register = Register(0x40); // 0x40 - 0x5f
	pub const BLOCK_DATA_CHECKSUM: Register = Register(0x60);
	pub const BLOCK_DATA_CONTROL: Register = Register(0x61);

	/// `BLOCK_DATA` window register for the given offset within a block
	pub fn block_data(block_offset: u8) -> Register {
		assert!((block_offset as usize) < BLOCK_SIZE);
		Register(Register::BLOCK_DATA.0 + block_offset)
	}

	pub fn name(&self) -> Option<&'static str> {
		REGISTER_NAMES.iter().find(|(r, _)| r == self).map(|(_, name)| *name)
	}
}

const REGISTER_NAMES: [(Register, &str); 27] = [
	(Register::CONTROL, "CONTROL"),
	(Register::TEMPERATURE, "TEMPERATURE"),
	(Register::VOLTAGE, "VOLTAGE"),
	(Register::FLAGS, "FLAGS"),
	(Register::NOMINAL_AVAILABLE_CAPACITY, "NOMINAL_AVAILABLE_CAPACITY"),
	(Register::FULL_AVAILABLE_CAPACITY, "FULL_AVAILABLE_CAPACITY"),
	(Register::REMAINING_CAPACITY, "REMAINING_CAPACITY"),
	(Register::FULL_CHARGE_CAPACITY, "FULL_CHARGE_CAPACITY"),
	(Register::AVERAGE_CURRENT, "AVERAGE_CURRENT"),
	(Register::STANDBY_CURRENT, "STANDBY_CURRENT"),
	(Register::MAX_LOAD_CURRENT, "MAX_LOAD_CURRENT"),
	(Register::AVERAGE_POWER, "AVERAGE_POWER"),
	(Register::STATE_OF_CHARGE, "STATE_OF_CHARGE"),
	(Register::INTERNAL_TEMPERATURE, "INTERNAL_TEMPERATURE"),
	(Register::STATE_OF_HEALTH, "STATE_OF_HEALTH"),
	(Register::REMAINING_CAPACITY_UNFILTERED, "REMAINING_CAPACITY_UNFILTERED"),
	(Register::REMAINING_CAPACITY_FILTERED, "REMAINING_CAPACITY_FILTERED"),
	(Register::FULL_CHARGE_CAPACITY_UNFILTERED, "FULL_CHARGE_CAPACITY_UNFILTERED"),
	(Register::FULL_CHARGE_CAPACITY_FILTERED, "FULL_CHARGE_CAPACITY_FILTERED"),
	(Register::STATE_OF_CHARGE_UNFILTERED, "STATE_OF_CHARGE_UNFILTERED"),
	(Register::OP_CONFIG, "OP_CONFIG"),
	(Register::DESIGN_CAPACITY, "DESIGN_CAPACITY"),
	(Register::DATA_CLASS, "DATA_CLASS"),
	(Register::DATA_BLOCK, "DATA_BLOCK"),
	(Register::BLOCK_DATA, "BLOCK_DATA"),
	(Register::BLOCK_DATA_CHECKSUM, "BLOCK_DATA_CHECKSUM"),
	(Register::BLOCK_DATA_CONTROL, "BLOCK_DATA_CONTROL"),
];

impl fmt::Display for Register {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{}", name),
			None if self.0 > Register::BLOCK_DATA.0 && self.0 < Register::BLOCK_DATA_CHECKSUM.0 => {
				write!(f, "BLOCK_DATA+{}", self.0 - Register::BLOCK_DATA.0)
			},
			None => write!(f, "0x{:02x}", self.0),
		}
	}
}

impl str::FromStr for Register {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Some((r, _)) = REGISTER_NAMES.iter().find(|(_, name)| name.eq_ignore_ascii_case(s)) {
			return Ok(*r);
		}
		Ok(Register(parse_ranged(s, 0xff, "register")? as u8))
	}
}

/// Subcommand for the `CONTROL` register
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ControlCommand(pub u16);

impl ControlCommand {
	pub const CONTROL_STATUS: ControlCommand = ControlCommand(0x0000);
	pub const DEVICE_TYPE: ControlCommand = ControlCommand(0x0001);
	pub const FW_VERSION: ControlCommand = ControlCommand(0x0002);
	pub const DM_CODE: ControlCommand = ControlCommand(0x0004);
	pub const PREV_MACWRITE: ControlCommand = ControlCommand(0x0007);
	pub const CHEM_ID: ControlCommand = ControlCommand(0x0008);
	pub const BAT_INSERT: ControlCommand = ControlCommand(0x000c);
	pub const BAT_REMOVE: ControlCommand = ControlCommand(0x000d);
	pub const SET_HIBERNATE: ControlCommand = ControlCommand(0x0011);
	pub const CLEAR_HIBERNATE: ControlCommand = ControlCommand(0x0012);
	pub const SET_CFGUPDATE: ControlCommand = ControlCommand(0x0013);
	pub const SHUTDOWN_ENABLE: ControlCommand = ControlCommand(0x001b);
	pub const SHUTDOWN: ControlCommand = ControlCommand(0x001c);
	pub const SEALED: ControlCommand = ControlCommand(0x0020);
	pub const PULSE_SOC_INT: ControlCommand = ControlCommand(0x0023);
	pub const RESET: ControlCommand = ControlCommand(0x0041);
	pub const SOFT_RESET: ControlCommand = ControlCommand(0x0042);
	pub const EXIT_CFGUPDATE: ControlCommand = ControlCommand(0x0043);
	pub const EXIT_RESIM: ControlCommand = ControlCommand(0x0044);
	pub const UNSEAL: ControlCommand = ControlCommand(0x8000); // must be sent twice

	pub fn name(&self) -> Option<&'static str> {
		CONTROL_COMMAND_NAMES.iter().find(|(c, _)| c == self).map(|(_, name)| *name)
	}
}

const CONTROL_COMMAND_NAMES: [(ControlCommand, &str); 20] = [
	(ControlCommand::CONTROL_STATUS, "CONTROL_STATUS"),
	(ControlCommand::DEVICE_TYPE, "DEVICE_TYPE"),
	(ControlCommand::FW_VERSION, "FW_VERSION"),
	(ControlCommand::DM_CODE, "DM_CODE"),
	(ControlCommand::PREV_MACWRITE, "PREV_MACWRITE"),
	(ControlCommand::CHEM_ID, "CHEM_ID"),
	(ControlCommand::BAT_INSERT, "BAT_INSERT"),
	(ControlCommand::BAT_REMOVE, "BAT_REMOVE"),
	(ControlCommand::SET_HIBERNATE, "SET_HIBERNATE"),
	(ControlCommand::CLEAR_HIBERNATE, "CLEAR_HIBERNATE"),
	(ControlCommand::SET_CFGUPDATE, "SET_CFGUPDATE"),
	(ControlCommand::SHUTDOWN_ENABLE, "SHUTDOWN_ENABLE"),
	(ControlCommand::SHUTDOWN, "SHUTDOWN"),
	(ControlCommand::SEALED, "SEALED"),
	(ControlCommand::PULSE_SOC_INT, "PULSE_SOC_INT"),
	(ControlCommand::RESET, "RESET"),
	(ControlCommand::SOFT_RESET, "SOFT_RESET"),
	(ControlCommand::EXIT_CFGUPDATE, "EXIT_CFGUPDATE"),
	(ControlCommand::EXIT_RESIM, "EXIT_RESIM"),
	(ControlCommand::UNSEAL, "UNSEAL"),
];

impl fmt::Display for ControlCommand {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.name() {
			Some(name) => write!(f, "{}", name),
			None => write!(f, "0x{:04x}", self.0),
		}
	}
}

impl str::FromStr for ControlCommand {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Some((c, _)) = CONTROL_COMMAND_NAMES.iter().find(|(_, name)| name.eq_ignore_ascii_case(s)) {
			return Ok(*c);
		}
		Ok(ControlCommand(parse_ranged(s, 0xffff, "control command")? as u16))
	}
}
