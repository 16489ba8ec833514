/* Chip documentation: https://www.ti.com/product/BQ27421-G1 (SLUUAC5 technical reference manual) */

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::i2c::I2cBus;

mod block;
mod consts;
mod error;
mod field;
mod flags;
mod telemetry;
mod timing;

#[cfg(test)]
pub(crate) mod mock;

pub use self::block::{
	BlockAddress,
	block_checksum,
	update_checksum,
};

pub use self::consts::{
	BLOCK_SIZE,
	ControlCommand,
	DEVICE_ADDRESS,
	Register,
	parse_int,
};

pub use self::error::{
	GaugeError,
	GaugeResult,
};

pub use self::field::FieldType;

pub use self::flags::{
	ControlStatus,
	Flags,
};

pub use self::telemetry::Telemetry;

pub use self::timing::Timing;

/// BQ27421 fuel gauge
///
/// Tracks whether the gauge was unsealed and put into CONFIG UPDATE mode
/// by this driver. The gauge itself doesn't report a successful unseal,
/// so these flags are a best guess and get out of sync if the gauge is
/// reset behind the driver's back.
///
/// Only use one `Gauge` per device at a time.
pub struct Gauge<B: I2c, D: DelayNs> {
	bus: B,
	delay: D,
	timing: Timing,
	unsealed: bool,
	cfg_update: bool,
}

impl<B: I2c, D: DelayNs> Gauge<B, D> {
	pub fn new(bus: B, delay: D) -> Self {
		Self::with_timing(bus, delay, Timing::default())
	}

	pub fn with_timing(bus: B, delay: D, timing: Timing) -> Self {
		Gauge {
			bus,
			delay,
			timing,
			unsealed: false,
			cfg_update: false,
		}
	}

	/// Give back bus and delay; doesn't touch the device
	pub fn release(self) -> (B, D) {
		(self.bus, self.delay)
	}

	pub fn bus(&self) -> &B {
		&self.bus
	}

	pub fn timing(&self) -> Timing {
		self.timing
	}

	pub fn is_unsealed(&self) -> bool {
		self.unsealed
	}

	pub fn is_cfg_update(&self) -> bool {
		self.cfg_update
	}

	fn sleep(&mut self, duration: Duration) {
		let micros = duration.as_micros();
		self.delay.delay_us(if micros > u32::max_value() as u128 { u32::max_value() } else { micros as u32 });
	}

	fn settle(&mut self) {
		let settle = self.timing.settle;
		self.sleep(settle);
	}

	pub(crate) fn write_register_byte(&mut self, register: Register, value: u8) -> GaugeResult<()> {
		trace!("write {} <- 0x{:02x}", register, value);
		self.bus.write_byte(DEVICE_ADDRESS, register.0, value).map_err(GaugeError::bus(register))
	}

	pub(crate) fn read_register_bytes(&mut self, register: Register, target: &mut [u8]) -> GaugeResult<()> {
		self.bus.read_bytes(DEVICE_ADDRESS, register.0, target).map_err(GaugeError::bus(register))?;
		trace!("read {} -> {:02x?}", register, target);
		Ok(())
	}

	pub(crate) fn write_register_bytes(&mut self, register: Register, data: &[u8]) -> GaugeResult<()> {
		trace!("write {} <- {:02x?}", register, data);
		self.bus.write_bytes(DEVICE_ADDRESS, register.0, data).map_err(GaugeError::bus(register))
	}

	/// Read a 16-bit standard command register
	///
	/// The gauge sends the low byte first.
	pub fn reg_read(&mut self, register: Register) -> GaugeResult<u16> {
		let raw = self.bus.read_word(DEVICE_ADDRESS, register.0).map_err(GaugeError::bus(register))?;
		let value = raw.swap_bytes();
		trace!("read {} -> 0x{:04x}", register, value);
		Ok(value)
	}

	/// Send a control subcommand
	///
	/// `SEALED` and `UNSEAL` update the tracked seal state once the write
	/// went through; the gauge doesn't acknowledge them.
	pub fn ctl(&mut self, command: ControlCommand) -> GaugeResult<()> {
		self.write_control(command)?;
		match command {
			ControlCommand::SEALED => {
				self.unsealed = false;
				self.cfg_update = false;
			},
			ControlCommand::UNSEAL => {
				// actually needs two in a row; `unseal` takes care of that
				self.unsealed = true;
			},
			_ => (),
		}
		Ok(())
	}

	fn write_control(&mut self, command: ControlCommand) -> GaugeResult<()> {
		trace!("control {}", command);
		self.bus.write_word(DEVICE_ADDRESS, Register::CONTROL.0, command.0.swap_bytes())
			.map_err(GaugeError::bus(Register::CONTROL))
	}

	/// Send a control subcommand and read its result from `CONTROL`
	pub fn ctl_read(&mut self, command: ControlCommand) -> GaugeResult<u16> {
		self.ctl(command)?;
		self.reg_read(Register::CONTROL)
	}

	pub fn flags(&mut self) -> GaugeResult<Flags> {
		self.reg_read(Register::FLAGS).map(Flags)
	}

	pub fn control_status(&mut self) -> GaugeResult<ControlStatus> {
		self.ctl_read(ControlCommand::CONTROL_STATUS).map(ControlStatus)
	}

	/// Ask the gauge whether it is sealed (doesn't update the tracked state)
	pub fn read_sealed_state(&mut self) -> GaugeResult<bool> {
		Ok(self.control_status()?.is_sealed())
	}

	pub fn unseal(&mut self) -> GaugeResult<()> {
		if self.unsealed {
			return Ok(());
		}
		debug!("unsealing gauge");
		// the gauge ignores a single UNSEAL
		self.write_control(ControlCommand::UNSEAL)?;
		self.write_control(ControlCommand::UNSEAL)?;
		self.unsealed = true;
		Ok(())
	}

	pub fn seal(&mut self) -> GaugeResult<()> {
		debug!("sealing gauge");
		self.ctl(ControlCommand::SEALED)
	}

	// sleep, then read FLAGS, until CFGUPMODE is set
	fn wait_cfg_update_mode(&mut self) -> GaugeResult<()> {
		let mut counter = self.timing.poll_counter();
		loop {
			counter.start_poll()?;
			let interval = self.timing.poll_interval;
			self.sleep(interval);
			let flags = self.flags()?;
			if flags.is_cfg_update_mode() {
				debug!("CFGUPMODE set after {} polls", counter.polls());
				return Ok(());
			}
		}
	}

	/// Unseal the gauge and put it into CONFIG UPDATE mode (if not already)
	///
	/// If the gauge already is in CONFIG UPDATE mode (entered without this
	/// driver) block data access is not explicitly enabled.
	pub fn enter_cfg_update(&mut self) -> GaugeResult<()> {
		if self.cfg_update {
			return Ok(());
		}

		let flags = self.flags()?;
		if flags.is_cfg_update_mode() {
			warn!("gauge already in CONFIG UPDATE mode, not enabling block data access");
			// CONFIG UPDATE mode is only reachable when unsealed
			self.unsealed = true;
			self.cfg_update = true;
			return Ok(());
		}

		self.unseal()?;
		self.ctl(ControlCommand::SET_CFGUPDATE)?;
		self.wait_cfg_update_mode()?;

		// enable block data access
		self.write_register_byte(Register::BLOCK_DATA_CONTROL, 0x00)?;

		info!("gauge entered CONFIG UPDATE mode");
		self.cfg_update = true;
		Ok(())
	}

	/// Leave CONFIG UPDATE mode through a soft reset, optionally sealing the
	/// gauge afterwards
	///
	/// Data memory changes take effect with the soft reset.
	pub fn exit_cfg_update(&mut self, seal: bool) -> GaugeResult<()> {
		let mut counter = self.timing.poll_counter();
		loop {
			counter.start_poll()?;
			let flags = self.flags()?;
			if counter.polls() == 1 {
				self.ctl(ControlCommand::SOFT_RESET)?;
			}
			let interval = self.timing.poll_interval;
			self.sleep(interval);
			if !flags.is_cfg_update_mode() {
				break;
			}
		}
		debug!("CFGUPMODE cleared after {} polls", counter.polls());
		self.cfg_update = false;
		info!("gauge left CONFIG UPDATE mode");

		if seal {
			self.seal()?;
		}
		Ok(())
	}
}
