use std::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{
	ControlCommand,
	Flags,
	Gauge,
	GaugeResult,
	Register,
};

/// Snapshot of the standard commands
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Telemetry {
	/// mV
	pub voltage: u16,
	/// 0.1 K
	pub temperature: u16,
	/// mA, negative while discharging
	pub average_current: i16,
	/// mW
	pub average_power: i16,
	/// %
	pub state_of_charge: u16,
	/// %
	pub state_of_health: u16,
	/// mAh
	pub remaining_capacity: u16,
	/// mAh
	pub full_charge_capacity: u16,
	pub flags: Flags,
}

impl Telemetry {
	/// Temperature in degrees Celsius
	pub fn temperature_celsius(&self) -> f32 {
		self.temperature as f32 / 10.0 - 273.15
	}
}

impl fmt::Display for Telemetry {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "Voltage:              {} mV", self.voltage)?;
		writeln!(f, "Temperature:          {:.1} °C", self.temperature_celsius())?;
		writeln!(f, "Average current:      {} mA", self.average_current)?;
		writeln!(f, "Average power:        {} mW", self.average_power)?;
		writeln!(f, "State of charge:      {} %", self.state_of_charge)?;
		writeln!(f, "State of health:      {} %", self.state_of_health)?;
		writeln!(f, "Remaining capacity:   {} mAh", self.remaining_capacity)?;
		writeln!(f, "Full charge capacity: {} mAh", self.full_charge_capacity)?;
		write!(f, "Flags:                {:?}", self.flags)
	}
}

impl<B: I2c, D: DelayNs> Gauge<B, D> {
	pub fn voltage(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::VOLTAGE)
	}

	pub fn temperature(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::TEMPERATURE)
	}

	pub fn average_current(&mut self) -> GaugeResult<i16> {
		Ok(self.reg_read(Register::AVERAGE_CURRENT)? as i16)
	}

	pub fn standby_current(&mut self) -> GaugeResult<i16> {
		Ok(self.reg_read(Register::STANDBY_CURRENT)? as i16)
	}

	pub fn max_load_current(&mut self) -> GaugeResult<i16> {
		Ok(self.reg_read(Register::MAX_LOAD_CURRENT)? as i16)
	}

	pub fn average_power(&mut self) -> GaugeResult<i16> {
		Ok(self.reg_read(Register::AVERAGE_POWER)? as i16)
	}

	pub fn state_of_charge(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::STATE_OF_CHARGE)
	}

	pub fn state_of_health(&mut self) -> GaugeResult<u16> {
		// high byte is the status
		Ok(self.reg_read(Register::STATE_OF_HEALTH)? & 0x00ff)
	}

	pub fn remaining_capacity(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::REMAINING_CAPACITY)
	}

	pub fn full_charge_capacity(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::FULL_CHARGE_CAPACITY)
	}

	pub fn design_capacity(&mut self) -> GaugeResult<u16> {
		self.reg_read(Register::DESIGN_CAPACITY)
	}

	pub fn device_type(&mut self) -> GaugeResult<u16> {
		self.ctl_read(ControlCommand::DEVICE_TYPE)
	}

	pub fn fw_version(&mut self) -> GaugeResult<u16> {
		self.ctl_read(ControlCommand::FW_VERSION)
	}

	pub fn telemetry(&mut self) -> GaugeResult<Telemetry> {
		Ok(Telemetry {
			voltage: self.voltage()?,
			temperature: self.temperature()?,
			average_current: self.average_current()?,
			average_power: self.average_power()?,
			state_of_charge: self.state_of_charge()?,
			state_of_health: self.state_of_health()?,
			remaining_capacity: self.remaining_capacity()?,
			full_charge_capacity: self.full_charge_capacity()?,
			flags: self.flags()?,
		})
	}
}
