use std::fmt;
use std::str;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{
	Gauge,
	GaugeResult,
};

/// Data memory field types; multi-byte fields are stored big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldType {
	U1,
	U2,
	U4,
	I1,
	I2,
	I4,
}

impl FieldType {
	pub fn size(&self) -> usize {
		match *self {
			FieldType::U1 | FieldType::I1 => 1,
			FieldType::U2 | FieldType::I2 => 2,
			FieldType::U4 | FieldType::I4 => 4,
		}
	}

	/// Inclusive range of representable values
	pub fn range(&self) -> (i64, i64) {
		match *self {
			FieldType::U1 => (0, u8::max_value() as i64),
			FieldType::U2 => (0, u16::max_value() as i64),
			FieldType::U4 => (0, u32::max_value() as i64),
			FieldType::I1 => (i8::min_value() as i64, i8::max_value() as i64),
			FieldType::I2 => (i16::min_value() as i64, i16::max_value() as i64),
			FieldType::I4 => (i32::min_value() as i64, i32::max_value() as i64),
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match *self {
			FieldType::U1 => "u1",
			FieldType::U2 => "u2",
			FieldType::U4 => "u4",
			FieldType::I1 => "i1",
			FieldType::I2 => "i2",
			FieldType::I4 => "i4",
		};
		f.write_str(name)
	}
}

impl str::FromStr for FieldType {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match &*s.to_ascii_lowercase() {
			"u1" => FieldType::U1,
			"u2" => FieldType::U2,
			"u4" => FieldType::U4,
			"i1" => FieldType::I1,
			"i2" => FieldType::I2,
			"i4" => FieldType::I4,
			_ => bail!("unknown field type {:?} (expected u1, u2, u4, i1, i2 or i4)", s),
		})
	}
}

impl<B: I2c, D: DelayNs> Gauge<B, D> {
	pub fn data_read_u1(&mut self, data_class: u8, offset: u8) -> GaugeResult<u8> {
		let mut buf = [0u8; 1];
		self.data_read(data_class, offset, &mut buf)?;
		Ok(buf[0])
	}

	pub fn data_read_u2(&mut self, data_class: u8, offset: u8) -> GaugeResult<u16> {
		let mut buf = [0u8; 2];
		self.data_read(data_class, offset, &mut buf)?;
		Ok(u16::from_be_bytes(buf))
	}

	pub fn data_read_u4(&mut self, data_class: u8, offset: u8) -> GaugeResult<u32> {
		let mut buf = [0u8; 4];
		self.data_read(data_class, offset, &mut buf)?;
		Ok(u32::from_be_bytes(buf))
	}

	pub fn data_read_i1(&mut self, data_class: u8, offset: u8) -> GaugeResult<i8> {
		Ok(self.data_read_u1(data_class, offset)? as i8)
	}

	pub fn data_read_i2(&mut self, data_class: u8, offset: u8) -> GaugeResult<i16> {
		Ok(self.data_read_u2(data_class, offset)? as i16)
	}

	pub fn data_read_i4(&mut self, data_class: u8, offset: u8) -> GaugeResult<i32> {
		Ok(self.data_read_u4(data_class, offset)? as i32)
	}

	pub fn data_write_u1(&mut self, data_class: u8, offset: u8, value: u8) -> GaugeResult<()> {
		self.data_write(data_class, offset, &[value])
	}

	pub fn data_write_u2(&mut self, data_class: u8, offset: u8, value: u16) -> GaugeResult<()> {
		self.data_write(data_class, offset, &value.to_be_bytes())
	}

	pub fn data_write_u4(&mut self, data_class: u8, offset: u8, value: u32) -> GaugeResult<()> {
		self.data_write(data_class, offset, &value.to_be_bytes())
	}

	pub fn data_write_i1(&mut self, data_class: u8, offset: u8, value: i8) -> GaugeResult<()> {
		self.data_write_u1(data_class, offset, value as u8)
	}

	pub fn data_write_i2(&mut self, data_class: u8, offset: u8, value: i16) -> GaugeResult<()> {
		self.data_write_u2(data_class, offset, value as u16)
	}

	pub fn data_write_i4(&mut self, data_class: u8, offset: u8, value: i32) -> GaugeResult<()> {
		self.data_write_u4(data_class, offset, value as u32)
	}

	/// Read a field of any type, widened to `i64`
	pub fn read_field(&mut self, data_class: u8, offset: u8, field_type: FieldType) -> GaugeResult<i64> {
		Ok(match field_type {
			FieldType::U1 => self.data_read_u1(data_class, offset)? as i64,
			FieldType::U2 => self.data_read_u2(data_class, offset)? as i64,
			FieldType::U4 => self.data_read_u4(data_class, offset)? as i64,
			FieldType::I1 => self.data_read_i1(data_class, offset)? as i64,
			FieldType::I2 => self.data_read_i2(data_class, offset)? as i64,
			FieldType::I4 => self.data_read_i4(data_class, offset)? as i64,
		})
	}

	/// Write a field of any type; fails if `value` doesn't fit
	pub fn write_field(&mut self, data_class: u8, offset: u8, field_type: FieldType, value: i64) -> crate::AResult<()> {
		let (min, max) = field_type.range();
		ensure!(value >= min && value <= max, "{} doesn't fit into {} ({}..={})", value, field_type, min, max);
		match field_type {
			FieldType::U1 => self.data_write_u1(data_class, offset, value as u8)?,
			FieldType::U2 => self.data_write_u2(data_class, offset, value as u16)?,
			FieldType::U4 => self.data_write_u4(data_class, offset, value as u32)?,
			FieldType::I1 => self.data_write_i1(data_class, offset, value as i8)?,
			FieldType::I2 => self.data_write_i2(data_class, offset, value as i16)?,
			FieldType::I4 => self.data_write_i4(data_class, offset, value as i32)?,
		}
		Ok(())
	}
}
