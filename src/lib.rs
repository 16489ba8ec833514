#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod bq27421;
pub mod i2c;

/// Open the gauge on a linux i2c-dev bus (e.g. `/dev/i2c-1`)
pub fn open_gauge(path: &str, timing: bq27421::Timing) -> AResult<bq27421::Gauge<i2c::I2cdev, i2c::LinuxDelay>> {
	let bus = with_context!(("couldn't open I2C bus {}", path),
		i2c::open_bus(path)
	)?;
	Ok(bq27421::Gauge::with_timing(bus, i2c::LinuxDelay, timing))
}
