#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate bq27421_gauge;
use bq27421_gauge::*;

use std::process::exit;

use bq27421_gauge::bq27421::{
	ControlCommand,
	FieldType,
	Gauge,
	Register,
	Timing,
	parse_int,
};
use bq27421_gauge::i2c::{
	I2cdev,
	LinuxDelay,
};

type LinuxGauge = Gauge<I2cdev, LinuxDelay>;

const DEFAULT_BUS: &str = "/dev/i2c-1";

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_number(matches: &clap::ArgMatches, name: &str) -> AResult<i64> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	parse_int(param).map_err(|e| {
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_u8(matches: &clap::ArgMatches, name: &str) -> AResult<u8> {
	let value = get_number(matches, name)?;
	ensure!(value >= 0 && value <= 0xff, "invalid parameter {}: {} out of range (0..=255)", name, value);
	Ok(value as u8)
}

fn timing(matches: &clap::ArgMatches) -> AResult<Timing> {
	let mut timing = Timing::default();
	if matches.is_present("poll_limit") {
		let limit = get_number(matches, "poll_limit")?;
		ensure!(limit >= 0 && limit <= u32::max_value() as i64, "invalid parameter poll_limit: {} out of range", limit);
		timing.poll_limit = if limit == 0 { None } else { Some(limit as u32) };
	}
	Ok(timing)
}

fn status(gauge: &mut LinuxGauge) -> AResult<()> {
	let device_type = gauge.device_type()?;
	if device_type != 0x0421 {
		warn!("unexpected device type 0x{:04x}", device_type);
	}
	println!("Device type:          0x{:04x}", device_type);
	println!("Firmware version:     0x{:04x}", gauge.fw_version()?);
	println!("Control status:       {:?}", gauge.control_status()?);
	println!("Design capacity:      {} mAh", gauge.design_capacity()?);
	println!("{}", gauge.telemetry()?);
	Ok(())
}

fn reg(gauge: &mut LinuxGauge, sub_m: &clap::ArgMatches) -> AResult<()> {
	let register: Register = get_param(sub_m, "REGISTER")?;
	let value = gauge.reg_read(register)?;
	println!("{}: 0x{:04x} ({})", register, value, value);
	Ok(())
}

fn ctl(gauge: &mut LinuxGauge, sub_m: &clap::ArgMatches) -> AResult<()> {
	let command: ControlCommand = get_param(sub_m, "COMMAND")?;
	if sub_m.is_present("read") {
		let value = gauge.ctl_read(command)?;
		println!("{}: 0x{:04x}", command, value);
	} else {
		gauge.ctl(command)?;
	}
	Ok(())
}

fn read(gauge: &mut LinuxGauge, sub_m: &clap::ArgMatches) -> AResult<()> {
	let class = get_u8(sub_m, "CLASS")?;
	let offset = get_u8(sub_m, "OFFSET")?;
	let field_type: FieldType = get_param(sub_m, "TYPE")?;
	let value = gauge.read_field(class, offset, field_type)?;
	println!("{} ({}@{}): {} (0x{:x})", field_type, class, offset, value, value);
	Ok(())
}

fn write(gauge: &mut LinuxGauge, sub_m: &clap::ArgMatches) -> AResult<()> {
	let class = get_u8(sub_m, "CLASS")?;
	let offset = get_u8(sub_m, "OFFSET")?;
	let field_type: FieldType = get_param(sub_m, "TYPE")?;
	let value = get_number(sub_m, "VALUE")?;
	let seal = sub_m.is_present("seal");

	let old = gauge.read_field(class, offset, field_type)?;
	if old == value {
		info!("{} ({}@{}) already is {}", field_type, class, offset, value);
		if seal {
			gauge.seal()?;
		}
		return Ok(());
	}
	gauge.write_field(class, offset, field_type, value)?;

	// still in CONFIG UPDATE mode; the soft reset below applies the change
	let new = gauge.read_field(class, offset, field_type)?;
	ensure!(new == value, "verification failed: wrote {}, read back {}", value, new);

	gauge.exit_cfg_update(seal)?;
	info!("{} ({}@{}): {} -> {}", field_type, class, offset, old, new);
	Ok(())
}

fn dump(gauge: &mut LinuxGauge, sub_m: &clap::ArgMatches) -> AResult<()> {
	let class = get_u8(sub_m, "CLASS")?;
	let block = get_u8(sub_m, "BLOCK")?;
	let data = gauge.read_block(class, block)?;
	for (i, line) in data.chunks(16).enumerate() {
		print!("{:02x}:", block as usize * 32 + i * 16);
		for b in line {
			print!(" {:02x}", b);
		}
		println!();
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg bus: -b --bus +takes_value "I2C bus device (default /dev/i2c-1)")
		(@arg poll_limit: --("poll-limit") +takes_value "maximum FLAGS polls while switching CONFIG UPDATE mode (0: no limit)")
		(@subcommand status =>
			(about: "show telemetry and status")
		)
		(@subcommand reg =>
			(about: "read standard command register")
			(@arg REGISTER: +required "register name or number")
		)
		(@subcommand ctl =>
			(about: "send control command")
			(@arg read: -r --read "read result from CONTROL afterwards")
			(@arg COMMAND: +required "control command name or number")
		)
		(@subcommand read =>
			(about: "read data memory field")
			(@arg CLASS: +required "data class (subclass id)")
			(@arg OFFSET: +required "offset within data class")
			(@arg TYPE: +required "field type (u1, u2, u4, i1, i2, i4)")
		)
		(@subcommand write =>
			(about: "write data memory field and leave CONFIG UPDATE mode")
			(@arg seal: -s --seal "seal gauge afterwards")
			(@arg CLASS: +required "data class (subclass id)")
			(@arg OFFSET: +required "offset within data class")
			(@arg TYPE: +required "field type (u1, u2, u4, i1, i2, i4)")
			(@arg VALUE: +required +allow_hyphen_values "new value")
		)
		(@subcommand dump =>
			(about: "hex dump of data memory block (checksum verified)")
			(@arg CLASS: +required "data class (subclass id)")
			(@arg BLOCK: +required "block number within data class")
		)
	).get_matches();

	let bus = matches.value_of("bus").unwrap_or(DEFAULT_BUS);
	let mut gauge = open_gauge(bus, timing(&matches)?)?;
	debug!("using {}", bus);

	match matches.subcommand() {
		("status", _) => {
			status(&mut gauge)
		}
		("reg", Some(sub_m)) => {
			reg(&mut gauge, sub_m)
		}
		("ctl", Some(sub_m)) => {
			ctl(&mut gauge, sub_m)
		}
		("read", Some(sub_m)) => {
			read(&mut gauge, sub_m)
		}
		("write", Some(sub_m)) => {
			write(&mut gauge, sub_m)
		}
		("dump", Some(sub_m)) => {
			dump(&mut gauge, sub_m)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
