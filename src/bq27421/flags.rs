use std::fmt;

// Flags() register bits
const FLAG_OT:        u16 = 0x8000; // over-temperature
const FLAG_UT:        u16 = 0x4000; // under-temperature
const FLAG_FC:        u16 = 0x0200; // full charge
const FLAG_CHG:       u16 = 0x0100; // fast charging allowed
const FLAG_ITPOR:     u16 = 0x0020; // POR or RESET occurred
const FLAG_CFGUPMODE: u16 = 0x0010; // CONFIG UPDATE mode
const FLAG_BAT_DET:   u16 = 0x0008; // battery inserted
const FLAG_SOC1:      u16 = 0x0004; // SOC <= SOC1 set threshold
const FLAG_SOCF:      u16 = 0x0002; // SOC <= SOCF set threshold
const FLAG_DSG:       u16 = 0x0001; // discharging

/// Status register as returned by the `FLAGS` command
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Flags(pub u16);

impl Flags {
	pub fn is_over_temperature(&self) -> bool {
		0 != self.0 & FLAG_OT
	}
	pub fn is_under_temperature(&self) -> bool {
		0 != self.0 & FLAG_UT
	}
	pub fn is_full_charge(&self) -> bool {
		0 != self.0 & FLAG_FC
	}
	pub fn is_charging_allowed(&self) -> bool {
		0 != self.0 & FLAG_CHG
	}
	pub fn is_reset_occurred(&self) -> bool {
		0 != self.0 & FLAG_ITPOR
	}
	pub fn is_cfg_update_mode(&self) -> bool {
		0 != self.0 & FLAG_CFGUPMODE
	}
	pub fn is_battery_detected(&self) -> bool {
		0 != self.0 & FLAG_BAT_DET
	}
	pub fn is_soc1(&self) -> bool {
		0 != self.0 & FLAG_SOC1
	}
	pub fn is_soc_final(&self) -> bool {
		0 != self.0 & FLAG_SOCF
	}
	pub fn is_discharging(&self) -> bool {
		0 != self.0 & FLAG_DSG
	}
}

impl fmt::Display for Flags {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

impl fmt::Debug for Flags {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x} (", self.0)?;
		if self.is_over_temperature() { write!(f, " [OT]")?; }
		if self.is_under_temperature() { write!(f, " [UT]")?; }
		if self.is_full_charge() { write!(f, " [FC]")?; }
		if self.is_charging_allowed() { write!(f, " [CHG]")?; }
		if self.is_reset_occurred() { write!(f, " [ITPOR]")?; }
		if self.is_cfg_update_mode() { write!(f, " [CFGUPMODE]")?; }
		if self.is_battery_detected() { write!(f, " [BAT_DET]")?; }
		if self.is_soc1() { write!(f, " [SOC1]")?; }
		if self.is_soc_final() { write!(f, " [SOCF]")?; }
		if self.is_discharging() { write!(f, " [DSG]")?; }
		write!(f, " )")
	}
}

// CONTROL_STATUS bits
const STATUS_SHUTDOWNEN: u16 = 0x8000;
const STATUS_WDRESET:    u16 = 0x4000;
const STATUS_SS:         u16 = 0x2000; // sealed
const STATUS_CALMODE:    u16 = 0x1000;
const STATUS_CCA:        u16 = 0x0800;
const STATUS_BCA:        u16 = 0x0400;
const STATUS_QMAX_UP:    u16 = 0x0200;
const STATUS_RES_UP:     u16 = 0x0100;
const STATUS_INITCOMP:   u16 = 0x0080;
const STATUS_HIBERNATE:  u16 = 0x0040;
const STATUS_SLEEP:      u16 = 0x0010;
const STATUS_LDMD:       u16 = 0x0008;
const STATUS_RUP_DIS:    u16 = 0x0004;
const STATUS_VOK:        u16 = 0x0002;

/// Result of the `CONTROL_STATUS` control command
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ControlStatus(pub u16);

impl ControlStatus {
	pub fn is_shutdown_enabled(&self) -> bool {
		0 != self.0 & STATUS_SHUTDOWNEN
	}
	pub fn is_watchdog_reset(&self) -> bool {
		0 != self.0 & STATUS_WDRESET
	}
	pub fn is_sealed(&self) -> bool {
		0 != self.0 & STATUS_SS
	}
	pub fn is_calibration_mode(&self) -> bool {
		0 != self.0 & STATUS_CALMODE
	}
	pub fn is_cc_auto_calibrating(&self) -> bool {
		0 != self.0 & STATUS_CCA
	}
	pub fn is_board_calibrating(&self) -> bool {
		0 != self.0 & STATUS_BCA
	}
	pub fn is_qmax_updated(&self) -> bool {
		0 != self.0 & STATUS_QMAX_UP
	}
	pub fn is_resistance_updated(&self) -> bool {
		0 != self.0 & STATUS_RES_UP
	}
	pub fn is_init_complete(&self) -> bool {
		0 != self.0 & STATUS_INITCOMP
	}
	pub fn is_hibernate(&self) -> bool {
		0 != self.0 & STATUS_HIBERNATE
	}
	pub fn is_sleep(&self) -> bool {
		0 != self.0 & STATUS_SLEEP
	}
	pub fn is_load_mode_constant_power(&self) -> bool {
		0 != self.0 & STATUS_LDMD
	}
	pub fn is_resistance_update_disabled(&self) -> bool {
		0 != self.0 & STATUS_RUP_DIS
	}
	pub fn is_voltage_ok(&self) -> bool {
		0 != self.0 & STATUS_VOK
	}
}

impl fmt::Display for ControlStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

impl fmt::Debug for ControlStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x} (", self.0)?;
		if self.is_shutdown_enabled() { write!(f, " [SHUTDOWNEN]")?; }
		if self.is_watchdog_reset() { write!(f, " [WDRESET]")?; }
		if self.is_sealed() { write!(f, " [SS]")?; }
		if self.is_calibration_mode() { write!(f, " [CALMODE]")?; }
		if self.is_cc_auto_calibrating() { write!(f, " [CCA]")?; }
		if self.is_board_calibrating() { write!(f, " [BCA]")?; }
		if self.is_qmax_updated() { write!(f, " [QMAX_UP]")?; }
		if self.is_resistance_updated() { write!(f, " [RES_UP]")?; }
		if self.is_init_complete() { write!(f, " [INITCOMP]")?; }
		if self.is_hibernate() { write!(f, " [HIBERNATE]")?; }
		if self.is_sleep() { write!(f, " [SLEEP]")?; }
		if self.is_load_mode_constant_power() { write!(f, " [LDMD]")?; }
		if self.is_resistance_update_disabled() { write!(f, " [RUP_DIS]")?; }
		if self.is_voltage_ok() { write!(f, " [VOK]")?; }
		write!(f, " )")
	}
}
