use std::time::Duration;

use super::{
	GaugeError,
	GaugeResult,
};

/// Sleeps and poll limits used while talking to the gauge
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Timing {
	/// Pause between the steps of a data memory access
	pub settle: Duration,
	/// Pause between two reads of the `FLAGS` register while waiting for
	/// CFGUPMODE to change
	pub poll_interval: Duration,
	/// Maximum number of `FLAGS` reads while waiting for CFGUPMODE to
	/// change; `None` waits forever. At least one read is always done.
	pub poll_limit: Option<u32>,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			settle: Duration::from_micros(100),
			poll_interval: Duration::from_micros(100),
			// the gauge needs up to ~1s to enter CONFIG UPDATE mode
			poll_limit: Some(20_000),
		}
	}
}

impl Timing {
	pub fn unbounded() -> Self {
		Self {
			poll_limit: None,
			..Self::default()
		}
	}

	pub(crate) fn poll_counter(&self) -> PollCounter {
		PollCounter {
			polls: 0,
			limit: self.poll_limit,
		}
	}
}

/// Counts `FLAGS` polls against `Timing::poll_limit`
pub(crate) struct PollCounter {
	polls: u32,
	limit: Option<u32>,
}

impl PollCounter {
	/// Account for the next poll; fails once the limit is used up
	pub(crate) fn start_poll(&mut self) -> GaugeResult<()> {
		if let Some(limit) = self.limit {
			if self.polls >= limit.max(1) {
				return Err(GaugeError::Timeout { polls: self.polls });
			}
		}
		self.polls = self.polls.saturating_add(1);
		Ok(())
	}

	pub(crate) fn polls(&self) -> u32 {
		self.polls
	}
}
