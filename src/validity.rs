//! Edge-triggered validity state.
//!
//! The form and the active step each carry one validity flag. Both start
//! out `true` so that the first failing sweep produces a falling edge and
//! notifies listeners. Recording a result reports `Some` only when the flag
//! actually flips, which is what keeps validity callbacks edge-triggered
//! rather than firing on every sweep.

/// Current validity flags for the whole form and the active step.
#[derive(Debug, Clone)]
pub(crate) struct ValidityTracker {
	form_valid: bool,
	step_valid: bool,
}

impl Default for ValidityTracker {
	fn default() -> Self {
		Self {
			form_valid: true,
			step_valid: true,
		}
	}
}

impl ValidityTracker {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Records a whole-form result, returning the new value on a flip.
	pub(crate) fn record_form(&mut self, valid: bool) -> Option<bool> {
		if valid == self.form_valid {
			return None;
		}
		self.form_valid = valid;
		Some(valid)
	}

	/// Records an active-step result, returning the new value on a flip.
	pub(crate) fn record_step(&mut self, valid: bool) -> Option<bool> {
		if valid == self.step_valid {
			return None;
		}
		self.step_valid = valid;
		Some(valid)
	}

	pub(crate) fn form_valid(&self) -> bool {
		self.form_valid
	}

	pub(crate) fn step_valid(&self) -> bool {
		self.step_valid
	}

	/// Restores the optimistic starting state without notifying anyone.
	pub(crate) fn reset(&mut self) {
		*self = Self::default();
	}
}
