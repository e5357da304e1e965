//! Step tokens and multi-step navigation state.
//!
//! Steps are addressed by tokens: the main sequence is numbered from `1`,
//! and each main step may own one optional branch written with a `b` suffix
//! (`"2"` steps aside to `"2b"`). Tokens are structured values everywhere
//! inside the engine; the string form only appears at the document and
//! callback boundaries.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

/// Address of a step container.
///
/// # Examples
///
/// ```
/// use stepform::StepToken;
///
/// let main: StepToken = "2".parse().unwrap();
/// let branch: StepToken = "2b".parse().unwrap();
///
/// assert_eq!(main, StepToken::main(2));
/// assert_eq!(branch, StepToken::branch(2));
/// assert_eq!(branch.to_string(), "2b");
/// assert!(branch.is_optional());
/// assert_eq!(branch.base(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepToken {
	base: u32,
	optional: bool,
}

impl StepToken {
	/// Creates the token of a main-sequence step.
	pub fn main(base: u32) -> Self {
		Self {
			base,
			optional: false,
		}
	}

	/// Creates the token of the optional branch hanging off `base`.
	pub fn branch(base: u32) -> Self {
		Self {
			base,
			optional: true,
		}
	}

	/// Numeric part of the token.
	pub fn base(&self) -> u32 {
		self.base
	}

	/// Whether the token addresses an optional branch.
	pub fn is_optional(&self) -> bool {
		self.optional
	}
}

impl fmt::Display for StepToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.optional {
			write!(f, "{}b", self.base)
		} else {
			write!(f, "{}", self.base)
		}
	}
}

impl FromStr for StepToken {
	type Err = FormError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (digits, optional) = match s.strip_suffix('b') {
			Some(rest) => (rest, true),
			None => (s, false),
		};
		if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
			return Err(FormError::InvalidStepToken(s.to_string()));
		}
		let base = digits
			.parse::<u32>()
			.map_err(|_| FormError::InvalidStepToken(s.to_string()))?;
		Ok(Self { base, optional })
	}
}

/// Requested transition, before resolution against the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget {
	/// Advance to the next main step.
	Next,
	/// Return to the previous main step, or from a branch to its base.
	Prev,
	/// Enter the optional branch of the current step.
	Optional,
	/// Jump to an explicit main step. Used by reset.
	Exact(u32),
}

impl StepTarget {
	/// Resolves the target token relative to `current`.
	///
	/// `Prev` from an optional branch lands on the branch's own base step,
	/// not the step before it. `Prev` from step 1 resolves to the
	/// nonexistent step 0 and is absorbed later by the container lookup.
	pub fn resolve(self, current: StepToken) -> StepToken {
		match self {
			StepTarget::Next => StepToken::main(current.base() + 1),
			StepTarget::Prev => {
				if current.is_optional() {
					StepToken::main(current.base())
				} else {
					StepToken::main(current.base().saturating_sub(1))
				}
			}
			StepTarget::Optional => StepToken::branch(current.base()),
			StepTarget::Exact(base) => StepToken::main(base),
		}
	}

	/// Whether this target requires the current step to validate first.
	pub(crate) fn validates(self) -> bool {
		matches!(self, StepTarget::Next | StepTarget::Optional)
	}
}

/// Navigation state of a stepped form.
///
/// Tracks the active token, the forward high-water mark that bounds
/// whole-form validation, the optional branches actually entered, and the
/// `step_changing` lock that serializes transitions.
#[derive(Debug, Clone)]
pub struct StepNavigator {
	current: StepToken,
	highest_visited: u32,
	visited_branches: BTreeSet<u32>,
	step_changing: bool,
}

impl StepNavigator {
	/// Creates a navigator positioned on `initial`.
	pub fn new(initial: StepToken) -> Self {
		let mut visited_branches = BTreeSet::new();
		if initial.is_optional() {
			visited_branches.insert(initial.base());
		}
		Self {
			current: initial,
			highest_visited: initial.base(),
			visited_branches,
			step_changing: false,
		}
	}

	/// Token of the active step.
	pub fn current(&self) -> StepToken {
		self.current
	}

	/// Highest main-step number reached so far.
	pub fn highest_visited(&self) -> u32 {
		self.highest_visited
	}

	/// Whether a transition is in flight.
	pub fn is_step_changing(&self) -> bool {
		self.step_changing
	}

	/// Tries to acquire the transition lock. Returns `false` when another
	/// transition already holds it.
	pub(crate) fn begin_transition(&mut self) -> bool {
		if self.step_changing {
			return false;
		}
		self.step_changing = true;
		true
	}

	/// Releases the transition lock. Must run on every exit path.
	pub(crate) fn finish_transition(&mut self) {
		self.step_changing = false;
	}

	/// Commits a completed transition to `target`.
	pub(crate) fn apply(&mut self, target: StepToken) {
		self.current = target;
		if target.is_optional() {
			self.visited_branches.insert(target.base());
		}
		if target.base() > self.highest_visited {
			self.highest_visited = target.base();
		}
	}

	/// Whether `token` falls inside the visited range used by whole-form
	/// validation. Optional branches count only when actually entered.
	pub(crate) fn in_scope(&self, token: StepToken) -> bool {
		if token.base() > self.highest_visited {
			return false;
		}
		!token.is_optional() || self.visited_branches.contains(&token.base())
	}

	/// Drops the high-water mark back to the active step and forgets
	/// visited branches. Used by reset after navigating home.
	pub(crate) fn reset_high_water(&mut self) {
		self.highest_visited = self.current.base();
		self.visited_branches.clear();
		if self.current.is_optional() {
			self.visited_branches.insert(self.current.base());
		}
	}
}
