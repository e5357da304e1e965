//! Field validation rules.
//!
//! [`evaluate`] runs the rule chain for one field against a snapshot of its
//! live inputs and resolves the failure message through the catalog. It is
//! pure: document side effects (error markers) are applied by the caller,
//! which is what keeps silent sweeps and visible sweeps on one code path.
//!
//! Custom rules are deferred booleans. Synchronous conditions are wrapped
//! into immediately-ready futures so every check awaits the same way.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;
use std::sync::LazyLock;

use crate::document::{FileInfo, FormDocument};
use crate::field::{FieldDescriptor, FieldKind};
use crate::messages::{MessageCatalog, keys};

// Email pattern: dot-separated atoms, then a dotted domain with an
// alphabetic top-level label. Atom grouping structurally rejects leading,
// trailing, and consecutive dots in the local part.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

// Web address with an optional http/https scheme, a dotted domain or IPv4
// literal, and optional port, path, query string, and fragment.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^(https?://)?((([a-z\d]([a-z\d-]*[a-z\d])*)\.)+[a-z]{2,}|((\d{1,3}\.){3}\d{1,3}))(:\d+)?(/[-a-z\d%_.~+]*)*(\?[;&a-z\d%_.~+=-]*)?(#[-a-z\d_]*)?$",
	)
	.expect("URL_REGEX: invalid regex pattern")
});

/// Deferred boolean returned by custom rule conditions.
pub type RuleFuture = BoxFuture<'static, bool>;

/// One user-supplied validation rule.
///
/// The condition receives the live value and the field name and resolves to
/// `true` when the value is acceptable.
///
/// # Examples
///
/// ```
/// use stepform::CustomRule;
///
/// let no_spaces = CustomRule::new(|value, _field| !value.contains(' '))
///     .with_message("Spaces are not allowed");
/// # let _ = no_spaces;
/// ```
#[derive(Clone)]
pub struct CustomRule {
	condition: Arc<dyn Fn(&str, &str) -> RuleFuture + Send + Sync>,
	message: Option<String>,
}

impl CustomRule {
	/// Creates a rule from a synchronous condition.
	pub fn new<F>(condition: F) -> Self
	where
		F: Fn(&str, &str) -> bool + Send + Sync + 'static,
	{
		Self {
			condition: Arc::new(move |value, field| {
				let outcome = condition(value, field);
				Box::pin(std::future::ready(outcome)) as RuleFuture
			}),
			message: None,
		}
	}

	/// Creates a rule from a condition that resolves asynchronously.
	///
	/// The condition must return an owned future; copy what it needs out of
	/// the borrowed arguments.
	///
	/// # Examples
	///
	/// ```
	/// use stepform::CustomRule;
	///
	/// let taken = CustomRule::deferred(|value, _field| {
	///     let value = value.to_string();
	///     Box::pin(async move { value != "admin" })
	/// })
	/// .with_message("That name is taken");
	/// # let _ = taken;
	/// ```
	pub fn deferred<F>(condition: F) -> Self
	where
		F: Fn(&str, &str) -> RuleFuture + Send + Sync + 'static,
	{
		Self {
			condition: Arc::new(condition),
			message: None,
		}
	}

	/// Sets the message reported when the condition resolves to `false`.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub(crate) async fn check(&self, value: &str, field: &str) -> bool {
		(self.condition)(value, field).await
	}

	pub(crate) fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}
}

impl std::fmt::Debug for CustomRule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CustomRule")
			.field("condition", &"<function>")
			.field("message", &self.message)
			.finish()
	}
}

/// Custom rules grouped by the kind name they apply to.
///
/// Rules registered under a built-in kind name run after the built-in
/// check; rules under any other name drive [`FieldKind::Other`] fields.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
	rules: HashMap<String, Vec<CustomRule>>,
}

impl RuleRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a rule to the list registered under `kind`.
	pub fn register(&mut self, kind: impl Into<String>, rule: CustomRule) {
		self.rules.entry(kind.into()).or_default().push(rule);
	}

	/// Rules registered under `kind`, in registration order.
	pub fn rules_for(&self, kind: &str) -> &[CustomRule] {
		self.rules.get(kind).map(Vec::as_slice).unwrap_or_default()
	}
}

/// Result of validating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
	/// The field passed every rule.
	Pass,
	/// The first failing rule, with its resolved message.
	Fail {
		/// Message to reveal next to the field.
		message: String,
	},
}

impl FieldOutcome {
	/// Whether the field passed.
	pub fn is_pass(&self) -> bool {
		matches!(self, FieldOutcome::Pass)
	}

	fn fail(message: String) -> Self {
		FieldOutcome::Fail { message }
	}
}

/// Live inputs of one field, read from the document in a single lock scope
/// so no lock is held while rule futures run.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldSnapshot {
	pub value: String,
	pub checked: bool,
	pub has_checked_option: bool,
	pub file: Option<FileInfo>,
	pub password_peer: Option<String>,
}

pub(crate) fn snapshot_field(document: &dyn FormDocument, field: &FieldDescriptor) -> FieldSnapshot {
	FieldSnapshot {
		value: document.value(&field.name).unwrap_or_default(),
		checked: document.is_checked(&field.name),
		has_checked_option: !document.checked_values(&field.name).is_empty(),
		file: document.file_info(&field.name),
		password_peer: document.value("password"),
	}
}

/// Runs the rule chain for one field and returns the first failure.
///
/// Rule order: the required-if-filled skip, the required check, length
/// bounds, the choice-group check, the kind-specific check, then custom
/// rules in registration order.
pub(crate) async fn evaluate(
	field: &FieldDescriptor,
	snapshot: &FieldSnapshot,
	registry: &RuleRegistry,
	messages: &MessageCatalog,
) -> FieldOutcome {
	let resolve = |key: &str, var: Option<&str>| -> String {
		messages.resolve(&field.name, &field.kind_name, key, var)
	};

	// An optional field that was left untouched skips every later rule,
	// custom rules included.
	if field.required_if_filled && !field.required && is_unfilled(field, snapshot) {
		return FieldOutcome::Pass;
	}

	if field.required && textual(field) && snapshot.value.is_empty() {
		return FieldOutcome::fail(resolve(keys::EMPTY, None));
	}

	if textual(field) && !snapshot.value.is_empty() {
		let length = snapshot.value.chars().count();
		if let Some(min) = field.min_length
			&& length < min
		{
			return FieldOutcome::fail(resolve(keys::MIN_LENGTH, Some(&min.to_string())));
		}
		if let Some(max) = field.max_length
			&& length > max
		{
			return FieldOutcome::fail(resolve(keys::MAX_LENGTH, Some(&max.to_string())));
		}
	}

	match &field.kind {
		FieldKind::MultiChoice => {
			// A choice group with nothing ticked fails even without the
			// required marker; required-if-filled is the one way out, and
			// it skips the custom rules as well.
			if !snapshot.has_checked_option {
				if field.required_if_filled {
					return FieldOutcome::Pass;
				}
				return FieldOutcome::fail(resolve(keys::EMPTY, None));
			}
		}
		FieldKind::Email => {
			if !snapshot.value.is_empty() && !is_valid_email(&snapshot.value) {
				return FieldOutcome::fail(resolve(keys::INVALID, None));
			}
		}
		FieldKind::Url => {
			if !snapshot.value.is_empty() && !is_valid_url(&snapshot.value) {
				return FieldOutcome::fail(resolve(keys::INVALID, None));
			}
		}
		FieldKind::CuitCuil => {
			if !snapshot.value.is_empty() && !is_valid_cuit_cuil(&snapshot.value) {
				return FieldOutcome::fail(resolve(keys::INVALID, None));
			}
		}
		FieldKind::Money => {
			// A bare currency symbol means the amount was never typed.
			if snapshot.value.is_empty() || snapshot.value == field.currency {
				return FieldOutcome::fail(resolve(keys::EMPTY, None));
			}
		}
		FieldKind::SingleCheckbox => {
			if !snapshot.checked {
				return FieldOutcome::fail(resolve(keys::EMPTY, None));
			}
		}
		FieldKind::PasswordRepeat => {
			// Without a password field to compare against there is nothing
			// to check.
			if let Some(peer) = &snapshot.password_peer
				&& peer != &snapshot.value
			{
				return FieldOutcome::fail(resolve(keys::UNEQUAL, None));
			}
		}
		FieldKind::File => {
			if let Some(outcome) = check_file(field, snapshot, &resolve) {
				return outcome;
			}
		}
		FieldKind::Text | FieldKind::Other(_) => {}
	}

	for rule in registry.rules_for(&field.kind_name) {
		if !rule.check(&snapshot.value, &field.name).await {
			let message = rule
				.message()
				.map(str::to_string)
				.unwrap_or_default();
			return FieldOutcome::fail(message);
		}
	}

	FieldOutcome::Pass
}

fn check_file(
	field: &FieldDescriptor,
	snapshot: &FieldSnapshot,
	resolve: &impl Fn(&str, Option<&str>) -> String,
) -> Option<FieldOutcome> {
	let Some(file) = &snapshot.file else {
		if field.required {
			return Some(FieldOutcome::fail(resolve(keys::EMPTY, None)));
		}
		return None;
	};

	let size = file_size_mb(file.size_bytes);
	if let Some(min) = field.min_size
		&& size < min
	{
		return Some(FieldOutcome::fail(resolve(
			keys::MIN_SIZE,
			Some(&format!("{min} MB")),
		)));
	}
	if let Some(max) = field.max_size
		&& size > max
	{
		return Some(FieldOutcome::fail(resolve(
			keys::MAX_SIZE,
			Some(&format!("{max} MB")),
		)));
	}
	None
}

// Whether the field counts as untouched for the required-if-filled skip.
fn is_unfilled(field: &FieldDescriptor, snapshot: &FieldSnapshot) -> bool {
	match &field.kind {
		FieldKind::MultiChoice => !snapshot.has_checked_option,
		FieldKind::File => snapshot.file.is_none(),
		FieldKind::SingleCheckbox => false,
		_ => snapshot.value.is_empty(),
	}
}

// Kinds whose emptiness and length are judged on the text value.
fn textual(field: &FieldDescriptor) -> bool {
	!matches!(
		field.kind,
		FieldKind::MultiChoice | FieldKind::SingleCheckbox | FieldKind::File
	)
}

/// File size in megabytes, rounded to one decimal.
pub(crate) fn file_size_mb(size_bytes: u64) -> f64 {
	(size_bytes as f64 / 1_048_576.0 * 10.0).round() / 10.0
}

/// Whether `value` is a well-formed email address.
pub(crate) fn is_valid_email(value: &str) -> bool {
	EMAIL_REGEX.is_match(value)
}

/// Whether `value` is a well-formed web address.
pub(crate) fn is_valid_url(value: &str) -> bool {
	URL_REGEX.is_match(value)
}

/// Whether `value` is a valid CUIT/CUIL number.
///
/// Separators are discarded; the remaining digits must be exactly eleven,
/// and the last one must equal the mod-11 check digit computed over the
/// first ten.
pub(crate) fn is_valid_cuit_cuil(value: &str) -> bool {
	const MULTIPLIERS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

	let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
	if digits.len() != 11 {
		return false;
	}

	let sum: u32 = digits
		.iter()
		.take(10)
		.zip(MULTIPLIERS)
		.map(|(digit, multiplier)| digit * multiplier)
		.sum();

	let result = match 11 - (sum % 11) {
		10 => 9,
		11 => 0,
		other => other,
	};

	result == digits[10]
}
