//! Form configuration.
//!
//! [`FormOptions`] collects everything a [`crate::Form`] needs beyond the
//! document itself: the submission target and wire format, the class names
//! the document adapter reads and writes, custom rules and messages, and
//! the lifecycle callbacks. Every field has a working default except the
//! submission target.

use std::time::Duration;

use crate::callback::Callback;
use crate::messages::MessageCatalog;
use crate::serialize::{FieldGroup, PayloadFormat};
use crate::transport::{SubmitError, SubmitMethod, SubmitResponse};
use crate::validator::{CustomRule, RuleRegistry};

/// Class names shared between the form and its document adapter.
///
/// The first two mark how a field wants to be validated; the rest are
/// written by the form to reflect its state. `control_error` is only
/// applied when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssClasses {
	/// Marks a field that must be filled.
	pub required: String,
	/// Marks a field validated only once it has content.
	pub required_if_filled: String,
	/// Added to a field whose last validation failed.
	pub has_error: String,
	/// Keeps an error message element out of sight.
	pub hidden: String,
	/// Added to the form while a submission is in flight.
	pub submitting: String,
	/// Added to the submit button while a submission is in flight.
	pub loading: String,
	/// Marks the visible step container.
	pub active: String,
	/// Added to a field whose control has content.
	pub filled: String,
	/// Extra class for the failing control itself, when wanted.
	pub control_error: Option<String>,
}

impl Default for CssClasses {
	fn default() -> Self {
		Self {
			required: "--required".to_string(),
			required_if_filled: "--required-if-filled".to_string(),
			has_error: "--has-error".to_string(),
			hidden: "--hidden".to_string(),
			submitting: "--submitting".to_string(),
			loading: "--loading".to_string(),
			active: "--active".to_string(),
			filled: "--filled".to_string(),
			control_error: None,
		}
	}
}

/// Everything configurable about a form.
///
/// # Examples
///
/// ```
/// use stepform::{FormOptions, PayloadFormat};
///
/// let options = FormOptions::new("/api/subscribe")
///     .with_format(PayloadFormat::Json)
///     .on_success(|response| println!("answered with {}", response.status));
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct FormOptions {
	/// Where submissions are sent.
	pub submit_url: String,
	/// HTTP method for submissions.
	pub method: SubmitMethod,
	/// Wire format of the submission body.
	pub format: PayloadFormat,
	/// Class names shared with the document adapter.
	pub classes: CssClasses,
	/// JSON nesting applied at serialization time.
	pub field_groups: Vec<FieldGroup>,
	/// Name/value pairs appended to every payload.
	pub extra_fields: Vec<(String, String)>,
	/// Field names the serializer leaves out.
	pub serializer_ignore: Vec<String>,
	/// Extra request headers sent with every submission.
	pub request_headers: Vec<(String, String)>,
	/// Custom validation rules, grouped by kind name.
	pub rules: RuleRegistry,
	/// Validation message catalog.
	pub messages: MessageCatalog,
	/// Whether a successful submission clears the form.
	pub reset_on_success: bool,
	/// Whether a successful submission removes the busy markers. Leaving
	/// them up keeps the loader spinning through a follow-up redirect.
	pub reset_loader_on_success: bool,
	/// Whether a failed validation scrolls to the first failing field.
	pub scroll_on_error: bool,
	/// Offset in pixels applied when scrolling to a failing field.
	pub scroll_offset: i32,
	/// How long each transition phase is given.
	pub transition_duration: Duration,
	/// Skips the transition effect entirely, swapping steps instantly.
	pub disable_transitions: bool,
	/// Log instead of submitting.
	pub debug: bool,
	/// Consulted before a step change with the old and new step tokens.
	/// Returning `false` blocks the change.
	pub on_before_step_change: Option<Callback<(String, String), bool>>,
	/// Fires after a step change with the old and new step tokens.
	pub on_step_change: Option<Callback<(String, String)>>,
	/// Fires when whole-form validity flips.
	pub on_validity_change: Option<Callback<bool>>,
	/// Fires when active-step validity flips, with the step number.
	pub on_step_validity_change: Option<Callback<(bool, u32)>>,
	/// Fires when validation blocks a submission or a forward step change,
	/// with the failing names.
	pub on_validation_error: Option<Callback<Vec<String>>>,
	/// Fires when a submission is requested, before anything else.
	pub on_before_submit: Option<Callback>,
	/// Fires once a submission actually starts.
	pub on_submit_start: Option<Callback>,
	/// Fires when a submission attempt is over, whatever the outcome.
	pub on_submit_end: Option<Callback>,
	/// Fires when the target accepts a submission.
	pub on_success: Option<Callback<SubmitResponse>>,
	/// Fires when a submission is rejected or never arrives.
	pub on_error: Option<Callback<SubmitError>>,
}

impl FormOptions {
	/// Creates options targeting `submit_url`, with defaults everywhere
	/// else.
	pub fn new(submit_url: impl Into<String>) -> Self {
		Self {
			submit_url: submit_url.into(),
			method: SubmitMethod::default(),
			format: PayloadFormat::default(),
			classes: CssClasses::default(),
			field_groups: Vec::new(),
			extra_fields: Vec::new(),
			serializer_ignore: Vec::new(),
			request_headers: Vec::new(),
			rules: RuleRegistry::new(),
			messages: MessageCatalog::new(),
			reset_on_success: true,
			reset_loader_on_success: true,
			scroll_on_error: true,
			scroll_offset: 0,
			transition_duration: Duration::from_millis(200),
			disable_transitions: false,
			debug: false,
			on_before_step_change: None,
			on_step_change: None,
			on_validity_change: None,
			on_step_validity_change: None,
			on_validation_error: None,
			on_before_submit: None,
			on_submit_start: None,
			on_submit_end: None,
			on_success: None,
			on_error: None,
		}
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: SubmitMethod) -> Self {
		self.method = method;
		self
	}

	/// Sets the wire format.
	pub fn with_format(mut self, format: PayloadFormat) -> Self {
		self.format = format;
		self
	}

	/// Replaces the class names.
	pub fn with_classes(mut self, classes: CssClasses) -> Self {
		self.classes = classes;
		self
	}

	/// Adds a JSON nesting group.
	pub fn with_field_group(mut self, group: FieldGroup) -> Self {
		self.field_groups.push(group);
		self
	}

	/// Appends a fixed name/value pair to every payload.
	pub fn with_extra_field(
		mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.extra_fields.push((name.into(), value.into()));
		self
	}

	/// Keeps a field out of every payload.
	pub fn ignore_field(mut self, name: impl Into<String>) -> Self {
		self.serializer_ignore.push(name.into());
		self
	}

	/// Adds a header to every submission request.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.request_headers.push((name.into(), value.into()));
		self
	}

	/// Registers a custom rule under `kind`.
	pub fn with_rule(mut self, kind: impl Into<String>, rule: CustomRule) -> Self {
		self.rules.register(kind, rule);
		self
	}

	/// Overrides one validation message.
	pub fn with_validation_message(
		mut self,
		table: impl Into<String>,
		key: impl Into<String>,
		text: impl Into<String>,
	) -> Self {
		self.messages = self.messages.with_message(table, key, text);
		self
	}

	/// Controls whether a successful submission clears the form.
	pub fn with_reset_on_success(mut self, reset: bool) -> Self {
		self.reset_on_success = reset;
		self
	}

	/// Controls whether success removes the busy markers.
	pub fn with_reset_loader_on_success(mut self, reset: bool) -> Self {
		self.reset_loader_on_success = reset;
		self
	}

	/// Controls scrolling to the first failing field.
	pub fn with_scroll_on_error(mut self, scroll: bool) -> Self {
		self.scroll_on_error = scroll;
		self
	}

	/// Sets the scroll offset in pixels.
	pub fn with_scroll_offset(mut self, offset: i32) -> Self {
		self.scroll_offset = offset;
		self
	}

	/// Sets how long each transition phase is given.
	pub fn with_transition_duration(mut self, duration: Duration) -> Self {
		self.transition_duration = duration;
		self
	}

	/// Swaps steps instantly, skipping the transition effect.
	pub fn without_transitions(mut self) -> Self {
		self.disable_transitions = true;
		self
	}

	/// Logs the payload instead of submitting it.
	pub fn debug(mut self) -> Self {
		self.debug = true;
		self
	}

	/// Consulted before each step change with the old and new step tokens.
	/// Return `false` to keep the form on its current step.
	pub fn on_before_step_change<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &str) -> bool + Send + Sync + 'static,
	{
		self.on_before_step_change = Some(Callback::new(move |(from, to): (String, String)| {
			callback(&from, &to)
		}));
		self
	}

	/// Called after each step change with the old and new step tokens.
	pub fn on_step_change<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &str) + Send + Sync + 'static,
	{
		self.on_step_change = Some(Callback::new(move |(from, to): (String, String)| {
			callback(&from, &to)
		}));
		self
	}

	/// Called when whole-form validity flips.
	pub fn on_validity_change<F>(mut self, callback: F) -> Self
	where
		F: Fn(bool) + Send + Sync + 'static,
	{
		self.on_validity_change = Some(Callback::new(callback));
		self
	}

	/// Called when active-step validity flips.
	pub fn on_step_validity_change<F>(mut self, callback: F) -> Self
	where
		F: Fn(bool, u32) + Send + Sync + 'static,
	{
		self.on_step_validity_change =
			Some(Callback::new(move |(valid, step): (bool, u32)| {
				callback(valid, step)
			}));
		self
	}

	/// Called when validation blocks a submission or a forward step change,
	/// with the failing names.
	pub fn on_validation_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&[String]) + Send + Sync + 'static,
	{
		self.on_validation_error =
			Some(Callback::new(move |names: Vec<String>| callback(&names)));
		self
	}

	/// Called when a submission is requested, before anything else runs.
	pub fn on_before_submit<F>(mut self, callback: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.on_before_submit = Some(Callback::new(move |()| callback()));
		self
	}

	/// Called once a submission actually starts.
	pub fn on_submit_start<F>(mut self, callback: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.on_submit_start = Some(Callback::new(move |()| callback()));
		self
	}

	/// Called when a submission attempt is over, whatever the outcome.
	pub fn on_submit_end<F>(mut self, callback: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.on_submit_end = Some(Callback::new(move |()| callback()));
		self
	}

	/// Called when the target accepts a submission.
	pub fn on_success<F>(mut self, callback: F) -> Self
	where
		F: Fn(SubmitResponse) + Send + Sync + 'static,
	{
		self.on_success = Some(Callback::new(callback));
		self
	}

	/// Called when a submission is rejected or never arrives.
	pub fn on_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(SubmitError) + Send + Sync + 'static,
	{
		self.on_error = Some(Callback::new(callback));
		self
	}
}
