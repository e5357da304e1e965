//! The form engine.
//!
//! [`Form`] ties a document adapter to the navigation, validity, and
//! submission machinery. It owns the scanned field list, the step
//! navigator, and the validity tracker, and drives the transport and
//! transition collaborators. All mutation of the underlying document goes
//! through short-lived locks; the lock is never held across an await.

use std::fmt;

use crate::document::{SharedDocument, lock_document};
use crate::error::{FormError, FormResult};
use crate::field::FieldDescriptor;
use crate::options::FormOptions;
use crate::serialize::{Payload, build_payload, collect_pairs};
use crate::step::{StepNavigator, StepTarget, StepToken};
use crate::transition::{NoTransition, TransitionEffect};
use crate::transport::{HttpTransport, SubmitError, SubmitRequest, Transport};
use crate::validator::{FieldOutcome, evaluate, snapshot_field};
use crate::validity::ValidityTracker;

/// Result of one validation sweep.
struct SweepOutcome {
	/// Names of failing fields, in document order.
	invalid: Vec<String>,
	/// Whether every field of the active step passed.
	step_valid: bool,
}

impl SweepOutcome {
	fn form_valid(&self) -> bool {
		self.invalid.is_empty()
	}
}

/// A form bound to a document, ready to validate, navigate, and submit.
///
/// Construction scans the document for fields and steps, then runs a
/// silent validation sweep to settle the validity flags; when required
/// fields start out empty, that sweep is where the first validity
/// callbacks fire.
///
/// # Examples
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
///
/// use stepform::{FieldDescriptor, Form, FormOptions, MemoryDocument, SharedDocument};
///
/// # async fn demo() -> Result<(), stepform::FormError> {
/// let document = MemoryDocument::new()
///     .with_field(FieldDescriptor::new("email").with_kind("email").required());
/// let shared: SharedDocument = Arc::new(Mutex::new(document));
///
/// let mut form = Form::new(shared, FormOptions::new("/api/subscribe")).await?;
/// if form.submit().await? {
///     println!("accepted");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Form {
	document: SharedDocument,
	options: FormOptions,
	fields: Vec<FieldDescriptor>,
	navigator: Option<StepNavigator>,
	validity: ValidityTracker,
	transport: Box<dyn Transport>,
	transition: Box<dyn TransitionEffect>,
}

impl fmt::Debug for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Form")
			.field("fields", &self.fields.len())
			.field("navigator", &self.navigator)
			.field("validity", &self.validity)
			.finish_non_exhaustive()
	}
}

impl Form {
	/// Binds a form to `document` with the default HTTP transport and no
	/// transition effect.
	///
	/// Fails with [`FormError::MissingSubmitControl`] when the document has
	/// no submit control, and with [`FormError::MissingSubmitTarget`] when
	/// neither a submit URL nor debug mode was configured.
	pub async fn new(document: SharedDocument, options: FormOptions) -> FormResult<Self> {
		Self::with_collaborators(
			document,
			options,
			Box::new(HttpTransport::new()),
			Box::new(NoTransition),
		)
		.await
	}

	/// Binds a form with explicit transport and transition collaborators.
	pub async fn with_collaborators(
		document: SharedDocument,
		options: FormOptions,
		transport: Box<dyn Transport>,
		transition: Box<dyn TransitionEffect>,
	) -> FormResult<Self> {
		let (fields, navigator) = {
			let doc = lock_document(&document);
			if !doc.has_submit_control() {
				return Err(FormError::MissingSubmitControl);
			}
			if options.submit_url.is_empty() && !options.debug {
				return Err(FormError::MissingSubmitTarget);
			}
			let fields = doc.scan_fields(&options.classes)?;
			// Without an active marker the form behaves steplessly.
			let navigator = doc.active_step().map(StepNavigator::new);
			(fields, navigator)
		};

		tracing::debug!(
			fields = fields.len(),
			stepped = navigator.is_some(),
			"form initialized"
		);

		let mut form = Self {
			document,
			options,
			fields,
			navigator,
			validity: ValidityTracker::new(),
			transport,
			transition,
		};

		// Opening sweep: settle both flags against the starting values.
		let scoped = form.scoped_fields();
		let outcome = form.sweep_fields(&scoped, false).await;
		form.record_form_validity(outcome.form_valid());
		form.record_step_validity(outcome.step_valid);

		Ok(form)
	}

	// =========================================================================
	// Validation
	// =========================================================================

	/// Silently revalidates every field up to the highest visited step and
	/// refreshes both validity flags.
	///
	/// No error UI is touched, so this is safe to call after programmatic
	/// value changes. Returns the whole-form validity.
	pub async fn validate_all_fields(&mut self) -> bool {
		let scoped = self.scoped_fields();
		let outcome = self.sweep_fields(&scoped, false).await;
		self.record_form_validity(outcome.form_valid());
		self.record_step_validity(outcome.step_valid);
		outcome.form_valid()
	}

	/// Validates one field visibly, then silently refreshes both validity
	/// flags.
	///
	/// Fails with [`FormError::UnknownField`] when `name` was not found by
	/// the last scan.
	pub async fn validate_field(&mut self, name: &str) -> FormResult<bool> {
		let field = self
			.fields
			.iter()
			.find(|field| field.name == name)
			.cloned()
			.ok_or_else(|| FormError::UnknownField(name.to_string()))?;

		let outcome = self.evaluate_field(&field).await;
		self.apply_outcome(&field, &outcome);

		let scoped = self.scoped_fields();
		let sweep = self.sweep_fields(&scoped, false).await;
		self.record_form_validity(sweep.form_valid());
		self.record_step_validity(sweep.step_valid);

		Ok(outcome.is_pass())
	}

	/// Runs every field in `fields` through the validator, in order.
	///
	/// In visible mode each outcome is written back to the document as an
	/// error marker or a cleared one; silent mode leaves the UI alone.
	async fn sweep_fields(&self, fields: &[FieldDescriptor], visible: bool) -> SweepOutcome {
		let current = self.navigator.as_ref().map(StepNavigator::current);
		let mut outcome = SweepOutcome {
			invalid: Vec::new(),
			step_valid: true,
		};

		for field in fields {
			let result = self.evaluate_field(field).await;
			if visible {
				self.apply_outcome(field, &result);
			}
			if result.is_pass() {
				continue;
			}
			outcome.invalid.push(field.name.clone());
			let on_active_step = match (current, field.step) {
				(Some(step), Some(field_step)) => field_step == step,
				// A stepless form has a single implicit step.
				(None, _) => true,
				(Some(_), None) => false,
			};
			if on_active_step {
				outcome.step_valid = false;
			}
		}

		outcome
	}

	/// Reads the field's current state under the lock, then evaluates the
	/// rule chain without holding it, so custom rules may take their time.
	async fn evaluate_field(&self, field: &FieldDescriptor) -> FieldOutcome {
		let snapshot = {
			let doc = lock_document(&self.document);
			snapshot_field(&*doc, field)
		};
		evaluate(field, &snapshot, &self.options.rules, &self.options.messages).await
	}

	fn apply_outcome(&self, field: &FieldDescriptor, outcome: &FieldOutcome) {
		let mut doc = lock_document(&self.document);
		match outcome {
			FieldOutcome::Pass => doc.clear_field_error(&field.name),
			FieldOutcome::Fail { message } => doc.set_field_error(&field.name, message),
		}
	}

	/// Fields inside the validation scope: everything up to the highest
	/// visited step, optional branches only when actually entered.
	fn scoped_fields(&self) -> Vec<FieldDescriptor> {
		let Some(navigator) = &self.navigator else {
			return self.fields.clone();
		};
		self.fields
			.iter()
			.filter(|field| field.step.is_none_or(|step| navigator.in_scope(step)))
			.cloned()
			.collect()
	}

	/// Fields sitting on the active step.
	fn active_step_fields(&self) -> Vec<FieldDescriptor> {
		let Some(navigator) = &self.navigator else {
			return self.fields.clone();
		};
		let current = navigator.current();
		self.fields
			.iter()
			.filter(|field| field.step == Some(current))
			.cloned()
			.collect()
	}

	fn record_form_validity(&mut self, valid: bool) {
		if let Some(flipped) = self.validity.record_form(valid)
			&& let Some(callback) = &self.options.on_validity_change
		{
			callback.call(flipped);
		}
	}

	/// Records step validity against the active step. On a stepless form
	/// the flag is tracked but the callback never fires.
	fn record_step_validity(&mut self, valid: bool) {
		let step = self
			.navigator
			.as_ref()
			.map(|navigator| navigator.current().base());
		if let Some(flipped) = self.validity.record_step(valid)
			&& let Some(step) = step
			&& let Some(callback) = &self.options.on_step_validity_change
		{
			callback.call((flipped, step));
		}
	}

	// =========================================================================
	// Navigation
	// =========================================================================

	/// Moves forward one step, validating the active step first.
	///
	/// Returns whether the step changed.
	pub async fn next_step(&mut self) -> bool {
		self.change_step(StepTarget::Next).await
	}

	/// Moves back one step without validation. From an optional branch this
	/// returns to the branch's own base step.
	pub async fn prev_step(&mut self) -> bool {
		self.change_step(StepTarget::Prev).await
	}

	/// Enters the optional branch of the active step, validating the
	/// active step first.
	pub async fn optional_step(&mut self) -> bool {
		self.change_step(StepTarget::Optional).await
	}

	/// Drives one transition attempt toward `target`.
	///
	/// Returns `false` when the form is stepless, another transition is in
	/// flight, the target resolves to the current token, the gate callback
	/// or the active step's validation rejects the move, or the target
	/// container does not exist.
	pub async fn change_step(&mut self, target: StepTarget) -> bool {
		self.navigate(target, true).await
	}

	async fn navigate(&mut self, target: StepTarget, sweep_on_arrival: bool) -> bool {
		// Single-slot transition lock; every exit path below releases it.
		let current = {
			let Some(navigator) = self.navigator.as_mut() else {
				return false;
			};
			if !navigator.begin_transition() {
				return false;
			}
			navigator.current()
		};
		let resolved = target.resolve(current);

		// Re-entering the optional branch replays its transition; any
		// other same-token target is dropped.
		if resolved == current && !current.is_optional() {
			self.end_navigation();
			return false;
		}

		if let Some(gate) = &self.options.on_before_step_change
			&& !gate.call((current.to_string(), resolved.to_string()))
		{
			self.end_navigation();
			return false;
		}

		if target.validates() {
			let fields = self.active_step_fields();
			let outcome = self.sweep_fields(&fields, true).await;
			self.record_step_validity(outcome.step_valid);
			if !outcome.form_valid() {
				// A failing active step keeps the whole form invalid.
				self.record_form_validity(false);
				tracing::debug!(fields = ?outcome.invalid, "step change blocked by validation");
				if let Some(callback) = &self.options.on_validation_error {
					callback.call(outcome.invalid);
				}
				self.end_navigation();
				return false;
			}
		}

		let containers_exist = {
			let doc = lock_document(&self.document);
			let steps = doc.steps();
			steps.contains(&current) && steps.contains(&resolved)
		};
		if !containers_exist {
			self.end_navigation();
			return false;
		}

		let duration = self.options.transition_duration;
		if !self.options.disable_transitions {
			self.transition.leave(current, duration).await;
		}
		{
			let mut doc = lock_document(&self.document);
			doc.set_step_active(current, false);
			doc.set_step_active(resolved, true);
		}
		if !self.options.disable_transitions {
			self.transition.enter(resolved, duration).await;
		}

		if let Some(navigator) = self.navigator.as_mut() {
			navigator.apply(resolved);
			navigator.finish_transition();
		}

		if let Some(callback) = &self.options.on_step_change {
			callback.call((current.to_string(), resolved.to_string()));
		}

		if sweep_on_arrival {
			// The entered step joins the validation scope; settle the
			// whole-form flag against it without touching the error UI.
			// Step validity keeps the value recorded at departure.
			let scoped = self.scoped_fields();
			let outcome = self.sweep_fields(&scoped, false).await;
			self.record_form_validity(outcome.form_valid());
		}

		true
	}

	fn end_navigation(&mut self) {
		if let Some(navigator) = self.navigator.as_mut() {
			navigator.finish_transition();
		}
	}

	// =========================================================================
	// Submission
	// =========================================================================

	/// Runs the full submission pipeline.
	///
	/// Every field up to the highest visited step is validated visibly;
	/// failures surface through the validation-error callback and abort
	/// before any network activity. In debug mode the serialized payload
	/// is logged and the attempt counts as accepted without touching the
	/// network.
	///
	/// Returns `Ok(true)` when the target accepted the submission,
	/// `Ok(false)` when validation or the target rejected it, and an error
	/// only when the payload could not be encoded.
	pub async fn submit(&mut self) -> FormResult<bool> {
		if let Some(callback) = &self.options.on_before_submit {
			callback.call(());
		}
		self.start_submitting();

		let scoped = self.scoped_fields();
		let outcome = self.sweep_fields(&scoped, true).await;
		self.record_form_validity(outcome.form_valid());
		self.record_step_validity(outcome.step_valid);

		if !outcome.form_valid() {
			tracing::debug!(fields = ?outcome.invalid, "submission blocked by validation");
			self.finish_submitting(true);
			if let Some(callback) = &self.options.on_validation_error {
				callback.call(outcome.invalid.clone());
			}
			if self.options.scroll_on_error
				&& let Some(first) = outcome.invalid.first()
			{
				let mut doc = lock_document(&self.document);
				doc.scroll_to_field(first, self.options.scroll_offset);
			}
			return Ok(false);
		}

		let payload = match self.payload() {
			Ok(payload) => payload,
			Err(error) => {
				self.finish_submitting(true);
				return Err(error);
			}
		};

		if self.options.debug {
			tracing::info!(payload = %payload_preview(&payload), "debug mode, submission skipped");
			self.finish_submitting(true);
			return Ok(true);
		}

		let request = SubmitRequest {
			url: self.options.submit_url.clone(),
			method: self.options.method,
			headers: self.options.request_headers.clone(),
			payload,
		};

		let accepted = match self.transport.send(request).await {
			Ok(response) if response.is_success() => {
				if self.options.reset_on_success {
					self.reset().await;
				}
				if let Some(callback) = &self.options.on_success {
					callback.call(response);
				}
				true
			}
			Ok(response) => {
				if let Some(callback) = &self.options.on_error {
					callback.call(SubmitError::Rejected { response });
				}
				false
			}
			Err(error) => {
				if let Some(callback) = &self.options.on_error {
					callback.call(SubmitError::Transport(error));
				}
				false
			}
		};

		self.finish_submitting(false);
		Ok(accepted)
	}

	/// Serializes the current field values in the configured format.
	pub fn payload(&self) -> FormResult<Payload> {
		let pairs = {
			let doc = lock_document(&self.document);
			collect_pairs(&*doc, &self.fields, &self.options.serializer_ignore)
		};
		build_payload(
			pairs,
			self.options.format,
			&self.options.field_groups,
			&self.options.extra_fields,
		)
	}

	fn start_submitting(&self) {
		{
			let mut doc = lock_document(&self.document);
			doc.set_submitting(true);
		}
		if let Some(callback) = &self.options.on_submit_start {
			callback.call(());
		}
	}

	/// Leaves the busy state. Without `force`, the visual markers stay up
	/// when the form is configured to keep its loader after success; the
	/// submit-end callback fires either way.
	fn finish_submitting(&self, force: bool) {
		if self.options.reset_loader_on_success || force {
			let mut doc = lock_document(&self.document);
			doc.set_submitting(false);
		}
		if let Some(callback) = &self.options.on_submit_end {
			callback.call(());
		}
	}

	// =========================================================================
	// Housekeeping
	// =========================================================================

	/// Clears every value and error marker, returns to step 1, drops the
	/// high-water mark, and restores the validity baseline without firing
	/// callbacks.
	pub async fn reset(&mut self) {
		{
			let mut doc = lock_document(&self.document);
			doc.clear_values();
			for field in &self.fields {
				doc.clear_field_error(&field.name);
			}
		}

		if self.navigator.is_some() {
			self.navigate(StepTarget::Exact(1), false).await;
		}
		if let Some(navigator) = self.navigator.as_mut() {
			navigator.reset_high_water();
		}

		// Back to the constructed baseline; the next sweep re-fires edges.
		self.validity.reset();
	}

	/// Rescans the document for fields and refreshes both validity flags.
	///
	/// Call after adding or removing field containers at runtime.
	pub async fn refresh(&mut self) -> FormResult<()> {
		let fields = {
			let doc = lock_document(&self.document);
			doc.scan_fields(&self.options.classes)?
		};
		self.fields = fields;
		self.validate_all_fields().await;
		Ok(())
	}

	// =========================================================================
	// Accessors
	// =========================================================================

	/// The active step token, or `None` for a stepless form.
	pub fn current_step(&self) -> Option<StepToken> {
		self.navigator.as_ref().map(StepNavigator::current)
	}

	/// Forward high-water mark, or `None` for a stepless form.
	pub fn highest_visited_step(&self) -> Option<u32> {
		self.navigator.as_ref().map(StepNavigator::highest_visited)
	}

	/// Whether a transition is currently in flight.
	pub fn is_step_changing(&self) -> bool {
		self.navigator
			.as_ref()
			.is_some_and(StepNavigator::is_step_changing)
	}

	/// Whether the form has step navigation.
	pub fn has_steps(&self) -> bool {
		self.navigator.is_some()
	}

	/// Whole-form validity as of the last sweep.
	pub fn is_valid(&self) -> bool {
		self.validity.form_valid()
	}

	/// Active-step validity as of the last recording.
	pub fn is_current_step_valid(&self) -> bool {
		self.validity.step_valid()
	}

	/// Fields discovered by the last scan, in document order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}
}

fn payload_preview(payload: &Payload) -> String {
	match payload {
		Payload::UrlEncoded(encoded) => encoded.clone(),
		Payload::Json(value) => value.to_string(),
	}
}
