//! Host document abstraction.
//!
//! The engine never touches a real DOM. Everything it needs from the host
//! page goes through [`FormDocument`]: discovering field containers,
//! reading live control values, and applying the visual side effects of
//! validation and navigation. Browser adapters implement the trait against
//! their widget tree; [`MemoryDocument`] implements it in memory so the
//! whole engine runs under plain tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{FormError, FormResult};
use crate::field::FieldDescriptor;
use crate::options::CssClasses;
use crate::step::StepToken;

/// A file attached to a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
	/// File name as reported by the host.
	pub name: String,
	/// File size in bytes.
	pub size_bytes: u64,
}

/// Shared handle to a document collaborator.
///
/// The engine and the embedding host both hold the document, so it travels
/// behind an `Arc<Mutex<_>>`. Locks are short-lived; the engine never holds
/// one across an await point.
pub type SharedDocument = Arc<Mutex<dyn FormDocument>>;

/// Locks a shared document, recovering from a poisoned mutex.
pub(crate) fn lock_document(document: &SharedDocument) -> MutexGuard<'_, dyn FormDocument + 'static> {
	document.lock().unwrap_or_else(|e| e.into_inner())
}

/// Operations the engine needs from the host page.
///
/// Mutating methods mirror the visual contract: error markers imply the
/// error class, the accessibility-invalid attribute, and the revealed
/// message element; step activation implies the configured active class.
/// How an adapter realizes them is its own business.
pub trait FormDocument: Send {
	/// Discovers the form's field containers in document order.
	///
	/// `classes` carries the configured marker class names an adapter
	/// should look for. A container without a form control fails with
	/// [`FormError::ControlNotFound`]; a control without a name fails with
	/// [`FormError::ControlNameNotFound`]. Both are fatal.
	fn scan_fields(&self, classes: &CssClasses) -> FormResult<Vec<FieldDescriptor>>;

	/// Step containers in document order. Empty for a stepless form.
	fn steps(&self) -> Vec<StepToken>;

	/// The step container currently marked active, if any.
	fn active_step(&self) -> Option<StepToken>;

	/// Whether the form owns a submit control.
	fn has_submit_control(&self) -> bool;

	/// Live value of the named control.
	fn value(&self, field: &str) -> Option<String>;

	/// Whether the named single checkbox is ticked.
	fn is_checked(&self, field: &str) -> bool;

	/// Values of the checked options in the named choice group.
	fn checked_values(&self, field: &str) -> Vec<String>;

	/// File attached to the named file input.
	fn file_info(&self, field: &str) -> Option<FileInfo>;

	/// Marks the named field errored and reveals `message`.
	fn set_field_error(&mut self, field: &str, message: &str);

	/// Clears the error marker of the named field.
	fn clear_field_error(&mut self, field: &str);

	/// Toggles the active state of a step container.
	fn set_step_active(&mut self, step: StepToken, active: bool);

	/// Toggles the submitting state on the form and its submit control.
	fn set_submitting(&mut self, active: bool);

	/// Clears every control value, ticked option, and attached file.
	fn clear_values(&mut self);

	/// Brings the named field into view, offset by `offset` pixels.
	fn scroll_to_field(&mut self, field: &str, offset: i32);
}

#[derive(Debug)]
enum MemoryEntry {
	Field(MemoryField),
	MissingControl,
	UnnamedControl,
}

#[derive(Debug)]
struct MemoryField {
	descriptor: FieldDescriptor,
	value: String,
	checked: bool,
	checked_values: Vec<String>,
	file: Option<FileInfo>,
	error: Option<String>,
}

/// In-memory [`FormDocument`] used by tests and examples.
///
/// The builder methods script what a real page would contain; the runtime
/// mutators simulate a user typing, ticking, and attaching files.
///
/// # Examples
///
/// ```
/// use stepform::{FieldDescriptor, MemoryDocument, StepToken};
///
/// let mut document = MemoryDocument::new()
///     .with_step(StepToken::main(1))
///     .with_step(StepToken::main(2))
///     .with_active_step(StepToken::main(1))
///     .with_field(FieldDescriptor::new("name").required().on_step(StepToken::main(1)));
///
/// document.set_value("name", "Ada");
/// ```
#[derive(Debug)]
pub struct MemoryDocument {
	entries: Vec<MemoryEntry>,
	steps: Vec<StepToken>,
	active: Option<StepToken>,
	has_submit: bool,
	submitting: bool,
	scrolled: Vec<(String, i32)>,
}

impl MemoryDocument {
	/// Creates an empty document with a submit control and no steps.
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			steps: Vec::new(),
			active: None,
			has_submit: true,
			submitting: false,
			scrolled: Vec::new(),
		}
	}

	/// Declares a step container. Order of calls is document order.
	pub fn with_step(mut self, token: StepToken) -> Self {
		self.steps.push(token);
		self
	}

	/// Marks a declared step container active.
	pub fn with_active_step(mut self, token: StepToken) -> Self {
		self.active = Some(token);
		self
	}

	/// Declares a field container. Order of calls is document order.
	pub fn with_field(mut self, descriptor: FieldDescriptor) -> Self {
		self.entries.push(MemoryEntry::Field(MemoryField {
			descriptor,
			value: String::new(),
			checked: false,
			checked_values: Vec::new(),
			file: None,
			error: None,
		}));
		self
	}

	/// Declares a field container holding no control.
	pub fn with_missing_control(mut self) -> Self {
		self.entries.push(MemoryEntry::MissingControl);
		self
	}

	/// Declares a field container whose control has no name attribute.
	pub fn with_unnamed_control(mut self) -> Self {
		self.entries.push(MemoryEntry::UnnamedControl);
		self
	}

	/// Removes the submit control.
	pub fn without_submit_control(mut self) -> Self {
		self.has_submit = false;
		self
	}

	/// Sets the live value of a control.
	pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
		if let Some(entry) = self.field_mut(field) {
			entry.value = value.into();
		}
	}

	/// Ticks or unticks a single checkbox.
	pub fn set_checked(&mut self, field: &str, checked: bool) {
		if let Some(entry) = self.field_mut(field) {
			entry.checked = checked;
		}
	}

	/// Replaces the checked option values of a choice group.
	pub fn set_checked_values(&mut self, field: &str, values: Vec<String>) {
		if let Some(entry) = self.field_mut(field) {
			entry.checked_values = values;
		}
	}

	/// Attaches a file to a file input.
	pub fn attach_file(&mut self, field: &str, name: impl Into<String>, size_bytes: u64) {
		if let Some(entry) = self.field_mut(field) {
			entry.file = Some(FileInfo {
				name: name.into(),
				size_bytes,
			});
		}
	}

	/// Error message currently shown on a field, if any.
	pub fn error_message(&self, field: &str) -> Option<String> {
		self.field(field).and_then(|entry| entry.error.clone())
	}

	/// Whether a field is currently marked errored.
	pub fn has_error(&self, field: &str) -> bool {
		self.field(field).is_some_and(|entry| entry.error.is_some())
	}

	/// Whether any field is currently marked errored.
	pub fn has_any_error(&self) -> bool {
		self.entries.iter().any(|entry| match entry {
			MemoryEntry::Field(field) => field.error.is_some(),
			_ => false,
		})
	}

	/// Whether the form is in its submitting state.
	pub fn is_submitting(&self) -> bool {
		self.submitting
	}

	/// Fields scrolled into view, in order, with their offsets.
	pub fn scroll_log(&self) -> &[(String, i32)] {
		&self.scrolled
	}

	fn field(&self, name: &str) -> Option<&MemoryField> {
		self.entries.iter().find_map(|entry| match entry {
			MemoryEntry::Field(field) if field.descriptor.name == name => Some(field),
			_ => None,
		})
	}

	fn field_mut(&mut self, name: &str) -> Option<&mut MemoryField> {
		self.entries.iter_mut().find_map(|entry| match entry {
			MemoryEntry::Field(field) if field.descriptor.name == name => Some(field),
			_ => None,
		})
	}
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl FormDocument for MemoryDocument {
	// The builder scripts scan results directly, so the class vocabulary
	// real adapters consult is not needed here.
	fn scan_fields(&self, _classes: &CssClasses) -> FormResult<Vec<FieldDescriptor>> {
		self.entries
			.iter()
			.map(|entry| match entry {
				MemoryEntry::Field(field) => Ok(field.descriptor.clone()),
				MemoryEntry::MissingControl => Err(FormError::ControlNotFound),
				MemoryEntry::UnnamedControl => Err(FormError::ControlNameNotFound),
			})
			.collect()
	}

	fn steps(&self) -> Vec<StepToken> {
		self.steps.clone()
	}

	fn active_step(&self) -> Option<StepToken> {
		self.active
	}

	fn has_submit_control(&self) -> bool {
		self.has_submit
	}

	fn value(&self, field: &str) -> Option<String> {
		self.field(field).map(|entry| entry.value.clone())
	}

	fn is_checked(&self, field: &str) -> bool {
		self.field(field).is_some_and(|entry| entry.checked)
	}

	fn checked_values(&self, field: &str) -> Vec<String> {
		self.field(field)
			.map(|entry| entry.checked_values.clone())
			.unwrap_or_default()
	}

	fn file_info(&self, field: &str) -> Option<FileInfo> {
		self.field(field).and_then(|entry| entry.file.clone())
	}

	fn set_field_error(&mut self, field: &str, message: &str) {
		if let Some(entry) = self.field_mut(field) {
			entry.error = Some(message.to_string());
		}
	}

	fn clear_field_error(&mut self, field: &str) {
		if let Some(entry) = self.field_mut(field) {
			entry.error = None;
		}
	}

	fn set_step_active(&mut self, step: StepToken, active: bool) {
		if active {
			self.active = Some(step);
		} else if self.active == Some(step) {
			self.active = None;
		}
	}

	fn set_submitting(&mut self, active: bool) {
		self.submitting = active;
	}

	fn clear_values(&mut self) {
		for entry in &mut self.entries {
			if let MemoryEntry::Field(field) = entry {
				field.value.clear();
				field.checked = false;
				field.checked_values.clear();
				field.file = None;
			}
		}
	}

	fn scroll_to_field(&mut self, field: &str, offset: i32) {
		self.scrolled.push((field.to_string(), offset));
	}
}
