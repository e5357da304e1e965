//! Field descriptors and the closed set of validated field kinds.

use crate::step::StepToken;

/// Validation behavior attached to a field.
///
/// The kind is resolved once at scan time from the declared type string;
/// the engine dispatches on the variant, never on the raw string. Unknown
/// declarations land in [`FieldKind::Other`] and still participate in
/// custom-rule lookup through their declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
	/// Free text, no kind-specific checks.
	Text,
	/// Email address syntax.
	Email,
	/// Web address with optional scheme.
	Url,
	/// Argentine tax identifier with mod-11 check digit.
	CuitCuil,
	/// Monetary amount entered next to a currency symbol.
	Money,
	/// A lone checkbox that must be ticked.
	SingleCheckbox,
	/// A radio or checkbox group where at least one option must be picked.
	MultiChoice,
	/// Must match the live value of the field named `password`.
	PasswordRepeat,
	/// File input with optional size bounds in megabytes.
	File,
	/// Any other declared kind; validated only by registered custom rules.
	Other(String),
}

impl FieldKind {
	/// Maps a declared type string to its kind.
	///
	/// # Examples
	///
	/// ```
	/// use stepform::FieldKind;
	///
	/// assert_eq!(FieldKind::from_name("email"), FieldKind::Email);
	/// assert_eq!(FieldKind::from_name("cuil"), FieldKind::CuitCuil);
	/// assert_eq!(FieldKind::from_name("radio"), FieldKind::MultiChoice);
	/// assert_eq!(
	///     FieldKind::from_name("rut"),
	///     FieldKind::Other("rut".to_string()),
	/// );
	/// ```
	pub fn from_name(name: &str) -> Self {
		match name {
			"" | "text" => FieldKind::Text,
			"email" => FieldKind::Email,
			"url" => FieldKind::Url,
			"cuit" | "cuil" => FieldKind::CuitCuil,
			"money" => FieldKind::Money,
			"single-checkbox" => FieldKind::SingleCheckbox,
			"radio" | "checkbox" => FieldKind::MultiChoice,
			"password-repeat" => FieldKind::PasswordRepeat,
			"file" => FieldKind::File,
			other => FieldKind::Other(other.to_string()),
		}
	}
}

/// Everything the scanner learned about one field container.
///
/// Descriptors hold declared attributes only. Live values are read from the
/// document at validation time, never cached here.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
	/// Control name, unique within the form for anything but choice groups.
	pub name: String,
	/// Resolved validation kind.
	pub kind: FieldKind,
	/// Raw declared kind string, used for custom-rule lookup.
	pub kind_name: String,
	/// Field must hold a value.
	pub required: bool,
	/// Field is validated only once it holds a value.
	pub required_if_filled: bool,
	/// Minimum value length in characters.
	pub min_length: Option<usize>,
	/// Maximum value length in characters.
	pub max_length: Option<usize>,
	/// Minimum file size in megabytes.
	pub min_size: Option<f64>,
	/// Maximum file size in megabytes.
	pub max_size: Option<f64>,
	/// Currency symbol shown beside a money input.
	pub currency: String,
	/// Enclosing step container, when the form has steps.
	pub step: Option<StepToken>,
}

impl FieldDescriptor {
	/// Creates a plain text descriptor with the given control name.
	///
	/// # Examples
	///
	/// ```
	/// use stepform::{FieldDescriptor, FieldKind};
	///
	/// let field = FieldDescriptor::new("email").with_kind("email").required();
	/// assert_eq!(field.kind, FieldKind::Email);
	/// assert!(field.required);
	/// ```
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: FieldKind::Text,
			kind_name: "text".to_string(),
			required: false,
			required_if_filled: false,
			min_length: None,
			max_length: None,
			min_size: None,
			max_size: None,
			currency: "$".to_string(),
			step: None,
		}
	}

	/// Sets the declared kind from its type string.
	pub fn with_kind(mut self, kind_name: impl Into<String>) -> Self {
		let kind_name = kind_name.into();
		self.kind = FieldKind::from_name(&kind_name);
		self.kind_name = kind_name;
		self
	}

	/// Marks the field required.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Marks the field required-if-filled.
	pub fn required_if_filled(mut self) -> Self {
		self.required_if_filled = true;
		self
	}

	/// Sets the minimum length in characters.
	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.min_length = Some(min_length);
		self
	}

	/// Sets the maximum length in characters.
	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	/// Sets the minimum file size in megabytes.
	pub fn with_min_size(mut self, min_size: f64) -> Self {
		self.min_size = Some(min_size);
		self
	}

	/// Sets the maximum file size in megabytes.
	pub fn with_max_size(mut self, max_size: f64) -> Self {
		self.max_size = Some(max_size);
		self
	}

	/// Sets the currency symbol for money fields.
	pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
		self.currency = currency.into();
		self
	}

	/// Places the field inside the step container `token`.
	///
	/// # Examples
	///
	/// ```
	/// use stepform::{FieldDescriptor, StepToken};
	///
	/// let field = FieldDescriptor::new("city").on_step(StepToken::main(2));
	/// assert_eq!(field.step, Some(StepToken::main(2)));
	/// ```
	pub fn on_step(mut self, token: StepToken) -> Self {
		self.step = Some(token);
		self
	}
}
