//! Error message catalog with per-field and per-kind overrides.
//!
//! Messages are resolved through three tables in order: the field's own
//! name, the field's declared kind name, then the `default` table. Length
//! and size messages carry a `[[var]]` placeholder filled with the bound
//! at resolution time.

use std::collections::HashMap;

/// Placeholder replaced with the concrete bound in templated messages.
pub const MESSAGE_VAR: &str = "[[var]]";

/// Lookup keys used by the built-in rules.
pub mod keys {
	pub const EMPTY: &str = "empty";
	pub const INVALID: &str = "invalid";
	pub const MIN_LENGTH: &str = "min_length";
	pub const MAX_LENGTH: &str = "max_length";
	pub const UNEQUAL: &str = "unequal";
	pub const MIN_SIZE: &str = "min_size";
	pub const MAX_SIZE: &str = "max_size";
}

/// Table of validation messages keyed by field name or kind name.
///
/// # Examples
///
/// ```
/// use stepform::MessageCatalog;
///
/// let catalog = MessageCatalog::new()
///     .with_message("email", "invalid", "That address does not look right");
///
/// assert_eq!(
///     catalog.resolve("contact_email", "email", "invalid", None),
///     "That address does not look right",
/// );
/// assert_eq!(
///     catalog.resolve("name", "text", "empty", None),
///     "This field is required",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MessageCatalog {
	tables: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
	/// Creates a catalog holding the default messages.
	pub fn new() -> Self {
		let mut tables: HashMap<String, HashMap<String, String>> = HashMap::new();

		let mut default = HashMap::new();
		default.insert(keys::EMPTY.to_string(), "This field is required".to_string());
		default.insert(
			keys::MIN_LENGTH.to_string(),
			format!("Enter at least {MESSAGE_VAR} characters"),
		);
		default.insert(
			keys::MAX_LENGTH.to_string(),
			format!("Enter at most {MESSAGE_VAR} characters"),
		);
		default.insert(keys::INVALID.to_string(), "Enter a valid value".to_string());
		tables.insert("default".to_string(), default);

		let mut email = HashMap::new();
		email.insert(
			keys::INVALID.to_string(),
			"Enter a valid email address".to_string(),
		);
		tables.insert("email".to_string(), email);

		let mut url = HashMap::new();
		url.insert(keys::INVALID.to_string(), "Enter a valid URL".to_string());
		tables.insert("url".to_string(), url);

		let cuit = HashMap::from([(
			keys::INVALID.to_string(),
			"Enter a valid CUIT or CUIL number".to_string(),
		)]);
		tables.insert("cuit".to_string(), cuit.clone());
		tables.insert("cuil".to_string(), cuit);

		let mut password_repeat = HashMap::new();
		password_repeat.insert(
			keys::UNEQUAL.to_string(),
			"Passwords do not match".to_string(),
		);
		tables.insert("password-repeat".to_string(), password_repeat);

		let mut file = HashMap::new();
		file.insert(
			keys::EMPTY.to_string(),
			"You must attach a file".to_string(),
		);
		file.insert(
			keys::MIN_SIZE.to_string(),
			format!("The minimum file size is {MESSAGE_VAR}"),
		);
		file.insert(
			keys::MAX_SIZE.to_string(),
			format!("The maximum file size is {MESSAGE_VAR}"),
		);
		tables.insert("file".to_string(), file);

		Self { tables }
	}

	/// Sets one message, overriding any default.
	///
	/// `table` is a field name or kind name; `key` is one of the lookup
	/// keys in [`keys`].
	pub fn with_message(
		mut self,
		table: impl Into<String>,
		key: impl Into<String>,
		text: impl Into<String>,
	) -> Self {
		self.tables
			.entry(table.into())
			.or_default()
			.insert(key.into(), text.into());
		self
	}

	/// Resolves a message for `field`/`kind` under `key`, filling the
	/// `[[var]]` placeholder with `var` when present. Unknown keys resolve
	/// to an empty string.
	pub fn resolve(&self, field: &str, kind: &str, key: &str, var: Option<&str>) -> String {
		let template = self
			.lookup(field, key)
			.or_else(|| self.lookup(kind, key))
			.or_else(|| self.lookup("default", key))
			.unwrap_or_default();
		match var {
			Some(value) => template.replace(MESSAGE_VAR, value),
			None => template.to_string(),
		}
	}

	fn lookup(&self, table: &str, key: &str) -> Option<&str> {
		self.tables.get(table)?.get(key).map(String::as_str)
	}
}

impl Default for MessageCatalog {
	fn default() -> Self {
		Self::new()
	}
}
