//! Error types shared across the crate.
//!
//! Configuration problems are fatal and surface as [`FormError`] from the
//! operation that detected them, usually construction or [`refresh`]. Field
//! validation failures are ordinary data and never appear here; they travel
//! through callbacks and document error markers instead.
//!
//! [`refresh`]: crate::form::Form::refresh

use thiserror::Error;

/// Result alias used throughout the crate.
pub type FormResult<T> = Result<T, FormError>;

/// Fatal configuration and lookup errors.
///
/// # Examples
///
/// ```
/// use stepform::FormError;
///
/// let err = FormError::ControlNotFound;
/// assert_eq!(err.to_string(), "control not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
	/// The document exposes no submit control.
	#[error("the form has no submit button")]
	MissingSubmitControl,

	/// Neither a submit URL nor debug mode was configured.
	#[error("the form has no submit target")]
	MissingSubmitTarget,

	/// A declared field container holds no form control.
	#[error("control not found")]
	ControlNotFound,

	/// A form control carries no name attribute.
	#[error("control name not found")]
	ControlNameNotFound,

	/// A step container declares a token that does not parse.
	#[error("invalid step token: {0}")]
	InvalidStepToken(String),

	/// A field name was requested that the last scan did not discover.
	#[error("unknown field: {0}")]
	UnknownField(String),

	/// The submission payload could not be encoded.
	#[error("failed to encode submission payload: {0}")]
	Encode(String),
}
