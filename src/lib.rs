//! Multi-step form enhancement for an existing document
//!
//! This crate binds validation, step navigation, and submission handling to
//! a form described by a [`FormDocument`] adapter:
//! - Per-field validation with built-in kinds (email, URL, CUIT/CUIL, money,
//!   checkboxes, files) and asynchronous custom rules
//! - Edge-triggered whole-form and current-step validity notifications
//! - Step navigation with optional branches (`"2"` to `"2b"`), a forward
//!   high-water mark bounding the validation scope, and a gate callback
//! - A submission pipeline serializing to URL-encoded or JSON payloads
//! - Input filters for currency, quantity, and phone formatting
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//!
//! use stepform::{FieldDescriptor, Form, FormOptions, MemoryDocument, SharedDocument};
//!
//! # async fn demo() -> Result<(), stepform::FormError> {
//! let document = MemoryDocument::new()
//!     .with_field(FieldDescriptor::new("name").required())
//!     .with_field(FieldDescriptor::new("email").with_kind("email").required());
//! let shared: SharedDocument = Arc::new(Mutex::new(document));
//!
//! let options = FormOptions::new("/api/subscribe")
//!     .on_validity_change(|valid| println!("form valid: {valid}"));
//! let mut form = Form::new(shared, options).await?;
//!
//! form.submit().await?;
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod document;
pub mod error;
pub mod field;
pub mod filters;
pub mod form;
pub mod messages;
pub mod options;
pub mod serialize;
pub mod step;
pub mod transition;
pub mod transport;
mod validator;
mod validity;

pub use callback::Callback;
pub use document::{FileInfo, FormDocument, MemoryDocument, SharedDocument};
pub use error::{FormError, FormResult};
pub use field::{FieldDescriptor, FieldKind};
pub use form::Form;
pub use messages::{MESSAGE_VAR, MessageCatalog};
pub use options::{CssClasses, FormOptions};
pub use serialize::{FieldGroup, Payload, PayloadFormat};
pub use step::{StepTarget, StepToken};
pub use transition::{NoTransition, TransitionEffect};
pub use transport::{
	HttpTransport, NullTransport, SubmitError, SubmitMethod, SubmitRequest, SubmitResponse,
	Transport, TransportError,
};
pub use validator::{CustomRule, FieldOutcome, RuleFuture, RuleRegistry};
