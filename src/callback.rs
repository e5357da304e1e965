//! Cloneable callback wrapper used for every notification hook.
//!
//! The engine reports state changes through optional callbacks held in
//! [`FormOptions`](crate::options::FormOptions). Wrapping the closure in an
//! `Arc` keeps the options cheaply cloneable even though closures are not.

use std::sync::Arc;

/// A type-safe, cloneable callback wrapper.
///
/// ## Type Parameters
///
/// - `Args`: the argument tuple the callback receives
/// - `Ret`: the return type (defaults to `()`)
///
/// # Examples
///
/// ```
/// use stepform::Callback;
///
/// let doubled = Callback::new(|n: u32| n * 2);
/// assert_eq!(doubled.call(21), 42);
///
/// let cloned = doubled.clone();
/// assert_eq!(cloned.call(1), 2);
/// ```
pub struct Callback<Args = (), Ret = ()> {
	inner: Arc<dyn Fn(Args) -> Ret + Send + Sync + 'static>,
}

impl<Args, Ret> Callback<Args, Ret> {
	/// Creates a new callback from a function or closure.
	///
	/// # Examples
	///
	/// ```
	/// use stepform::Callback;
	///
	/// let on_change = Callback::new(|valid: bool| {
	///     assert!(valid);
	/// });
	/// on_change.call(true);
	/// ```
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + Send + Sync + 'static,
	{
		Self { inner: Arc::new(f) }
	}

	/// Calls the callback with the given arguments.
	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> std::fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Callback")
			.field("inner", &"<function>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	#[rstest]
	fn test_callback_call_returns_value() {
		// Arrange
		let callback = Callback::new(|(a, b): (u32, u32)| a + b);

		// Act
		let result = callback.call((40, 2));

		// Assert
		assert_eq!(result, 42);
	}

	#[rstest]
	fn test_callback_clone_shares_closure() {
		// Arrange
		let seen = Arc::new(Mutex::new(Vec::new()));
		let callback = Callback::new({
			let seen = seen.clone();
			move |value: bool| seen.lock().unwrap().push(value)
		});

		// Act
		let cloned = callback.clone();
		callback.call(true);
		cloned.call(false);

		// Assert
		assert_eq!(*seen.lock().unwrap(), vec![true, false]);
	}

	#[rstest]
	fn test_callback_debug_hides_closure() {
		// Arrange
		let callback: Callback<(), ()> = Callback::new(|_| ());

		// Act
		let output = format!("{callback:?}");

		// Assert
		assert!(output.contains("<function>"));
	}
}
