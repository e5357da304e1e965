//! Visual effects around step changes.
//!
//! The form drives the effect in two phases: [`TransitionEffect::leave`]
//! runs while the outgoing step is still active, the step containers are
//! swapped, then [`TransitionEffect::enter`] runs for the incoming step.
//! The step-change guard stays held for the whole sequence, so effects may
//! take their time without racing a second navigation.

use std::time::Duration;

use async_trait::async_trait;

use crate::step::StepToken;

/// Hook animating the swap between two step containers.
#[async_trait]
pub trait TransitionEffect: Send + Sync {
	/// Runs before the outgoing step is deactivated.
	async fn leave(&self, step: StepToken, duration: Duration);

	/// Runs after the incoming step is activated.
	async fn enter(&self, step: StepToken, duration: Duration);
}

/// Swaps step containers instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransition;

#[async_trait]
impl TransitionEffect for NoTransition {
	async fn leave(&self, _step: StepToken, _duration: Duration) {}

	async fn enter(&self, _step: StepToken, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_no_transition_is_a_noop() {
		// Arrange
		let effect: Box<dyn TransitionEffect> = Box::new(NoTransition);

		// Act & Assert: both phases resolve immediately
		effect.leave(StepToken::main(1), Duration::from_millis(200)).await;
		effect.enter(StepToken::main(2), Duration::from_millis(200)).await;
	}
}
