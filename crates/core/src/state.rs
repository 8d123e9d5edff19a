//! State-machine trait for value-typed domain models.

/// Pure, deterministic state transitions over an immutable value.
///
/// - **Decision + evolution**: `transition(&self, cmd)` validates the command
///   and returns the next state.
/// - The previous state is never mutated; a rejected command leaves the caller
///   holding the unchanged value.
///
/// Implementations must not perform IO or side effects.
pub trait StateMachine: Sized + Clone {
    type Command: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Compute the next state for a single command.
    fn transition(&self, command: &Self::Command) -> Result<Self, Self::Error>;

    /// Fold a sequence of commands, stopping at the first rejected one.
    fn replay<'a, I>(&self, commands: I) -> Result<Self, Self::Error>
    where
        I: IntoIterator<Item = &'a Self::Command>,
        Self::Command: 'a,
    {
        commands
            .into_iter()
            .try_fold(self.clone(), |state, command| state.transition(command))
    }
}
