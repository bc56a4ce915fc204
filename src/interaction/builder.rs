//! Fluent construction of interactions.

use super::{Interaction, InteractionResult};
use crate::core::{StateSet, Stateful};
use std::convert::Infallible;
use std::fmt;

/// The operation an interaction runs until one is supplied: returns the
/// instance unchanged.
pub type Identity<'a, T> = fn(&'a T) -> Result<&'a T, Infallible>;

/// Builder for an [`Interaction`].
///
/// Seeded eagerly from the instance: incoming states default to the
/// instance's state at creation, outgoing states to the transitions allowed
/// from it, short-circuit states to none, and the operation to identity.
/// Setters consume and return the builder.
///
/// # Example
///
/// ```rust
/// use statebound::{MutableStateful, State, StateCell, StateSet, Stateful};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Job {
///     Queued,
///     Running,
///     Done,
/// }
///
/// impl State for Job {
///     fn configure_allowed_transitions(&self) -> StateSet<Self> {
///         match self {
///             Self::Queued => StateSet::of([Self::Running]),
///             Self::Running => StateSet::of([Self::Done]),
///             Self::Done => StateSet::empty(),
///         }
///     }
/// }
///
/// let job: StateCell<Job> = StateCell::new(Job::Queued);
///
/// let result = job
///     .interact()
///     .short_circuit_states(StateSet::of([Job::Done]))
///     .interaction(|job| job.transition_to(Job::Running))
///     .execute()?;
///
/// assert!(result.is_succeeded());
/// assert_eq!(job.state(), Job::Running);
/// # Ok::<(), statebound::IllegalTransition<Job>>(())
/// ```
pub struct InteractionBuilder<'a, T: Stateful, F = Identity<'a, T>> {
    instance: &'a T,
    incoming_states: StateSet<T::State>,
    outgoing_states: StateSet<T::State>,
    short_circuit_states: StateSet<T::State>,
    interaction: F,
}

impl<'a, T: Stateful> InteractionBuilder<'a, T> {
    /// Starts a builder for `instance`, reading its state once.
    pub fn new(instance: &'a T) -> Self {
        let _section = instance.lock_exclusive();
        let current = instance.state();
        let outgoing_states = instance.allowed_transitions();

        Self {
            instance,
            incoming_states: StateSet::single(current),
            outgoing_states,
            short_circuit_states: StateSet::empty(),
            interaction: Ok,
        }
    }
}

impl<'a, T: Stateful, F> InteractionBuilder<'a, T, F> {
    /// States the instance must be in for the operation to run.
    pub fn incoming_states(mut self, states: StateSet<T::State>) -> Self {
        self.incoming_states = states;
        self
    }

    /// States the operation's result must be in.
    pub fn outgoing_states(mut self, states: StateSet<T::State>) -> Self {
        self.outgoing_states = states;
        self
    }

    /// States in which the interaction does nothing and reports
    /// short-circuit. Takes precedence over incoming validation.
    pub fn short_circuit_states(mut self, states: StateSet<T::State>) -> Self {
        self.short_circuit_states = states;
        self
    }

    /// Sets the operation, replacing any previous one.
    ///
    /// The operation receives the instance and returns a stateful result
    /// whose state is checked against the outgoing states. Its error type
    /// becomes the error of [`execute`](Self::execute).
    pub fn interaction<G, R, E>(self, interaction: G) -> InteractionBuilder<'a, T, G>
    where
        G: FnOnce(&'a T) -> Result<R, E>,
        R: Stateful<State = T::State>,
    {
        InteractionBuilder {
            instance: self.instance,
            incoming_states: self.incoming_states,
            outgoing_states: self.outgoing_states,
            short_circuit_states: self.short_circuit_states,
            interaction,
        }
    }

    /// Sets an operation that works on the instance in place; the instance
    /// itself becomes the result.
    pub fn consumer<G, E>(
        self,
        consumer: G,
    ) -> InteractionBuilder<'a, T, impl FnOnce(&'a T) -> Result<&'a T, E>>
    where
        G: FnOnce(&'a T) -> Result<(), E>,
    {
        self.interaction(move |instance| consumer(instance).map(|()| instance))
    }

    /// Freezes the configuration into an immutable [`Interaction`].
    pub fn build(self) -> Interaction<'a, T, F> {
        Interaction {
            instance: self.instance,
            incoming_states: self.incoming_states,
            outgoing_states: self.outgoing_states,
            short_circuit_states: self.short_circuit_states,
            interaction: self.interaction,
        }
    }

    /// Builds and runs the interaction.
    ///
    /// Shorthand for `self.build().execute()`.
    pub fn execute<R, E>(self) -> Result<InteractionResult<'a, T, R>, E>
    where
        F: FnOnce(&'a T) -> Result<R, E>,
        R: Stateful<State = T::State>,
    {
        self.build().execute()
    }
}

impl<'a, T: Stateful, F: Clone> Clone for InteractionBuilder<'a, T, F> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance,
            incoming_states: self.incoming_states.clone(),
            outgoing_states: self.outgoing_states.clone(),
            short_circuit_states: self.short_circuit_states.clone(),
            interaction: self.interaction.clone(),
        }
    }
}

impl<T: Stateful, F> fmt::Debug for InteractionBuilder<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionBuilder")
            .field("incoming_states", &self.incoming_states)
            .field("outgoing_states", &self.outgoing_states)
            .field("short_circuit_states", &self.short_circuit_states)
            .finish_non_exhaustive()
    }
}
