//! Error types for transitions and state expectations.
//!
//! Domain errors carry the instance involved as a type parameter `I`. The
//! methods of [`Stateful`](crate::Stateful) and
//! [`MutableStateful`](crate::MutableStateful) fill it with a reference to
//! the instance; [`detach`](IllegalTransition::detach) swaps it for `()` so
//! the error can outlive the borrow. The `?` operator detaches
//! automatically when the surrounding function returns the detached type.

use super::state::State;
use super::states::StateSet;
use std::fmt;
use thiserror::Error;

/// A transition was requested to a state outside the current state's
/// allowed transitions.
///
/// The instance is left in `from`.
#[derive(Clone, PartialEq, Error)]
#[error("cannot transition from state '{from:?}' to state '{to:?}'")]
pub struct IllegalTransition<S: State, I = ()> {
    /// The state the instance was in
    pub from: S,
    /// The rejected target state
    pub to: S,
    /// The instance that refused the transition
    pub instance: I,
}

impl<S: State, I> IllegalTransition<S, I> {
    pub fn new(from: S, to: S, instance: I) -> Self {
        Self { from, to, instance }
    }

    /// The same error, attributed to another instance.
    pub fn with_instance<J>(self, instance: J) -> IllegalTransition<S, J> {
        IllegalTransition {
            from: self.from,
            to: self.to,
            instance,
        }
    }

    /// Drops the instance, keeping the states.
    pub fn detach(self) -> IllegalTransition<S> {
        self.with_instance(())
    }
}

impl<'a, S: State, I: ?Sized> From<IllegalTransition<S, &'a I>> for IllegalTransition<S> {
    fn from(error: IllegalTransition<S, &'a I>) -> Self {
        error.detach()
    }
}

impl<S: State, I> fmt::Debug for IllegalTransition<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IllegalTransition")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// An instance was required to be in one of `expected` but was in `actual`.
///
/// Raised by [`expect_state`](crate::Stateful::expect_state), by the
/// expected-state check of [`transition`](crate::MutableStateful::transition)
/// and by interaction incoming/outgoing validation.
#[derive(Clone, PartialEq, Error)]
#[error("expected states {expected} but was '{actual:?}'")]
pub struct UnexpectedState<S: State, I = ()> {
    /// The states that would have been accepted
    pub expected: StateSet<S>,
    /// The state that was observed
    pub actual: S,
    /// The instance whose state was checked
    pub instance: I,
}

impl<S: State, I> UnexpectedState<S, I> {
    pub fn new(expected: StateSet<S>, actual: S, instance: I) -> Self {
        Self {
            expected,
            actual,
            instance,
        }
    }

    /// The same error, attributed to another instance.
    pub fn with_instance<J>(self, instance: J) -> UnexpectedState<S, J> {
        UnexpectedState {
            expected: self.expected,
            actual: self.actual,
            instance,
        }
    }

    /// Drops the instance, keeping the states.
    pub fn detach(self) -> UnexpectedState<S> {
        self.with_instance(())
    }
}

impl<'a, S: State, I: ?Sized> From<UnexpectedState<S, &'a I>> for UnexpectedState<S> {
    fn from(error: UnexpectedState<S, &'a I>) -> Self {
        error.detach()
    }
}

impl<S: State, I> fmt::Debug for UnexpectedState<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnexpectedState")
            .field("expected", &self.expected)
            .field("actual", &self.actual)
            .finish_non_exhaustive()
    }
}

/// Failure of a conditional `transition(expected, new)`.
#[derive(Clone, PartialEq, Error)]
pub enum TransitionError<S: State, I = ()> {
    #[error(transparent)]
    Unexpected(#[from] UnexpectedState<S, I>),

    #[error(transparent)]
    Illegal(#[from] IllegalTransition<S, I>),
}

impl<S: State, I> TransitionError<S, I> {
    pub fn instance(&self) -> &I {
        match self {
            Self::Unexpected(error) => &error.instance,
            Self::Illegal(error) => &error.instance,
        }
    }

    /// The same error, attributed to another instance.
    pub fn with_instance<J>(self, instance: J) -> TransitionError<S, J> {
        match self {
            Self::Unexpected(error) => TransitionError::Unexpected(error.with_instance(instance)),
            Self::Illegal(error) => TransitionError::Illegal(error.with_instance(instance)),
        }
    }

    /// Drops the instance, keeping the states.
    pub fn detach(self) -> TransitionError<S> {
        self.with_instance(())
    }
}

impl<'a, S: State, I: ?Sized> From<TransitionError<S, &'a I>> for TransitionError<S> {
    fn from(error: TransitionError<S, &'a I>) -> Self {
        error.detach()
    }
}

impl<S: State, I> fmt::Debug for TransitionError<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexpected(error) => f.debug_tuple("Unexpected").field(error).finish(),
            Self::Illegal(error) => f.debug_tuple("Illegal").field(error).finish(),
        }
    }
}

/// Fatal misconfiguration of a state graph.
///
/// Membership queries are infallible, so these surface as panics carrying
/// this error's message rather than as returned values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("lazy state set supplier yielded no states")]
    MissingStates,

    #[error("lazy state set supplier panicked on an earlier query")]
    SupplierPanicked,

    #[error("enumerated state index {index} exceeds the supported maximum of {max}")]
    IndexOutOfRange { index: usize, max: usize },
}
