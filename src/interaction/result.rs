//! Outcomes of executing an interaction.

use crate::core::{Stateful, UnexpectedState};

/// Outcome of [`Interaction::execute`](super::Interaction::execute).
///
/// Failures of the operation itself are not represented here; they are
/// returned as the `Err` of `execute`.
#[derive(Debug)]
pub enum InteractionResult<'a, T: Stateful, R> {
    /// The instance was in a short-circuit state; nothing was validated or run
    ShortCircuited { instance: &'a T },

    /// The operation ran and its result is in an allowed outgoing state
    Succeeded { instance: &'a T, result: R },

    /// Incoming or outgoing validation rejected the interaction
    Failed(InteractionFailure<'a, T, R>),
}

/// The two ways an interaction can be rejected.
#[derive(Debug)]
pub enum InteractionFailure<'a, T: Stateful, R> {
    /// The instance was not in an allowed incoming state; the operation never ran
    IllegalIncomingState {
        instance: &'a T,
        error: UnexpectedState<T::State, &'a T>,
    },

    /// The operation ran but its result is not in an allowed outgoing state.
    ///
    /// Side effects of the operation are not rolled back.
    IllegalOutgoingState {
        instance: &'a T,
        result: R,
        error: UnexpectedState<T::State, &'a T>,
    },
}

impl<'a, T: Stateful, R> InteractionResult<'a, T, R> {
    /// The instance the interaction ran against.
    pub fn instance(&self) -> &'a T {
        match self {
            Self::ShortCircuited { instance } | Self::Succeeded { instance, .. } => instance,
            Self::Failed(failure) => failure.instance(),
        }
    }

    /// The operation's result, if the operation ran.
    pub fn result(&self) -> Option<&R> {
        match self {
            Self::Succeeded { result, .. }
            | Self::Failed(InteractionFailure::IllegalOutgoingState { result, .. }) => Some(result),
            _ => None,
        }
    }

    /// The validation error, carrying the instance, if validation failed.
    pub fn error(&self) -> Option<&UnexpectedState<T::State, &'a T>> {
        match self {
            Self::Failed(failure) => Some(failure.error()),
            _ => None,
        }
    }

    pub fn is_short_circuited(&self) -> bool {
        matches!(self, Self::ShortCircuited { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// `Ok(Some(result))` on success, `Ok(None)` when short-circuited and
    /// the validation error otherwise.
    pub fn into_outcome(self) -> Result<Option<R>, UnexpectedState<T::State, &'a T>> {
        match self {
            Self::ShortCircuited { .. } => Ok(None),
            Self::Succeeded { result, .. } => Ok(Some(result)),
            Self::Failed(failure) => Err(failure.into_error()),
        }
    }
}

impl<'a, T: Stateful> InteractionResult<'a, T, &'a T> {
    /// The instance when short-circuited, the result on success, and the
    /// validation error otherwise.
    pub fn into_result(self) -> Result<&'a T, UnexpectedState<T::State, &'a T>> {
        match self {
            Self::ShortCircuited { instance } => Ok(instance),
            Self::Succeeded { result, .. } => Ok(result),
            Self::Failed(failure) => Err(failure.into_error()),
        }
    }
}

impl<'a, T: Stateful, R> InteractionFailure<'a, T, R> {
    pub fn instance(&self) -> &'a T {
        match self {
            Self::IllegalIncomingState { instance, .. }
            | Self::IllegalOutgoingState { instance, .. } => instance,
        }
    }

    pub fn error(&self) -> &UnexpectedState<T::State, &'a T> {
        match self {
            Self::IllegalIncomingState { error, .. } | Self::IllegalOutgoingState { error, .. } => {
                error
            }
        }
    }

    pub fn into_error(self) -> UnexpectedState<T::State, &'a T> {
        match self {
            Self::IllegalIncomingState { error, .. } | Self::IllegalOutgoingState { error, .. } => {
                error
            }
        }
    }
}
