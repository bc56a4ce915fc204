//! Contracts for objects that hold a current state.

use super::error::{IllegalTransition, TransitionError, UnexpectedState};
use super::state::State;
use super::states::StateSet;
use crate::interaction::InteractionBuilder;
use crate::sync::ExclusiveGuard;
use std::sync::Arc;

/// Something that holds exactly one current [`State`].
///
/// Only [`state`](Self::state) is required; everything else derives from
/// it.
pub trait Stateful {
    type State: State;

    /// The current state.
    fn state(&self) -> Self::State;

    /// The transitions possible from the current state.
    fn allowed_transitions(&self) -> StateSet<Self::State> {
        self.state().allowed_transitions()
    }

    fn can_transition_to(&self, state: &Self::State) -> bool {
        self.allowed_transitions().contains(state)
    }

    /// Fails unless the current state equals `state`.
    ///
    /// Returns `self` on success so calls can be chained; the error
    /// carries `self` as its instance.
    fn expect_state(
        &self,
        state: &Self::State,
    ) -> Result<&Self, UnexpectedState<Self::State, &Self>> {
        let current = self.state();
        if current == *state {
            Ok(self)
        } else {
            Err(UnexpectedState::new(
                StateSet::single(state.clone()),
                current,
                self,
            ))
        }
    }

    /// Enters this instance's exclusive section, if it has one.
    ///
    /// Interactions hold the returned guard across their checks and
    /// operation. The default is unguarded.
    fn lock_exclusive(&self) -> Option<ExclusiveGuard<'_>> {
        None
    }
}

/// A [`Stateful`] whose state changes through guarded transitions.
///
/// A transition either fully succeeds or leaves the state untouched, and
/// at most one transition runs at a time per instance.
pub trait MutableStateful: Stateful {
    /// Moves to `state` if it is an allowed transition from the current
    /// state.
    fn transition_to(
        &self,
        state: Self::State,
    ) -> Result<&Self, IllegalTransition<Self::State, &Self>>;

    /// Moves from `expected` to `state`.
    ///
    /// Fails with [`TransitionError::Unexpected`] when the current state is
    /// not `expected`, whether or not `state` would be allowed.
    fn transition(
        &self,
        expected: &Self::State,
        state: Self::State,
    ) -> Result<&Self, TransitionError<Self::State, &Self>>;

    /// A live, read-only view of this instance.
    fn as_immutable(&self) -> ImmutableView<'_, Self>
    where
        Self: Sized,
    {
        ImmutableView { inner: self }
    }

    /// Starts an interaction seeded from the current state.
    fn interact(&self) -> InteractionBuilder<'_, Self>
    where
        Self: Sized,
    {
        InteractionBuilder::new(self)
    }
}

/// Read-only projection of a [`MutableStateful`].
///
/// Not a snapshot: [`state`](Stateful::state) always reads the underlying
/// instance.
#[derive(Debug)]
pub struct ImmutableView<'a, T> {
    inner: &'a T,
}

impl<T> Clone for ImmutableView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ImmutableView<'_, T> {}

impl<T: Stateful> Stateful for ImmutableView<'_, T> {
    type State = T::State;

    fn state(&self) -> T::State {
        self.inner.state()
    }

    fn allowed_transitions(&self) -> StateSet<T::State> {
        self.inner.allowed_transitions()
    }
}

/// A [`Stateful`] that stays in one state.
///
/// This is the view of a bare state as a stateful object.
#[derive(Clone, Debug, PartialEq)]
pub struct Frozen<S>(pub S);

impl<S: State> Stateful for Frozen<S> {
    type State = S;

    fn state(&self) -> S {
        self.0.clone()
    }
}

impl<S: State> From<S> for Frozen<S> {
    fn from(state: S) -> Self {
        Self(state)
    }
}

impl<T: Stateful + ?Sized> Stateful for &T {
    type State = T::State;

    fn state(&self) -> T::State {
        (**self).state()
    }

    fn allowed_transitions(&self) -> StateSet<T::State> {
        (**self).allowed_transitions()
    }

    fn lock_exclusive(&self) -> Option<ExclusiveGuard<'_>> {
        (**self).lock_exclusive()
    }
}

impl<T: Stateful + ?Sized> Stateful for Arc<T> {
    type State = T::State;

    fn state(&self) -> T::State {
        (**self).state()
    }

    fn allowed_transitions(&self) -> StateSet<T::State> {
        (**self).allowed_transitions()
    }

    fn lock_exclusive(&self) -> Option<ExclusiveGuard<'_>> {
        (**self).lock_exclusive()
    }
}
