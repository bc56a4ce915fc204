//! A ready-made mutable stateful object.

use super::lock::{CoarseLock, ExclusiveGuard, ReadWriteLock, StateLock};
use crate::core::{
    IllegalTransition, MutableStateful, State, StateSet, Stateful, TransitionError,
    UnexpectedState,
};
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

/// Holds a current state behind a lock strategy `L`.
///
/// `StateCell<S>` uses a single reentrant mutex; [`RwStateCell`] lets
/// readers share a read/write lock. Both offer the same contract. The
/// strategy is picked by type, so bind the cell to an annotated place (or
/// use the alias) when calling [`new`](Self::new).
///
/// Embed a cell in your own type and implement the traits with
/// [`delegate_stateful!`](crate::delegate_stateful) to give that type the
/// same guarantees.
///
/// # Example
///
/// ```rust
/// use statebound::{MutableStateful, State, StateCell, StateSet, Stateful};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Conn {
///     Idle,
///     Busy,
/// }
///
/// impl State for Conn {
///     fn configure_allowed_transitions(&self) -> StateSet<Self> {
///         match self {
///             Self::Idle => StateSet::of([Self::Busy]),
///             Self::Busy => StateSet::of([Self::Idle]),
///         }
///     }
/// }
///
/// let conn: StateCell<Conn> = StateCell::new(Conn::Idle);
/// conn.transition_to(Conn::Busy)?;
/// assert_eq!(conn.state(), Conn::Busy);
///
/// assert!(conn.transition(&Conn::Idle, Conn::Busy).is_err());
/// # Ok::<(), statebound::IllegalTransition<Conn>>(())
/// ```
pub struct StateCell<S, L = CoarseLock<S>> {
    lock: L,
    _state: PhantomData<fn() -> S>,
}

/// A [`StateCell`] guarded by a read/write lock.
pub type RwStateCell<S> = StateCell<S, ReadWriteLock<S>>;

impl<S: State, L: StateLock<S>> StateCell<S, L> {
    pub fn new(initial: S) -> Self {
        Self {
            lock: L::new(initial),
            _state: PhantomData,
        }
    }
}

impl<S: State, L: StateLock<S>> Stateful for StateCell<S, L> {
    type State = S;

    fn state(&self) -> S {
        self.lock.load()
    }

    fn lock_exclusive(&self) -> Option<ExclusiveGuard<'_>> {
        Some(self.lock.exclusive())
    }
}

impl<S: State, L: StateLock<S>> MutableStateful for StateCell<S, L> {
    fn transition_to(&self, state: S) -> Result<&Self, IllegalTransition<S, &Self>> {
        let _section = self.lock.exclusive();
        let from = self.lock.load();
        if !from.can_transition_to(&state) {
            return Err(IllegalTransition::new(from, state, self));
        }

        trace!(from = ?from, to = ?state, "state transition");
        self.lock.store(state);
        Ok(self)
    }

    fn transition(&self, expected: &S, state: S) -> Result<&Self, TransitionError<S, &Self>> {
        let _section = self.lock.exclusive();
        let current = self.lock.load();
        if current != *expected {
            let expected = StateSet::single(expected.clone());
            return Err(UnexpectedState::new(expected, current, self).into());
        }

        Ok(self.transition_to(state)?)
    }
}

impl<S: State, L: StateLock<S>> fmt::Debug for StateCell<S, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("state", &self.lock.load())
            .finish()
    }
}
