//! Validated, atomic operations on a stateful object.
//!
//! An interaction checks the instance's state on the way in, runs an
//! operation, and checks the state of the operation's result on the way
//! out. When the instance supports it, the whole sequence runs inside the
//! instance's exclusive section, so no other transition can interleave.
//!
//! # Example
//!
//! ```rust
//! use statebound::{MutableStateful, State, StateCell, StateSet, Stateful};
//!
//! #[derive(Clone, Copy, PartialEq, Debug)]
//! enum Door {
//!     Closed,
//!     Open,
//!     Locked,
//! }
//!
//! impl State for Door {
//!     fn configure_allowed_transitions(&self) -> StateSet<Self> {
//!         match self {
//!             Self::Closed => StateSet::of([Self::Open, Self::Locked]),
//!             Self::Open => StateSet::of([Self::Closed]),
//!             Self::Locked => StateSet::of([Self::Closed]),
//!         }
//!     }
//! }
//!
//! let door: StateCell<Door> = StateCell::new(Door::Locked);
//!
//! // A locked door refuses to open.
//! let result = door
//!     .interact()
//!     .incoming_states(StateSet::of([Door::Closed]))
//!     .interaction(|door| door.transition_to(Door::Open))
//!     .execute()?;
//!
//! assert!(result.is_failed());
//! assert_eq!(door.state(), Door::Locked);
//! # Ok::<(), statebound::IllegalTransition<Door>>(())
//! ```

mod builder;
mod result;

pub use builder::{Identity, InteractionBuilder};
pub use result::{InteractionFailure, InteractionResult};

use crate::core::{StateSet, Stateful, UnexpectedState};
use std::fmt;
use tracing::trace;

/// An immutable, ready-to-run interaction.
///
/// Created by [`InteractionBuilder::build`]. Executing consumes it; clone
/// it first (when the operation is `Clone`) to run it again.
pub struct Interaction<'a, T: Stateful, F> {
    instance: &'a T,
    incoming_states: StateSet<T::State>,
    outgoing_states: StateSet<T::State>,
    short_circuit_states: StateSet<T::State>,
    interaction: F,
}

impl<'a, T: Stateful> Interaction<'a, T, Identity<'a, T>> {
    /// Starts building an interaction on any stateful instance.
    ///
    /// Equivalent to [`MutableStateful::interact`](crate::MutableStateful::interact)
    /// but also accepts read-only instances.
    pub fn on(instance: &'a T) -> InteractionBuilder<'a, T> {
        InteractionBuilder::new(instance)
    }
}

impl<'a, T: Stateful, F> Interaction<'a, T, F> {
    pub fn instance(&self) -> &'a T {
        self.instance
    }

    pub fn incoming_states(&self) -> &StateSet<T::State> {
        &self.incoming_states
    }

    pub fn outgoing_states(&self) -> &StateSet<T::State> {
        &self.outgoing_states
    }

    pub fn short_circuit_states(&self) -> &StateSet<T::State> {
        &self.short_circuit_states
    }

    /// Runs the interaction.
    ///
    /// 1. If the instance is in a short-circuit state, returns
    ///    [`InteractionResult::ShortCircuited`] without running anything.
    /// 2. If it is not in an incoming state, returns
    ///    [`InteractionFailure::IllegalIncomingState`]; the operation never runs.
    /// 3. Runs the operation. Its error is returned as `Err` unchanged.
    /// 4. If the result's state is not an outgoing state, returns
    ///    [`InteractionFailure::IllegalOutgoingState`]. The operation's side
    ///    effects stay in place.
    /// 5. Otherwise returns [`InteractionResult::Succeeded`].
    ///
    /// The instance's exclusive section, when it has one, is held from the
    /// first check until this function returns.
    pub fn execute<R, E>(self) -> Result<InteractionResult<'a, T, R>, E>
    where
        F: FnOnce(&'a T) -> Result<R, E>,
        R: Stateful<State = T::State>,
    {
        let Self {
            instance,
            incoming_states,
            outgoing_states,
            short_circuit_states,
            interaction,
        } = self;
        let _section = instance.lock_exclusive();

        let current = instance.state();
        if short_circuit_states.contains(&current) {
            trace!(state = ?current, outcome = "short_circuited", "interaction finished");
            return Ok(InteractionResult::ShortCircuited { instance });
        }

        if !incoming_states.contains(&current) {
            trace!(
                state = ?current,
                expected = %incoming_states,
                outcome = "illegal_incoming_state",
                "interaction finished"
            );
            return Ok(InteractionResult::Failed(
                InteractionFailure::IllegalIncomingState {
                    instance,
                    error: UnexpectedState::new(incoming_states, current, instance),
                },
            ));
        }

        let result = interaction(instance)?;

        let outgoing = result.state();
        if !outgoing_states.contains(&outgoing) {
            trace!(
                state = ?outgoing,
                expected = %outgoing_states,
                outcome = "illegal_outgoing_state",
                "interaction finished"
            );
            return Ok(InteractionResult::Failed(
                InteractionFailure::IllegalOutgoingState {
                    instance,
                    result,
                    error: UnexpectedState::new(outgoing_states, outgoing, instance),
                },
            ));
        }

        trace!(state = ?outgoing, outcome = "succeeded", "interaction finished");
        Ok(InteractionResult::Succeeded { instance, result })
    }
}

impl<'a, T: Stateful, F: Clone> Clone for Interaction<'a, T, F> {
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

impl<T: Stateful, F> fmt::Debug for Interaction<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("incoming_states", &self.incoming_states)
            .field("outgoing_states", &self.outgoing_states)
            .field("short_circuit_states", &self.short_circuit_states)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Frozen, IllegalTransition, MutableStateful, State};
    use crate::sync::{RwStateCell, StateCell};
    use std::cell::Cell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum TestState {
        A,
        B,
        C,
        D,
    }

    impl State for TestState {
        fn configure_allowed_transitions(&self) -> StateSet<Self> {
            match self {
                Self::A => StateSet::of([Self::B, Self::C]),
                Self::B => StateSet::of([Self::D]),
                Self::C | Self::D => StateSet::empty(),
            }
        }
    }

    #[derive(Debug, PartialEq)]
    struct Aborted;

    #[test]
    fn short_circuit_takes_precedence() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);
        let invoked = Cell::new(false);

        let result = cell
            .interact()
            .incoming_states(StateSet::single(TestState::A))
            .short_circuit_states(StateSet::single(TestState::A))
            .consumer(|_| {
                invoked.set(true);
                Ok::<_, Aborted>(())
            })
            .execute()
            .unwrap();

        assert!(result.is_short_circuited());
        assert!(std::ptr::eq(result.instance(), &cell));
        assert!(!invoked.get());
    }

    #[test]
    fn illegal_incoming_state_skips_operation() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);
        let invoked = Cell::new(false);

        let result = cell
            .interact()
            .incoming_states(StateSet::single(TestState::B))
            .interaction(|cell| {
                invoked.set(true);
                cell.transition_to(TestState::C)
            })
            .execute()
            .unwrap();

        assert!(!invoked.get());
        assert_eq!(cell.state(), TestState::A);
        match result {
            InteractionResult::Failed(InteractionFailure::IllegalIncomingState {
                error, ..
            }) => {
                assert_eq!(error.expected, StateSet::single(TestState::B));
                assert_eq!(error.actual, TestState::A);
                assert!(std::ptr::eq(error.instance, &cell));
            }
            other => panic!("Expected IllegalIncomingState, got {other:?}"),
        }
    }

    #[test]
    fn illegal_outgoing_state_keeps_side_effects() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);

        let result = cell
            .interact()
            .outgoing_states(StateSet::single(TestState::B))
            .interaction(|cell| cell.transition_to(TestState::C))
            .execute()
            .unwrap();

        assert_eq!(cell.state(), TestState::C);
        match result {
            InteractionResult::Failed(InteractionFailure::IllegalOutgoingState {
                result,
                error,
                ..
            }) => {
                assert!(std::ptr::eq(result, &cell));
                assert_eq!(error.expected, StateSet::single(TestState::B));
                assert_eq!(error.actual, TestState::C);
                assert!(std::ptr::eq(error.instance, &cell));
            }
            other => panic!("Expected IllegalOutgoingState, got {other:?}"),
        }
    }

    #[test]
    fn legal_interaction_succeeds() {
        let cell: RwStateCell<TestState> = StateCell::new(TestState::A);

        let result = cell
            .interact()
            .interaction(|cell| cell.transition_to(TestState::B))
            .execute()
            .unwrap();

        assert!(result.is_succeeded());
        assert!(std::ptr::eq(result.into_result().unwrap(), &cell));
        assert_eq!(cell.state(), TestState::B);
    }

    #[test]
    fn operation_error_propagates_unchanged() {
        let cell: StateCell<TestState> = StateCell::new(TestState::B);

        let error = cell
            .interact()
            .interaction(|cell| cell.transition_to(TestState::A))
            .execute()
            .unwrap_err();

        assert!(std::ptr::eq(error.instance, &cell));
        assert_eq!(
            error.detach(),
            IllegalTransition::new(TestState::B, TestState::A, ())
        );
        assert_eq!(cell.state(), TestState::B);
    }

    #[test]
    fn result_may_be_a_different_stateful() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);

        let result = cell
            .interact()
            .outgoing_states(StateSet::single(TestState::D))
            .interaction(|_| Ok::<_, Aborted>(Frozen(TestState::D)))
            .execute()
            .unwrap();

        assert_eq!(result.into_outcome().unwrap(), Some(Frozen(TestState::D)));
        assert_eq!(cell.state(), TestState::A);
    }

    #[test]
    fn interaction_on_read_only_instance() {
        let frozen = Frozen(TestState::C);

        let result = Interaction::on(&frozen)
            .outgoing_states(StateSet::single(TestState::C))
            .execute()
            .unwrap();

        assert!(result.is_succeeded());
    }

    fn section_spans_whole_interaction<C>(cell: &C)
    where
        C: MutableStateful<State = TestState> + Sync,
    {
        let in_operation = AtomicBool::new(false);
        let barrier = Barrier::new(2);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                barrier.wait();
                while !in_operation.load(Ordering::SeqCst) {
                    std::thread::yield_now();
                }
                // Blocks until the interaction below has returned.
                assert_eq!(cell.state(), TestState::D);
                assert!(cell.transition(&TestState::D, TestState::A).is_err());
            });

            let result = cell
                .interact()
                .outgoing_states(StateSet::single(TestState::D))
                .interaction(|cell| {
                    barrier.wait();
                    cell.transition_to(TestState::B)?;
                    in_operation.store(true, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(50));
                    cell.transition_to(TestState::D)
                })
                .execute()
                .unwrap();

            assert!(result.is_succeeded());
        });
    }

    #[test]
    fn coarse_section_spans_whole_interaction() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);
        section_spans_whole_interaction(&cell);
    }

    #[test]
    fn read_write_section_spans_whole_interaction() {
        let cell: RwStateCell<TestState> = StateCell::new(TestState::A);
        section_spans_whole_interaction(&cell);
    }

    #[test]
    fn section_released_after_operation_error() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);

        let error = cell
            .interact()
            .consumer(|_| Err(Aborted))
            .execute()
            .unwrap_err();
        assert_eq!(error, Aborted);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                cell.transition_to(TestState::B).unwrap();
            });
        });
        assert_eq!(cell.state(), TestState::B);
    }

    #[test]
    fn built_interaction_can_rerun_when_cloned() {
        let cell: StateCell<TestState> = StateCell::new(TestState::A);
        let interaction = cell
            .interact()
            .incoming_states(StateSet::of([TestState::A, TestState::B]))
            .outgoing_states(StateSet::of([TestState::B, TestState::D]))
            .short_circuit_states(StateSet::single(TestState::D))
            .interaction(|cell| {
                let next = cell.allowed_transitions().states().next();
                match next {
                    Some(next) => cell.transition_to(next),
                    None => Ok(cell),
                }
            })
            .build();

        // A -> B is the first allowed transition in declaration order.
        assert!(interaction.clone().execute().unwrap().is_succeeded());
        assert!(interaction.clone().execute().unwrap().is_succeeded());
        assert!(interaction.execute().unwrap().is_short_circuited());
        assert_eq!(cell.state(), TestState::D);
    }
}
