//! Statebound: typed, validated state transitions under concurrent access
//!
//! Objects own exactly one current state and may only move along the edges
//! their states declare. Transitions are atomic: they either fully apply or
//! leave the state untouched, and at most one runs at a time per instance.
//!
//! # Core Concepts
//!
//! - **State**: a node that declares which states it may move to
//! - **StateSet**: an immutable set of states (empty, listed, bitset or lazy)
//! - **Stateful / MutableStateful**: read and guarded-write contracts
//! - **StateCell**: a ready-made mutable stateful with a pluggable lock
//! - **Interaction**: an operation wrapped in incoming, outgoing and
//!   short-circuit state checks, executed under the instance's lock
//!
//! # Example
//!
//! ```rust
//! use statebound::{state_enum, MutableStateful, StateCell, StateSet, Stateful};
//!
//! state_enum! {
//!     enum Payment {
//!         Pending => [Authorized, Declined],
//!         Authorized => [Captured],
//!         Captured => [],
//!         Declined => [],
//!     }
//! }
//!
//! let payment: StateCell<Payment> = StateCell::new(Payment::Pending);
//!
//! let mut short_circuited = Vec::new();
//! for _ in 0..2 {
//!     let result = payment
//!         .interact()
//!         .incoming_states(StateSet::of([Payment::Pending]))
//!         .outgoing_states(StateSet::of([Payment::Captured]))
//!         .short_circuit_states(StateSet::of([Payment::Captured]))
//!         .interaction(|payment| {
//!             payment.transition_to(Payment::Authorized)?;
//!             payment.transition_to(Payment::Captured)
//!         })
//!         .execute()?;
//!     short_circuited.push(result.is_short_circuited());
//! }
//!
//! // The second run finds the payment already captured.
//! assert_eq!(short_circuited, [false, true]);
//! assert_eq!(payment.state(), Payment::Captured);
//! # Ok::<(), statebound::IllegalTransition<Payment>>(())
//! ```

#[macro_use]
mod macros;

pub mod core;
pub mod interaction;
pub mod sync;

// Re-export commonly used types
pub use self::core::{
    ConfigurationError, EnumState, Frozen, IllegalTransition, ImmutableView, MutableStateful,
    State, StateSet, Stateful, TransitionCache, TransitionError, UnexpectedState,
    MAX_ENUM_STATES,
};
pub use self::interaction::{
    Interaction, InteractionBuilder, InteractionFailure, InteractionResult,
};
pub use self::sync::{
    CoarseLock, ExclusiveGuard, ReadWriteLock, RwStateCell, StateCell, StateLock,
};
