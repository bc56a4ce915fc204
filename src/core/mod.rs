//! Core state graph types and contracts.
//!
//! This module contains the value-level model:
//! - State definitions via the `State` trait
//! - Immutable state sets with membership and extension
//! - The `Stateful` and `MutableStateful` contracts
//! - The error taxonomy for transitions and expectations

mod error;
mod state;
mod stateful;
mod states;

pub use error::{ConfigurationError, IllegalTransition, TransitionError, UnexpectedState};
pub use state::{EnumState, State, TransitionCache};
pub use stateful::{Frozen, ImmutableView, MutableStateful, Stateful};
pub use states::{Iter, StateSet, MAX_ENUM_STATES};
