//! Immutable sets of states.
//!
//! A [`StateSet`] is a cheap-to-clone, immutable collection of states with
//! value-based membership. Four backing shapes sit behind the same API:
//!
//! - empty (no allocation),
//! - listed (an explicit, deduplicated list),
//! - enumerated (a bitset over an [`EnumState`] type),
//! - lazy (a supplier evaluated at most once, on first use).
//!
//! Sets never change after construction; [`StateSet::with_state`] returns a
//! new set.

use super::error::ConfigurationError;
use super::state::{EnumState, State};
use parking_lot::Mutex;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::iter::FusedIterator;
use std::sync::{Arc, OnceLock};

/// Largest number of variants an [`EnumState`] may have to be held in a bitset.
pub const MAX_ENUM_STATES: usize = u128::BITS as usize;

type Supplier<S> = Box<dyn FnOnce() -> Option<StateSet<S>> + Send>;

/// An immutable set of states.
///
/// # Example
///
/// ```rust
/// use statebound::{State, StateSet};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Door {
///     Open,
///     Closed,
///     Locked,
/// }
///
/// impl State for Door {}
///
/// let states = StateSet::empty().with_state(Door::Open).with_state(Door::Closed);
///
/// assert!(states.contains(&Door::Open));
/// assert!(!states.contains(&Door::Locked));
/// assert_eq!(states.len(), 2);
/// ```
pub struct StateSet<S> {
    repr: Repr<S>,
}

enum Repr<S> {
    Empty,
    Listed(Arc<[S]>),
    Enumerated(Bits<S>),
    Lazy(Arc<LazyStates<S>>),
}

struct Bits<S> {
    mask: u128,
    index_of: fn(&S) -> usize,
    state_at: fn(usize) -> Option<S>,
}

struct LazyStates<S> {
    supplier: Mutex<Option<Supplier<S>>>,
    resolved: OnceLock<StateSet<S>>,
}

impl<S> Clone for Bits<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Bits<S> {}

impl<S> Clone for StateSet<S> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Empty => Repr::Empty,
            Repr::Listed(states) => Repr::Listed(Arc::clone(states)),
            Repr::Enumerated(bits) => Repr::Enumerated(*bits),
            Repr::Lazy(lazy) => Repr::Lazy(Arc::clone(lazy)),
        };
        Self { repr }
    }
}

impl<S> StateSet<S> {
    /// The empty set.
    pub const fn empty() -> Self {
        Self { repr: Repr::Empty }
    }
}

impl<S> Default for StateSet<S> {
    fn default() -> Self {
        Self::empty()
    }
}

fn bit_for(index: usize) -> u128 {
    match u32::try_from(index).ok().and_then(|i| 1u128.checked_shl(i)) {
        Some(bit) => bit,
        None => panic!(
            "{}",
            ConfigurationError::IndexOutOfRange {
                index,
                max: MAX_ENUM_STATES,
            }
        ),
    }
}

impl<S: State> StateSet<S> {
    /// A set holding exactly one state.
    pub fn single(state: S) -> Self {
        Self {
            repr: Repr::Listed(Arc::from(vec![state])),
        }
    }

    /// A set holding the given states.
    ///
    /// The states are copied into the set, so later changes to the source
    /// collection are not observed. Duplicates are dropped.
    pub fn of<I>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut listed: Vec<S> = Vec::new();
        for state in states {
            if !listed.contains(&state) {
                listed.push(state);
            }
        }

        if listed.is_empty() {
            Self::empty()
        } else {
            Self {
                repr: Repr::Listed(listed.into()),
            }
        }
    }

    /// A set whose contents are produced by `supplier` the first time the
    /// set is queried.
    ///
    /// The supplier runs at most once, even when several threads query the
    /// set concurrently; every caller observes the same result. This allows
    /// state graphs whose transition sets refer to states that are not yet
    /// constructed.
    ///
    /// # Panics
    ///
    /// If the supplier panics, the panic reaches the querying caller and
    /// the supplier is spent; later queries panic with
    /// [`ConfigurationError::SupplierPanicked`].
    pub fn lazy<F>(supplier: F) -> Self
    where
        F: FnOnce() -> StateSet<S> + Send + 'static,
    {
        Self::try_lazy(move || Some(supplier()))
    }

    /// Like [`lazy`](Self::lazy), but the supplier may yield nothing.
    ///
    /// # Panics
    ///
    /// Querying the set panics with [`ConfigurationError::MissingStates`]
    /// if the supplier returns `None`.
    pub fn try_lazy<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Option<StateSet<S>> + Send + 'static,
    {
        Self {
            repr: Repr::Lazy(Arc::new(LazyStates {
                supplier: Mutex::new(Some(Box::new(supplier))),
                resolved: OnceLock::new(),
            })),
        }
    }

    /// Whether `state` is a member of this set.
    pub fn contains(&self, state: &S) -> bool {
        match &self.repr {
            Repr::Empty => false,
            Repr::Listed(states) => states.contains(state),
            Repr::Enumerated(bits) => bits.mask & bit_for((bits.index_of)(state)) != 0,
            Repr::Lazy(lazy) => lazy.backing().contains(state),
        }
    }

    /// Returns a new set containing every state of this one plus `state`.
    ///
    /// Enumerated sets stay enumerated.
    pub fn with_state(&self, state: S) -> Self {
        match &self.repr {
            Repr::Empty => Self::single(state),
            Repr::Listed(states) => {
                if states.contains(&state) {
                    return self.clone();
                }
                let mut extended = states.to_vec();
                extended.push(state);
                Self {
                    repr: Repr::Listed(extended.into()),
                }
            }
            Repr::Enumerated(bits) => Self {
                repr: Repr::Enumerated(Bits {
                    mask: bits.mask | bit_for((bits.index_of)(&state)),
                    ..*bits
                }),
            },
            Repr::Lazy(lazy) => lazy.backing().with_state(state),
        }
    }

    /// Whether this set has no members.
    pub fn is_empty(&self) -> bool {
        match &self.repr {
            Repr::Empty => true,
            Repr::Listed(states) => states.is_empty(),
            Repr::Enumerated(bits) => bits.mask == 0,
            Repr::Lazy(lazy) => lazy.backing().is_empty(),
        }
    }

    /// The number of distinct states in this set.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Listed(states) => states.len(),
            Repr::Enumerated(bits) => bits.mask.count_ones() as usize,
            Repr::Lazy(lazy) => lazy.backing().len(),
        }
    }

    /// Iterates over the states in this set.
    ///
    /// Listed sets yield states in insertion order, enumerated sets in
    /// variant order. Each call starts a fresh iteration.
    pub fn states(&self) -> Iter<'_, S> {
        let inner = match &self.repr {
            Repr::Empty => IterInner::Empty,
            Repr::Listed(states) => IterInner::Listed(states.iter()),
            Repr::Enumerated(bits) => IterInner::Enumerated {
                mask: bits.mask,
                state_at: bits.state_at,
            },
            Repr::Lazy(lazy) => return lazy.backing().states(),
        };
        Iter { inner }
    }
}

impl<S: EnumState> StateSet<S> {
    /// A bitset-backed set over an enumerated state type.
    ///
    /// # Panics
    ///
    /// Panics with [`ConfigurationError::IndexOutOfRange`] if a state's
    /// index is not below [`MAX_ENUM_STATES`].
    pub fn of_enum<I>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mask = states
            .into_iter()
            .fold(0u128, |mask, state| mask | bit_for(state.index()));

        Self {
            repr: Repr::Enumerated(Bits {
                mask,
                index_of: S::index,
                state_at: S::from_index,
            }),
        }
    }

    /// Every variant of an enumerated state type.
    pub fn all() -> Self {
        Self::of_enum((0..S::COUNT).filter_map(S::from_index))
    }
}

impl<S: State> LazyStates<S> {
    fn backing(&self) -> &StateSet<S> {
        self.resolved.get_or_init(|| {
            // The supplier is only gone here if an earlier call to it unwound.
            let Some(supply) = self.supplier.lock().take() else {
                panic!("{}", ConfigurationError::SupplierPanicked);
            };
            match supply() {
                Some(states) => states,
                None => panic!("{}", ConfigurationError::MissingStates),
            }
        })
    }
}

impl<S: State> FromIterator<S> for StateSet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::of(iter)
    }
}

/// Set equality: same members, regardless of backing shape or order.
impl<S: State> PartialEq for StateSet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.states().all(|state| other.contains(&state))
    }
}

impl<S: State> fmt::Display for StateSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, state) in self.states().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{state:?}")?;
        }
        f.write_str(")")
    }
}

impl<S: State> fmt::Debug for StateSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.states()).finish()
    }
}

impl<S: State + Serialize> Serialize for StateSet<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.states())
    }
}

impl<'de, S: State + Deserialize<'de>> Deserialize<'de> for StateSet<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<S>::deserialize(deserializer).map(StateSet::of)
    }
}

/// Iterator over the states of a [`StateSet`], created by
/// [`StateSet::states`].
pub struct Iter<'a, S> {
    inner: IterInner<'a, S>,
}

enum IterInner<'a, S> {
    Empty,
    Listed(std::slice::Iter<'a, S>),
    Enumerated {
        mask: u128,
        state_at: fn(usize) -> Option<S>,
    },
}

impl<S: Clone> Iterator for Iter<'_, S> {
    type Item = S;

    fn next(&mut self) -> Option<S> {
        match &mut self.inner {
            IterInner::Empty => None,
            IterInner::Listed(states) => states.next().cloned(),
            IterInner::Enumerated { mask, state_at } => {
                while *mask != 0 {
                    let index = mask.trailing_zeros() as usize;
                    *mask &= *mask - 1;
                    if let Some(state) = state_at(index) {
                        return Some(state);
                    }
                }
                None
            }
        }
    }
}

impl<S: Clone> FusedIterator for Iter<'_, S> {}
