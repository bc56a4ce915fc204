//! The `State` trait and compute-once transition tables.
//!
//! A state is a node in a caller-defined directed graph: it knows which
//! states it may move to. Enumerations usually declare their edges with a
//! `match` (or the [`state_enum!`](crate::state_enum) macro); struct states
//! that want the graph computed once per instance hold a
//! [`TransitionCache`].

use super::states::StateSet;
use std::fmt::{self, Debug};
use std::sync::OnceLock;

/// Trait for states of a stateful object.
///
/// # Required Traits
///
/// - `Clone`: the current state is handed out by value
/// - `PartialEq`: membership and expectations compare by value
/// - `Debug`: states appear in error messages and trace events
/// - `Send + Sync + 'static`: states are shared between threads
///
/// # Example
///
/// ```rust
/// use statebound::{State, StateSet};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Order {
///     Placed,
///     Shipped,
///     Delivered,
/// }
///
/// impl State for Order {
///     fn configure_allowed_transitions(&self) -> StateSet<Self> {
///         match self {
///             Self::Placed => StateSet::of([Self::Shipped]),
///             Self::Shipped => StateSet::of([Self::Delivered]),
///             Self::Delivered => StateSet::empty(),
///         }
///     }
/// }
///
/// assert!(Order::Placed.can_transition_to(&Order::Shipped));
/// assert!(!Order::Placed.can_transition_to(&Order::Delivered));
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The states reachable from this state.
    ///
    /// Served from [`transition_cache`](Self::transition_cache) when the
    /// state has one, so the graph is configured at most once per instance.
    /// Otherwise [`configure_allowed_transitions`](Self::configure_allowed_transitions)
    /// is consulted on every call.
    fn allowed_transitions(&self) -> StateSet<Self> {
        match self.transition_cache() {
            Some(cache) => cache.get_or_configure(|| self.configure_allowed_transitions()),
            None => self.configure_allowed_transitions(),
        }
    }

    /// Declares the states reachable from this state.
    ///
    /// Default implementation allows no transitions.
    fn configure_allowed_transitions(&self) -> StateSet<Self> {
        StateSet::empty()
    }

    /// Per-instance memo for [`allowed_transitions`](Self::allowed_transitions).
    ///
    /// Default implementation returns `None`.
    fn transition_cache(&self) -> Option<&TransitionCache<Self>> {
        None
    }

    fn can_transition_to(&self, state: &Self) -> bool {
        self.allowed_transitions().contains(state)
    }
}

/// A state type with a fixed, small number of variants.
///
/// Sets of such states may be stored as a bitset via
/// [`StateSet::of_enum`].
pub trait EnumState: State + Copy {
    /// Number of variants; indexes are `0..COUNT`.
    const COUNT: usize;

    fn index(&self) -> usize;

    fn from_index(index: usize) -> Option<Self>;
}

/// Compute-once storage for a state's allowed transitions.
///
/// The first call to [`get_or_configure`](Self::get_or_configure) runs the
/// configure function; concurrent first callers block until it finishes and
/// all observe the same set.
///
/// # Example
///
/// ```rust
/// use statebound::{State, StateSet, TransitionCache};
///
/// #[derive(Debug)]
/// struct Node {
///     name: &'static str,
///     transitions: TransitionCache<&'static Node>,
/// }
///
/// impl PartialEq for Node {
///     fn eq(&self, other: &Self) -> bool {
///         std::ptr::eq(self, other)
///     }
/// }
///
/// // Forward references between statics are resolved on first use.
/// static PING: Node = Node { name: "ping", transitions: TransitionCache::new() };
/// static PONG: Node = Node { name: "pong", transitions: TransitionCache::new() };
///
/// impl State for &'static Node {
///     fn configure_allowed_transitions(&self) -> StateSet<Self> {
///         match self.name {
///             "ping" => StateSet::of([&PONG]),
///             _ => StateSet::of([&PING]),
///         }
///     }
///
///     fn transition_cache(&self) -> Option<&TransitionCache<Self>> {
///         Some(&self.transitions)
///     }
/// }
///
/// assert!((&PING).can_transition_to(&&PONG));
/// assert!(PING.transitions.is_configured());
/// ```
pub struct TransitionCache<S> {
    cell: OnceLock<StateSet<S>>,
}

impl<S> TransitionCache<S> {
    /// An empty cache, configured on first use.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// A cache holding transitions supplied at construction.
    pub fn declared(states: StateSet<S>) -> Self {
        Self {
            cell: OnceLock::from(states),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<S: State> TransitionCache<S> {
    /// Returns the cached set, running `configure` if this is the first call.
    pub fn get_or_configure<F>(&self, configure: F) -> StateSet<S>
    where
        F: FnOnce() -> StateSet<S>,
    {
        self.cell.get_or_init(configure).clone()
    }
}

impl<S> Default for TransitionCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Debug for TransitionCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(states) => f.debug_tuple("TransitionCache").field(states).finish(),
            None => f.write_str("TransitionCache(<unconfigured>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum TestState {
        Initial,
        Intermediary,
        End,
    }

    impl State for TestState {
        fn configure_allowed_transitions(&self) -> StateSet<Self> {
            match self {
                Self::Initial => StateSet::of([Self::Intermediary]),
                Self::Intermediary => StateSet::of([Self::End]),
                Self::End => StateSet::empty(),
            }
        }
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Terminal;

    impl State for Terminal {}

    struct Node {
        name: &'static str,
        configured: AtomicUsize,
        transitions: TransitionCache<&'static Node>,
    }

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            std::ptr::eq(self, other)
        }
    }

    impl Debug for Node {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name)
        }
    }

    impl Node {
        const fn new(name: &'static str) -> Self {
            Self {
                name,
                configured: AtomicUsize::new(0),
                transitions: TransitionCache::new(),
            }
        }
    }

    static START: Node = Node::new("start");
    static MIDDLE: Node = Node::new("middle");
    static FINISH: Node = Node::new("finish");

    impl State for &'static Node {
        fn configure_allowed_transitions(&self) -> StateSet<Self> {
            self.configured.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            match self.name {
                "start" => StateSet::of([&MIDDLE]),
                "middle" => StateSet::of([&FINISH, &START]),
                _ => StateSet::empty(),
            }
        }

        fn transition_cache(&self) -> Option<&TransitionCache<Self>> {
            Some(&self.transitions)
        }
    }

    #[test]
    fn default_allows_no_transitions() {
        assert!(Terminal.allowed_transitions().is_empty());
        assert!(!Terminal.can_transition_to(&Terminal));
    }

    #[test]
    fn configured_transitions_are_reported() {
        assert!(TestState::Initial.can_transition_to(&TestState::Intermediary));
        assert!(!TestState::Initial.can_transition_to(&TestState::End));
        assert!(TestState::End.allowed_transitions().is_empty());
    }

    #[test]
    fn cache_configures_once_under_concurrent_first_access() {
        let barrier = Barrier::new(8);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    barrier.wait();
                    let start: &'static Node = &START;
                    assert!(start.can_transition_to(&&MIDDLE));
                });
            }
        });

        assert_eq!(START.configured.load(Ordering::SeqCst), 1);
        assert!(START.transitions.is_configured());
    }

    #[test]
    fn forward_references_resolve() {
        let middle: &'static Node = &MIDDLE;

        assert!(middle.can_transition_to(&&FINISH));
        assert!(middle.can_transition_to(&&START));
        assert!(!middle.can_transition_to(&&MIDDLE));
        assert_eq!(MIDDLE.configured.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn declared_cache_skips_configuration() {
        let cache = TransitionCache::declared(StateSet::of([TestState::End]));
        let configured = cache.get_or_configure(|| panic!("declared cache reconfigured"));

        assert!(cache.is_configured());
        assert_eq!(configured, StateSet::of([TestState::End]));
    }

    #[test]
    fn cache_debug_shows_configuration() {
        let cache: TransitionCache<TestState> = TransitionCache::new();
        assert_eq!(format!("{cache:?}"), "TransitionCache(<unconfigured>)");

        cache.get_or_configure(|| StateSet::of([TestState::Initial]));
        assert_eq!(format!("{cache:?}"), "TransitionCache({Initial})");
    }
}
