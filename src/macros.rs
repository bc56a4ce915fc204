//! Macros for declaring state graphs and stateful types.

/// Declares an enum state type together with its transition graph.
///
/// Each variant lists the variants it may move to. The macro derives
/// `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Debug` and serde's
/// `Serialize`/`Deserialize`, and implements [`State`](crate::State) and
/// [`EnumState`](crate::EnumState), so transition sets are bitset-backed.
///
/// # Example
///
/// ```
/// use statebound::{state_enum, State};
///
/// state_enum! {
///     pub enum Ticket {
///         Open => [InProgress, Closed],
///         InProgress => [Open, Resolved],
///         Resolved => [Closed, Open],
///         Closed => [],
///     }
/// }
///
/// assert!(Ticket::Open.can_transition_to(&Ticket::Closed));
/// assert!(!Ticket::Closed.can_transition_to(&Ticket::Open));
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => [$($target:ident),* $(,)?]
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::EnumState for $name {
            const COUNT: usize = [$($name::$variant),*].len();

            fn index(&self) -> usize {
                *self as usize
            }

            fn from_index(index: usize) -> Option<Self> {
                const VARIANTS: &[$name] = &[$($name::$variant),*];
                VARIANTS.get(index).copied()
            }
        }

        impl $crate::State for $name {
            fn configure_allowed_transitions(&self) -> $crate::StateSet<Self> {
                match self {
                    $(
                        Self::$variant => $crate::StateSet::<$name>::of_enum([$($name::$target),*]),
                    )*
                }
            }
        }
    };
}

/// Implements [`Stateful`](crate::Stateful) and
/// [`MutableStateful`](crate::MutableStateful) for a type by delegating to an
/// embedded [`StateCell`](crate::StateCell) (or any other mutable stateful)
/// field.
///
/// The syntax is `delegate_stateful!(Type => field: StateType)`.
///
/// # Example
///
/// ```
/// use statebound::{delegate_stateful, state_enum, MutableStateful, StateCell, Stateful};
///
/// state_enum! {
///     enum Light {
///         Off => [On],
///         On => [Off],
///     }
/// }
///
/// struct Lamp {
///     name: String,
///     light: StateCell<Light>,
/// }
///
/// delegate_stateful!(Lamp => light: Light);
///
/// let lamp = Lamp {
///     name: "desk".to_string(),
///     light: StateCell::new(Light::Off),
/// };
///
/// let lamp = lamp.transition_to(Light::On)?;
/// assert_eq!(lamp.state(), Light::On);
/// assert_eq!(lamp.name, "desk");
/// # Ok::<(), statebound::IllegalTransition<Light>>(())
/// ```
#[macro_export]
macro_rules! delegate_stateful {
    ($ty:ty => $field:ident : $state:ty) => {
        impl $crate::Stateful for $ty {
            type State = $state;

            fn state(&self) -> $state {
                $crate::Stateful::state(&self.$field)
            }

            fn allowed_transitions(&self) -> $crate::StateSet<$state> {
                $crate::Stateful::allowed_transitions(&self.$field)
            }

            fn lock_exclusive(&self) -> ::core::option::Option<$crate::ExclusiveGuard<'_>> {
                $crate::Stateful::lock_exclusive(&self.$field)
            }
        }

        impl $crate::MutableStateful for $ty {
            fn transition_to(
                &self,
                state: $state,
            ) -> ::core::result::Result<&Self, $crate::IllegalTransition<$state, &Self>> {
                $crate::MutableStateful::transition_to(&self.$field, state)
                    .map_err(|error| error.with_instance(self))?;
                ::core::result::Result::Ok(self)
            }

            fn transition(
                &self,
                expected: &$state,
                state: $state,
            ) -> ::core::result::Result<&Self, $crate::TransitionError<$state, &Self>> {
                $crate::MutableStateful::transition(&self.$field, expected, state)
                    .map_err(|error| error.with_instance(self))?;
                ::core::result::Result::Ok(self)
            }
        }
    };
}
