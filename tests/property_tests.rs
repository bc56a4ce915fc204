//! Property-based tests for state sets, transitions and interactions.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use statebound::{
    state_enum, EnumState, InteractionFailure, InteractionResult, MutableStateful, RwStateCell,
    State, StateCell, StateSet, Stateful, TransitionError,
};

state_enum! {
    enum Stage {
        Start => [Foo, End],
        Foo => [Foo, Bar],
        Bar => [Baz, End],
        Baz => [End],
        End => [],
    }
}

prop_compose! {
    fn arbitrary_stage()(index in 0..Stage::COUNT) -> Stage {
        Stage::from_index(index).unwrap()
    }
}

prop_compose! {
    fn arbitrary_stage_set()(mask in 0u8..(1 << Stage::COUNT)) -> StateSet<Stage> {
        (0..Stage::COUNT)
            .filter(|index| mask & (1 << index) != 0)
            .filter_map(Stage::from_index)
            .collect()
    }
}

proptest! {
    #[test]
    fn with_state_contains_exactly_added(
        added in prop::collection::vec(arbitrary_stage(), 0..8),
        probe in arbitrary_stage()
    ) {
        let listed = added
            .iter()
            .fold(StateSet::<Stage>::empty(), |set, stage| set.with_state(*stage));
        let enumerated = added
            .iter()
            .fold(StateSet::<Stage>::of_enum([]), |set, stage| set.with_state(*stage));

        prop_assert_eq!(listed.contains(&probe), added.contains(&probe));
        prop_assert_eq!(enumerated.contains(&probe), added.contains(&probe));
        prop_assert_eq!(listed.is_empty(), added.is_empty());
    }

    #[test]
    fn backing_shape_is_invisible(added in prop::collection::vec(arbitrary_stage(), 0..8)) {
        let listed = StateSet::of(added.clone());
        let enumerated = StateSet::of_enum(added.clone());
        let lazy = StateSet::lazy(move || StateSet::of(added));

        prop_assert_eq!(listed.len(), enumerated.len());
        prop_assert_eq!(&listed, &enumerated);
        prop_assert_eq!(&lazy, &listed);
        prop_assert_eq!(listed.states().count(), listed.len());
    }

    #[test]
    fn transition_to_applies_only_allowed_targets(
        start in arbitrary_stage(),
        target in arbitrary_stage()
    ) {
        let cell: StateCell<Stage> = StateCell::new(start);

        let outcome = cell.transition_to(target);

        if start.can_transition_to(&target) {
            prop_assert!(outcome.is_ok());
            prop_assert_eq!(cell.state(), target);
        } else {
            let error = outcome.unwrap_err();
            prop_assert_eq!(error.from, start);
            prop_assert_eq!(error.to, target);
            prop_assert_eq!(cell.state(), start);
        }
    }

    #[test]
    fn transition_rejects_wrong_expectation(
        start in arbitrary_stage(),
        expected in arbitrary_stage(),
        target in arbitrary_stage()
    ) {
        prop_assume!(start != expected);
        let cell: RwStateCell<Stage> = StateCell::new(start);

        let error = cell.transition(&expected, target).unwrap_err();

        prop_assert!(matches!(error, TransitionError::Unexpected(_)));
        prop_assert_eq!(cell.state(), start);
    }

    #[test]
    fn interaction_outcome_follows_state_sets(
        start in arbitrary_stage(),
        incoming in arbitrary_stage_set(),
        short_circuit in arbitrary_stage_set()
    ) {
        let cell: StateCell<Stage> = StateCell::new(start);
        let mut invoked = false;

        let result = cell
            .interact()
            .incoming_states(incoming.clone())
            .outgoing_states(StateSet::single(start))
            .short_circuit_states(short_circuit.clone())
            .consumer(|_| {
                invoked = true;
                Ok::<_, std::convert::Infallible>(())
            })
            .execute()
            .unwrap();

        if short_circuit.contains(&start) {
            prop_assert!(result.is_short_circuited());
        } else if !incoming.contains(&start) {
            let is_incoming_failure = matches!(
                result,
                InteractionResult::Failed(InteractionFailure::IllegalIncomingState { .. })
            );
            prop_assert!(is_incoming_failure);
        } else {
            prop_assert!(result.is_succeeded());
        }
        prop_assert_eq!(invoked, !short_circuit.contains(&start) && incoming.contains(&start));
        prop_assert_eq!(cell.state(), start);
    }

    #[test]
    fn state_set_serializes_as_sequence(added in prop::collection::vec(arbitrary_stage(), 0..8)) {
        let states = StateSet::of_enum(added);

        let json = serde_json::to_string(&states).unwrap();
        let deserialized: StateSet<Stage> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(deserialized, states);
    }
}
