//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - Graph declared with `state_enum!`
//! - Illegal transitions leave the state untouched
//! - Conditional transitions with an expected current state
//!
//! Run with: RUST_LOG=statebound=trace cargo run --example traffic_light

use statebound::{state_enum, MutableStateful, State, StateCell, Stateful};
use tracing_subscriber::EnvFilter;

state_enum! {
    enum TrafficLight {
        Red => [Green],
        Green => [Yellow],
        Yellow => [Red],
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let light: StateCell<TrafficLight> = StateCell::new(TrafficLight::Red);
    println!("Initial state: {:?}\n", light.state());

    println!("Cycling twice:");
    for _ in 0..6 {
        let next = light
            .allowed_transitions()
            .states()
            .next()
            .unwrap_or(TrafficLight::Red);
        match light.transition_to(next) {
            Ok(_) => println!("  -> {next:?}"),
            Err(error) => println!("  {error}"),
        }
    }

    println!("\nSkipping yellow:");
    match light.transition_to(TrafficLight::Yellow) {
        Ok(_) => println!("  unexpectedly allowed"),
        Err(error) => println!("  {error}"),
    }
    println!("  still {:?}", light.state());

    println!("\nConditional transition from the wrong state:");
    if let Err(error) = light.transition(&TrafficLight::Green, TrafficLight::Yellow) {
        println!("  {error}");
    }

    println!("\nReachable from each state:");
    for state in [TrafficLight::Red, TrafficLight::Green, TrafficLight::Yellow] {
        println!("  {state:?} -> {}", state.allowed_transitions());
    }

    println!("\n=== Example Complete ===");
}
