//! Shared Resource Across Threads
//!
//! This example demonstrates interactions racing on one instance.
//!
//! Key concepts:
//! - Read/write locked cells shared through `Arc`
//! - Interactions hold the instance lock for check, operation and check
//! - Short-circuiting makes the initialization run exactly once
//! - Read-only views observe the live state
//!
//! Run with: RUST_LOG=statebound=trace cargo run --example shared_counter

use statebound::{
    delegate_stateful, state_enum, MutableStateful, RwStateCell, StateCell, StateSet, Stateful,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Resource {
        Cold => [Warming],
        Warming => [Ready, Cold],
        Ready => [Cold],
    }
}

struct Cache {
    loads: AtomicUsize,
    state: RwStateCell<Resource>,
}

delegate_stateful!(Cache => state: Resource);

fn warm_up(cache: &Cache) -> Result<bool, statebound::IllegalTransition<Resource>> {
    let result = cache
        .interact()
        .incoming_states(StateSet::of([Resource::Cold]))
        .outgoing_states(StateSet::of([Resource::Ready]))
        .short_circuit_states(StateSet::of([Resource::Ready]))
        .interaction(|cache| {
            cache.transition_to(Resource::Warming)?;
            cache.loads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            cache.transition_to(Resource::Ready)
        })
        .execute()?;

    Ok(result.is_succeeded())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Shared Resource Across Threads ===\n");

    let cache = Arc::new(Cache {
        loads: AtomicUsize::new(0),
        state: StateCell::new(Resource::Cold),
    });

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || match warm_up(&cache) {
                Ok(true) => println!("  worker {worker} warmed the cache"),
                Ok(false) => println!("  worker {worker} found it ready"),
                Err(error) => println!("  worker {worker} failed: {error}"),
            })
        })
        .collect();

    for worker in workers {
        worker.join().map_err(|_| "worker panicked")?;
    }

    let view = cache.as_immutable();
    println!("\nLoads performed: {}", cache.loads.load(Ordering::SeqCst));
    println!("State through read-only view: {:?}", view.state());

    cache
        .transition(&Resource::Ready, Resource::Cold)
        .map_err(statebound::TransitionError::detach)?;
    println!("After eviction the view reports: {:?}", view.state());

    println!("\n=== Example Complete ===");
    Ok(())
}
