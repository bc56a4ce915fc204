//! Document Approval Workflow
//!
//! This example demonstrates a multi-stage approval workflow driven through
//! interactions.
//!
//! Key concepts:
//! - Multi-stage workflow (Draft -> Review -> Approved -> Published)
//! - Incoming states act as preconditions
//! - Operations report their own errors (word count validation)
//! - Short-circuit states make publishing idempotent
//!
//! Run with: RUST_LOG=statebound=trace cargo run --example document_workflow

use statebound::{
    delegate_stateful, state_enum, IllegalTransition, MutableStateful, StateCell, StateSet,
    Stateful, TransitionError,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum DocState {
        Draft => [Review],
        Review => [Approved, Draft],
        Approved => [Published],
        Published => [],
    }
}

struct Document {
    id: u64,
    word_count: usize,
    state: StateCell<DocState>,
}

delegate_stateful!(Document => state: DocState);

#[derive(Debug, Error)]
enum ReviewError {
    #[error("document {id} has {words} words, at least 100 are required")]
    TooShort { id: u64, words: usize },

    #[error(transparent)]
    Transition(#[from] IllegalTransition<DocState>),
}

fn submit_for_review(doc: &Document) -> Result<(), ReviewError> {
    let result = doc
        .interact()
        .incoming_states(StateSet::of([DocState::Draft]))
        .interaction(|doc| {
            if doc.word_count < 100 {
                return Err(ReviewError::TooShort {
                    id: doc.id,
                    words: doc.word_count,
                });
            }
            doc.transition_to(DocState::Review)
                .map_err(|error| ReviewError::from(error.detach()))
        })
        .execute()?;

    match result.error() {
        Some(error) => println!("  document {} not submitted: {error}", doc.id),
        None => println!("  document {} submitted for review", doc.id),
    }
    Ok(())
}

fn publish(doc: &Document) -> Result<(), IllegalTransition<DocState>> {
    let result = doc
        .interact()
        .incoming_states(StateSet::of([DocState::Approved]))
        .outgoing_states(StateSet::of([DocState::Published]))
        .short_circuit_states(StateSet::of([DocState::Published]))
        .interaction(|doc| doc.transition_to(DocState::Published))
        .execute()?;

    if result.is_short_circuited() {
        println!("  document {} was already published", doc.id);
    } else if let Some(error) = result.error() {
        println!("  document {} not published: {error}", doc.id);
    } else {
        println!("  document {} published", doc.id);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Document Approval Workflow ===\n");

    let short = Document {
        id: 1,
        word_count: 40,
        state: StateCell::new(DocState::Draft),
    };
    let long = Document {
        id: 2,
        word_count: 1200,
        state: StateCell::new(DocState::Draft),
    };

    println!("Submitting documents:");
    if let Err(error) = submit_for_review(&short) {
        println!("  rejected: {error}");
    }
    submit_for_review(&long)?;

    println!("\nPublishing before approval:");
    publish(&long)?;

    println!("\nApproving and publishing twice:");
    long.transition(&DocState::Review, DocState::Approved)
        .map_err(TransitionError::detach)?;
    publish(&long)?;
    publish(&long)?;

    println!("\nFinal states:");
    println!("  document {}: {:?}", short.id, short.state());
    println!("  document {}: {:?}", long.id, long.state());

    println!("\n=== Example Complete ===");
    Ok(())
}
