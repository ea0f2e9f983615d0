//! Async Pipeline
//!
//! This example drives a small job pipeline with suspension-capable actions.
//!
//! Key concepts:
//! - Async entry actions and listeners awaited one at a time
//! - Dynamic transitions chosen from the fire arguments
//! - Initial transitions into a default substate
//! - Triggers queued from inside an action
//!
//! Run with: cargo run --example async_pipeline

use hierarch::{DynamicStateInfo, MachineError, StateMachine};
use std::time::Duration;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Stage {
    Idle,
    Processing,
    Fetching,
    Transforming,
    Published,
    Rejected,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Step {
    Submit,
    Fetched,
    Review,
}

#[derive(Clone, Debug, Default)]
struct Payload {
    records: usize,
}

#[tokio::main]
async fn main() -> Result<(), MachineError> {
    println!("=== Async Pipeline ===\n");

    let mut pipeline: StateMachine<Stage, Step, Payload> = StateMachine::new(Stage::Idle);
    let queue = pipeline.trigger_queue();

    pipeline
        .configure(Stage::Idle)
        .permit(Step::Submit, Stage::Processing);

    pipeline
        .configure(Stage::Processing)
        .initial_transition(Stage::Fetching)?
        .on_entry(
            |_, payload| {
                println!("  processing {} records", payload.records);
                Ok(())
            },
            None,
        );

    pipeline
        .configure(Stage::Fetching)
        .substate_of(Stage::Processing)?
        .permit(Step::Fetched, Stage::Transforming)
        .on_entry_async(
            move |_, payload: Payload| {
                let queue = queue.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    println!("  fetched {} records", payload.records);
                    queue.enqueue_with(Step::Fetched, payload);
                    Ok(())
                }
            },
            Some("download"),
        );

    pipeline
        .configure(Stage::Transforming)
        .substate_of(Stage::Processing)?
        .permit_dynamic(
            Step::Review,
            |payload: &Payload| {
                if payload.records > 0 {
                    Stage::Published
                } else {
                    Stage::Rejected
                }
            },
            Some("has records"),
            vec![
                DynamicStateInfo {
                    destination: Stage::Published,
                    criterion: "at least one record".to_string(),
                },
                DynamicStateInfo {
                    destination: Stage::Rejected,
                    criterion: "empty payload".to_string(),
                },
            ],
        );

    pipeline
        .configure(Stage::Published)
        .permit(Step::Submit, Stage::Processing);

    pipeline.on_transitioned_async(|t| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        println!("  {:?} -> {:?}", t.source(), t.destination());
    });

    println!("Submit 3 records:");
    pipeline
        .fire_async_with(Step::Submit, Payload { records: 3 })
        .await?;
    println!("  now in {:?}", pipeline.state());

    println!("Review:");
    pipeline
        .fire_async_with(Step::Review, Payload { records: 3 })
        .await?;

    println!("\nSynchronous fire is refused while async listeners exist:");
    if let Err(error) = pipeline.fire_with(Step::Submit, Payload::default()) {
        println!("  {error}");
    }

    println!("\nFinal state: {:?}", pipeline.state());
    println!("\n=== Example Complete ===");
    Ok(())
}
