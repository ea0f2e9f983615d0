//! Turnstile State Machine
//!
//! This example demonstrates a hierarchical turnstile driven synchronously.
//!
//! Key concepts:
//! - Guarded transitions with described conditions
//! - A superstate whose transitions every substate inherits
//! - Reentrant and internal transitions
//! - Transition listeners and unhandled triggers
//!
//! Run with: cargo run --example turnstile

use hierarch::{MachineError, StateMachine};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Turnstile {
    InService,
    Locked,
    Unlocked,
    Maintenance,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Input {
    Coin,
    Push,
    Service,
    Resume,
    Count,
}

fn main() -> Result<(), MachineError> {
    println!("=== Turnstile State Machine ===\n");

    let mut turnstile: StateMachine<Turnstile, Input, u32> = StateMachine::new(Turnstile::Locked);

    turnstile
        .configure(Turnstile::InService)
        .permit(Input::Service, Turnstile::Maintenance)
        .on_exit(
            |t| {
                println!("  leaving service ({:?})", t.trigger());
                Ok(())
            },
            None,
        );

    turnstile
        .configure(Turnstile::Locked)
        .substate_of(Turnstile::InService)?
        .permit_if(Input::Coin, Turnstile::Unlocked, |cents: &u32| *cents >= 50, Some("fare paid"))
        .internal_transition(
            Input::Count,
            |_, _| {
                println!("  counting passengers without unlocking");
                Ok(())
            },
            Some("count passenger"),
        )
        .on_entry(
            |_, _| {
                println!("  bolt engaged");
                Ok(())
            },
            None,
        );

    turnstile
        .configure(Turnstile::Unlocked)
        .substate_of(Turnstile::InService)?
        .permit(Input::Push, Turnstile::Locked)
        .permit_reentry(Input::Coin)
        .on_entry(
            |t, cents| {
                println!("  unlocked by {:?} with {cents} cents", t.trigger());
                Ok(())
            },
            None,
        );

    turnstile
        .configure(Turnstile::Maintenance)
        .permit(Input::Resume, Turnstile::Locked);

    turnstile.on_transitioned(|t| {
        println!("  {:?} -> {:?} on {:?}", t.source(), t.destination(), t.trigger());
    });

    println!("Initial state: {:?}", turnstile.state());
    println!("Permitted with 60 cents: {:?}\n", turnstile.permitted_triggers_with(&60));

    println!("Insert 20 cents:");
    if let Err(error) = turnstile.fire_with(Input::Coin, 20) {
        println!("  refused: {error}");
    }

    println!("Insert 60 cents:");
    turnstile.fire_with(Input::Coin, 60)?;

    println!("Insert another coin while unlocked:");
    turnstile.fire_with(Input::Coin, 50)?;

    println!("Push through:");
    turnstile.fire_with(Input::Push, 0)?;

    println!("Count passengers:");
    turnstile.fire_with(Input::Count, 0)?;

    println!("Call maintenance (inherited from InService):");
    turnstile.fire_with(Input::Service, 0)?;
    println!("  in service? {}", turnstile.is_in_state(&Turnstile::InService));

    println!("Resume:");
    turnstile.fire_with(Input::Resume, 0)?;

    println!("\nFinal state: {:?}", turnstile.state());
    println!("\n=== Example Complete ===");
    Ok(())
}
