//! Scenario tests for the suspension-capable fire path.

use hierarch::{ActionError, StateMachine, Transition};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Job {
    Queued,
    Running,
    Active,
    Done,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Event {
    Start,
    Finish,
    Poll,
    Retry,
}

fn push(log: &Log, line: impl Into<String>) {
    log.lock().push(line.into());
}

#[tokio::test]
async fn async_entry_action_runs_on_async_path() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Queued);
    let exits = Arc::clone(&log);
    machine
        .configure(Job::Queued)
        .permit(Event::Start, Job::Running)
        .on_exit(
            move |_| {
                push(&exits, "exit Queued");
                Ok(())
            },
            None,
        );
    let entries = Arc::clone(&log);
    machine.configure(Job::Running).on_entry_async(
        move |t: Transition<Job, Event>, _| {
            let entries = Arc::clone(&entries);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                push(&entries, format!("enter Running via {:?}", t.trigger()));
                Ok(())
            }
        },
        Some("warm up"),
    );

    assert!(machine.fire(Event::Start).unwrap_err().is_invalid_mode());
    assert_eq!(machine.state(), &Job::Queued);

    machine.fire_async(Event::Start).await.unwrap();

    assert_eq!(machine.state(), &Job::Running);
    assert_eq!(*log.lock(), vec!["exit Queued", "enter Running via Start"]);
}

#[tokio::test]
async fn mixed_actions_keep_registration_order() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Queued);
    machine
        .configure(Job::Queued)
        .permit(Event::Start, Job::Running);

    let first = Arc::clone(&log);
    let second = Arc::clone(&log);
    let third = Arc::clone(&log);
    machine
        .configure(Job::Running)
        .on_entry_async(
            move |_, _| {
                let first = Arc::clone(&first);
                async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    push(&first, "slow async");
                    Ok(())
                }
            },
            None,
        )
        .on_entry(
            move |_, _| {
                push(&second, "sync");
                Ok(())
            },
            None,
        )
        .on_entry_async(
            move |_, _| {
                let third = Arc::clone(&third);
                async move {
                    push(&third, "fast async");
                    Ok(())
                }
            },
            None,
        );

    machine.fire_async(Event::Start).await.unwrap();

    assert_eq!(*log.lock(), vec!["slow async", "sync", "fast async"]);
}

#[tokio::test]
async fn listeners_run_sync_first_then_async_in_order() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Queued);
    machine
        .configure(Job::Queued)
        .permit(Event::Start, Job::Running);

    let slow = Arc::clone(&log);
    machine.on_transitioned_async(move |t| {
        let slow = Arc::clone(&slow);
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            push(&slow, format!("async 1 -> {:?}", t.destination()));
        }
    });
    let sync = Arc::clone(&log);
    machine.on_transitioned(move |_| push(&sync, "sync"));
    let fast = Arc::clone(&log);
    machine.on_transitioned_async(move |_| {
        let fast = Arc::clone(&fast);
        async move { push(&fast, "async 2") }
    });

    machine.fire_async(Event::Start).await.unwrap();

    assert_eq!(*log.lock(), vec!["sync", "async 1 -> Running", "async 2"]);
}

#[tokio::test]
async fn async_unhandled_handler_swallows_trigger() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event, u8> = StateMachine::new(Job::Queued);
    machine
        .configure(Job::Queued)
        .permit_if(Event::Start, Job::Running, |slots: &u8| *slots > 0, Some("free slot"));
    let sink = Arc::clone(&log);
    machine.on_unhandled_trigger_async(move |state, trigger, unmet| {
        let sink = Arc::clone(&sink);
        async move {
            push(&sink, format!("{trigger:?} in {state:?}: {}", unmet.join(",")));
            Ok(())
        }
    });

    assert!(machine.fire_with(Event::Start, 0).unwrap_err().is_invalid_mode());

    machine.fire_async_with(Event::Start, 0).await.unwrap();

    assert_eq!(machine.state(), &Job::Queued);
    assert_eq!(*log.lock(), vec!["Start in Queued: free slot"]);
}

#[tokio::test]
async fn async_internal_transition_stays_put() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event, u32> = StateMachine::new(Job::Running);
    let sink = Arc::clone(&log);
    machine
        .configure(Job::Running)
        .internal_transition_async(
            Event::Poll,
            move |t, progress| {
                let sink = Arc::clone(&sink);
                async move {
                    push(&sink, format!("{:?} at {progress}%", t.source()));
                    Ok(())
                }
            },
            Some("report progress"),
        )
        .permit(Event::Finish, Job::Done);

    machine.fire_async_with(Event::Poll, 40).await.unwrap();
    machine.fire_async_with(Event::Poll, 80).await.unwrap();

    assert_eq!(machine.state(), &Job::Running);
    assert_eq!(*log.lock(), vec!["Running at 40%", "Running at 80%"]);
}

#[tokio::test]
async fn triggers_queued_from_async_actions_run_after_completion() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Queued);
    let queue = machine.trigger_queue();
    machine
        .configure(Job::Queued)
        .permit(Event::Start, Job::Running);
    let entries = Arc::clone(&log);
    machine
        .configure(Job::Running)
        .permit(Event::Finish, Job::Done)
        .on_entry_async(
            move |_, _| {
                let queue = queue.clone();
                let entries = Arc::clone(&entries);
                async move {
                    queue.enqueue(Event::Finish);
                    push(&entries, "enter Running");
                    Ok(())
                }
            },
            None,
        );
    let listener = Arc::clone(&log);
    machine.on_transitioned(move |t| {
        push(&listener, format!("{:?} -> {:?}", t.source(), t.destination()));
    });

    machine.fire_async(Event::Start).await.unwrap();

    assert_eq!(machine.state(), &Job::Done);
    assert_eq!(
        *log.lock(),
        vec!["enter Running", "Queued -> Running", "Running -> Done"]
    );
}

#[tokio::test]
async fn async_failure_stops_the_fire_and_clears_the_queue() {
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Running);
    let queue = machine.trigger_queue();
    machine
        .configure(Job::Running)
        .permit(Event::Finish, Job::Done)
        .permit_reentry(Event::Retry)
        .on_exit_async(
            move |_| {
                let queue = queue.clone();
                async move {
                    queue.enqueue(Event::Retry);
                    Err(ActionError::new("worker lost"))
                }
            },
            None,
        );

    let error = machine.fire_async(Event::Finish).await.unwrap_err();

    assert_eq!(error.to_string(), "worker lost");
    assert_eq!(machine.state(), &Job::Running);
    assert!(machine.trigger_queue().is_empty());
}

#[tokio::test]
async fn activation_runs_on_async_path() {
    let log: Log = Arc::default();
    let mut machine: StateMachine<Job, Event> = StateMachine::new(Job::Running);
    let outer = Arc::clone(&log);
    machine
        .configure(Job::Active)
        .on_activate_async(
            move || {
                let outer = Arc::clone(&outer);
                async move {
                    push(&outer, "activate Active");
                    Ok(())
                }
            },
            None,
        );
    let inner = Arc::clone(&log);
    let inner_off = Arc::clone(&log);
    machine
        .configure(Job::Running)
        .substate_of(Job::Active)
        .unwrap()
        .on_activate(
            move || {
                push(&inner, "activate Running");
                Ok(())
            },
            None,
        )
        .on_deactivate_async(
            move || {
                let inner_off = Arc::clone(&inner_off);
                async move {
                    push(&inner_off, "deactivate Running");
                    Ok(())
                }
            },
            None,
        );

    assert!(machine.activate().unwrap_err().is_invalid_mode());

    machine.activate_async().await.unwrap();
    assert!(machine.node(&Job::Active).unwrap().is_active());
    assert!(machine.node(&Job::Running).unwrap().is_active());

    assert!(machine.deactivate().unwrap_err().is_invalid_mode());
    machine.deactivate_async().await.unwrap();

    assert!(machine.states().all(|node| !node.is_active()));
    assert_eq!(
        *log.lock(),
        vec!["activate Active", "activate Running", "deactivate Running"]
    );
}
