//! Property-based tests for the dispatch algorithm and the notification
//! contract.
//!
//! These tests use proptest to verify properties hold across many randomly
//! generated inputs.

use proptest::prelude::*;
use statecraft::builder::ChartBuilder;
use statecraft::core::{Chart, Signal};
use statecraft::machine::Machine;
use statecraft::observe::{state_id, StateChange, StateObserver};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    changes: Mutex<Vec<StateChange>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.changes.lock().unwrap().len()
    }
}

impl StateObserver for Recorder {
    fn state_changed(&self, change: &StateChange) {
        self.changes.lock().unwrap().push(change.clone());
    }
}

fn workflow() -> Chart {
    ChartBuilder::new("Workflow")
        .state("Init", |s| s.on("Next", "Preparing"))
        .state("Preparing", |s| s.on_completion("Working"))
        .state("Working", |s| s.on("Finish", "Done").on("Reset", "Init"))
        .final_state("Done")
        .initial("Init")
        .build()
        .unwrap()
}

prop_compose! {
    fn arbitrary_tag()(tag in "[A-Za-z]{1,12}") -> String {
        tag
    }
}

proptest! {
    #[test]
    fn unknown_events_never_move_the_machine(tags in prop::collection::vec(arbitrary_tag(), 1..20)) {
        let known = ["Next", "Finish", "Reset"];
        let mut machine = Machine::new(workflow());

        for tag in &tags {
            let before = machine.current_state().name().to_owned();
            let handled = machine.trigger(&Signal(tag));
            if !known.contains(&tag.as_str()) {
                prop_assert!(!handled);
                prop_assert_eq!(machine.current_state().name(), before);
            }
        }
    }

    #[test]
    fn dispatch_always_settles(tags in prop::collection::vec(arbitrary_tag(), 0..30)) {
        let mut machine = Machine::new(workflow());

        for tag in &tags {
            machine.trigger(&Signal(tag));
            // a settled machine does not move again without a new event
            let settled = machine.current_state().name().to_owned();
            let handled_again = machine.trigger(&Signal("NoSuchEvent"));
            prop_assert!(!handled_again);
            prop_assert_eq!(machine.current_state().name(), settled);
        }
    }

    #[test]
    fn finished_machines_handle_nothing(tag in arbitrary_tag()) {
        let mut machine = Machine::new(workflow());
        machine.trigger(&Signal("Next"));
        machine.trigger(&Signal("Finish"));
        prop_assert!(machine.is_finished());

        prop_assert!(!machine.trigger(&Signal(&tag)));
        prop_assert_eq!(machine.current_state().name(), "Done");
    }

    #[test]
    fn forcing_state_never_notifies(pick in 0..4usize) {
        let names = ["Init", "Preparing", "Working", "Done"];
        let recorder = Arc::new(Recorder::default());
        let mut machine = Machine::new(workflow());
        machine.subscribe(recorder.clone());

        machine.force_state(names[pick]).unwrap();

        prop_assert_eq!(recorder.count(), 0);
        prop_assert_eq!(machine.current_state().name(), names[pick]);
        prop_assert!(machine.history().transitions().is_empty());
    }

    #[test]
    fn notifications_chain_old_to_new(tags in prop::collection::vec(arbitrary_tag(), 0..20)) {
        let recorder = Arc::new(Recorder::default());
        let mut machine = Machine::new(workflow());
        machine.subscribe(recorder.clone());

        for tag in &tags {
            machine.trigger(&Signal(tag));
        }

        // consecutive records on a single machine always link up
        let changes = recorder.changes.lock().unwrap();
        for pair in changes.windows(2) {
            prop_assert_eq!(&pair[0].new_state_name, &pair[1].old_state_name);
        }
    }

    #[test]
    fn state_ids_are_stable_and_distinct(
        machine_a in "[A-Za-z][A-Za-z0-9 ]{0,15}",
        machine_b in "[A-Za-z][A-Za-z0-9 ]{0,15}",
        state_a in "[A-Za-z][A-Za-z0-9 ]{0,15}",
        state_b in "[A-Za-z][A-Za-z0-9 ]{0,15}",
    ) {
        prop_assert_eq!(state_id(&machine_a, &state_a), state_id(&machine_a, &state_a));
        if (machine_a.as_str(), state_a.as_str()) != (machine_b.as_str(), state_b.as_str()) {
            prop_assert_ne!(state_id(&machine_a, &state_a), state_id(&machine_b, &state_b));
        }
    }
}
