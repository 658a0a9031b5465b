// tests/property_progress.rs

use proptest::collection::vec;
use proptest::prelude::*;

use analysis_controller::progress::{
    ProgressCommand, ProgressCore, ProgressEvent, ProgressSettings, ProgressTracker, StatusUpdate,
};
use analysis_controller::types::DisplayState;
use analysis_controller_test_utils::status::RecordingStatus;

fn event(started: bool) -> ProgressEvent {
    if started {
        ProgressEvent::WorkStarted
    } else {
        ProgressEvent::WorkFinished
    }
}

/// Turn `n` and a stream of coin flips into a well-paired interleaving of
/// `n` starts and `n` finishes: a finish never precedes its start.
fn paired_sequence(n: usize, flips: &[bool]) -> Vec<ProgressEvent> {
    let mut events = Vec::with_capacity(n * 2);
    let mut remaining_starts = n;
    let mut open = 0usize;
    let mut flips = flips.iter().copied().cycle();

    while remaining_starts > 0 || open > 0 {
        let prefer_start = flips.next().unwrap_or(true);
        if remaining_starts > 0 && (open == 0 || prefer_start) {
            remaining_starts -= 1;
            open += 1;
            events.push(ProgressEvent::WorkStarted);
        } else {
            open -= 1;
            events.push(ProgressEvent::WorkFinished);
        }
    }
    events
}

proptest! {
    #[test]
    fn count_tracks_clamped_model(events in vec(any::<bool>(), 0..200)) {
        let mut core = ProgressCore::new();
        let mut model: i64 = 0;

        for started in events {
            core.step(event(started));
            model = if started { model + 1 } else { (model - 1).max(0) };

            prop_assert_eq!(core.count() as i64, model);
            prop_assert_eq!(core.spinner_active(), model > 0);
            prop_assert_eq!(
                core.display_state(),
                if model > 0 { DisplayState::Busy } else { DisplayState::Idle }
            );
        }
    }

    #[test]
    fn display_only_changes_on_transitions(events in vec(any::<bool>(), 0..200)) {
        let mut core = ProgressCore::new();

        for started in events {
            let before = core.display_state();
            let step = core.step(event(started));
            let changed = before != step.state;

            let shows = step
                .commands
                .iter()
                .filter(|c| matches!(c, ProgressCommand::ShowStatus(_)))
                .count();
            prop_assert_eq!(shows, usize::from(changed));

            if changed && step.state == DisplayState::Idle {
                prop_assert!(step.commands.contains(&ProgressCommand::StopSpinner));
                prop_assert!(step.commands.contains(&ProgressCommand::ShowStatus(StatusUpdate::Done)));
            }
        }
    }

    #[test]
    fn paired_interleavings_end_idle(
        n in 1usize..40,
        flips in vec(any::<bool>(), 1..80),
    ) {
        let status = RecordingStatus::new();
        let mut tracker = ProgressTracker::new(ProgressSettings::default(), status.sink());

        for event in paired_sequence(n, &flips) {
            tracker.handle(event);
            prop_assert_eq!(tracker.spinner_active(), tracker.count() > 0);
        }

        prop_assert_eq!(tracker.count(), 0);
        prop_assert_eq!(tracker.display_state(), DisplayState::Idle);
        prop_assert!(!tracker.spinner_active());
        let last = status.last();
        prop_assert_eq!(last.as_deref(), Some("analysis: done"));
        prop_assert_eq!(
            status.count_prefixed("analysis: working"),
            status.count_prefixed("analysis: done")
        );
    }
}
