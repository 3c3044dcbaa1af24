use std::time::Duration;

use pretty_assertions::assert_eq;
use services::{
    BatchConfirmer,
    types::{ConfirmationFailure, ConfirmationStatus, Handle, outcomes_per_handle},
};
use test_case::test_case;
use test_helpers::{
    confirmer_config, handles,
    mocks::confirmer::{self, Behaviour},
};

fn status_of(
    run: &services::batch_confirmer::service::ConfirmationRun,
    handle: &str,
) -> ConfirmationStatus {
    run.outcomes
        .iter()
        .find(|outcome| outcome.handle == Handle::new(handle))
        .map(|outcome| outcome.status)
        .expect("every handle to have an outcome")
}

#[tokio::test(start_paused = true)]
async fn timeouts_and_rejections_fail_while_fast_confirmations_succeed() {
    // given
    let api = confirmer::behaving([
        (Handle::new("h0"), Behaviour::ConfirmsAfter(Duration::from_millis(10))),
        (Handle::new("h1"), Behaviour::ConfirmsAfter(Duration::from_millis(5000))),
        (Handle::new("h2"), Behaviour::RejectsAfter(Duration::ZERO)),
    ]);
    let confirmer = BatchConfirmer::new(api, confirmer_config(2, Duration::from_millis(3000)));

    // when
    let run = confirmer.confirm_all(handles(3)).await;

    // then
    assert_eq!(status_of(&run, "h0"), ConfirmationStatus::Success);
    assert_eq!(status_of(&run, "h1"), ConfirmationStatus::Failed);
    assert_eq!(status_of(&run, "h2"), ConfirmationStatus::Failed);

    // first batch holds h0 and h1, second one only h2
    let mut first_batch = run.outcomes[..2]
        .iter()
        .map(|outcome| outcome.handle.clone())
        .collect::<Vec<_>>();
    first_batch.sort();
    assert_eq!(first_batch, vec![Handle::new("h0"), Handle::new("h1")]);
    assert_eq!(run.outcomes[2].handle, Handle::new("h2"));

    assert_eq!(run.reports.len(), 2);
    let first = run.reports[0];
    assert_eq!((first.succeeded, first.failed), (1, 1));
    assert!(first.elapsed >= Duration::from_millis(3000));
    assert!(first.elapsed < Duration::from_millis(5000));

    let second = run.reports[1];
    assert_eq!((second.size, second.succeeded, second.failed), (1, 0, 1));
}

#[tokio::test(start_paused = true)]
async fn successful_confirmation_carries_its_receipt() {
    // given
    let api = confirmer::behaving([(
        Handle::new("h0"),
        Behaviour::ConfirmsAfter(Duration::from_millis(1)),
    )]);
    let confirmer = BatchConfirmer::new(api, confirmer_config(10, Duration::from_secs(3)));

    // when
    let run = confirmer.confirm_all(handles(1)).await;

    // then
    let outcome = &run.outcomes[0];
    assert_eq!(outcome.status, ConfirmationStatus::Success);
    assert_eq!(outcome.receipt, Some(confirmer::receipt_for(&Handle::new("h0"))));
    assert_eq!(outcome.failure, None);
}

#[tokio::test(start_paused = true)]
async fn rejection_and_timeout_are_told_apart_but_both_fail() {
    // given
    let api = confirmer::behaving([
        (Handle::new("h0"), Behaviour::RejectsAfter(Duration::from_millis(1))),
        (Handle::new("h1"), Behaviour::ConfirmsAfter(Duration::from_secs(10))),
    ]);
    let confirmer = BatchConfirmer::new(api, confirmer_config(2, Duration::from_secs(1)));

    // when
    let run = confirmer.confirm_all(handles(2)).await;

    // then
    for outcome in &run.outcomes {
        assert_eq!(outcome.status, ConfirmationStatus::Failed);
        assert!(outcome.receipt.is_none());
    }
    let failure_of = |handle: &str| {
        run.outcomes
            .iter()
            .find(|o| o.handle == Handle::new(handle))
            .and_then(|o| o.failure.clone())
    };
    assert!(matches!(failure_of("h0"), Some(ConfirmationFailure::Rejected(_))));
    assert_eq!(failure_of("h1"), Some(ConfirmationFailure::TimedOut));
    assert_eq!(run.progress.failed, 2);
}

#[tokio::test(start_paused = true)]
async fn confirmations_within_a_batch_run_concurrently() {
    // given
    let api = confirmer::confirms_everything_after(Duration::from_millis(800));
    let confirmer = BatchConfirmer::new(api, confirmer_config(5, Duration::from_secs(3)));

    // when
    let run = confirmer.confirm_all(handles(5)).await;

    // then
    assert_eq!(run.reports.len(), 1);
    let elapsed = run.reports[0].elapsed;
    assert!(elapsed >= Duration::from_millis(800));
    assert!(elapsed < Duration::from_millis(1600), "took {elapsed:?}");
    assert_eq!(run.progress.succeeded, 5);
}

#[tokio::test(start_paused = true)]
async fn batches_run_one_after_another() {
    // given
    let api = confirmer::confirms_everything_after(Duration::from_millis(500));
    let confirmer = BatchConfirmer::new(api, confirmer_config(2, Duration::from_secs(3)));
    let start = tokio::time::Instant::now();

    // when
    let run = confirmer.confirm_all(handles(5)).await;

    // then
    assert_eq!(run.reports.len(), 3);
    assert!(start.elapsed() >= Duration::from_millis(1500));
    let indices = run.reports.iter().map(|r| r.index).collect::<Vec<_>>();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test_case(1, 1; "single handle")]
#[test_case(7, 3; "trailing partial batch")]
#[test_case(9, 3; "even batches")]
#[test_case(4, 10; "batch larger than input")]
#[tokio::test(start_paused = true)]
async fn every_handle_gets_exactly_one_outcome(amount: usize, batch_size: usize) {
    // given
    let api = confirmer::confirms_everything_after(Duration::from_millis(10));
    let confirmer = BatchConfirmer::new(api, confirmer_config(batch_size, Duration::from_secs(3)));

    // when
    let run = confirmer.confirm_all(handles(amount)).await;

    // then
    let counts = outcomes_per_handle(&run.outcomes);
    assert_eq!(counts.len(), amount);
    assert!(counts.values().all(|&count| count == 1));
    assert_eq!(run.reports.len(), amount.div_ceil(batch_size));
    assert!(run.reports[..run.reports.len() - 1].iter().all(|r| r.size == batch_size));
    assert_eq!(run.progress.processed, amount);
}

#[tokio::test(start_paused = true)]
async fn a_broken_batch_does_not_stop_the_next_one() {
    // given
    let api = confirmer::behaving([
        (Handle::new("h0"), Behaviour::Panics),
        (Handle::new("h1"), Behaviour::ConfirmsAfter(Duration::from_millis(10))),
        (Handle::new("h2"), Behaviour::ConfirmsAfter(Duration::from_millis(10))),
    ]);
    let confirmer = BatchConfirmer::new(api, confirmer_config(2, Duration::from_secs(3)));

    // when
    let run = confirmer.confirm_all(handles(3)).await;

    // then
    assert_eq!(run.reports.len(), 1, "the first batch's report is skipped");
    assert_eq!(run.reports[0].index, 1);
    assert_eq!(status_of(&run, "h0"), ConfirmationStatus::Failed);
    assert_eq!(status_of(&run, "h1"), ConfirmationStatus::Success);
    assert_eq!(status_of(&run, "h2"), ConfirmationStatus::Success);
    assert_eq!(run.progress.processed, 3);
    assert_eq!(run.progress.succeeded, 2);
}
