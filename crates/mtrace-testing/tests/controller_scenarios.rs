//! End-to-end scenarios against a running session controller: delta
//! aggregation, command dispatch, backpressure and disposal.

use mtrace_session::RetransformStatus;
use mtrace_testing::{single_call_delta, TestSession};
use mtrace_types::TracepointId;
use std::time::Duration;

#[test]
fn delta_flows_through_a_refresh_tick_into_flattened_stats() {
    let session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .start();

    session
        .source
        .push_delta(single_call_delta("Foo", "bar", 3, Duration::from_nanos(900)));

    let delivered = session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snapshot| !snapshot.is_empty())
    });
    assert!(delivered, "no stats delivered within the deadline");

    let snapshot = session.sink.last_snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].tracepoint, TracepointId::new("Foo", "bar"));
    assert_eq!(snapshot[0].stats.call_count, 3);
    assert_eq!(snapshot[0].stats.wall_time, Duration::from_nanos(900));
}

#[test]
fn refresh_time_is_reported_even_without_deltas() {
    let session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .start();

    let ticked = session.wait_until(Duration::from_secs(2), |s| {
        s.sink.refresh_times().len() >= 2
    });
    assert!(ticked, "refresh loop did not tick");
    assert!(session
        .sink
        .snapshots()
        .iter()
        .all(|snapshot| snapshot.is_empty()));
}

#[test]
fn accumulation_is_monotonic_across_ticks() {
    let session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .start();

    session
        .source
        .push_delta(single_call_delta("Foo", "bar", 2, Duration::ZERO));
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snap| snap.first().is_some_and(|e| e.stats.call_count == 2))
    }));

    session
        .source
        .push_delta(single_call_delta("Foo", "bar", 5, Duration::ZERO));
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snap| snap.first().is_some_and(|e| e.stats.call_count == 7))
    }));

    // Counts never regress between the two observations.
    let counts: Vec<u64> = session
        .sink
        .snapshots()
        .iter()
        .map(|snap| snap.first().map(|e| e.stats.call_count).unwrap_or(0))
        .collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
}

#[test]
fn clear_zeroes_stats_and_is_idempotent() {
    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .start();

    session
        .source
        .push_delta(single_call_delta("Foo", "bar", 3, Duration::from_micros(1)));
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snap| snap.first().is_some_and(|e| e.stats.call_count == 3))
    }));

    session.controller.dispatch("clear");
    session.controller.dispatch("clear");
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snap| snap.first().is_some_and(|e| e.stats.call_count == 0))
    }));

    session.controller.shutdown();
    let last = session.sink.last_snapshot().unwrap();
    assert_eq!(last[0].stats.call_count, 0);
    assert_eq!(last[0].stats.wall_time, Duration::ZERO);
}

#[test]
fn reset_replaces_the_tree_with_an_empty_one() {
    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .start();

    session
        .source
        .push_delta(single_call_delta("Foo", "bar", 3, Duration::ZERO));
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink
            .last_snapshot()
            .is_some_and(|snap| !snap.is_empty())
    }));

    session.controller.dispatch("reset");
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.sink.last_snapshot().is_some_and(|snap| snap.is_empty())
    }));
    session.controller.shutdown();
}

#[test]
fn trace_command_reaches_store_and_engine() {
    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(50))
        .known_classes(&["FooService", "FooRepository", "Bar"])
        .start();

    session.controller.dispatch("trace count Foo*");
    assert!(session.wait_until(Duration::from_secs(2), |s| {
        s.store.calls().len() == 2
    }));

    let retransformed = session.engine.retransformed();
    assert_eq!(retransformed.len(), 1);
    assert_eq!(
        retransformed[0],
        vec!["FooService".to_string(), "FooRepository".to_string()]
    );
    session.controller.shutdown();
}

#[test]
fn slow_sink_throttles_the_refresh_cadence() {
    let sink_delay = Duration::from_millis(50);
    let window = Duration::from_millis(300);

    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(5))
        .sink_delay(sink_delay)
        .start();

    std::thread::sleep(window);
    session.controller.shutdown();

    let ticks = session.sink.refresh_times().len();
    // Every tick blocks on the sink for at least `sink_delay`, so the count
    // is bounded by window / sink_delay (plus one in-flight tick), never by
    // the much faster nominal cadence.
    let bound = (window.as_millis() / sink_delay.as_millis()) as usize + 2;
    assert!(
        ticks <= bound,
        "expected at most {} ticks under backpressure, saw {}",
        bound,
        ticks
    );
    assert!(ticks >= 1, "refresh loop never ticked");
}

#[test]
fn shutdown_cancels_the_rest_of_a_retransform_batch() {
    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(500))
        .known_classes(&["C0", "C1", "C2", "C3", "C4", "C5", "C6", "C7"])
        .retransform_delay(Duration::from_millis(25))
        .start();

    session.controller.dispatch("trace *");
    assert!(
        session.wait_until(Duration::from_secs(2), |s| !s.engine.outcomes().is_empty()),
        "retransform batch never started"
    );

    // The token is set while the engine is still working through the batch;
    // shutdown joins the worker, so the batch is complete afterwards.
    session.controller.shutdown();

    let outcomes = session.engine.outcomes();
    assert_eq!(outcomes.len(), 8);
    assert!(
        outcomes
            .iter()
            .any(|o| o.status == RetransformStatus::Transformed),
        "no class finished before cancellation: {:?}",
        outcomes
    );
    assert!(
        outcomes
            .iter()
            .any(|o| o.status == RetransformStatus::Cancelled),
        "cancellation never reached the batch: {:?}",
        outcomes
    );
    // Cancellation is a point of no return within one batch.
    let first_cancelled = outcomes
        .iter()
        .position(|o| o.status == RetransformStatus::Cancelled)
        .unwrap();
    assert!(outcomes[first_cancelled..]
        .iter()
        .all(|o| o.status == RetransformStatus::Cancelled));
}

#[test]
fn shutdown_stops_the_worker_and_further_dispatches_are_dropped() {
    let mut session = TestSession::builder()
        .refresh_delay(Duration::from_millis(10))
        .known_classes(&["Foo"])
        .start();

    session.controller.shutdown();
    let calls_after_shutdown = session.store.calls().len();

    // Logged and dropped, never panics.
    session.controller.dispatch("trace Foo#bar");
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(session.store.calls().len(), calls_after_shutdown);
}
