//! Integration tests for conditional polling
//!
//! Drives [`PollClient`] against an in-memory transport with tokio's clock
//! paused, so interval and deadline behaviour is deterministic.

mod support;

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexpoll_core::{all_condition, requests, Condition, PollClient, RequestOptions, Response};
use indexpoll_domain::{PollError, Query, TermQuery};
use serde::Deserialize;
use serde_json::Value;
use support::{BrokenBody, MockTransport, Reply};

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    total: Total,
}

#[derive(Debug, Default, Deserialize)]
struct Total {
    value: u64,
}

fn hits(total: u64) -> Reply {
    Reply::ok(format!(r#"{{"hits":{{"total":{{"value":{total},"relation":"eq"}},"hits":[]}}}}"#))
}

fn total_hits_at_least(n: u64) -> Condition {
    Condition::json(move |result: &SearchResult| result.hits.total.value >= n)
}

fn options(condition: Condition, timeout: Duration, interval: Duration) -> RequestOptions {
    RequestOptions::builder()
        .timeout(timeout)
        .interval(interval)
        .condition(condition)
        .build()
        .expect("test options are valid")
}

fn search_request() -> indexpoll_core::TransportRequest {
    let body = Query::from(TermQuery::new("labels.test", "poll")).to_body();
    requests::search("traces-*", &body).expect("search body serializes")
}

#[tokio::test(start_paused = true)]
async fn test_no_condition_makes_single_attempt() {
    let transport = MockTransport::new([hits(0), hits(10)]);
    let client = PollClient::new(transport.clone());
    let mut request = search_request();
    let mut out = SearchResult::default();

    let response = client
        .execute_into(&mut request, &mut out, &RequestOptions::default())
        .await
        .expect("single attempt should succeed");

    assert_eq!(transport.attempts(), 1);
    assert_eq!(out.hits.total.value, 0);
    assert_eq!(response.status(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_no_condition_ignores_timeout() {
    let transport = MockTransport::new([hits(0)]);
    let client = PollClient::new(transport.clone());
    let opts = RequestOptions::builder()
        .timeout(Duration::from_millis(1))
        .interval(Duration::from_millis(1))
        .build()
        .unwrap();

    client.execute(&mut search_request(), &opts).await.expect("no deadline without condition");
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_eventual_success_after_exactly_k_attempts() {
    for k in 1..=4u64 {
        let replies = (1..=k).map(|i| hits(if i == k { 3 } else { 0 }));
        let transport = MockTransport::new(replies);
        let client = PollClient::new(transport.clone());
        let mut out = SearchResult::default();

        client
            .execute_into(
                &mut search_request(),
                &mut out,
                &options(total_hits_at_least(3), Duration::from_secs(10), Duration::from_millis(50)),
            )
            .await
            .expect("condition becomes true");

        assert_eq!(transport.attempts() as u64, k, "k = {k}");
        assert_eq!(out.hits.total.value, 3);
    }
}

#[tokio::test(start_paused = true)]
async fn test_attempts_are_spaced_by_interval() {
    let transport = MockTransport::new([hits(0), hits(0), hits(1)]);
    let client = PollClient::new(transport.clone());
    let started = tokio::time::Instant::now();

    client
        .execute(
            &mut search_request(),
            &options(total_hits_at_least(1), Duration::from_secs(10), Duration::from_millis(200)),
        )
        .await
        .unwrap();

    assert_eq!(transport.attempts(), 3);
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(400) && elapsed < Duration::from_millis(405),
        "unexpected elapsed time {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_deadline_bounds_attempts() {
    support::init_tracing();
    let transport = MockTransport::new([hits(0)]);
    let client = PollClient::new(transport.clone());
    let timeout = Duration::from_millis(500);
    let interval = Duration::from_millis(100);
    let started = tokio::time::Instant::now();

    let err = client
        .execute(&mut search_request(), &options(total_hits_at_least(1), timeout, interval))
        .await
        .expect_err("condition never holds");

    assert!(err.is_deadline_exceeded(), "unexpected error: {err:?}");
    let expected = (timeout.as_millis() / interval.as_millis()) as usize;
    let attempts = transport.attempts();
    assert!(
        attempts + 1 >= expected && attempts <= expected + 1,
        "expected about {expected} attempts, got {attempts}"
    );
    let elapsed = started.elapsed();
    assert!(elapsed >= timeout && elapsed < timeout + Duration::from_millis(5));
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_polling_waits_for_condition() {
    let mut replies: Vec<Reply> = (0..50).map(|_| hits(0)).collect();
    replies.push(hits(1));
    let transport = MockTransport::new(replies);
    let client = PollClient::new(transport.clone());
    let opts = RequestOptions::builder()
        .no_timeout()
        .interval(Duration::from_secs(5))
        .condition(total_hits_at_least(1))
        .build()
        .unwrap();

    client.execute(&mut search_request(), &opts).await.expect("eventually satisfied");

    assert_eq!(transport.attempts(), 51);
}

#[tokio::test(start_paused = true)]
async fn test_streamed_body_is_identical_on_every_attempt() {
    let transport = MockTransport::new([hits(0), hits(0), hits(0), hits(1)]);
    let client = PollClient::new(transport.clone());
    let payload = br#"{"query":{"term":{"labels.test":{"value":"poll"}}}}"#.to_vec();
    let mut request = indexpoll_core::TransportRequest::new(
        indexpoll_core::Method::Post,
        "/traces-*/_search",
    )
    .reader_body(Cursor::new(payload.clone()));

    client
        .execute(
            &mut request,
            &options(total_hits_at_least(1), Duration::from_secs(5), Duration::from_millis(10)),
        )
        .await
        .unwrap();

    let bodies = transport.bodies();
    assert_eq!(bodies.len(), 4);
    for body in bodies {
        assert_eq!(body.as_deref(), Some(payload.as_slice()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_is_not_retried() {
    let transport = MockTransport::new([Reply::TransportFailure("reset".into()), hits(1)]);
    let client = PollClient::new(transport.clone());

    let err = client
        .execute(
            &mut search_request(),
            &options(total_hits_at_least(1), Duration::from_secs(30), Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Transport(_)), "unexpected error: {err:?}");
    assert_eq!(err.to_string(), "reset");
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_application_error_is_not_retried() {
    let body = r#"{"error":{"type":"security_exception"},"status":401}"#;
    let transport = MockTransport::new([Reply::status(401, body), hits(1)]);
    let client = PollClient::new(transport.clone());

    let err = client
        .execute(
            &mut search_request(),
            &options(total_hits_at_least(1), Duration::from_secs(30), Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    match err {
        PollError::Status(status) => {
            assert_eq!(status.status_code, 401);
            assert_eq!(status.message, body);
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_application_error_mid_poll_stops_polling() {
    support::init_tracing();
    let transport = MockTransport::new([hits(0), Reply::status(503, "unavailable"), hits(1)]);
    let client = PollClient::new(transport.clone());

    let err = client
        .execute(
            &mut search_request(),
            &options(total_hits_at_least(1), Duration::from_secs(30), Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(transport.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_condition_short_circuits_inside_executor() {
    let second_calls = Arc::new(AtomicUsize::new(0));
    let counter = second_calls.clone();
    let condition = all_condition([
        total_hits_at_least(2),
        Condition::new(move |_: &Response| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }),
    ]);
    let transport = MockTransport::new([hits(0), hits(1), hits(2)]);
    let client = PollClient::new(transport.clone());

    client
        .execute(
            &mut search_request(),
            &options(condition, Duration::from_secs(5), Duration::from_millis(10)),
        )
        .await
        .unwrap();

    assert_eq!(transport.attempts(), 3);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_returned_response_is_readable_by_caller() {
    let transport = MockTransport::new([hits(0), hits(7)]);
    let client = PollClient::new(transport);
    let mut out = SearchResult::default();

    let response = client
        .execute_into(
            &mut search_request(),
            &mut out,
            &options(total_hits_at_least(7), Duration::from_secs(5), Duration::from_millis(10)),
        )
        .await
        .unwrap();

    let decoded: Value = serde_json::from_reader(response.reader()).unwrap();
    assert_eq!(decoded["hits"]["total"]["value"], 7);
    assert_eq!(out.hits.total.value, 7);
    assert_eq!(response.text(), String::from_utf8(response.body().to_vec()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_are_independent() {
    let fast = MockTransport::new([hits(1)]);
    let slow = MockTransport::new([hits(0), hits(0), hits(0), hits(1)]);
    let fast_client = PollClient::new(fast.clone());
    let slow_client = PollClient::new(slow.clone());
    let opts = options(total_hits_at_least(1), Duration::from_secs(5), Duration::from_millis(10));

    let mut fast_request = search_request();
    let mut slow_request = search_request();
    let (a, b) = tokio::join!(
        fast_client.execute(&mut fast_request, &opts),
        slow_client.execute(&mut slow_request, &opts),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(fast.attempts(), 1);
    assert_eq!(slow.attempts(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_body_fails_before_any_send() {
    let transport = MockTransport::new([hits(1)]);
    let client = PollClient::new(transport.clone());
    let mut request = indexpoll_core::TransportRequest::new(
        indexpoll_core::Method::Post,
        "/traces-*/_search",
    )
    .reader_body(BrokenBody);

    let err = client
        .execute(
            &mut request,
            &options(total_hits_at_least(1), Duration::from_secs(5), Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    match err {
        PollError::BodyCapture(source) => {
            assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
        }
        other => panic!("expected body capture error, got {other:?}"),
    }
    assert_eq!(transport.attempts(), 0);
}
