use crate::{BackoffPolicy, ConnectionPhase, StoreState, StreamSession};
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dashboard_data(total_servers: u32) -> serde_json::Value {
    serde_json::json!({
        "stats": {
            "total_servers": total_servers,
            "online_servers": total_servers,
            "offline_servers": 0,
            "alert_count": 0,
            "avg_cpu": 23.5,
            "avg_memory": 48.1,
            "avg_disk": 61.0
        },
        "servers": { "servers": [], "total": total_servers },
        "alerts": [],
        "health": {
            "status": "ok",
            "servers": {},
            "total": total_servers,
            "online": total_servers,
            "offline": 0,
            "alerts": 0
        }
    })
}

fn dashboard_event_body(timestamp: &str, total_servers: u32) -> String {
    let event = serde_json::json!({
        "type": "dashboard_update",
        "timestamp": timestamp,
        "data": dashboard_data(total_servers)
    });
    format!("event: dashboard\ndata: {}\n\n", event)
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream")
}

fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(2)).unwrap()
}

async fn wait_for_state(
    rx: &mut watch::Receiver<StoreState>,
    mut predicate: impl FnMut(&StoreState) -> bool,
) -> StoreState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = rx.borrow_and_update().clone();
            if predicate(&state) {
                return state;
            }
            rx.changed().await.expect("store closed");
        }
    })
    .await
    .expect("timed out waiting for store state")
}

fn session_for(server: &MockServer) -> StreamSession {
    StreamSession::builder()
        .api_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_snapshot_is_delivered_to_subscribers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(dashboard_event_body(
            "2026-02-03T04:05:06Z",
            3,
        )))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let mut rx = session.subscribe();
    session.start().unwrap();

    let state = wait_for_state(&mut rx, |s| s.snapshot.is_some()).await;
    let snapshot = state.snapshot.unwrap();
    assert_eq!(snapshot.stats.total_servers, 3);
    assert_eq!(snapshot.servers.total, 3);

    // The update time comes from the event's own timestamp.
    let at = state.connection.last_snapshot_time.unwrap();
    assert_eq!(at.year(), 2026);
    assert_eq!(at.second(), 6);

    session.stop();
}

#[tokio::test]
async fn test_every_subscriber_sees_the_same_snapshot() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(dashboard_event_body(
            "2026-02-03T04:05:06Z",
            7,
        )))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let mut first = session.subscribe();
    let mut second = session.subscribe();
    session.start().unwrap();

    let a = wait_for_state(&mut first, |s| s.snapshot.is_some()).await;
    let b = wait_for_state(&mut second, |s| s.snapshot.is_some()).await;
    assert_eq!(a.snapshot.unwrap(), b.snapshot.unwrap());

    session.stop();
}

#[tokio::test]
async fn test_malformed_event_is_dropped_without_closing() {
    let mock_server = MockServer::start().await;
    let body = format!(
        "event: dashboard\ndata: {{not json}}\n\n{}",
        dashboard_event_body("2026-02-03T04:05:06Z", 9)
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(body))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let mut rx = session.subscribe();
    session.start().unwrap();

    // The first applied snapshot is the well-formed one; the malformed
    // event before it must not have produced a store write.
    let state = wait_for_state(&mut rx, |s| s.snapshot.is_some()).await;
    assert_eq!(state.snapshot.unwrap().stats.total_servers, 9);

    session.stop();
}

#[tokio::test]
async fn test_malformed_only_stream_leaves_store_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(
            "event: dashboard\ndata: {broken\n\n".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let mut rx = session.subscribe();
    session.start().unwrap();

    // The whole stream gets consumed before the end-of-stream close is
    // recorded, so once the phase is Closed the malformed event has been
    // processed — and must not have produced a store write.
    let state = wait_for_state(&mut rx, |s| s.connection.phase == ConnectionPhase::Closed).await;
    assert!(state.snapshot.is_none());

    session.stop();
}

#[tokio::test]
async fn test_retry_ceiling_reaches_exhausted_and_stops() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut session = StreamSession::builder()
        .api_url(mock_server.uri())
        .backoff(fast_backoff())
        .max_attempts(2)
        .build()
        .unwrap();
    let mut rx = session.subscribe();
    session.start().unwrap();

    let state = wait_for_state(&mut rx, |s| s.connection.exhausted).await;
    assert_eq!(state.connection.phase, ConnectionPhase::Closed);
    assert!(state.connection.last_error.is_some());

    // Initial attempt plus two retries, then nothing further.
    let requests = mock_server.received_requests().await.unwrap().len();
    assert_eq!(requests, 3);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);

    session.stop();
}

#[tokio::test]
async fn test_manual_reconnect_leaves_exhausted_immediately() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut session = StreamSession::builder()
        .api_url(mock_server.uri())
        .backoff(fast_backoff())
        .max_attempts(1)
        .build()
        .unwrap();
    let mut rx = session.subscribe();
    session.start().unwrap();

    wait_for_state(&mut rx, |s| s.connection.exhausted).await;
    let before = mock_server.received_requests().await.unwrap().len();

    // No automatic attempt fires out of the exhausted state.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), before);

    session.reconnect();

    // The manual reconnect bypasses backoff, so a fresh attempt lands
    // promptly, and the failure cycle runs back to exhaustion.
    tokio::time::timeout(Duration::from_secs(2), async {
        while mock_server.received_requests().await.unwrap().len() <= before {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no connection attempt after manual reconnect");
    wait_for_state(&mut rx, |s| s.connection.exhausted).await;

    session.stop();
}

#[tokio::test]
async fn test_successful_open_resets_attempt_counter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(dashboard_event_body(
            "2026-02-03T04:05:06Z",
            1,
        )))
        .mount(&mock_server)
        .await;

    let mut session = StreamSession::builder()
        .api_url(mock_server.uri())
        .backoff(fast_backoff())
        .build()
        .unwrap();
    let mut rx = session.subscribe();
    session.start().unwrap();

    let state = wait_for_state(&mut rx, |s| s.snapshot.is_some()).await;
    assert_eq!(state.connection.attempt_count, 0);
    assert!(state.connection.last_error.is_none());

    session.stop();
}

#[tokio::test]
async fn test_stop_cancels_a_pending_reconnect() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut session = StreamSession::builder()
        .api_url(mock_server.uri())
        .backoff(BackoffPolicy::new(Duration::from_millis(300), Duration::from_secs(1)).unwrap())
        .build()
        .unwrap();
    let mut rx = session.subscribe();
    session.start().unwrap();

    // Let the first attempt fail, then stop while the backoff sleep is
    // pending.
    wait_for_state(&mut rx, |s| s.connection.phase == ConnectionPhase::Closed).await;
    session.stop();
    assert!(!session.is_running());

    let before = mock_server.received_requests().await.unwrap().len();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(mock_server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_unnamed_message_event_is_accepted_with_arrival_time() {
    let mock_server = MockServer::start().await;
    let body = format!("data: {}\n\n", serde_json::json!({ "data": dashboard_data(4) }));
    Mock::given(method("GET"))
        .and(path("/api/v1/sse/dashboard"))
        .respond_with(sse_response(body))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let mut rx = session.subscribe();
    session.start().unwrap();

    let state = wait_for_state(&mut rx, |s| s.snapshot.is_some()).await;
    assert_eq!(state.snapshot.unwrap().stats.total_servers, 4);
    // No trusted timestamp on generic messages: the client stamped arrival.
    assert!(state.connection.last_snapshot_time.is_some());

    session.stop();
}

#[tokio::test]
async fn test_explicit_stream_url_overrides_api_base() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/custom/stream"))
        .respond_with(sse_response(dashboard_event_body(
            "2026-02-03T04:05:06Z",
            2,
        )))
        .mount(&mock_server)
        .await;

    let mut session = StreamSession::builder()
        .api_url("http://ignored.invalid")
        .stream_url(format!("{}/custom/stream", mock_server.uri()))
        .build()
        .unwrap();
    let mut rx = session.subscribe();
    session.start().unwrap();

    let state = wait_for_state(&mut rx, |s| s.snapshot.is_some()).await;
    assert_eq!(state.snapshot.unwrap().stats.total_servers, 2);

    session.stop();
}
