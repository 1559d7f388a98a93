//! End-to-end behavior of a playground session against a scripted transport.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use devportal_core::db::SessionStore;
use devportal_playground::executor::CORS_HINT;
use devportal_playground::model::RowField;
use devportal_playground::{
    Executor, HISTORY_LIMIT, HttpMethod, OutgoingRequest, Playground, PlaygroundError, Transport,
    TransportError, TransportResponse, presets,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const BASE_URL: &str = "https://api.example.com/v1";

/// Records every request and answers with a fixed result.
struct ScriptedTransport {
    result: Result<TransportResponse, TransportError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<OutgoingRequest>>,
}

impl ScriptedTransport {
    fn json(status: u16, body: &str) -> Arc<Self> {
        Self::with(Ok(TransportResponse {
            status,
            status_text: "OK".into(),
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.into(),
        }))
    }

    fn failing(message: &str) -> Arc<Self> {
        Self::with(Err(TransportError::new(message)))
    }

    fn with(result: Result<TransportResponse, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last(&self) -> OutgoingRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

fn session() -> Playground {
    let store = Rc::new(SessionStore::open().unwrap());
    Playground::new(BASE_URL, Vec::new(), store).unwrap()
}

fn session_with_key() -> Playground {
    let mut pg = session();
    pg.set_credential("sk_dev_0123456789abcdef").unwrap();
    pg
}

#[tokio::test]
async fn test_usage_request_round_trip() {
    let transport = ScriptedTransport::json(200, r#"{"calls":5}"#);
    let executor = Executor::new(transport.clone());
    let mut pg = session_with_key();
    pg.request.path = "/usage".into();
    assert_eq!(pg.request.build_url(), "https://api.example.com/v1/usage");

    let id = pg.execute(&executor, CancellationToken::new()).await.unwrap();

    let record = pg.current_response().unwrap();
    assert_eq!(record.status, Some(200));
    assert_eq!(record.body, json!({"calls": 5}));

    let entry = pg.history.latest().unwrap();
    assert_eq!(entry.id, id);
    assert_eq!(entry.method, HttpMethod::Get);
    assert_eq!(entry.url, "https://api.example.com/v1/usage");
    assert!(entry.succeeded);
    assert!(!pg.is_in_flight());
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let transport = ScriptedTransport::json(200, "{}");
    let executor = Executor::new(transport.clone());
    let mut pg = session();

    let result = pg.execute(&executor, CancellationToken::new()).await;

    assert_eq!(result, Err(PlaygroundError::MissingCredential));
    assert!(pg.missing_credential());
    assert!(pg.history.is_empty());
    assert!(pg.current_response().is_none());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_cors_failure_becomes_network_error() {
    let transport = ScriptedTransport::failing("TypeError: Failed to fetch (CORS policy)");
    let executor = Executor::new(transport);
    let mut pg = session_with_key();

    pg.execute(&executor, CancellationToken::new()).await.unwrap();

    let record = pg.current_response().unwrap();
    assert_eq!(record.status, None);
    assert!(record.is_network_error());
    assert_eq!(record.body["hint"], CORS_HINT);
    assert!(!pg.history.latest().unwrap().succeeded);
}

#[tokio::test]
async fn test_history_keeps_most_recent_thirty() {
    let executor = Executor::new(ScriptedTransport::json(200, "{}"));
    let mut pg = session_with_key();

    let mut ids = Vec::new();
    for i in 0..35 {
        pg.request.path = format!("/photos/{i}");
        ids.push(pg.execute(&executor, CancellationToken::new()).await.unwrap());
    }

    assert_eq!(pg.history.len(), HISTORY_LIMIT);
    let kept: Vec<u64> = pg.history.iter().map(|e| e.id).collect();
    let expected: Vec<u64> = ids.iter().rev().take(HISTORY_LIMIT).copied().collect();
    assert_eq!(kept, expected);
    assert_eq!(pg.history.latest().unwrap().url, "https://api.example.com/v1/photos/34");
}

#[tokio::test]
async fn test_manual_api_key_header_is_overridden() {
    let transport = ScriptedTransport::json(200, "{}");
    let executor = Executor::new(transport.clone());
    let mut pg = session_with_key();
    pg.request.headers.push("x-api-key", "sk_manual_value");

    pg.execute(&executor, CancellationToken::new()).await.unwrap();

    let sent = transport.last();
    let keys: Vec<&(String, String)> = sent
        .headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("x-api-key"))
        .collect();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].1, "sk_dev_0123456789abcdef");
    assert!(!pg.curl().contains("sk_manual_value"));
}

#[tokio::test]
async fn test_get_never_sends_body() {
    let transport = ScriptedTransport::json(200, "{}");
    let executor = Executor::new(transport.clone());
    let mut pg = session_with_key();
    pg.request.body = r#"{"ignored": true}"#.into();

    pg.execute(&executor, CancellationToken::new()).await.unwrap();
    assert_eq!(transport.last().body, None);

    pg.request.method = HttpMethod::Post;
    pg.execute(&executor, CancellationToken::new()).await.unwrap();
    assert_eq!(transport.last().body.as_deref(), Some(r#"{"ignored": true}"#));
}

#[tokio::test]
async fn test_disabled_rows_stay_out_of_request_and_curl() {
    let transport = ScriptedTransport::json(200, "{}");
    let executor = Executor::new(transport.clone());
    let mut pg = session_with_key();

    let param = pg.request.query_params.push("page", "2");
    pg.request.query_params.toggle_row(param);
    let header = pg.request.headers.push("X-Trace", "abc");
    pg.request.headers.toggle_row(header);
    pg.request.headers.update_row(header, RowField::Value, "still-off");

    pg.execute(&executor, CancellationToken::new()).await.unwrap();

    let sent = transport.last();
    assert!(!sent.url.contains("page"));
    assert_eq!(sent.header("X-Trace"), None);

    let curl = pg.curl();
    assert!(!curl.contains("page=2"));
    assert!(!curl.contains("X-Trace"));
    assert_eq!(curl, pg.curl());
}

#[test]
fn test_upload_preset_only_touches_content_type() {
    let mut pg = session();
    pg.request.headers.push("X-Trace", "abc");
    let accept_before = pg.request.headers.find_by_key("Accept").cloned();

    pg.apply_preset(presets::find("Upload Photo").unwrap());

    assert!(pg.request.is_multipart);
    assert_eq!(pg.request.method, HttpMethod::Post);
    assert_eq!(
        pg.request.headers.find_by_key("content-type").map(|r| r.value.as_str()),
        Some("multipart/form-data")
    );
    assert_eq!(pg.request.headers.find_by_key("Accept").cloned(), accept_before);
    assert_eq!(
        pg.request.headers.find_by_key("X-Trace").map(|r| r.value.as_str()),
        Some("abc")
    );
    assert_eq!(pg.request.headers.len(), 3);
}

#[tokio::test]
async fn test_replay_restores_request() {
    let executor = Executor::new(ScriptedTransport::json(200, "{}"));
    let mut pg = session_with_key();
    pg.request.method = HttpMethod::Delete;
    pg.request.path = "/photos/42".into();
    pg.request.query_params.push("q", "a b");
    let id = pg.execute(&executor, CancellationToken::new()).await.unwrap();

    pg.request.method = HttpMethod::Get;
    pg.request.path = "/".into();
    pg.request.query_params.clear();

    assert!(pg.replay(id));
    assert_eq!(pg.request.method, HttpMethod::Delete);
    assert_eq!(pg.request.build_url(), "https://api.example.com/v1/photos/42?q=a%20b");
}

#[tokio::test]
async fn test_edits_after_begin_do_not_reach_the_wire() {
    let transport = ScriptedTransport::json(200, "{}");
    let executor = Executor::new(transport.clone());
    let mut pg = session_with_key();
    pg.request.method = HttpMethod::Post;
    pg.request.path = "/photos".into();
    let trace = pg.request.headers.push("X-Trace", "abc");
    pg.request.body = r#"{"title":"before"}"#.into();

    let outgoing = pg.begin().unwrap();

    pg.request.path = "/albums".into();
    pg.request.headers.push("X-Late", "1");
    pg.request.headers.update_row(trace, RowField::Value, "changed");
    pg.request.body = r#"{"title":"after"}"#.into();

    let execution = executor.run(outgoing, CancellationToken::new()).await;
    pg.complete(execution);

    let sent = transport.last();
    assert_eq!(sent.url, "https://api.example.com/v1/photos");
    assert_eq!(sent.header("X-Trace"), Some("abc"));
    assert_eq!(sent.header("X-Late"), None);
    assert_eq!(sent.body.as_deref(), Some(r#"{"title":"before"}"#));
    assert_eq!(pg.history.latest().unwrap().url, "https://api.example.com/v1/photos");
}

#[tokio::test]
async fn test_execute_leaves_request_state_untouched() {
    let executor = Executor::new(ScriptedTransport::json(201, r#"{"id":7}"#));
    let mut pg = session_with_key();
    pg.request.method = HttpMethod::Post;
    pg.request.path = "/photos".into();
    pg.request.query_params.push("album", "trip");
    pg.request.headers.push("X-Trace", "abc");
    pg.request.body = r#"{"title":"sunset"}"#.into();
    let before = pg.request.clone();

    pg.execute(&executor, CancellationToken::new()).await.unwrap();

    assert_eq!(pg.request, before);
    assert_eq!(pg.current_response().unwrap().status, Some(201));
}
