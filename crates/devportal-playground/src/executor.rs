//! Request execution: the transport seam, outcome classification, and the
//! background worker the UI thread talks to.

use std::collections::BTreeMap;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::error::{PlaygroundError, TransportError};
use crate::model::{HistoryEntry, HttpMethod, NETWORK_ERROR_TEXT, ResponseRecord, format_size};
use crate::request::{OutgoingRequest, RequestState};
use crate::vault::KeyVault;

pub const CORS_HINT: &str = "The request was rejected by a cross-origin (CORS) policy. \
     Call the API from a server-side client instead.";
pub const INVALID_REQUEST_HINT: &str =
    "The request could not be built. Check header names and values and the base URL.";
pub const NETWORK_HINT: &str =
    "Could not reach the API. Check the base URL and your network connection.";

const CORS_VOCABULARY: &[&str] = &[
    "cors",
    "cross-origin",
    "failed to fetch",
    "networkerror",
    "access-control",
];

// ── Transport ────────────────────────────────────────────────────────

/// What came back over the wire, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}

/// The seam through which the executor performs network I/O.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("devportal/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response body: {e}")))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// ── Executor ─────────────────────────────────────────────────────────

/// Outcome of one execution.
#[derive(Debug, Clone)]
pub struct Execution {
    pub request: OutgoingRequest,
    pub response: ResponseRecord,
    pub entry: HistoryEntry,
}

/// Freeze the request for sending. Fails without touching the network when
/// no credential is set.
pub fn prepare(state: &RequestState, vault: &KeyVault) -> Result<OutgoingRequest, PlaygroundError> {
    let credential = vault.raw().ok_or(PlaygroundError::MissingCredential)?;
    Ok(state.snapshot(credential))
}

#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Run one round trip. Never fails: transport problems become a
    /// network-error record.
    pub async fn run(&self, request: OutgoingRequest, cancel: CancellationToken) -> Execution {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            body_bytes = request.body.as_ref().map_or(0, String::len),
            "request started"
        );

        let start = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::cancelled()),
            result = self.transport.send(&request) => result,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let response = match result {
            Ok(raw) => {
                tracing::info!(status = raw.status, duration_ms, "request completed");
                normalize_response(raw, duration_ms)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err.message,
                    invalid_request = err.invalid_request,
                    duration_ms,
                    "request failed"
                );
                network_failure(&err, duration_ms)
            }
        };

        let entry = HistoryEntry::new(
            request.method,
            request.url.clone(),
            response.status,
            Some(duration_ms),
        );

        Execution {
            request,
            response,
            entry,
        }
    }
}

fn normalize_response(raw: TransportResponse, duration_ms: u64) -> ResponseRecord {
    let is_json = raw
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
    let body = normalize_body(is_json, &raw.body);

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in raw.headers {
        headers
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    ResponseRecord {
        status: Some(raw.status),
        status_text: raw.status_text,
        headers,
        size_formatted: pretty_size(&body),
        body,
        duration_ms,
    }
}

/// JSON bodies are parsed; anything else is wrapped as `{"rawText": ...}`.
fn normalize_body(is_json: bool, text: &str) -> Value {
    if !is_json {
        return json!({ "rawText": text });
    }
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "rawText": text }))
}

fn network_failure(err: &TransportError, duration_ms: u64) -> ResponseRecord {
    let hint = if err.invalid_request {
        INVALID_REQUEST_HINT
    } else {
        network_hint(&err.message)
    };
    let body = json!({ "error": err.message, "hint": hint });
    ResponseRecord {
        status: None,
        status_text: NETWORK_ERROR_TEXT.to_string(),
        headers: BTreeMap::new(),
        size_formatted: pretty_size(&body),
        body,
        duration_ms,
    }
}

pub fn network_hint(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if CORS_VOCABULARY.iter().any(|word| lower.contains(word)) {
        CORS_HINT
    } else {
        NETWORK_HINT
    }
}

fn pretty_size(body: &Value) -> String {
    let len = serde_json::to_string_pretty(body).map_or(0, |s| s.len());
    format_size(len)
}

// ── Background worker ────────────────────────────────────────────────

/// A job for the worker thread.
#[derive(Debug)]
pub struct ExecutionJob {
    pub request: OutgoingRequest,
    pub cancel: CancellationToken,
}

/// Runs executions on a dedicated thread with a single-threaded tokio
/// runtime, so the UI loop only ever polls.
pub struct HttpExecutor {
    sender: mpsc::Sender<ExecutionJob>,
    receiver: mpsc::Receiver<Execution>,
    shutdown: CancellationToken,
}

impl HttpExecutor {
    pub fn spawn(executor: Executor) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<ExecutionJob>();
        let (result_tx, result_rx) = mpsc::channel::<Execution>();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        thread::Builder::new()
            .name("devportal-executor".into())
            .spawn(move || {
                rt.block_on(async move {
                    while let Ok(job) = job_rx.recv() {
                        let execution = executor.run(job.request, job.cancel).await;
                        if result_tx.send(execution).is_err() {
                            break; // UI dropped the receiver
                        }
                    }
                });
            })
            .context("Failed to spawn executor thread")?;

        Ok(Self {
            sender: job_tx,
            receiver: result_rx,
            shutdown: CancellationToken::new(),
        })
    }

    /// Queue a request (non-blocking). Its token is cancelled on shutdown.
    pub fn submit(&self, request: OutgoingRequest) -> Result<()> {
        let job = ExecutionJob {
            request,
            cancel: self.shutdown.child_token(),
        };
        self.sender
            .send(job)
            .map_err(|_| anyhow::anyhow!("Executor thread has stopped"))
    }

    /// Try to receive a finished execution (non-blocking).
    pub fn try_recv(&self) -> Option<Execution> {
        self.receiver.try_recv().ok()
    }

    /// Cancel everything in flight.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for HttpExecutor {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockTransport {
        result: Result<TransportResponse, TransportError>,
        calls: AtomicUsize,
        seen: Mutex<Vec<OutgoingRequest>>,
    }

    impl MockTransport {
        fn ok(status: u16, content_type: &str, body: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(TransportResponse {
                    status,
                    status_text: "OK".into(),
                    headers: vec![("content-type".into(), content_type.into())],
                    body: body.into(),
                }),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn err(message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err(TransportError::new(message)),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    /// Never answers; only cancellation ends the call.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn send(&self, _request: &OutgoingRequest) -> Result<TransportResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn request() -> OutgoingRequest {
        OutgoingRequest {
            method: HttpMethod::Get,
            url: "https://api.example.com/v1/usage".into(),
            headers: vec![("X-API-Key".into(), "k".into())],
            body: None,
        }
    }

    #[tokio::test]
    async fn test_json_success() {
        let transport = MockTransport::ok(200, "application/json; charset=utf-8", "{\"calls\":5}");
        let executor = Executor::new(transport.clone());
        let execution = executor.run(request(), CancellationToken::new()).await;

        assert_eq!(execution.response.status, Some(200));
        assert_eq!(execution.response.body, json!({"calls": 5}));
        assert_eq!(execution.response.headers["content-type"], "application/json; charset=utf-8");
        assert!(execution.entry.succeeded);
        assert_eq!(execution.entry.url, "https://api.example.com/v1/usage");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.seen.lock().unwrap()[0], request());
    }

    #[tokio::test]
    async fn test_non_json_is_wrapped() {
        let executor = Executor::new(MockTransport::ok(500, "text/html", "<h1>oops</h1>"));
        let execution = executor.run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.body, json!({"rawText": "<h1>oops</h1>"}));
        assert!(!execution.entry.succeeded);
    }

    #[tokio::test]
    async fn test_invalid_json_is_wrapped() {
        let executor = Executor::new(MockTransport::ok(200, "application/json", "{nope"));
        let execution = executor.run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.body, json!({"rawText": "{nope"}));
    }

    #[tokio::test]
    async fn test_empty_json_is_null() {
        let executor = Executor::new(MockTransport::ok(204, "application/json", ""));
        let execution = executor.run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.body, Value::Null);
        assert_eq!(execution.response.size_formatted, "4 B");
    }

    #[tokio::test]
    async fn test_cors_failure() {
        let executor = Executor::new(MockTransport::err("TypeError: Failed to fetch"));
        let execution = executor.run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.status, None);
        assert_eq!(execution.response.status_text, "Network Error");
        assert_eq!(execution.response.body["hint"], CORS_HINT);
        assert_eq!(execution.response.body["error"], "TypeError: Failed to fetch");
        assert!(!execution.entry.succeeded);
        assert_eq!(execution.entry.status, None);
    }

    #[tokio::test]
    async fn test_generic_network_failure() {
        let executor = Executor::new(MockTransport::err("dns error: no such host"));
        let execution = executor.run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.body["hint"], NETWORK_HINT);
    }

    #[tokio::test]
    async fn test_bad_header_name_is_an_invalid_request() {
        let transport = ReqwestTransport::new(None).unwrap();
        let executor = Executor::new(Arc::new(transport));
        let mut bad = request();
        bad.headers.insert(0, ("bad header".into(), "v".into()));

        let execution = executor.run(bad, CancellationToken::new()).await;

        assert_eq!(execution.response.status, None);
        assert_eq!(execution.response.body["hint"], INVALID_REQUEST_HINT);
        assert!(
            execution.response.body["error"]
                .as_str()
                .unwrap()
                .contains("builder error")
        );
        assert!(!execution.entry.succeeded);
    }

    #[tokio::test]
    async fn test_invalid_request_hint_wins_over_vocabulary() {
        let transport = Arc::new(MockTransport {
            result: Err(TransportError::invalid_request("invalid header value for access-control")),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        });
        let execution = Executor::new(transport).run(request(), CancellationToken::new()).await;
        assert_eq!(execution.response.body["hint"], INVALID_REQUEST_HINT);
    }

    #[tokio::test]
    async fn test_cancellation_is_network_error() {
        let executor = Executor::new(Arc::new(HangingTransport));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let execution = executor.run(request(), cancel).await;
        assert_eq!(execution.response.status, None);
        assert_eq!(execution.response.body["error"], "request cancelled");
    }

    #[test]
    fn test_network_hint_vocabulary() {
        assert_eq!(network_hint("Blocked by CORS policy"), CORS_HINT);
        assert_eq!(network_hint("Cross-Origin request blocked"), CORS_HINT);
        assert_eq!(network_hint("NetworkError when attempting to fetch"), CORS_HINT);
        assert_eq!(network_hint("missing Access-Control-Allow-Origin"), CORS_HINT);
        assert_eq!(network_hint("connection refused"), NETWORK_HINT);
    }

    #[test]
    fn test_duplicate_headers_are_joined() {
        let raw = TransportResponse {
            status: 200,
            status_text: "OK".into(),
            headers: vec![
                ("set-cookie".into(), "a=1".into()),
                ("set-cookie".into(), "b=2".into()),
            ],
            body: String::new(),
        };
        let record = normalize_response(raw, 3);
        assert_eq!(record.headers["set-cookie"], "a=1, b=2");
        assert_eq!(record.body, json!({"rawText": ""}));
    }

    #[test]
    fn test_background_executor_round_trip() {
        let worker =
            HttpExecutor::spawn(Executor::new(MockTransport::ok(200, "application/json", "[]"))).unwrap();
        worker.submit(request()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let execution = loop {
            if let Some(execution) = worker.try_recv() {
                break execution;
            }
            assert!(Instant::now() < deadline, "worker never answered");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(execution.response.body, json!([]));
    }
}
