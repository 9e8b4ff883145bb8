/*!
 * Scripted transport for tests and offline demos.
 *
 * Replies are looked up by route (the request path without its query string):
 * - one-shot replies queued with `enqueue` are consumed first, in order
 * - then the persistent reply registered with `route`
 * - then, for the translation endpoint, the translation responder
 * - otherwise a 404
 *
 * Every request is recorded, so tests can assert on request counts. The mock
 * also tracks how many requests were awaiting a reply at the same time.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{HttpRequest, HttpResponse, Transport};
use crate::errors::TransportError;

/// Default path of the translation endpoint
const TRANSLATE_ROUTE: &str = "/api/translate";

/// A scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Answer with a status and body
    Respond { status: u16, body: String },
    /// Fail at the transport level
    Fail(TransportError),
    /// Wait before producing the inner reply
    Delayed { delay_ms: u64, reply: Box<MockReply> },
}

impl MockReply {
    /// 200 with a JSON body
    pub fn json(value: serde_json::Value) -> Self {
        Self::Respond {
            status: 200,
            body: value.to_string(),
        }
    }

    /// 200 with an empty body
    pub fn ok() -> Self {
        Self::Respond {
            status: 200,
            body: String::new(),
        }
    }

    /// Arbitrary status and body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            status,
            body: body.into(),
        }
    }

    /// Connection failure
    pub fn connection_error() -> Self {
        Self::Fail(TransportError::Connection("Simulated connection failure".to_string()))
    }

    /// Delay this reply
    pub fn after_ms(self, delay_ms: u64) -> Self {
        Self::Delayed {
            delay_ms,
            reply: Box::new(self),
        }
    }
}

/// Function producing a translation for (text, source, target)
pub type TranslationResponder = fn(&str, &str, &str) -> String;

/// Mock transport recording requests and replaying scripted responses
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Persistent replies per route
    routes: Arc<Mutex<HashMap<String, MockReply>>>,
    /// One-shot replies per route
    queued: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    /// Automatic answers for the translation endpoint
    responder: Option<TranslationResponder>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    /// Delay added before every reply
    latency_ms: u64,
    /// Requests currently awaiting their reply
    in_flight: Arc<AtomicUsize>,
    /// Most requests seen awaiting a reply at once
    peak_in_flight: Arc<AtomicUsize>,
}

/// Counts a request as in flight until it is answered or dropped
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockTransport {
    /// Create an empty mock; unknown routes answer 404
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose translation endpoint answers `[<target>] <text>`
    pub fn translating() -> Self {
        Self::new().with_translation_responder(|text, _source, target| format!("[{}] {}", target, text))
    }

    /// Set a custom translation responder
    pub fn with_translation_responder(mut self, responder: TranslationResponder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Delay every reply by `latency_ms`
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Register a persistent reply for a route
    pub fn route(&self, route: &str, reply: MockReply) -> &Self {
        self.routes.lock().insert(route.to_string(), reply);
        self
    }

    /// Queue a one-shot reply for a route
    pub fn enqueue(&self, route: &str, reply: MockReply) -> &Self {
        self.queued
            .lock()
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received for a given route
    pub fn requests_to(&self, route: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.route() == route)
            .cloned()
            .collect()
    }

    /// Forget recorded requests and the in-flight peak
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
        self.peak_in_flight.store(0, Ordering::SeqCst);
    }

    /// Most requests that were awaiting a reply at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn pick_reply(&self, request: &HttpRequest) -> MockReply {
        let route = request.route();

        if let Some(reply) = self
            .queued
            .lock()
            .get_mut(route)
            .and_then(|queue| queue.pop_front())
        {
            return reply;
        }

        if let Some(reply) = self.routes.lock().get(route) {
            return reply.clone();
        }

        if route == TRANSLATE_ROUTE {
            if let Some(responder) = self.responder {
                return translate_reply(request, responder);
            }
        }

        MockReply::status(404, "Not Found")
    }
}

fn translate_reply(request: &HttpRequest, responder: TranslationResponder) -> MockReply {
    let Some(body) = request.json_body() else {
        return MockReply::status(400, "missing JSON body");
    };

    let field = |name: &str| body.get(name).and_then(|v| v.as_str()).unwrap_or_default();
    let translated = responder(
        field("text"),
        field("source_language"),
        field("target_language"),
    );

    MockReply::json(serde_json::json!({ "translated": translated }))
}

async fn play(reply: MockReply) -> Result<HttpResponse, TransportError> {
    let mut reply = reply;
    loop {
        match reply {
            MockReply::Respond { status, body } => return Ok(HttpResponse { status, body }),
            MockReply::Fail(error) => return Err(error),
            MockReply::Delayed { delay_ms, reply: inner } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                reply = *inner;
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self.pick_reply(&request);
        self.requests.lock().push(request);

        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }
        play(reply).await
    }
}
