//! W3C Trace Context propagation for calls to upstream APIs.
//!
//! Outgoing requests carry `traceparent`/`tracestate` derived from the current
//! span, so the upstream API's spans join the BFF's trace.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::TraceContextExt;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, Secret};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header name for W3C tracestate
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Inject current trace context into HTTP request headers.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let span = Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if span_context.is_valid() {
        // version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );

        if let Ok(value) = traceparent.parse() {
            headers.insert(TRACEPARENT_HEADER, value);
        }

        let tracestate = span_context.trace_state().header();
        if !tracestate.is_empty()
            && let Ok(value) = tracestate.parse()
        {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }
}

/// Extract request ID from incoming request headers.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Build the `Cookie` header value that carries a session credential.
///
/// Returns `None` when the credential cannot be represented as a header value.
pub fn credential_cookie(cookie_name: &str, credential: &Secret<String>) -> Option<HeaderValue> {
    let mut value =
        HeaderValue::from_str(&format!("{}={}", cookie_name, credential.expose_secret())).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// A request whose trace headers are injected at send time.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
    headers: HeaderMap,
}

impl TracedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self {
            request,
            headers: HeaderMap::new(),
        }
    }

    /// Attach a session credential as a cookie.
    pub fn credential(mut self, cookie_name: &str, credential: &Secret<String>) -> Self {
        if let Some(value) = credential_cookie(cookie_name, credential) {
            self.headers.insert(COOKIE, value);
        }
        self
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
            headers: self.headers,
        }
    }

    /// Send the request with trace context headers injected.
    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = self.headers;
        inject_trace_context(&mut headers);

        self.request.headers(headers).send().await
    }
}

/// Extension trait for reqwest::Client to create traced requests.
pub trait TracedClientExt {
    fn traced(&self, method: Method, url: &str) -> TracedRequest;

    fn traced_get(&self, url: &str) -> TracedRequest {
        self.traced(Method::GET, url)
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        self.traced(Method::POST, url)
    }

    fn traced_put(&self, url: &str) -> TracedRequest {
        self.traced(Method::PUT, url)
    }

    fn traced_delete(&self, url: &str) -> TracedRequest {
        self.traced(Method::DELETE, url)
    }
}

impl TracedClientExt for reqwest::Client {
    fn traced(&self, method: Method, url: &str) -> TracedRequest {
        TracedRequest::new(self.request(method, url))
    }
}

/// Whether an upstream status means the credential is missing or no longer valid.
pub fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}
