use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::config::AnalyzerConfig;

/// Remote text generation abstraction (allows mocking).
///
/// Implementations return the generated text with any transport envelope
/// already removed.
pub trait GenerationClient: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

/// Request body for the generation endpoint.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    model: &'a str,
}

/// Accepted response bodies: `{"text": "..."}` or a bare JSON string.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateEnvelope {
    Wrapped { text: String },
    Bare(String),
}

/// Unwrap the generated text from a raw response body.
pub fn parse_envelope(body: &str) -> Result<String, AnalysisError> {
    match serde_json::from_str::<GenerateEnvelope>(body) {
        Ok(GenerateEnvelope::Wrapped { text }) | Ok(GenerateEnvelope::Bare(text)) => Ok(text),
        Err(e) => Err(AnalysisError::UnexpectedEnvelope(e.to_string())),
    }
}

/// HTTP client for the remote generation webhook.
pub struct HttpGenerationClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGenerationClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        Self::new(&config.endpoint, config.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout(self.timeout.as_millis() as u64)
        } else if e.is_connect() {
            AnalysisError::Connection(self.endpoint.clone())
        } else {
            AnalysisError::HttpClient(e.to_string())
        }
    }
}

impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, AnalysisError> {
        let body = GenerateRequest {
            text: prompt,
            model,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body_len = response.bytes().await.map_or(0, |b| b.len());
            return Err(AnalysisError::EndpointStatus {
                status: status.as_u16(),
                body_len,
            });
        }

        let raw = response.text().await.map_err(|e| self.map_send_error(e))?;
        parse_envelope(&raw)
    }
}

/// Canned behaviour for [`MockGenerationClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this generated text.
    Text(String),
    /// Fail as if the endpoint answered with this HTTP status.
    Status(u16),
    /// Fail as if the endpoint could not be reached.
    Unreachable,
    /// Sleep, then return the text. Used to exercise timeouts.
    Delayed(Duration, String),
}

/// Mock generation client for testing — returns a configurable reply.
pub struct MockGenerationClient {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockGenerationClient {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(MockReply::Text(text.to_string()))
    }

    pub fn unreachable() -> Self {
        Self::new(MockReply::Unreachable)
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerationClient for MockGenerationClient {
    async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Status(status) => Err(AnalysisError::EndpointStatus {
                status: *status,
                body_len: 0,
            }),
            MockReply::Unreachable => Err(AnalysisError::Connection("mock".into())),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    async fn spawn_endpoint(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/generate")
    }

    #[test]
    fn envelope_accepts_wrapped_text() {
        assert_eq!(parse_envelope(r#"{"text":"hello"}"#).unwrap(), "hello");
    }

    #[test]
    fn envelope_accepts_bare_string() {
        assert_eq!(parse_envelope(r#""hello""#).unwrap(), "hello");
    }

    #[test]
    fn envelope_rejects_other_shapes() {
        for body in [r#"{"output":"x"}"#, "42", "[\"a\"]", "not json"] {
            assert!(
                matches!(parse_envelope(body), Err(AnalysisError::UnexpectedEnvelope(_))),
                "accepted {body}"
            );
        }
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = HttpGenerationClient::new("http://localhost:9/generate/", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/generate");
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let mock = MockGenerationClient::text("ok");
        assert_eq!(mock.generate("p", "m").await.unwrap(), "ok");
        assert_eq!(mock.calls(), 1);
        assert!(matches!(
            MockGenerationClient::new(MockReply::Status(502)).generate("p", "m").await,
            Err(AnalysisError::EndpointStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn http_client_posts_prompt_and_model() {
        let app = Router::new().route(
            "/generate",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                let cache = headers
                    .get("cache-control")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({
                    "text": format!("{}|{}|{}", body["model"].as_str().unwrap_or(""), body["text"].as_str().unwrap_or(""), cache)
                }))
            }),
        );
        let url = spawn_endpoint(app).await;
        let client = HttpGenerationClient::new(&url, Duration::from_secs(5)).unwrap();

        let text = client.generate("my prompt", "my-model").await.unwrap();
        assert_eq!(text, "my-model|my prompt|no-cache");
    }

    #[tokio::test]
    async fn http_client_accepts_bare_string_body() {
        let app = Router::new().route("/generate", post(|| async { Json("plain answer") }));
        let url = spawn_endpoint(app).await;
        let client = HttpGenerationClient::new(&url, Duration::from_secs(5)).unwrap();

        assert_eq!(client.generate("p", "m").await.unwrap(), "plain answer");
    }

    #[tokio::test]
    async fn http_client_reports_status_without_echoing_body() {
        let app = Router::new().route(
            "/generate",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded: Headache, Fever") }),
        );
        let url = spawn_endpoint(app).await;
        let client = HttpGenerationClient::new(&url, Duration::from_secs(5)).unwrap();

        match client.generate("Headache", "m").await {
            Err(e @ AnalysisError::EndpointStatus { .. }) => {
                assert!(matches!(
                    e,
                    AnalysisError::EndpointStatus {
                        status: 503,
                        body_len: 27
                    }
                ));
                assert!(!e.to_string().contains("Headache"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_client_times_out() {
        let app = Router::new().route(
            "/generate",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json("late")
            }),
        );
        let url = spawn_endpoint(app).await;
        let client = HttpGenerationClient::new(&url, Duration::from_millis(100)).unwrap();

        assert!(matches!(
            client.generate("p", "m").await,
            Err(AnalysisError::Timeout(100))
        ));
    }

    #[tokio::test]
    async fn http_client_reports_unreachable_endpoint() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpGenerationClient::new(&format!("http://{addr}/generate"), Duration::from_secs(2))
                .unwrap();
        assert!(matches!(
            client.generate("p", "m").await,
            Err(AnalysisError::Connection(_))
        ));
    }
}
