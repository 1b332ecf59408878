//! HTTP embedding client for OpenAI-compatible `/embeddings` endpoints.
//!
//! Retries on 429 (rate limit), 5xx and transport errors with exponential backoff
//! (500ms, 1s, 2s). Other failures surface immediately; exhausted retries surface as
//! `EmbeddingError::Unavailable` carrying the last failure.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EmbeddingError, EmbeddingProvider};

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    backoff_base: Duration,
}

/// Outcome of one failed call: worth retrying or not.
enum Failure {
    Transient(EmbeddingError),
    Fatal(EmbeddingError),
}

impl HttpEmbedder {
    /// `base_url` is the API root, e.g. `http://localhost:8000/v1`.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            dimension,
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
        })
    }

    /// Overrides the first retry delay; later delays keep doubling.
    #[must_use]
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One initial attempt plus up to `MAX_RETRIES` retries on 429, 5xx and transport errors.
    async fn request(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut retry = 0;
        loop {
            let error = match self.attempt(&body).await {
                Ok(embedding) => return check_dimension(embedding, self.dimension),
                Err(Failure::Fatal(e)) => return Err(e),
                Err(Failure::Transient(e)) => e,
            };

            if retry == MAX_RETRIES {
                return Err(EmbeddingError::Unavailable {
                    retries: MAX_RETRIES,
                    last: Box::new(error),
                });
            }

            // base, 2x base, 4x base
            let delay = self.backoff_base * 2_u32.pow(retry);
            retry += 1;
            warn!(
                "Embedding call failed ({}), retry {}/{} after {}ms...",
                error,
                retry,
                MAX_RETRIES,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, body: &EmbeddingRequest<'_>) -> Result<Vec<f32>, Failure> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Failure::Transient(EmbeddingError::Http(e)))?;
        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(Failure::Transient(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Failure::Fatal(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Failure::Fatal(EmbeddingError::Http(e)))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(Failure::Fatal(EmbeddingError::EmptyResponse))
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        let embedding = self.request(text).await?;
        debug!("Embedded {} chars via {}", text.len(), self.endpoint);
        Ok(embedding)
    }
}

fn check_dimension(embedding: Vec<f32>, expected: usize) -> Result<Vec<f32>, EmbeddingError> {
    if embedding.len() == expected {
        Ok(embedding)
    } else {
        Err(EmbeddingError::Dimension {
            expected,
            actual: embedding.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves `/v1/embeddings` on an ephemeral port, answering every call with `reply`.
    /// Returns the base URL and a counter of calls received.
    async fn stub_server(status: StatusCode, reply: Value) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/v1/embeddings",
                post(move |State(hits): State<Arc<AtomicUsize>>| {
                    let reply = reply.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        (status, Json(reply))
                    }
                }),
            )
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1"), hits)
    }

    fn client(base_url: &str, dimension: usize) -> HttpEmbedder {
        HttpEmbedder::new(base_url, Some("key".to_string()), "m".to_string(), dimension)
            .unwrap()
            .with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_returns_embedding() {
        let (url, hits) =
            stub_server(StatusCode::OK, json!({ "data": [{ "embedding": [0.5, 0.25] }] })).await;
        let embedding = client(&url, 2).encode("rust").await.unwrap();
        assert_eq!(embedding, vec![0.5, 0.25]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_unavailable() {
        let (url, hits) =
            stub_server(StatusCode::SERVICE_UNAVAILABLE, json!({ "error": { "message": "busy" } })).await;
        let err = client(&url, 2).encode("rust").await.unwrap_err();

        match err {
            EmbeddingError::Unavailable { retries, last } => {
                assert_eq!(retries, MAX_RETRIES);
                assert!(matches!(*last, EmbeddingError::Api { status: 503, .. }));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
        // First attempt plus every retry.
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize + 1);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, hits) =
            stub_server(StatusCode::BAD_REQUEST, json!({ "error": { "message": "bad model" } })).await;
        let err = client(&url, 2).encode("rust").await.unwrap_err();

        assert!(matches!(
            err,
            EmbeddingError::Api { status: 400, ref message } if message == "bad model"
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrong_dimension_from_provider() {
        let (url, _) =
            stub_server(StatusCode::OK, json!({ "data": [{ "embedding": [1.0, 2.0, 3.0] }] })).await;
        let err = client(&url, 2).encode("rust").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Dimension { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let embedder =
            HttpEmbedder::new("http://localhost:8000/v1/", None, "m".to_string(), 4).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:8000/v1/embeddings");
    }

    #[tokio::test]
    async fn test_empty_text_skips_network() {
        // Port 9 (discard) is never contacted: empty input short-circuits.
        let embedder = HttpEmbedder::new("http://127.0.0.1:9", None, "m".to_string(), 3).unwrap();
        assert_eq!(embedder.encode("  ").await.unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let err = check_dimension(vec![1.0, 2.0], 3).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::Dimension {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(check_dimension(vec![1.0], 1).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_response_parses_first_datum() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2]}],"model":"m"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
    }

    #[test]
    fn test_error_envelope_parses() {
        let json = r#"{"error":{"message":"bad model","type":"invalid_request_error"}}"#;
        let parsed: ApiErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "bad model");
    }
}
