use crate::{ChatRequest, ChatResponse, ClientError, ReindexReport, ReindexRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "60s";

/// Shown to end users whenever the service cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str = "The notes service is unavailable, check that it is running.";
pub const EMPTY_ANSWER_PLACEHOLDER: &str = "(empty answer)";

/// Parses `"60s"`, `"1.5s"` or `"60"` into a duration.
pub fn parse_timeout(raw: &str) -> Result<Duration, ClientError> {
    let value = raw.trim().to_lowercase();
    let number = value.strip_suffix('s').unwrap_or(&value).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|seconds| *seconds > 0.0)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| ClientError::InvalidTimeout(raw.to_string()))
}

/// Remote client for the `/reindex` and `/chat` endpoints.
#[derive(Debug, Clone)]
pub struct RagApiClient {
    base_url: String,
    timeout: Duration,
}

impl RagApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_timeout_str(base_url: impl Into<String>, timeout: &str) -> Result<Self, ClientError> {
        Ok(Self::new(base_url, parse_timeout(timeout)?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let client = Client::builder().timeout(self.timeout).build()?;
        let response = client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    pub async fn reindex(&self) -> Result<ReindexReport, ClientError> {
        self.post("/reindex", &ReindexRequest::default()).await
    }

    pub async fn chat(&self, question: &str, top_k: Option<i64>) -> Result<ChatResponse, ClientError> {
        let request = ChatRequest {
            question: question.to_string(),
            top_k,
        };
        self.post("/chat", &request).await
    }
}

/// Converts a chat result into user-facing text, degrading to
/// [`UNAVAILABLE_MESSAGE`] on any failure.
pub fn answer_or_unavailable(result: Result<ChatResponse, ClientError>) -> String {
    match result {
        Ok(response) if response.answer.is_empty() => EMPTY_ANSWER_PLACEHOLDER.to_string(),
        Ok(response) => response.answer,
        Err(error) => {
            tracing::error!(%error, "chat request failed");
            UNAVAILABLE_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> Result<String, std::io::Error> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://{addr}/"))
    }

    #[test]
    fn timeouts_parse_with_or_without_suffix() -> Result<(), ClientError> {
        assert_eq!(parse_timeout("60s")?, Duration::from_secs(60));
        assert_eq!(parse_timeout(" 1.5S ")?, Duration::from_millis(1_500));
        assert_eq!(parse_timeout("30")?, Duration::from_secs(30));
        assert!(parse_timeout("soon").is_err());
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("1e300s").is_err());
        assert!(parse_timeout("inf").is_err());
        assert!(parse_timeout("NaN").is_err());
        Ok(())
    }

    #[tokio::test]
    async fn chat_sends_question_and_optional_top_k() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/chat",
            post(|Json(body): Json<Value>| async move {
                Json(json!({ "answer": body.to_string() }))
            }),
        );
        let client = RagApiClient::from_timeout_str(serve(router).await?, "5s")?;

        let without = client.chat("ping?", None).await?;
        assert_eq!(without.answer, r#"{"question":"ping?"}"#);
        let with = client.chat("ping?", Some(3)).await?;
        assert_eq!(with.answer, r#"{"question":"ping?","top_k":3}"#);
        Ok(())
    }

    #[tokio::test]
    async fn reindex_parses_counts() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/reindex",
            post(|| async { Json(json!({ "indexed_files": 2, "indexed_chunks": 7 })) }),
        );
        let client = RagApiClient::from_timeout_str(serve(router).await?, "5s")?;
        let report = client.reindex().await?;
        assert_eq!(report, ReindexReport { indexed_files: 2, indexed_chunks: 7 });
        Ok(())
    }

    #[tokio::test]
    async fn error_status_is_surfaced() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/chat",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = RagApiClient::from_timeout_str(serve(router).await?, "5s")?;
        let error = client.chat("q", None).await.err();
        assert!(matches!(error, Some(ClientError::Status { status: 502, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_fixed_message() -> Result<(), Box<dyn std::error::Error>> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let client = RagApiClient::new(format!("http://{addr}"), Duration::from_secs(2));
        let text = answer_or_unavailable(client.chat("hello", None).await);
        assert_eq!(text, UNAVAILABLE_MESSAGE);
        Ok(())
    }

    #[test]
    fn empty_answer_gets_placeholder() {
        let text = answer_or_unavailable(Ok(ChatResponse {
            answer: String::new(),
        }));
        assert_eq!(text, EMPTY_ANSWER_PLACEHOLDER);
    }
}
