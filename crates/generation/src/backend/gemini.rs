//! Google Gemini backend
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! The credential is checked before any request goes out; HTTP status codes
//! are mapped onto the error taxonomy here and nowhere else.

use async_trait::async_trait;
use serde::Deserialize;

use super::{GenerationBackend, GenerationError};

/// Default service endpoint
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model when the configuration names none
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Response structure from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini backend over HTTP
pub struct GeminiBackend {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create with a custom base URL (tests, proxies)
    pub fn with_base_url(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn resolved_key(&self) -> Result<&str, GenerationError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(GenerationError::Auth(
                "no API key configured; set one in the config or the GEMINI_API_KEY environment variable".to_string(),
            )),
        }
    }

    /// Pull the generated text out of a decoded response body
    fn text_from_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::InvalidResponse(
                "response contained no candidate text".to_string(),
            ));
        }
        Ok(text)
    }

    /// Map a non-2xx response onto the error taxonomy
    fn error_from_status(status: u16, retry_after: Option<u64>, body: String) -> GenerationError {
        match status {
            401 | 403 => GenerationError::Auth(body),
            // The service reports a malformed/revoked key as 400 INVALID_ARGUMENT
            400 if body.contains("API key") => GenerationError::Auth(body),
            429 => GenerationError::RateLimited { retry_after },
            _ => GenerationError::Upstream { status, body },
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn description(&self) -> &'static str {
        "Google Gemini generateContent API (remote, requires an API key)"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.resolved_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        log::debug!(
            "GeminiBackend: sending {} char prompt to model '{}'",
            prompt.len(),
            self.model
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&request_body)
            .send()
            .await
            .map_err(GenerationError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_status(status.as_u16(), retry_after, body));
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(GenerationError::from_transport)?;

        Self::text_from_response(decoded)
    }

    async fn health_check(&self) -> bool {
        let key = match self.resolved_key() {
            Ok(key) => key,
            Err(_) => return false,
        };
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model);
        match self
            .http_client
            .get(&url)
            .header("x-goog-api-key", key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name() {
        let backend = GeminiBackend::new(None, DEFAULT_MODEL);
        assert_eq!(backend.name(), "gemini");
    }

    #[test]
    fn test_default_base_url() {
        let backend = GeminiBackend::new(None, DEFAULT_MODEL);
        assert_eq!(backend.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let backend = GeminiBackend::new(None, DEFAULT_MODEL);
        let err = backend.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Auth(_)));
    }

    #[tokio::test]
    async fn test_blank_key_fails_before_any_request() {
        let backend = GeminiBackend::new(Some("   ".into()), DEFAULT_MODEL);
        let err = backend.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Auth(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GeminiBackend::error_from_status(403, None, "denied".into()),
            GenerationError::Auth(_)
        ));
        assert!(matches!(
            GeminiBackend::error_from_status(429, Some(30), String::new()),
            GenerationError::RateLimited {
                retry_after: Some(30)
            }
        ));
        assert!(matches!(
            GeminiBackend::error_from_status(500, None, "boom".into()),
            GenerationError::Upstream { status: 500, .. }
        ));
    }

    #[test]
    fn test_invalid_key_400_maps_to_auth() {
        assert!(matches!(
            GeminiBackend::error_from_status(400, None, "API key not valid".into()),
            GenerationError::Auth(_)
        ));
        assert!(matches!(
            GeminiBackend::error_from_status(400, None, "malformed request".into()),
            GenerationError::Upstream { status: 400, .. }
        ));
    }

    #[test]
    fn test_text_from_response() {
        let decoded: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "```python\nx = 1\n```" }] }
            }]
        }))
        .unwrap();
        let text = GeminiBackend::text_from_response(decoded).unwrap();
        assert_eq!(text, "```python\nx = 1\n```");
    }

    #[test]
    fn test_multiple_parts_are_joined() {
        let decoded: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "a" }, { "text": "b" }] }
            }]
        }))
        .unwrap();
        assert_eq!(GeminiBackend::text_from_response(decoded).unwrap(), "ab");
    }

    #[test]
    fn test_empty_candidates_is_invalid_response() {
        let decoded: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(
            GeminiBackend::text_from_response(decoded),
            Err(GenerationError::InvalidResponse(_))
        ));
    }
}
