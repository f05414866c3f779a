/// Google Gemini text-generation backend
///
/// Calls `/v1beta/models/{model}:generateContent` with a single user turn and
/// concatenates the text parts of the first candidate.
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::providers::ModelClient,
};

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }

    fn extract_text(response: GenerateContentResponse) -> AppResult<String> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ExternalApi(
                "Gemini response contained no text".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw Gemini API response");

        let parsed: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                AppError::ExternalApi(format!("Failed to parse Gemini response: {}", e))
            })?;

        let text = Self::extract_text(parsed)?;

        tracing::info!(
            model = %self.model,
            reply_len = text.len(),
            provider = "gemini",
            "Model reply received"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client(api_url: String) -> GeminiClient {
        GeminiClient::new(
            "test_key".to_string(),
            api_url,
            "gemini-1.5-flash".to_string(),
        )
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = create_test_client("http://test.local/".to_string());
        assert_eq!(
            client.endpoint(),
            "http://test.local/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_wraps_prompt() {
        let body = GeminiClient::request_body("rank these");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "rank these");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "```json\n[1, "}, {"text": "2]\n```"}]}
            }]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = GeminiClient::extract_text(response).unwrap();
        assert_eq!(text, "```json\n[1, 2]\n```");
    }

    #[test]
    fn test_extract_text_without_candidates_fails() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_generate_returns_reply_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-1.5-flash:generateContent")
                    .header("x-goog-api-key", "test_key");
                then.status(200).json_body(serde_json::json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "[3, 7, 5, 8]"}]}
                    }]
                }));
            })
            .await;

        let client = create_test_client(server.base_url());
        let reply = client.generate("prompt").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "[3, 7, 5, 8]");
    }

    #[tokio::test]
    async fn test_generate_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("overloaded");
            })
            .await;

        let client = create_test_client(server.base_url());
        let err = client.generate("prompt").await.unwrap_err();

        match err {
            AppError::ExternalApi(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("not json");
            })
            .await;

        let client = create_test_client(server.base_url());
        assert!(client.generate("prompt").await.is_err());
    }
}
