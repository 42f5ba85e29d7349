use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::AppConfig;
use crate::core::error::AppError;
use crate::core::http_client::{build_http_client, send_with_retry};
use crate::features::generation::dto::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const TEMPERATURE: f64 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Gemini `generateContent` client. One prompt in, one text completion out.
pub struct GeminiClient {
    config: Arc<AppConfig>,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: Arc<AppConfig>) -> Result<Self, AppError> {
        let http_client = build_http_client(
            config.disable_proxy,
            Duration::from_secs(config.generation_timeout_secs),
        )
        .map_err(|err| AppError::internal(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.gemini_api_base, self.config.gemini_model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: Some("application/json".to_string()),
            },
        };

        debug!(target: "comparison", model = %self.config.gemini_model, prompt_chars = prompt.chars().count(), "calling gemini");

        let body = send_with_retry("gemini", || {
            self.http_client
                .post(&url)
                .header(API_KEY_HEADER, &self.config.gemini_api_key)
                .json(&request)
        })
        .await
        .map_err(|failure| AppError::generation(format!("gemini request failed: {failure}")))?;

        let response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| AppError::generation(format!("unexpected gemini response: {err}")))?;

        extract_text(response)
    }
}

pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String, AppError> {
    if let Some(error) = response.error {
        return Err(AppError::generation(format!(
            "gemini error {}: {}",
            error.code.map(|code| code.to_string()).unwrap_or_default(),
            error.message
        )));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AppError::generation(format!("gemini produced no output: {reason}")));
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::generation(format!(
            "gemini returned an empty completion (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).expect("response json")
    }

    #[test]
    fn joins_candidate_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(response).expect("text"), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompts_are_generation_errors() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("SAFETY")));
    }

    #[test]
    fn empty_completion_is_rejected() {
        let response = parse(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#);
        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("MAX_TOKENS")));
    }
}
