//! Gemini API client for chat replies.
//!
//! Thin non-streaming client for the generateContent endpoint. The model
//! is prompted as the marketplace assistant in the caller's language; the
//! caller is responsible for falling back to the rule-based path when this
//! client errors.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sokocamp_core::Language;

use crate::config::GeminiConfig;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Errors from the Gemini API.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The response carried no candidate text.
    #[error("response contained no reply text")]
    MissingContent,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            inner: Arc::new(GeminiClientInner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }

    /// Generate a reply to a user question.
    ///
    /// `context` carries free-text page context (current product, order
    /// status) the assistant may use.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no text.
    #[instrument(skip(self, prompt, context), fields(model = %self.inner.config.model))]
    pub async fn generate_reply(
        &self,
        prompt: &str,
        context: &str,
        language: Language,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: system_prompt(prompt, context, language),
                }],
            }],
        };

        let url = format!(
            "{GEMINI_API_URL}/{}:generateContent?key={}",
            self.inner.config.model,
            self.inner.config.api_key.expose_secret(),
        );

        let response = self.inner.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map_or_else(|_| "unknown error".to_owned(), |body| body.error.message);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GeminiError::MissingContent)
    }
}

/// Build the per-language system prompt wrapping the user question.
fn system_prompt(prompt: &str, context: &str, language: Language) -> String {
    match language {
        Language::Sw => format!(
            "Wewe ni msaidizi wa SokoCamp, soko la kitandao la chuo kikuu. \
             Unasaidia wateja kuhusu maswali ya bidhaa, hali ya maagizo, \
             taarifa za wauzaji, sera za soko, ununuzi na malipo, na \
             uwasilishaji. Jibu kwa ufupi, kwa urafiki, na kwa msaada. Kama \
             swali halihusu SokoCamp, elekeza mtu aandikie \
             sokocamp@gmail.com.\n\n\
             Context: {context}\n\
             Swali la mtumiaji: {prompt}"
        ),
        Language::En => format!(
            "You are the SokoCamp assistant for a campus marketplace. You \
             help customers with product inquiries, order status, vendor \
             information, marketplace policies, shopping and payments, and \
             delivery. Respond briefly, friendly, and helpfully. If the \
             question is not related to SokoCamp, direct them to \
             sokocamp@gmail.com.\n\n\
             Context: {context}\n\
             User question: {prompt}"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_question_and_context() {
        let prompt = system_prompt("where is my order?", "order #12", Language::En);
        assert!(prompt.contains("User question: where is my order?"));
        assert!(prompt.contains("Context: order #12"));
    }

    #[test]
    fn test_system_prompt_language_selection() {
        let sw = system_prompt("habari", "", Language::Sw);
        assert!(sw.contains("msaidizi wa SokoCamp"));
        assert!(sw.contains("Swali la mtumiaji: habari"));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Karibu!" } ] } }
            ]
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.candidates[0].content.parts[0].text, "Karibu!");
    }

    #[test]
    fn test_error_body_parsing() {
        let json = r#"{ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } }"#;
        let parsed: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.error.message, "API key not valid");
    }
}
