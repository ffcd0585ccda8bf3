//! Provider identifiers and HTTP clients for the three AI services.
//!
//! All three vendors accept the same conceptual payload (a base64 PNG plus a
//! question) but with different wire formats. The differences live in the
//! request-body builders and response parsers below; everything else goes
//! through the one [`VisionClient`] trait so the shell can dispatch without
//! caring which vendor is selected, and tests can substitute a fake.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Hard bound on every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_TOKENS: u32 = 1000;
const OPENAI_MODEL: &str = "gpt-4-vision-preview";
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const CLAUDE_MODEL: &str = "claude-3-sonnet-20240229";

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const CLAUDE_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_API_VERSION: &str = "2023-06-01";

/// One of the three supported AI services.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Gemini,
    Claude,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Gemini, Provider::Claude];

    /// Stable identifier used in configuration.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
        }
    }

    /// Human-readable name for UI labels and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI (GPT-4)",
            Provider::Gemini => "Google Gemini",
            Provider::Claude => "Anthropic Claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "claude" => Ok(Provider::Claude),
            other => Err(AppError::config(format!("Unknown provider: {}", other))),
        }
    }
}

/// A client that can answer a question about an image.
///
/// Implemented once per vendor; the shell only ever holds a
/// `Box<dyn VisionClient>` built by [`client_for`].
#[async_trait]
pub trait VisionClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sends a base64-encoded PNG and a question, returns the answer text.
    async fn ask(&self, image_b64: &str, question: &str) -> Result<String>;
}

/// Builds the client for the given provider with the 30-second timeout set.
pub fn client_for(provider: Provider, credential: &str) -> Result<Box<dyn VisionClient>> {
    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let api_key = credential.to_string();

    Ok(match provider {
        Provider::OpenAi => Box::new(OpenAiClient { http, api_key }),
        Provider::Gemini => Box::new(GeminiClient { http, api_key }),
        Provider::Claude => Box::new(ClaudeClient { http, api_key }),
    })
}

/// Converts a non-2xx response into [`AppError::Provider`].
async fn error_for_status(provider: Provider, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Provider {
            provider: provider.label().to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// OpenAI

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

pub(crate) fn openai_request_body(image_b64: &str, question: &str) -> Value {
    json!({
        "model": OPENAI_MODEL,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": question },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/png;base64,{}", image_b64) }
                }
            ]
        }],
        "max_tokens": MAX_TOKENS
    })
}

pub(crate) fn parse_openai_response(value: &Value) -> Result<String> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::EmptyResponse {
            provider: Provider::OpenAi.label().to_string(),
        })
}

#[async_trait]
impl VisionClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn ask(&self, image_b64: &str, question: &str) -> Result<String> {
        let response = self
            .http
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(&openai_request_body(image_b64, question))
            .send()
            .await?;

        let value = error_for_status(Provider::OpenAi, response).await?;
        parse_openai_response(&value)
    }
}

// ---------------------------------------------------------------------------
// Gemini

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

pub(crate) fn gemini_request_body(image_b64: &str, question: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": question },
                { "inline_data": { "mime_type": "image/png", "data": image_b64 } }
            ]
        }]
    })
}

pub(crate) fn parse_gemini_response(value: &Value) -> Result<String> {
    value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::EmptyResponse {
            provider: Provider::Gemini.label().to_string(),
        })
}

#[async_trait]
impl VisionClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn ask(&self, image_b64: &str, question: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_URL_BASE, GEMINI_MODEL);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request_body(image_b64, question))
            .send()
            .await?;

        let value = error_for_status(Provider::Gemini, response).await?;
        parse_gemini_response(&value)
    }
}

// ---------------------------------------------------------------------------
// Claude

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
}

pub(crate) fn claude_request_body(image_b64: &str, question: &str) -> Value {
    json!({
        "model": CLAUDE_MODEL,
        "max_tokens": MAX_TOKENS,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": question },
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": "image/png",
                        "data": image_b64
                    }
                }
            ]
        }]
    })
}

pub(crate) fn parse_claude_response(value: &Value) -> Result<String> {
    value
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::EmptyResponse {
            provider: Provider::Claude.label().to_string(),
        })
}

#[async_trait]
impl VisionClient for ClaudeClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn ask(&self, image_b64: &str, question: &str) -> Result<String> {
        let response = self
            .http
            .post(CLAUDE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .json(&claude_request_body(image_b64, question))
            .send()
            .await?;

        let value = error_for_status(Provider::Claude, response).await?;
        parse_claude_response(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_round_trips_through_from_str() {
        for provider in Provider::ALL {
            assert_eq!(provider.id().parse::<Provider>().unwrap(), provider);
        }
        assert!("mistral".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_serde_uses_lowercase_ids() {
        for provider in Provider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.id()));
            let back: Provider = serde_json::from_str(&json).unwrap();
            assert_eq!(back, provider);
        }
    }

    #[test]
    fn openai_body_embeds_data_url_and_question() {
        let body = openai_request_body("QUJD", "what is this?");
        assert_eq!(body["model"], OPENAI_MODEL);
        assert_eq!(body["max_tokens"], MAX_TOKENS);
        assert_eq!(
            body["messages"][0]["content"][0]["text"],
            "what is this?"
        );
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn gemini_body_uses_inline_data_part() {
        let body = gemini_request_body("QUJD", "describe");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "describe");
        let inline = &body["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "QUJD");
    }

    #[test]
    fn claude_body_uses_base64_image_source() {
        let body = claude_request_body("QUJD", "describe");
        assert_eq!(body["model"], CLAUDE_MODEL);
        let source = &body["messages"][0]["content"][1]["source"];
        assert_eq!(source["type"], "base64");
        assert_eq!(source["media_type"], "image/png");
        assert_eq!(source["data"], "QUJD");
    }

    #[test]
    fn response_parsers_extract_answer_text() {
        let openai = json!({
            "choices": [{ "message": { "role": "assistant", "content": "a cat" } }]
        });
        assert_eq!(parse_openai_response(&openai).unwrap(), "a cat");

        let gemini = json!({
            "candidates": [{ "content": { "parts": [{ "text": "a dog" }] } }]
        });
        assert_eq!(parse_gemini_response(&gemini).unwrap(), "a dog");

        let claude = json!({
            "content": [{ "type": "text", "text": "a bird" }]
        });
        assert_eq!(parse_claude_response(&claude).unwrap(), "a bird");
    }

    #[test]
    fn response_parsers_reject_missing_answer() {
        let empty = json!({});
        assert!(matches!(
            parse_openai_response(&empty),
            Err(AppError::EmptyResponse { .. })
        ));
        assert!(matches!(
            parse_gemini_response(&empty),
            Err(AppError::EmptyResponse { .. })
        ));
        assert!(matches!(
            parse_claude_response(&empty),
            Err(AppError::EmptyResponse { .. })
        ));
    }

    struct FakeClient {
        answer: &'static str,
    }

    #[async_trait]
    impl VisionClient for FakeClient {
        fn provider(&self) -> Provider {
            Provider::OpenAi
        }

        async fn ask(&self, _image_b64: &str, question: &str) -> Result<String> {
            Ok(format!("{}: {}", question, self.answer))
        }
    }

    #[test]
    fn trait_object_dispatch_works_with_a_fake() {
        let client: Box<dyn VisionClient> = Box::new(FakeClient { answer: "42" });
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let answer = rt.block_on(client.ask("unused", "meaning of life")).unwrap();
        assert_eq!(answer, "meaning of life: 42");
    }
}
