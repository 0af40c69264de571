use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::traits::{Translator, TranslatorInfo};
use crate::config::Lang;
use crate::error::{Error, Result};

/// Default number of retry attempts
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default delay between retries in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
pub struct OpenAiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Number of retry attempts
    pub retry_count: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiTranslator {
    /// Create a new OpenAI-compatible translator.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    #[allow(clippy::expect_used)]
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        retry_count: u32,
        retry_delay_ms: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base,
            api_key,
            model,
            retry_count,
            retry_delay_ms,
        }
    }

    /// Create a translator with default retry settings.
    pub fn with_defaults(api_base: String, api_key: Option<String>, model: String) -> Self {
        Self::new(
            api_base,
            api_key,
            model,
            DEFAULT_RETRY_COUNT,
            DEFAULT_RETRY_DELAY_MS,
        )
    }

    /// Prompt for a single document string (a cell, a file name, a paragraph).
    ///
    /// Document fragments are short and context-free, so the prompt pins the
    /// model to a bare translation with no commentary.
    fn build_prompt(text: &str, source: &Lang, target: &Lang) -> String {
        format!(
            "Translate this {} text into {}. It is a fragment from a document \
             (a spreadsheet cell, file name, or paragraph). Reply with the \
             translation only, nothing else.\n\n{}",
            language_name(source),
            language_name(target),
            text
        )
    }

    /// Make API request with retry logic
    async fn request_with_retry(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_prompt(text, source, target),
            }],
            // Low temperature keeps repeated cache misses consistent
            temperature: 0.3,
        };

        let mut last_error = None;

        for attempt in 0..self.retry_count {
            debug!(
                "Translation request attempt {}/{} to {}",
                attempt + 1,
                self.retry_count,
                url
            );

            match self.send_once(&url, &request).await {
                Ok(translated) => return Ok(translated),
                Err(Error::TranslationRateLimited { retry_after }) => {
                    warn!("Rate limited by provider, retry after {:?}s", retry_after);
                    let wait_ms = retry_after.unwrap_or(5) * 1000;
                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    last_error = Some(Error::TranslationRateLimited { retry_after });
                    continue;
                }
                Err(e) => {
                    warn!("Translation request failed: {e}");
                    last_error = Some(e);
                }
            }

            if attempt < self.retry_count - 1 {
                tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
            }
        }

        error!("Translation failed after {} attempts", self.retry_count);
        Err(last_error.unwrap_or(Error::TranslationMaxRetriesExceeded))
    }

    async fn send_once(&self, url: &str, request: &ChatRequest) -> Result<String> {
        let mut req = self.client.post(url).json(request);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::TranslationTimeout
            } else {
                Error::TranslationRequest(e.to_string())
            }
        })?;

        if response.status().as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::TranslationRateLimited { retry_after });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;

        let Some(choice) = chat.choices.first() else {
            return Err(Error::TranslationInvalidResponse(
                "No choices in response".to_string(),
            ));
        };

        // Strip quotes some models wrap around short fragments
        Ok(choice
            .message
            .content
            .trim()
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string())
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
            requires_api_key: false, // Optional for local servers
        }
    }

    async fn translate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        // Same-language pairs would just echo through the provider
        if source.as_str() == target.as_str() {
            return Ok(text.to_string());
        }

        self.request_with_retry(text, source, target).await
    }
}

/// Convert language code to human-readable name for prompts
fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "th" => "Thai",
        "en" => "English",
        "zh" | "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "he" => "Hebrew",
        "el" => "Greek",
        "vi" => "Vietnamese",
        // The model should still understand most ISO codes
        _ => "the source language",
    }
}
