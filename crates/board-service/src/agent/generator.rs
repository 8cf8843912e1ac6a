//! Reply generation
//!
//! [`ReplyGenerator`] is the seam between the agent and the text generation
//! service. [`GeminiGenerator`] talks to the Generative Language
//! `generateContent` REST endpoint, inlining post images as base64.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use board_common::AgentConfig;
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// MIME type assumed when an image response does not declare one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Largest image downloaded for inlining
const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Longest error body kept in a `Status` error
const MAX_ERROR_BODY_CHARS: usize = 320;

/// Everything the generation service needs for one reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub image_urls: Vec<String>,
}

/// Generation failures; the agent logs them and skips the candidate
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service is not configured")]
    NotConfigured,

    #[error("generation request timed out")]
    Timeout,

    #[error("generation request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generation response: {0}")]
    Malformed(String),

    #[error("generation service returned no text")]
    Empty,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Produces reply text for the persona
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_payload(request: &GenerationRequest, images: Vec<InlineData>) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: request.prompt.clone(),
    }];
    parts.extend(images.into_iter().map(|inline_data| Part::Inline { inline_data }));

    let instruction = request.system_instruction.trim();
    GenerateContentRequest {
        contents: vec![Content { parts }],
        system_instruction: (!instruction.is_empty()).then(|| Content {
            parts: vec![Part::Text {
                text: instruction.to_string(),
            }],
        }),
    }
}

/// Text of the first candidate, parts joined by newlines
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let text = response
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
                .join("\n")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text.to_string())
}

// ============================================================================
// Gemini client
// ============================================================================

/// Generative Language API client
pub struct GeminiGenerator {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    max_image_bytes: usize,
}

impl GeminiGenerator {
    /// Build a client with the configured model, endpoint and timeout
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: &AgentConfig) -> Result<Self, GenerationError> {
        Self::with_timeout(config, config.request_timeout())
    }

    fn with_timeout(config: &AgentConfig, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.api_base_url.trim_end_matches('/'),
                config.model
            ),
            max_image_bytes: MAX_IMAGE_BYTES,
        })
    }

    /// Download an image and encode it inline; failures drop the image
    async fn fetch_image(&self, url: &str) -> Option<InlineData> {
        let mut response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(url = %url, status = %response.status(), "Image fetch rejected, skipping image");
                return None;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Image fetch failed, skipping image");
                return None;
            }
        };

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

        if response
            .content_length()
            .is_some_and(|len| len > self.max_image_bytes as u64)
        {
            warn!(url = %url, limit = self.max_image_bytes, "Image too large, skipping image");
            return None;
        }

        let mut data = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) if data.len() + chunk.len() > self.max_image_bytes => {
                    warn!(url = %url, limit = self.max_image_bytes, "Image too large, skipping image");
                    return None;
                }
                Ok(Some(chunk)) => data.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    warn!(url = %url, error = %e, "Image download failed, skipping image");
                    return None;
                }
            }
        }

        Some(InlineData {
            mime_type,
            data: STANDARD.encode(&data),
        })
    }
}

#[async_trait]
impl ReplyGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NotConfigured)?;

        let images: Vec<InlineData> = join_all(request.image_urls.iter().map(|url| self.fetch_image(url)))
            .await
            .into_iter()
            .flatten()
            .collect();
        debug!(images = images.len(), "Sending generation request");

        let payload = build_payload(request, images);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        extract_text(&body)
    }
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("endpoint", &self.endpoint)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}
