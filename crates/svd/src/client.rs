//! HTTP client for the Stable Video Diffusion inference API.
//!
//! Wraps one model endpoint using [`reqwest`]. [`SvdClient::generate`]
//! performs a single attempt; retry policy lives in [`crate::retry`].

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;

/// Assumed output frame rate used to convert a requested duration into
/// a frame count.
pub const FRAMES_PER_SECOND: u32 = 8;

/// Hard cap on frames per request, matching the remote model's limit.
pub const MAX_FRAMES: u32 = 25;

/// Bodies smaller than this cannot plausibly be video content.
pub const MIN_VIDEO_BYTES: usize = 1000;

/// Per-attempt request timeout. Inference is slow; a cold model can take
/// minutes to produce a clip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Compute the `num_frames` request parameter for a clip duration.
///
/// Bounds request cost: `min(duration * 8, 25)`.
pub fn frame_count(duration_secs: u32) -> u32 {
    (duration_secs * FRAMES_PER_SECOND).min(MAX_FRAMES)
}

/// Generation parameters derived from a job's inputs.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Requested clip duration in seconds.
    pub duration_secs: u32,
    /// Requested quality label (forwarded for future use; the current
    /// model ignores it).
    pub quality: String,
}

/// Errors from a single inference attempt.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The model is still loading (HTTP 503). Not a failure; retry after
    /// the estimated wait if the payload provided one.
    #[error("model is loading")]
    ModelLoading {
        /// Wait suggested by the `estimated_time` payload field.
        estimated: Option<Duration>,
    },

    /// The API returned a semantic error. Not retried.
    #[error("inference API error ({status}): {detail}")]
    Api {
        /// HTTP status code (200 when a success status carried an error
        /// payload).
        status: u16,
        /// Structured `error` field when present, else the raw body.
        detail: String,
    },

    /// A success response whose body is too small to be video content.
    #[error("response too small for video content: {len} bytes")]
    Truncated { len: usize },

    /// The HTTP request itself failed (connect, DNS, TLS, timeout).
    /// Retried under the same budget as `ModelLoading`.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether this error consumes retry budget rather than failing the
    /// job outright.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::ModelLoading { .. } | FetchError::Request(_)
        )
    }
}

/// HTTP client for a single Stable Video Diffusion endpoint.
pub struct SvdClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl SvdClient {
    /// Create a new client for an inference endpoint.
    ///
    /// * `api_url` - full model URL, e.g.
    ///   `https://api-inference.huggingface.co/models/stabilityai/stable-video-diffusion-img2vid-xt`.
    /// * `token`   - bearer token for the inference API.
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            token,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: String, token: String) -> Self {
        Self {
            client,
            api_url,
            token,
        }
    }

    /// Endpoint URL this client targets.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Perform one image-to-video inference attempt.
    ///
    /// Sends the image as a multipart `inputs` part plus a `parameters`
    /// JSON part, and classifies the response per the API's conventions:
    /// 503 means the model is loading, other non-200s are semantic
    /// errors, and a 200 without a video content type is inspected
    /// before being trusted.
    pub async fn generate(
        &self,
        image: &[u8],
        params: &GenerationParams,
    ) -> Result<Vec<u8>, FetchError> {
        let parameters = serde_json::json!({
            "num_frames": frame_count(params.duration_secs),
        });

        let form = reqwest::multipart::Form::new()
            .part(
                "inputs",
                reqwest::multipart::Part::bytes(image.to_vec())
                    .file_name("character.jpg")
                    .mime_str("image/jpeg")?,
            )
            .text("parameters", parameters.to_string());

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "video/mp4")
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ModelLoading {
                estimated: parse_estimated_time(&body),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            return Err(FetchError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().await?;

        if !is_video_content_type(&content_type) {
            // A success status with a JSON body is an error in disguise.
            if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
                let detail = value
                    .get("error")
                    .and_then(|e| e.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                return Err(FetchError::Api {
                    status: status.as_u16(),
                    detail,
                });
            }
            if bytes.len() < MIN_VIDEO_BYTES {
                return Err(FetchError::Truncated { len: bytes.len() });
            }
            // Some endpoints omit correct headers on binary video.
            tracing::warn!(
                content_type = %content_type,
                len = bytes.len(),
                "Accepting response without a video content type",
            );
        }

        if bytes.is_empty() {
            return Err(FetchError::Truncated { len: 0 });
        }

        Ok(bytes.to_vec())
    }
}

/// Content types trusted to carry video bytes.
fn is_video_content_type(content_type: &str) -> bool {
    content_type.starts_with("video/") || content_type.starts_with("application/octet-stream")
}

/// Extract the `estimated_time` wait (seconds) from a 503 payload.
///
/// The field is remote input: negative, non-finite, or overflowing
/// values are discarded rather than trusted, leaving the caller to fall
/// back on its own backoff.
fn parse_estimated_time(body: &str) -> Option<Duration> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("estimated_time").and_then(|t| t.as_f64()))
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
