//! Generative audio client
//!
//! Text-to-music inference runs in a separate service. The client POSTs
//! `{prompt, max_new_tokens, seed}` and expects a WAV body back. One
//! attempt per request: failures are surfaced, never retried.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::mood_prompt::{generation_seed, map_mood, token_budget};
use super::wav;

const USER_AGENT: &str = concat!("moodmap-server/", env!("CARGO_PKG_VERSION"));

/// Generative model errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Connection, timeout or body transfer failure
    #[error("Network error: {0}")]
    Network(String),

    /// Inference service answered with a non-success status
    #[error("Model API error {0}: {1}")]
    Api(u16, String),

    /// Returned bytes are not usable audio
    #[error("Invalid audio from model: {0}")]
    InvalidAudio(String),
}

/// Inference request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub seed: u64,
}

impl GenerationRequest {
    /// Prompt, token budget and seed for a point in mood space
    pub fn from_mood(energy: f64, valence: f64, preview: bool) -> Self {
        Self {
            prompt: map_mood(energy, valence).text(),
            max_new_tokens: token_budget(preview),
            seed: generation_seed(energy, valence),
        }
    }
}

/// Backend that turns a request into WAV bytes
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError>;
}

/// HTTP client for a MusicGen-style inference endpoint
pub struct MusicGenClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl MusicGenClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AudioGenerator for MusicGenClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        debug!(endpoint = %self.endpoint, seed = request.seed, "Requesting generation");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// A normalized clip ready to stream
#[derive(Debug, Clone)]
pub struct GeneratedClip {
    /// 16-bit mono WAV
    pub wav: Vec<u8>,
    /// Seconds
    pub duration: f64,
    pub preview: bool,
}

/// Generate a clip for (energy, valence) and peak-normalize it
pub async fn generate_from_mood(
    generator: &dyn AudioGenerator,
    energy: f64,
    valence: f64,
    preview: bool,
) -> Result<GeneratedClip, GenerationError> {
    let request = GenerationRequest::from_mood(energy, valence, preview);
    info!(
        energy,
        valence,
        preview,
        prompt = %request.prompt,
        "Generating music"
    );

    let raw = generator.generate(&request).await?;

    let normalized = tokio::task::spawn_blocking(move || wav::normalize_to_wav(&raw))
        .await
        .map_err(|e| GenerationError::InvalidAudio(format!("Post-processing task failed: {}", e)))?
        .map_err(|e| GenerationError::InvalidAudio(format!("{:#}", e)))?;

    Ok(GeneratedClip {
        wav: normalized.bytes,
        duration: normalized.duration,
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingGenerator {
        seen: Mutex<Vec<GenerationRequest>>,
        response: Vec<u8>,
    }

    #[async_trait]
    impl AudioGenerator for RecordingGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_request_from_mood() {
        let request = GenerationRequest::from_mood(0.8, 0.2, true);
        assert_eq!(
            request.prompt,
            "melancholic and emotional. Electronic dance music with clear melody and rhythm."
        );
        assert_eq!(request.max_new_tokens, 256);
        assert_eq!(request.seed, 1200);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["max_new_tokens"], 256);
        assert!(body["prompt"].is_string());
    }

    #[tokio::test]
    async fn test_generate_from_mood_normalizes() {
        let pcm: Vec<i16> = (0..16000).map(|i| ((i % 100) as i16 - 50) * 10).collect();
        let generator = RecordingGenerator {
            seen: Mutex::new(Vec::new()),
            response: wav::encode_wav_i16(&pcm, 16000).unwrap(),
        };

        let clip = generate_from_mood(&generator, 0.5, 0.5, false).await.unwrap();
        assert!((clip.duration - 1.0).abs() < 1e-9);
        assert!(!clip.preview);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_new_tokens, 512);
        assert_eq!(seen[0].seed, 1500);
    }

    #[tokio::test]
    async fn test_invalid_audio_is_reported() {
        let generator = RecordingGenerator {
            seen: Mutex::new(Vec::new()),
            response: b"not audio".to_vec(),
        };
        let result = generate_from_mood(&generator, 0.5, 0.5, true).await;
        assert!(matches!(result, Err(GenerationError::InvalidAudio(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client =
            MusicGenClient::new("http://127.0.0.1:9/generate", Duration::from_secs(2)).unwrap();
        let request = GenerationRequest::from_mood(0.5, 0.5, true);
        let result = client.generate(&request).await;
        assert!(matches!(result, Err(GenerationError::Network(_))));
    }
}
