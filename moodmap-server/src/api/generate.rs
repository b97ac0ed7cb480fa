//! Mood-conditioned music generation
//!
//! GET /generate/:energy/:valence?preview=true streams a WAV clip.

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::extract::{ApiPath, ApiQuery};
use crate::services::music_gen_client::generate_from_mood;
use crate::{ApiError, ApiResult, AppState};

pub const DOWNLOAD_DISPOSITION: &str = "attachment;filename=generated_music.wav";

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default = "default_preview")]
    pub preview: bool,
}

fn default_preview() -> bool {
    true
}

/// GET /generate/:energy/:valence
///
/// Responds with `audio/wav` plus `X-Duration` (seconds) and `X-Preview`.
/// 503 when no model endpoint is configured, 502 when the model fails.
pub async fn generate_music(
    State(state): State<AppState>,
    ApiPath((energy, valence)): ApiPath<(f64, f64)>,
    ApiQuery(params): ApiQuery<GenerateParams>,
) -> ApiResult<Response> {
    if !energy.is_finite() || !valence.is_finite() {
        return Err(ApiError::BadRequest(
            "energy and valence must be finite numbers".to_string(),
        ));
    }

    let generator = state.generator.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("No generative model endpoint configured".to_string())
    })?;

    let clip = generate_from_mood(generator.as_ref(), energy, valence, params.preview).await?;

    let headers = [
        (header::CONTENT_TYPE, "audio/wav".to_string()),
        (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION.to_string()),
        (HeaderName::from_static("x-duration"), clip.duration.to_string()),
        (HeaderName::from_static("x-preview"), clip.preview.to_string()),
    ];

    Ok((headers, clip.wav).into_response())
}

pub fn generate_routes() -> Router<AppState> {
    Router::new().route("/generate/:energy/:valence", get(generate_music))
}
