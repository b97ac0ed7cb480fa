//! Audio upload and feature ingest
//!
//! POST /features (multipart, field `file`)

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use moodmap_common::db::{songs, NewSong};
use moodmap_common::FeatureVector;
use serde::Serialize;
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Artist stored for uploaded files
pub const UPLOAD_ARTIST: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub song_id: String,
    pub features: FeatureVector,
}

/// POST /features
///
/// Extracts mood features from the uploaded file and stores a new song
/// titled after the file name.
pub async fn upload_features(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<FeaturesResponse>> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Missing multipart field 'file'".to_string()))?;

    let extractor = state.extractor.clone();
    let hint = file_name.clone();
    let features = tokio::task::spawn_blocking(move || extractor.extract(bytes, hint.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))??;

    let title = file_name.unwrap_or_else(|| "untitled".to_string());
    let song = songs::insert_song(
        &state.db,
        &NewSong::from_features(title, UPLOAD_ARTIST, &features),
    )
    .await?;

    info!(
        song_id = %song.id,
        title = %song.title,
        energy = features.energy,
        valence = features.valence,
        tempo = features.tempo,
        "Ingested uploaded song"
    );

    Ok(Json(FeaturesResponse {
        song_id: song.id,
        features,
    }))
}

pub fn feature_routes() -> Router<AppState> {
    Router::new().route("/features", post(upload_features))
}
