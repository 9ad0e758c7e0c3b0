//! Character image upload handler.
//!
//! Accepts a multipart upload, validates that it actually carries image
//! content, and stores it under the uploads bucket as
//! `character_<uuid>.<ext>`.

use axum::extract::{Multipart, State};
use axum::Json;
use charvid_core::naming;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for a successful character upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Locator of the stored image, e.g. `/uploads/character_<uuid>.png`.
    pub image_url: String,
}

/// POST /upload-character
///
/// Reads the `character` multipart field, rejects anything that is not
/// an image (both by declared content type and by magic bytes), and
/// saves it with a fresh UUID-based filename.
pub async fn upload_character(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("character") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest("File must be an image".to_string()));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        // Declared content types lie; check the magic bytes too.
        if image::guess_format(&data).is_err() {
            return Err(AppError::BadRequest(
                "File content is not a recognizable image".to_string(),
            ));
        }

        let extension = naming::image_extension(&filename);
        let stored_name = naming::character_image_filename(Uuid::new_v4(), &extension);
        let dest = state.config.uploads_dir.join(&stored_name);

        tokio::fs::write(&dest, &data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to save upload: {e}")))?;

        tracing::info!(
            filename = %stored_name,
            len = data.len(),
            "Character image uploaded",
        );

        return Ok(Json(UploadResponse {
            image_url: naming::upload_locator(&stored_name),
        }));
    }

    Err(AppError::BadRequest(
        "Missing 'character' file field in multipart upload".to_string(),
    ))
}
