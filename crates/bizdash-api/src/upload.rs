use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::{header, HeaderMap},
    Json,
};
use bizdash_core::Session;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub avatar_url: String,
}

/// Check the declared MIME type against the file's magic bytes and return
/// the extension to store under. Runs before anything touches disk.
pub fn validate_image(declared_mime: &str, bytes: &[u8]) -> Result<&'static str, String> {
    match declared_mime {
        "image/png" => {
            if bytes.len() >= PNG_MAGIC.len() && bytes[..PNG_MAGIC.len()] == PNG_MAGIC {
                Ok("png")
            } else {
                Err("file does not match the PNG signature".into())
            }
        }
        "image/jpeg" => {
            if bytes.len() >= JPEG_MAGIC.len() && bytes[..JPEG_MAGIC.len()] == JPEG_MAGIC {
                Ok("jpg")
            } else {
                Err("file does not match the JPEG signature".into())
            }
        }
        other => Err(format!("unsupported image type: {other}")),
    }
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing content-type header".into()))?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload body".into()));
    }
    if body.len() > MAX_AVATAR_BYTES {
        return Err(ApiError::BadRequest("avatar exceeds the 5 MiB limit".into()));
    }

    let extension = validate_image(declared, &body).map_err(ApiError::BadRequest)?;

    let dir = &state.config.server.upload_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let file_name = format!("{}.{extension}", session.user_id);
    let path = std::path::Path::new(dir).join(&file_name);
    tokio::fs::write(&path, &body)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let avatar_url = format!("/uploads/{file_name}");
    state
        .identity
        .set_avatar_url(&session.user_id, &avatar_url)
        .await?;

    info!(user_id = %session.user_id, %avatar_url, "avatar stored");
    Ok(Json(UploadResponse {
        success: true,
        avatar_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_with_valid_signature_passes() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(b"rest of file");
        assert_eq!(validate_image("image/png", &bytes), Ok("png"));
    }

    #[test]
    fn declared_png_with_wrong_magic_is_rejected() {
        let bytes = b"GIF89a not a png".to_vec();
        assert!(validate_image("image/png", &bytes).is_err());
    }

    #[test]
    fn truncated_png_is_rejected() {
        assert!(validate_image("image/png", &PNG_MAGIC[..4]).is_err());
    }

    #[test]
    fn jpeg_signature_passes() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(validate_image("image/jpeg", &bytes), Ok("jpg"));
    }

    #[test]
    fn unsupported_mime_is_rejected() {
        assert!(validate_image("image/gif", b"GIF89a").is_err());
    }
}
