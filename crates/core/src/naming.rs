//! Filename and locator conventions for stored assets.
//!
//! Uploaded character images and produced videos live in two flat
//! buckets and are exposed to clients as relative locators:
//!
//! - uploads: `character_<uuid>.<ext>` under `/uploads/...`
//! - videos:  `video_<jobId>.mp4` under `/videos/...`

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Locator prefix for uploaded character images.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Locator prefix for produced videos.
pub const VIDEOS_PREFIX: &str = "/videos/";

/// Fallback extension when the uploaded filename carries none.
const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Generate the stored filename for an uploaded character image.
///
/// # Examples
///
/// ```
/// use charvid_core::naming::character_image_filename;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// assert_eq!(
///     character_image_filename(id, "png"),
///     "character_00000000-0000-0000-0000-000000000000.png"
/// );
/// ```
pub fn character_image_filename(id: Uuid, extension: &str) -> String {
    format!("character_{id}.{extension}")
}

/// Generate the stored filename for a job's video artifact.
///
/// # Examples
///
/// ```
/// use charvid_core::naming::video_filename;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// assert_eq!(video_filename(id), "video_00000000-0000-0000-0000-000000000000.mp4");
/// ```
pub fn video_filename(job_id: Uuid) -> String {
    format!("video_{job_id}.mp4")
}

/// Client-facing locator for an uploaded image filename.
pub fn upload_locator(filename: &str) -> String {
    format!("{UPLOADS_PREFIX}{filename}")
}

/// Client-facing locator for a video filename.
pub fn video_locator(filename: &str) -> String {
    format!("{VIDEOS_PREFIX}{filename}")
}

/// Extract a usable extension from an uploaded filename.
///
/// Falls back to `jpg` when the name has no extension, and strips
/// anything that is not alphanumeric so the result is always safe to
/// splice into a stored filename.
pub fn image_extension(filename: &str) -> String {
    let ext: String = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if ext.is_empty() {
        DEFAULT_IMAGE_EXTENSION.to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}

/// Resolve an `/uploads/...` locator to a path inside `uploads_dir`.
///
/// Returns `None` for locators outside the uploads bucket or containing
/// path separators / parent references (traversal attempts).
pub fn upload_path(uploads_dir: &Path, locator: &str) -> Option<PathBuf> {
    let filename = locator.strip_prefix(UPLOADS_PREFIX)?;
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return None;
    }
    Some(uploads_dir.join(filename))
}
