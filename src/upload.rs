//! Upload-side checks for story images.
//!
//! Mirrors what the interactive shell enforces before handing bytes to the
//! gateway: an allowed file extension and a 10 MB size cap. Decodability is
//! the gateway's concern, not checked here.

use crate::{Error, Result};
use std::fs;
use std::path::Path;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Validate and read an uploaded image file.
pub fn read_upload(path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| Error::Upload(format!("{} has no file extension", path.display())))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::Upload(format!(
            "Unsupported image format '{}'. Expected one of: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let metadata = fs::metadata(path)?;
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(Error::Upload(format!(
            "Image is {:.2} MB; the limit is 10 MB",
            metadata.len() as f64 / (1024.0 * 1024.0)
        )));
    }

    Ok(fs::read(path)?)
}
