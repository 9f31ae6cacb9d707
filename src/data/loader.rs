use crate::data::Image;
use crate::AlignError;
use std::path::{Path, PathBuf};

/// File extensions picked up when scanning a fixture directory.
pub const FIXTURE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Decode an image file into an [`Image`].
///
/// Missing, unreadable and undecodable files all fail with
/// [`AlignError::Load`] carrying the path.
pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Image> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| AlignError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Image::from_dynamic(img))
}

/// File name used for a fixture rendered at `angle` degrees.
pub fn fixture_file_name(angle: u32) -> String {
    format!("rotated_{angle:03}deg.png")
}

/// Recover the ground-truth angle from a fixture file name.
///
/// Accepts `rotated_047deg.png` as well as the older
/// `rotated_image_047deg.png` naming.
pub fn parse_fixture_angle(file_name: &str) -> Option<u32> {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let digits = stem
        .strip_prefix("rotated_image_")
        .or_else(|| stem.strip_prefix("rotated_"))?
        .strip_suffix("deg")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// List image files in `dir` whose names carry a fixture angle, sorted by angle.
pub fn list_fixtures<P: AsRef<Path>>(dir: P) -> crate::Result<Vec<(u32, PathBuf)>> {
    let mut fixtures = Vec::new();

    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FIXTURE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match parse_fixture_angle(name) {
            Some(angle) => fixtures.push((angle, path)),
            None => {
                tracing::warn!(file = %path.display(), "Skipping image without a fixture angle")
            }
        }
    }

    fixtures.sort();
    Ok(fixtures)
}
