//! Cover and teaser media rules: kinds, storage paths, focal points and
//! the public download manifest pacing.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

/// Minimum delay clients must leave between two files of a bulk download.
pub const DOWNLOAD_INTERVAL_MS: u64 = 1000;

/// Prefix of the fallback download name for untitled teasers.
pub const DOWNLOAD_NAME_PREFIX: &str = "peekit-file-";

/// Extension used when an uploaded file name has none.
pub const FALLBACK_EXTENSION: &str = "bin";

// ---------------------------------------------------------------------------
// Teaser kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeaserKind {
    Image,
    Video,
}

impl TeaserKind {
    /// Anything whose MIME type starts with `video` is a video; the rest
    /// are images.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.starts_with("video") => Self::Video,
            _ => Self::Image,
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(CoreError::Validation(format!(
                "Invalid teaser type '{s}'. Must be one of: image, video"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

// ---------------------------------------------------------------------------
// Storage paths
// ---------------------------------------------------------------------------

/// Lowercased extension of an uploaded file name.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// `covers/<user>/<uuid>.<ext>`
pub fn cover_path(user_id: EntityId, file_name: &str) -> String {
    format!(
        "covers/{user_id}/{}.{}",
        uuid::Uuid::new_v4(),
        file_extension(file_name)
    )
}

/// `teasers/<user>/<project>/<uuid>.<ext>`
pub fn teaser_path(user_id: EntityId, project_id: EntityId, file_name: &str) -> String {
    format!(
        "teasers/{user_id}/{project_id}/{}.{}",
        uuid::Uuid::new_v4(),
        file_extension(file_name)
    )
}

/// File name offered to the client when downloading a teaser.
pub fn download_name(teaser_id: EntityId, title: Option<&str>) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => format!("{DOWNLOAD_NAME_PREFIX}{teaser_id}"),
    }
}

// ---------------------------------------------------------------------------
// Focal point
// ---------------------------------------------------------------------------

/// Cover crop anchor, in percent of width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: f32,
    pub y: f32,
}

impl Default for FocalPoint {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

impl FocalPoint {
    pub fn new(x: f32, y: f32) -> Result<Self, CoreError> {
        let point = Self { x, y };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "Focal point {axis} must be between 0 and 100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_content_type_is_video() {
        assert_eq!(TeaserKind::from_content_type(Some("video/mp4")), TeaserKind::Video);
        assert_eq!(TeaserKind::from_content_type(Some("image/jpeg")), TeaserKind::Image);
        assert_eq!(TeaserKind::from_content_type(None), TeaserKind::Image);
    }

    #[test]
    fn teaser_kind_from_db() {
        assert_eq!(TeaserKind::from_str_db("video").unwrap(), TeaserKind::Video);
        assert!(TeaserKind::from_str_db("audio").is_err());
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("IMG_001.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), FALLBACK_EXTENSION);
        assert_eq!(file_extension("trailing."), FALLBACK_EXTENSION);
        assert_eq!(file_extension("evil.j/pg"), FALLBACK_EXTENSION);
    }

    #[test]
    fn storage_paths_are_namespaced() {
        let user = EntityId::new_v4();
        let project = EntityId::new_v4();

        let cover = cover_path(user, "cover.png");
        assert!(cover.starts_with(&format!("covers/{user}/")));
        assert!(cover.ends_with(".png"));

        let teaser = teaser_path(user, project, "clip.mp4");
        assert!(teaser.starts_with(&format!("teasers/{user}/{project}/")));
        assert!(teaser.ends_with(".mp4"));
        assert_ne!(teaser, teaser_path(user, project, "clip.mp4"));
    }

    #[test]
    fn download_name_falls_back_to_id() {
        let id = EntityId::nil();
        assert_eq!(download_name(id, Some("IMG_1.jpg")), "IMG_1.jpg");
        assert_eq!(
            download_name(id, None),
            "peekit-file-00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(download_name(id, Some(" ")), download_name(id, None));
    }

    #[test]
    fn focal_point_bounds() {
        assert!(FocalPoint::new(0.0, 100.0).is_ok());
        assert!(FocalPoint::new(-1.0, 50.0).is_err());
        assert!(FocalPoint::new(50.0, 100.5).is_err());
        assert!(FocalPoint::new(f32::NAN, 50.0).is_err());
        assert_eq!(FocalPoint::default(), FocalPoint { x: 50.0, y: 50.0 });
    }
}
