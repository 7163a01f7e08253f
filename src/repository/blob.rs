//! Photo Uploads
//!
//! Payload type for proof photos and the storage path naming scheme
//! `<unix-millis>-<random hex>.<extension>`.

use rand::Rng;
use std::path::Path;

use crate::domain::{DomainError, DomainResult};

/// A photo picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Original file name, used for the extension and content type
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a photo from disk
    pub async fn from_path(path: &Path) -> DomainResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Decode a base64 data URL such as `data:image/png;base64,...`.
    ///
    /// The photo is named `photo.<ext>` after the declared media type.
    pub fn from_data_url(data: &str) -> DomainResult<Self> {
        let (header, payload) = data
            .trim()
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| DomainError::InvalidInput("expected a data: URL".to_string()))?;
        let media_type = header.split(';').next().unwrap_or_default();

        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload.trim())
            .map_err(|e| DomainError::InvalidInput(format!("Failed to decode base64: {}", e)))?;
        Ok(Self::new(format!("photo.{}", extension_for(media_type)), bytes))
    }

    /// Load from a `data:` URL or a file path
    pub async fn from_source(source: &str) -> DomainResult<Self> {
        if source.trim_start().starts_with("data:") {
            Self::from_data_url(source)
        } else {
            Self::from_path(Path::new(source)).await
        }
    }

    /// Text after the last dot, or the whole name when there is none
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }

    /// Storage path for this photo at `now_millis` with a random suffix
    pub fn storage_path(&self, now_millis: i64, suffix: &str) -> String {
        format!("{}-{}.{}", now_millis, suffix, self.extension())
    }
}

/// File extension for a media type; the subtype wins when it is a known
/// extension (`image/jpeg` -> `jpeg`)
fn extension_for(media_type: &str) -> &str {
    let Some(known) = mime_guess::get_mime_extensions_str(media_type) else {
        return "bin";
    };
    let subtype = media_type.rsplit('/').next().unwrap_or_default();
    known
        .iter()
        .copied()
        .find(|ext| ext.eq_ignore_ascii_case(subtype))
        .or_else(|| known.first().copied())
        .unwrap_or("bin")
}

/// 13 random hex digits
pub fn random_suffix<R: Rng>(rng: &mut R) -> String {
    format!("{:013x}", rng.gen::<u64>() & 0x000F_FFFF_FFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_extension_and_content_type() {
        let photo = PhotoUpload::new("oppvask.JPG", vec![1, 2, 3]);
        assert_eq!(photo.extension(), "JPG");
        assert_eq!(photo.content_type(), "image/jpeg");

        let bare = PhotoUpload::new("photo", vec![]);
        assert_eq!(bare.extension(), "photo");
        assert_eq!(bare.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_storage_path() {
        let photo = PhotoUpload::new("a.b.png", vec![]);
        assert_eq!(photo.storage_path(1_760_000_000_000, "abc"), "1760000000000-abc.png");
    }

    #[test]
    fn test_random_suffix_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let suffix = random_suffix(&mut rng);
        assert_eq!(suffix.len(), 13);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(suffix, random_suffix(&mut rng));
    }

    #[test]
    fn test_from_data_url() {
        let photo = PhotoUpload::from_data_url("data:image/png;base64,aGVp").unwrap();
        assert_eq!(photo.file_name, "photo.png");
        assert_eq!(photo.bytes, b"hei");
        assert_eq!(photo.content_type(), "image/png");

        let jpeg = PhotoUpload::from_data_url("data:image/jpeg;base64,aGVp").unwrap();
        assert_eq!(jpeg.file_name, "photo.jpeg");

        let odd = PhotoUpload::from_data_url("data:application/x-kollektiv;base64,aGVp").unwrap();
        assert_eq!(odd.extension(), "bin");

        assert!(PhotoUpload::from_data_url("aGVp").is_err());
        assert!(PhotoUpload::from_data_url("data:,!!!").is_err());
    }

    #[tokio::test]
    async fn test_from_source_picks_data_url_or_file() {
        let inline = PhotoUpload::from_source("data:image/webp;base64,aGVp").await.unwrap();
        assert_eq!(inline.file_name, "photo.webp");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kjokken.jpg");
        std::fs::write(&path, b"img").unwrap();
        let file = PhotoUpload::from_source(path.to_str().unwrap()).await.unwrap();
        assert_eq!(file.file_name, "kjokken.jpg");

        assert!(PhotoUpload::from_source("/no/such/photo.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bevis.webp");
        std::fs::write(&path, b"img").unwrap();
        let photo = PhotoUpload::from_path(&path).await.unwrap();
        assert_eq!(photo.file_name, "bevis.webp");
        assert_eq!(photo.bytes, b"img");
    }
}
