//! Captured input for a scan attempt: decoded QR text or an image. The camera
//! and QR widgets live outside this crate; these types hold what they hand
//! over, either a file on disk or the `data:` URL webcam widgets produce.

use super::error::{Error, Result};
use base64ct::{Base64, Encoding};
use std::{fmt, path::Path};

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_CAPTURE_NAME: &str = "capture.jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Raw image bytes plus the metadata needed for a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

// Image bytes are noise in logs.
impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageBlob {
    /// # Errors
    /// Returns `Error::Validation` if `bytes` is empty.
    pub fn new(
        bytes: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::validation("captured image is empty"));
        }

        Ok(Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        })
    }

    /// Reads an image file, guessing its content type from the extension.
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read and
    /// `Error::Validation` if it is empty.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| Error::Config(format!("failed to read {}: {err}", path.display())))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_CAPTURE_NAME)
            .to_string();

        Self::new(bytes, file_name, content_type_for(path))
    }

    /// Decodes a base64 `data:` URL such as `data:image/jpeg;base64,/9j/...`.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the URL is not base64 image data.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let rest = data_url
            .trim()
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| Error::validation("capture is not a data URL"))?;

        let (meta, encoded) = rest
            .split_once(',')
            .ok_or_else(|| Error::validation("data URL has no payload"))?;

        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::validation("data URL payload is not base64"))?;

        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        if !content_type.starts_with("image/") {
            return Err(Error::validation(format!(
                "data URL is {content_type}, expected an image"
            )));
        }

        let bytes = Base64::decode_vec(encoded.trim())
            .map_err(|err| Error::validation(format!("invalid base64 image data: {err}")))?;

        let extension = content_type.trim_start_matches("image/");
        let file_name = if extension == "jpeg" {
            DEFAULT_CAPTURE_NAME.to_string()
        } else {
            format!("capture.{extension}")
        };

        Self::new(bytes, file_name, content_type)
    }

    /// Accepts either a `data:` URL or a filesystem path.
    ///
    /// # Errors
    /// See [`ImageBlob::from_data_url`] and [`ImageBlob::from_path`].
    pub async fn load(source: &str) -> Result<Self> {
        if source.trim_start().starts_with(DATA_URL_PREFIX) {
            Self::from_data_url(source)
        } else {
            Self::from_path(source).await
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// What the operator captured for an attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CapturePayload {
    QrText(String),
    Image(ImageBlob),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn decodes_jpeg_data_url() {
        // "hello" in base64
        let blob = ImageBlob::from_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(blob.bytes(), b"hello");
        assert_eq!(blob.file_name(), "capture.jpg");
        assert_eq!(blob.content_type(), "image/jpeg");
    }

    #[test]
    fn png_data_url_keeps_extension() {
        let blob = ImageBlob::from_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(blob.file_name(), "capture.png");
        assert_eq!(blob.content_type(), "image/png");
    }

    #[test]
    fn rejects_malformed_data_urls() {
        for input in [
            "image/jpeg;base64,aGVsbG8=",
            "data:image/jpeg;base64",
            "data:image/jpeg,aGVsbG8=",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/jpeg;base64,***",
            "data:image/jpeg;base64,",
        ] {
            assert!(
                matches!(ImageBlob::from_data_url(input), Err(Error::Validation(_))),
                "expected validation error for {input}"
            );
        }
    }

    #[test]
    fn debug_hides_bytes() {
        let blob = ImageBlob::new(vec![1, 2, 3], "a.png", "image/png").unwrap();
        let rendered = format!("{blob:?}");
        assert!(rendered.contains("len: 3"));
        assert!(!rendered.contains("[1, 2, 3]"));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("face.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("face.png")), "image/png");
        assert_eq!(content_type_for(Path::new("face")), "application/octet-stream");
    }

    #[tokio::test]
    async fn load_reads_files_and_data_urls() {
        let path: PathBuf =
            std::env::temp_dir().join(format!("gatepass-capture-{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, b"png-bytes").await.unwrap();

        let blob = ImageBlob::load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(blob.bytes(), b"png-bytes");
        assert_eq!(blob.content_type(), "image/png");
        let _ = tokio::fs::remove_file(&path).await;

        let blob = ImageBlob::load("data:image/jpeg;base64,aGVsbG8=").await.unwrap();
        assert_eq!(blob.bytes(), b"hello");
    }

    #[tokio::test]
    async fn missing_file_is_config_error() {
        let err = ImageBlob::load("/nonexistent/gatepass/face.jpg").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
