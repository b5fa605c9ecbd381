use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gymshot_core::Result;
use gymshot_vision::{EncodedImage, VisionRequest};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Builds vision requests for a batch of image paths.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    prompt: String,
}

/// A batch after encoding: the request to send plus the images left out.
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub request: VisionRequest,
    /// Paths that could not be read.
    pub skipped: Vec<PathBuf>,
}

impl EncodedBatch {
    /// True when no image could be encoded; such a batch is never sent.
    pub fn is_empty(&self) -> bool {
        self.request.images.is_empty()
    }
}

/// Read a file and base64-encode its contents.
pub async fn encode_image(path: &Path) -> Result<EncodedImage> {
    let bytes = tokio::fs::read(path).await?;
    Ok(EncodedImage {
        source: path.to_path_buf(),
        data: STANDARD.encode(bytes),
    })
}

impl RequestBuilder {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Encode every path; unreadable files are logged and skipped individually.
    pub async fn build(&self, paths: &[PathBuf]) -> EncodedBatch {
        let mut images = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        for path in paths {
            match encode_image(path).await {
                Ok(image) => images.push(image),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable image");
                    skipped.push(path.clone());
                }
            }
        }

        EncodedBatch {
            request: VisionRequest {
                model: self.model.clone(),
                prompt: self.prompt.clone(),
                images,
            },
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_skips_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("a.png");
        let missing = tmp.path().join("b.png");
        std::fs::write(&present, b"hello").unwrap();

        let batch = RequestBuilder::new("m", "p")
            .build(&[present.clone(), missing.clone()])
            .await;

        assert!(!batch.is_empty());
        assert_eq!(batch.request.images.len(), 1);
        assert_eq!(batch.request.images[0].source, present);
        assert_eq!(batch.request.images[0].data, "aGVsbG8=");
        assert_eq!(batch.skipped, vec![missing]);
        assert_eq!(batch.request.model, "m");
        assert_eq!(batch.request.prompt, "p");
    }

    #[tokio::test]
    async fn test_all_missing_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let batch = RequestBuilder::new("m", "p")
            .build(&[tmp.path().join("x.png")])
            .await;
        assert!(batch.is_empty());
        assert_eq!(batch.skipped.len(), 1);
    }
}
