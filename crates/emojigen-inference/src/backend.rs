//! Image backend abstraction.
//!
//! Enum dispatch for image-generation backends, avoiding the
//! dyn-compatibility issues with async trait methods. [`ImageBackend`]
//! also turns a [`GeneratedImage`] into the bytes that get persisted.

use crate::error::InferenceError;
use crate::output::{GeneratedImage, decode_output};
use crate::replicate::ReplicateBackend;

/// A backend that can turn a caller prompt into an image.
pub enum ImageBackend {
    /// Hosted model on Replicate.
    Replicate(ReplicateBackend),
    /// Canned model output, for offline development and tests.
    Fixed(FixedBackend),
}

impl ImageBackend {
    /// Generate one image for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if the backend call fails or its output
    /// cannot be decoded.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, InferenceError> {
        match self {
            Self::Replicate(backend) => backend.generate(prompt).await,
            Self::Fixed(backend) => backend.generate(),
        }
    }

    /// Resolve a generated image to its bytes, downloading if needed.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Http`] if the download fails and
    /// [`InferenceError::Malformed`] if the image is empty.
    pub async fn fetch_bytes(&self, image: GeneratedImage) -> Result<Vec<u8>, InferenceError> {
        let bytes = match image {
            GeneratedImage::Bytes(bytes) => bytes,
            GeneratedImage::Url(url) => download(self.client(), &url).await?,
        };
        if bytes.is_empty() {
            return Err(InferenceError::Malformed("generated image is empty".to_owned()));
        }
        Ok(bytes)
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Replicate(_) => "replicate",
            Self::Fixed(_) => "fixed",
        }
    }

    const fn client(&self) -> &reqwest::Client {
        match self {
            Self::Replicate(backend) => backend.client(),
            Self::Fixed(backend) => &backend.client,
        }
    }
}

/// Download an image URL.
async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, InferenceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InferenceError::Http(format!("image download failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InferenceError::Http(format!(
            "image download returned {status}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| InferenceError::Http(format!("image download body failed: {e}")))?;

    tracing::debug!(size = bytes.len(), "Downloaded generated image");
    Ok(bytes.to_vec())
}

// ---------------------------------------------------------------------------
// Fixed backend
// ---------------------------------------------------------------------------

/// Canned response returned by [`FixedBackend`].
#[derive(Debug, Clone)]
enum FixedResponse {
    Output(serde_json::Value),
    Failure(String),
}

/// Backend that replays a configured model output.
///
/// The raw output goes through the same decoder as live predictions.
pub struct FixedBackend {
    client: reqwest::Client,
    response: FixedResponse,
}

impl FixedBackend {
    /// Replay `output` as if it were a prediction's `output` field.
    pub fn new(output: serde_json::Value) -> Self {
        Self {
            client: reqwest::Client::new(),
            response: FixedResponse::Output(output),
        }
    }

    /// Always fail as an unreachable service would.
    pub fn failing(reason: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            response: FixedResponse::Failure(reason.to_owned()),
        }
    }

    fn generate(&self) -> Result<GeneratedImage, InferenceError> {
        match &self.response {
            FixedResponse::Output(output) => decode_output(output),
            FixedResponse::Failure(reason) => Err(InferenceError::Http(reason.clone())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgo=";
    const PNG_MAGIC: [u8; 4] = [137, 80, 78, 71];

    /// Serve `GET /out.png` on an ephemeral port; every other path is 404.
    async fn image_host() -> String {
        let app = axum::Router::new().route(
            "/out.png",
            axum::routing::get(|| async { PNG_MAGIC.to_vec() }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn url_output_is_downloaded() {
        let host = image_host().await;
        let url = format!("{host}/out.png");
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([url])));

        let image = backend.generate("cat").await.unwrap();
        assert_eq!(image, GeneratedImage::Url(url));
        let bytes = backend.fetch_bytes(image).await.unwrap();
        assert_eq!(bytes, PNG_MAGIC.to_vec());
    }

    #[tokio::test]
    async fn failed_download_is_http_error() {
        let host = image_host().await;
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([])));
        let result = backend
            .fetch_bytes(GeneratedImage::Url(format!("{host}/missing.png")))
            .await;
        assert!(matches!(result, Err(InferenceError::Http(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn fixed_backend_decodes_inline_image() {
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([PNG_DATA_URI])));
        let image = backend.generate("anything").await;
        assert!(matches!(image, Ok(GeneratedImage::Bytes(_))));
    }

    #[tokio::test]
    async fn fixed_backend_failure_is_http_error() {
        let backend = ImageBackend::Fixed(FixedBackend::failing("service unavailable"));
        let image = backend.generate("anything").await;
        assert!(matches!(image, Err(InferenceError::Http(_))));
    }

    #[tokio::test]
    async fn fixed_backend_malformed_output_is_rejected() {
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!({"nope": 1})));
        let image = backend.generate("anything").await;
        assert!(matches!(image, Err(InferenceError::Malformed(_))));
    }

    #[tokio::test]
    async fn inline_bytes_pass_through() {
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([])));
        let bytes = backend
            .fetch_bytes(GeneratedImage::Bytes(vec![1, 2, 3]))
            .await
            .unwrap_or_default();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_bytes_are_malformed() {
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([])));
        let result = backend.fetch_bytes(GeneratedImage::Bytes(Vec::new())).await;
        assert!(matches!(result, Err(InferenceError::Malformed(_))));
    }

    #[test]
    fn backend_names() {
        let backend = ImageBackend::Fixed(FixedBackend::new(serde_json::json!([])));
        assert_eq!(backend.name(), "fixed");
    }
}
