//! Replicate predictions API backend.
//!
//! Creates a prediction with `Prefer: wait` so short runs finish in a
//! single round trip, then polls the prediction's `get` URL until it
//! reaches a terminal status. The whole exchange is bounded by
//! [`ReplicateConfig::timeout`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::output::{GeneratedImage, decode_output};
use crate::prompt::PromptTemplate;

/// Default Replicate API base URL.
pub const DEFAULT_API_URL: &str = "https://api.replicate.com/v1";

/// The SDXL emoji fine-tune, pinned to a specific version.
pub const DEFAULT_MODEL_VERSION: &str =
    "fofr/sdxl-emoji:dee76b5afde21b0f01ed7925f0665b7e879c50ee718c5f78a9d38e04d523cc5e";

/// Default deadline for one generation, including polling.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default delay between status polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Connection settings for the Replicate backend.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    /// API base URL.
    pub api_url: String,
    /// API token, sent as a bearer token.
    pub api_token: String,
    /// Model version as `owner/name:hash` or a bare version hash.
    pub model_version: String,
    /// Deadline for one generation, including polling.
    pub timeout: Duration,
    /// Delay between status polls.
    pub poll_interval: Duration,
}

impl ReplicateConfig {
    /// Configuration with default URL, model, and timings.
    pub fn new(api_token: &str) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_token: api_token.to_owned(),
            model_version: DEFAULT_MODEL_VERSION.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// The version hash Replicate expects in the request body.
    pub fn version_hash(&self) -> &str {
        self.model_version
            .rsplit_once(':')
            .map_or(self.model_version.as_str(), |(_, hash)| hash)
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// The fixed generation parameters sent with every prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmojiModelInput {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Templated prompt.
    pub prompt: String,
    /// Refiner stage selection.
    pub refine: &'static str,
    /// Sampler.
    pub scheduler: &'static str,
    /// `LoRA` additive scale.
    pub lora_scale: f64,
    /// Number of images to produce.
    pub num_outputs: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f64,
    /// Whether to watermark the output.
    pub apply_watermark: bool,
    /// Fraction of noise handled by the expert ensemble.
    pub high_noise_frac: f64,
    /// Negative prompt.
    pub negative_prompt: &'static str,
    /// Prompt strength for img2img.
    pub prompt_strength: f64,
    /// Denoising steps.
    pub num_inference_steps: u32,
}

impl EmojiModelInput {
    /// The fixed parameter set around an already-templated prompt.
    pub const fn new(prompt: String) -> Self {
        Self {
            width: 1024,
            height: 1024,
            prompt,
            refine: "no_refiner",
            scheduler: "K_EULER",
            lora_scale: 0.6,
            num_outputs: 1,
            guidance_scale: 7.5,
            apply_watermark: false,
            high_noise_frac: 0.8,
            negative_prompt: "",
            prompt_strength: 0.8,
            num_inference_steps: 50,
        }
    }
}

/// Body of `POST /predictions`.
#[derive(Debug, Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: &'a EmojiModelInput,
}

/// Lifecycle state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    /// Queued, not yet running.
    Starting,
    /// Running.
    Processing,
    /// Finished with output.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Canceled,
}

impl PredictionStatus {
    /// Whether no further transitions will happen.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Links returned with a prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    /// URL to poll for status.
    pub get: String,
}

/// The subset of a prediction object this client reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Prediction ID.
    pub id: String,
    /// Current status.
    pub status: PredictionStatus,
    /// Model output once succeeded.
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Error reported by the model.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// Follow-up links.
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Backend for the Replicate predictions API.
pub struct ReplicateBackend {
    client: reqwest::Client,
    config: ReplicateConfig,
    template: PromptTemplate,
}

impl ReplicateBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(config: ReplicateConfig, template: PromptTemplate) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            template,
        })
    }

    /// The HTTP client, shared with image downloads.
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run the model on a caller prompt and decode its output.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedImage, InferenceError> {
        let input = EmojiModelInput::new(self.template.render(prompt)?);

        tokio::time::timeout(self.config.timeout, self.run(&input))
            .await
            .map_err(|_elapsed| InferenceError::Timeout)?
    }

    async fn run(&self, input: &EmojiModelInput) -> Result<GeneratedImage, InferenceError> {
        let mut prediction = self.create(input).await?;
        tracing::debug!(
            prediction_id = prediction.id,
            status = ?prediction.status,
            "Replicate prediction created"
        );

        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.config.poll_interval).await;
            let url = prediction
                .urls
                .as_ref()
                .map(|u| u.get.clone())
                .ok_or_else(|| {
                    InferenceError::Malformed("running prediction has no urls.get".to_owned())
                })?;
            prediction = self.fetch(&url).await?;
        }

        finish(&prediction)
    }

    async fn create(&self, input: &EmojiModelInput) -> Result<Prediction, InferenceError> {
        let url = format!("{}/predictions", self.config.api_url);
        let body = CreatePrediction {
            version: self.config.version_hash(),
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Http(format!("Replicate request failed: {e}")))?;

        read_prediction(response).await
    }

    async fn fetch(&self, url: &str) -> Result<Prediction, InferenceError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_token)
            .send()
            .await
            .map_err(|e| InferenceError::Http(format!("Replicate poll failed: {e}")))?;

        read_prediction(response).await
    }
}

/// Check the status code and parse a prediction body.
async fn read_prediction(response: reqwest::Response) -> Result<Prediction, InferenceError> {
    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(InferenceError::Http(format!(
            "Replicate returned {status}: {error_body}"
        )));
    }

    response
        .json::<Prediction>()
        .await
        .map_err(|e| InferenceError::Malformed(format!("Replicate response parse failed: {e}")))
}

/// Turn a terminal prediction into an image or an error.
fn finish(prediction: &Prediction) -> Result<GeneratedImage, InferenceError> {
    match prediction.status {
        PredictionStatus::Succeeded => {
            let output = prediction.output.as_ref().ok_or_else(|| {
                InferenceError::Malformed(format!(
                    "prediction {} succeeded without output",
                    prediction.id
                ))
            })?;
            decode_output(output)
        }
        PredictionStatus::Canceled => Err(InferenceError::Prediction(format!(
            "prediction {} was canceled",
            prediction.id
        ))),
        PredictionStatus::Failed | PredictionStatus::Starting | PredictionStatus::Processing => {
            let reason = prediction
                .error
                .as_ref()
                .map_or_else(|| "no error detail".to_owned(), ToString::to_string);
            Err(InferenceError::Prediction(format!(
                "prediction {} failed: {reason}",
                prediction.id
            )))
        }
    }
}
