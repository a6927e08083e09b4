//! Error types for the inference client.
//!
//! Every failure talking to the hosted model surfaces as an
//! [`InferenceError`]. None of them are retried.

/// Errors that can occur while generating an image.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP call to the inference service failed or returned a
    /// non-success status.
    #[error("inference request failed: {0}")]
    Http(String),

    /// The model ran but reported failure or cancellation.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// The model output did not have a recognised shape.
    #[error("malformed model output: {0}")]
    Malformed(String),

    /// The prompt template could not be compiled or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The prediction did not finish before the configured deadline.
    #[error("timeout: prediction exceeded deadline")]
    Timeout,
}
