//! Decoding of raw model output into a [`GeneratedImage`].
//!
//! The hosted model answers with either a list of file URLs or inline
//! image data. The shape is inspected exactly once, here, and everything
//! downstream works with the tagged variant.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::InferenceError;

/// An image produced by the model, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    /// The model hosts the image; the bytes must be downloaded.
    Url(String),
    /// The image bytes were returned inline.
    Bytes(Vec<u8>),
}

impl GeneratedImage {
    /// Short label for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// Decode a prediction's `output` field.
///
/// Accepts an array whose first element is a string, or a bare string.
/// The string must be an `http(s)` URL or a base64 `data:image/...` URI.
pub fn decode_output(output: &serde_json::Value) -> Result<GeneratedImage, InferenceError> {
    let first = match output {
        serde_json::Value::Array(items) => items.first(),
        other @ serde_json::Value::String(_) => Some(other),
        _ => None,
    };

    let text = first
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            InferenceError::Malformed(format!("expected a string or string array, got {output}"))
        })?;

    if text.starts_with("https://") || text.starts_with("http://") {
        return Ok(GeneratedImage::Url(text.to_owned()));
    }

    if let Some(uri) = text.strip_prefix("data:") {
        return decode_data_uri(uri).map(GeneratedImage::Bytes);
    }

    Err(InferenceError::Malformed(
        "output is neither an http(s) URL nor a data URI".to_owned(),
    ))
}

/// Decode the part of a data URI after `data:`.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, InferenceError> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| InferenceError::Malformed("data URI without payload".to_owned()))?;

    let media_type = header.strip_suffix(";base64").ok_or_else(|| {
        InferenceError::Malformed(format!("data URI is not base64 encoded: {header}"))
    })?;
    if !media_type.starts_with("image/") {
        return Err(InferenceError::Malformed(format!(
            "data URI is not an image: {media_type}"
        )));
    }

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| InferenceError::Malformed(format!("invalid base64 image data: {e}")))?;
    if bytes.is_empty() {
        return Err(InferenceError::Malformed("empty image data".to_owned()));
    }
    Ok(bytes)
}
