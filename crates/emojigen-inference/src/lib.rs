//! Image generation for the Emojigen service.
//!
//! Wraps the hosted image model behind [`ImageBackend`]. A generation call
//! renders the caller's prompt through a [`PromptTemplate`], runs the model
//! with a fixed parameter set, and decodes the output once into a
//! [`GeneratedImage`]:
//!
//! ```text
//! prompt --> PromptTemplate --> Replicate prediction --> decode_output --> GeneratedImage
//!                                                                           |
//!                                                         fetch_bytes <-----+
//! ```
//!
//! # Modules
//!
//! - [`backend`] -- Enum-dispatched backends and byte resolution
//! - [`replicate`] -- Replicate predictions API client
//! - [`output`] -- Model output decoding
//! - [`prompt`] -- Prompt templating
//! - [`error`] -- Error types

pub mod backend;
pub mod error;
pub mod output;
pub mod prompt;
pub mod replicate;

pub use backend::{FixedBackend, ImageBackend};
pub use error::InferenceError;
pub use output::{GeneratedImage, decode_output};
pub use prompt::{DEFAULT_PROMPT_TEMPLATE, PromptTemplate};
pub use replicate::{
    DEFAULT_API_URL, DEFAULT_MODEL_VERSION, EmojiModelInput, ReplicateBackend, ReplicateConfig,
};
