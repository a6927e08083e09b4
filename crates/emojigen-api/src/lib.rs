//! HTTP API for the Emojigen emoji generator.
//!
//! This crate provides an Axum server exposing:
//!
//! - **Profile** (`GET /api/profile`) -- credit balance and tier, created
//!   with three free credits on first access
//! - **Listing** (`GET /api/emojis`) -- every generated emoji with the
//!   caller's like flag
//! - **Generation** (`POST /api/generate`) -- prompt in, stored image URL
//!   out, one credit spent
//! - **Likes** (`POST /api/emojis/like`) -- toggle a like and get the new
//!   count
//!
//! # Architecture
//!
//! ```text
//! request --> CallerId (auth) --> handler --> service
//!                                               |
//!                 +-----------------------------+-------------+
//!                 |                             |             |
//!              Store                     ImageBackend     AssetStore
//!       (PostgreSQL | memory)        (Replicate | fixed)  (Supabase | local | memory)
//! ```
//!
//! Every handle lives in [`AppState`], built once by the binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod service;
pub mod state;

pub use auth::{Authenticator, CallerId, JwtVerifier};
pub use config::{AppConfig, AuthConfig, ConfigError, StorageConfig, StoreConfig};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
