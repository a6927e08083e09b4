//! Data layer for the Emojigen service.
//!
//! `PostgreSQL` holds profiles, emojis, and the like index. An in-memory
//! backend with identical semantics serves local development and tests.
//!
//! # Architecture
//!
//! ```text
//! API handlers
//!     |
//!     +-- Store (enum dispatch)
//!         |-- Postgres(PostgresPool)
//!         |     |-- ProfileStore  (get-or-create, credit debit)
//!         |     |-- EmojiStore    (insert, listing, like counter)
//!         |     +-- LikeStore     (unique (user, emoji) pairs)
//!         +-- Memory(MemoryStore)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`profile_store`] -- Profile rows and credits
//! - [`emoji_store`] -- Emoji rows and the denormalized like counter
//! - [`like_store`] -- The like index
//! - [`memory`] -- In-memory tables
//! - [`store`] -- Backend-agnostic [`Store`] handle
//! - [`error`] -- Shared error types

pub mod emoji_store;
pub mod error;
pub mod like_store;
pub mod memory;
pub mod postgres;
pub mod profile_store;
pub mod store;

// Re-export primary types for convenience.
pub use emoji_store::{EmojiLikeRow, EmojiRow, EmojiStore};
pub use error::DbError;
pub use like_store::LikeStore;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use profile_store::{ProfileRow, ProfileStore};
pub use store::Store;
