//! Configuration for the API server.
//!
//! All configuration is loaded from environment variables at startup.
//! Anything missing or unparseable is a [`ConfigError`] and the process
//! exits before binding a port.

use std::path::PathBuf;
use std::time::Duration;

use emojigen_inference::{DEFAULT_PROMPT_TEMPLATE, ReplicateConfig};
use emojigen_storage::{DEFAULT_BUCKET, SupabaseConfig};

use crate::auth::DEFAULT_USER_HEADER;
use crate::server::ServerConfig;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Where profiles, emojis and likes are kept.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `PostgreSQL`.
    Postgres {
        /// Connection URL.
        url: String,
        /// Pool size.
        max_connections: u32,
    },
    /// Process-local tables, lost on exit.
    Memory,
}

/// Where generated images are written.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Supabase Storage bucket.
    Supabase(SupabaseConfig),
    /// Local directory served under `base_url`.
    Local {
        /// Directory to write into.
        dir: PathBuf,
        /// Public URL prefix for written files.
        base_url: String,
    },
    /// Process-local map.
    Memory {
        /// Public URL prefix for stored objects.
        base_url: String,
    },
}

/// How callers are identified.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// HS256 bearer tokens.
    JwtSecret {
        /// Shared secret.
        secret: String,
        /// Required `iss`, if any.
        issuer: Option<String>,
        /// Required `aud`, if any.
        audience: Option<String>,
    },
    /// RS256 bearer tokens.
    JwtPublicKey {
        /// PEM-encoded public key.
        pem: String,
        /// Required `iss`, if any.
        issuer: Option<String>,
        /// Required `aud`, if any.
        audience: Option<String>,
    },
    /// User id read from a trusted header.
    Header {
        /// Header name, lowercase.
        header: String,
    },
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Data store.
    pub store: StoreConfig,
    /// Whether to apply pending migrations at startup.
    pub run_migrations: bool,
    /// Inference client settings.
    pub inference: ReplicateConfig,
    /// Prompt template source.
    pub prompt_template: String,
    /// Image storage.
    pub storage: StorageConfig,
    /// Caller identification.
    pub auth: AuthConfig,
    /// Listen address.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Required variables:
    /// - `REPLICATE_API_TOKEN` -- inference API token
    /// - `DATABASE_URL` -- unless `STORE_BACKEND=memory`
    /// - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY` -- for `STORAGE_BACKEND=supabase`
    /// - `LOCAL_STORAGE_DIR`, `LOCAL_STORAGE_BASE_URL` -- for `STORAGE_BACKEND=local`
    /// - `AUTH_JWT_SECRET` or `AUTH_JWT_PUBLIC_KEY_PEM` -- for `AUTH_MODE=jwt`
    ///
    /// Optional variables:
    /// - `STORE_BACKEND` -- `postgres` (default) or `memory`
    /// - `DATABASE_MAX_CONNECTIONS` -- pool size (default 10)
    /// - `RUN_MIGRATIONS` -- apply migrations at startup (default `true`)
    /// - `REPLICATE_API_URL`, `REPLICATE_MODEL_VERSION` -- inference endpoint and model
    /// - `INFERENCE_TIMEOUT_SECS` -- generation deadline (default 120)
    /// - `PROMPT_TEMPLATE` -- minijinja template wrapping the prompt
    /// - `STORAGE_BACKEND` -- `supabase` (default), `local` or `memory`
    /// - `STORAGE_BUCKET` -- bucket name (default `emojis`)
    /// - `STORAGE_TIMEOUT_SECS` -- upload timeout (default 30)
    /// - `AUTH_MODE` -- `jwt` (default) or `header`
    /// - `AUTH_JWT_ISSUER`, `AUTH_JWT_AUDIENCE` -- extra claim checks
    /// - `AUTH_USER_HEADER` -- header for `header` mode (default `x-user-id`)
    /// - `SERVER_HOST`, `SERVER_PORT` -- listen address (default `0.0.0.0:8080`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let store = match vars.or("STORE_BACKEND", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            "memory" => StoreConfig::Memory,
            other => return Err(invalid("STORE_BACKEND", other)),
        };
        let run_migrations = vars.parsed("RUN_MIGRATIONS", true)?;

        let mut inference = ReplicateConfig::new(&vars.required("REPLICATE_API_TOKEN")?);
        if let Some(url) = vars.get("REPLICATE_API_URL") {
            inference.api_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(version) = vars.get("REPLICATE_MODEL_VERSION") {
            inference.model_version = version;
        }
        inference.timeout = Duration::from_secs(vars.parsed("INFERENCE_TIMEOUT_SECS", 120)?);
        let prompt_template = vars.or("PROMPT_TEMPLATE", DEFAULT_PROMPT_TEMPLATE);

        let storage = match vars.or("STORAGE_BACKEND", "supabase").as_str() {
            "supabase" => {
                let mut config = SupabaseConfig::new(
                    &vars.required("SUPABASE_URL")?,
                    &vars.required("SUPABASE_SERVICE_ROLE_KEY")?,
                )
                .with_bucket(&vars.or("STORAGE_BUCKET", DEFAULT_BUCKET));
                config.timeout = Duration::from_secs(vars.parsed("STORAGE_TIMEOUT_SECS", 30)?);
                StorageConfig::Supabase(config)
            }
            "local" => StorageConfig::Local {
                dir: PathBuf::from(vars.required("LOCAL_STORAGE_DIR")?),
                base_url: vars.required("LOCAL_STORAGE_BASE_URL")?,
            },
            "memory" => StorageConfig::Memory {
                base_url: vars.or("LOCAL_STORAGE_BASE_URL", "memory://emojis"),
            },
            other => return Err(invalid("STORAGE_BACKEND", other)),
        };

        let auth = match vars.or("AUTH_MODE", "jwt").as_str() {
            "jwt" => {
                let issuer = vars.get("AUTH_JWT_ISSUER");
                let audience = vars.get("AUTH_JWT_AUDIENCE");
                if let Some(pem) = vars.get("AUTH_JWT_PUBLIC_KEY_PEM") {
                    AuthConfig::JwtPublicKey { pem, issuer, audience }
                } else {
                    let secret = vars
                        .get("AUTH_JWT_SECRET")
                        .ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;
                    AuthConfig::JwtSecret { secret, issuer, audience }
                }
            }
            "header" => AuthConfig::Header {
                header: vars.or("AUTH_USER_HEADER", DEFAULT_USER_HEADER).to_ascii_lowercase(),
            },
            other => return Err(invalid("AUTH_MODE", other)),
        };

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: vars.or("SERVER_HOST", &defaults.host),
            port: vars.parsed("SERVER_PORT", defaults.port)?,
        };

        Ok(Self {
            store,
            run_migrations,
            inference,
            prompt_template,
            storage,
            auth,
            server,
        })
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: format!("unsupported value `{value}`"),
    }
}

/// Variable lookup that treats empty values as unset.
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim().parse().map_err(|e| ConfigError::Invalid {
                var: key,
                reason: format!("{e}"),
            })
        })
    }
}
