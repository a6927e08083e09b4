//! Entry point for the Emojigen API server.
//!
//! Loads configuration from the environment, builds the store, inference,
//! storage and auth handles, applies migrations, and serves HTTP until
//! `Ctrl-C`.

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderName;
use emojigen_api::{
    AppConfig, AppState, AuthConfig, Authenticator, JwtVerifier, StorageConfig, StoreConfig,
    start_server,
};
use emojigen_db::{MemoryStore, PostgresConfig, PostgresPool, Store};
use emojigen_inference::{ImageBackend, PromptTemplate, ReplicateBackend, ReplicateConfig};
use emojigen_storage::{AssetStore, LocalStorage, MemoryStorage, SupabaseStorage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, a backend cannot be
/// reached at startup, or the server fails to bind.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("emojigen-server starting");

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let store = build_store(&config).await?;
    info!(backend = store.name(), "store ready");

    let images = build_images(&config.inference, &config.prompt_template)?;
    info!(
        backend = images.name(),
        model = config.inference.model_version,
        timeout_secs = config.inference.timeout.as_secs(),
        "image backend configured"
    );

    let assets = build_assets(&config.storage)?;
    info!(backend = assets.name(), "asset storage configured");

    let auth = build_auth(&config.auth)?;
    info!(mode = auth.name(), "caller authentication configured");

    let state = Arc::new(AppState::new(store.clone(), images, assets, auth));
    start_server(&config.server, state).await?;

    if let Store::Postgres(pool) = &store {
        pool.close().await;
    }
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Store> {
    match &config.store {
        StoreConfig::Postgres {
            url,
            max_connections,
        } => {
            let pool = PostgresPool::connect(
                &PostgresConfig::new(url).with_max_connections(*max_connections),
            )
            .await
            .context("failed to connect to PostgreSQL")?;
            if config.run_migrations {
                pool.run_migrations()
                    .await
                    .context("failed to apply migrations")?;
            }
            Ok(Store::Postgres(pool))
        }
        StoreConfig::Memory => {
            warn!("using in-memory store; data is lost on exit");
            Ok(Store::Memory(MemoryStore::new()))
        }
    }
}

fn build_images(config: &ReplicateConfig, template: &str) -> anyhow::Result<ImageBackend> {
    let template = PromptTemplate::new(template).context("invalid PROMPT_TEMPLATE")?;
    let backend = ReplicateBackend::new(config.clone(), template)
        .context("failed to build inference client")?;
    Ok(ImageBackend::Replicate(backend))
}

fn build_assets(config: &StorageConfig) -> anyhow::Result<AssetStore> {
    Ok(match config {
        StorageConfig::Supabase(supabase) => AssetStore::Supabase(
            SupabaseStorage::new(supabase.clone()).context("failed to build storage client")?,
        ),
        StorageConfig::Local { dir, base_url } => {
            AssetStore::Local(LocalStorage::new(dir.clone(), base_url))
        }
        StorageConfig::Memory { base_url } => {
            warn!("using in-memory asset storage; images are lost on exit");
            AssetStore::Memory(MemoryStorage::new(base_url))
        }
    })
}

fn build_auth(config: &AuthConfig) -> anyhow::Result<Authenticator> {
    let (verifier, issuer, audience) = match config {
        AuthConfig::Header { header } => {
            let header = HeaderName::from_bytes(header.as_bytes())
                .context("invalid AUTH_USER_HEADER")?;
            warn!(%header, "trusting caller identity from a request header");
            return Ok(Authenticator::TrustedHeader { header });
        }
        AuthConfig::JwtSecret {
            secret,
            issuer,
            audience,
        } => (JwtVerifier::hs256(secret.as_bytes()), issuer, audience),
        AuthConfig::JwtPublicKey {
            pem,
            issuer,
            audience,
        } => {
            let pem = pem.replace("\\n", "\n");
            let verifier =
                JwtVerifier::rs256_pem(pem.as_bytes()).context("invalid AUTH_JWT_PUBLIC_KEY_PEM")?;
            (verifier, issuer, audience)
        }
    };

    let verifier = match issuer {
        Some(iss) => verifier.with_issuer(iss),
        None => verifier,
    };
    let verifier = match audience {
        Some(aud) => verifier.with_audience(aud),
        None => verifier,
    };
    Ok(Authenticator::Jwt(verifier))
}
