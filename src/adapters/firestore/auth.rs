//! Bearer tokens for Firestore requests.
//!
//! A token is fetched per request. `GcpTokenSource` resolves Application Default
//! Credentials (service-account file, gcloud user credentials or the metadata server)
//! and refreshes before expiry; the static and no-auth sources cover fixed tokens and
//! the emulator.

use crate::config::toml_config::{AuthMode, DatabaseConfig};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Token for the next request; `None` sends no `authorization` header.
    async fn token(&self) -> Result<Option<String>>;
}

pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

pub struct NoAuth;

#[async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

pub struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl GcpTokenSource {
    pub async fn discover() -> Result<Self> {
        let provider = gcp_auth::provider().await?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl TokenSource for GcpTokenSource {
    async fn token(&self) -> Result<Option<String>> {
        let token = self.provider.token(&[DATASTORE_SCOPE]).await?;
        Ok(Some(token.as_str().to_string()))
    }
}

pub async fn token_source(config: &DatabaseConfig) -> Result<Arc<dyn TokenSource>> {
    match (config.auth_mode(), &config.access_token) {
        (AuthMode::Token, Some(token)) => {
            tracing::info!("Using static Firestore access token");
            Ok(Arc::new(StaticToken::new(token.clone())))
        }
        (AuthMode::Token, None) => Err(CatalogError::ConfigValidationError {
            field: "database.access_token".to_string(),
            message: "auth = \"token\" requires an access_token".to_string(),
        }),
        (AuthMode::None, _) => {
            tracing::info!("Sending Firestore requests without credentials");
            Ok(Arc::new(NoAuth))
        }
        (AuthMode::Adc, _) => {
            tracing::info!("Resolving Application Default Credentials");
            Ok(Arc::new(GcpTokenSource::discover().await?))
        }
    }
}
