//! Utility provider lookup (external collaborator boundary).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerline_core::TransferError;

/// Receiving account of a utility provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub provider_id: String,
    pub provider_name: String,
    pub account_number: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("utility provider {0} not found")]
    NotFound(String),

    #[error("provider registry unavailable: {0}")]
    Unavailable(String),
}

impl From<ProviderError> for TransferError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::NotFound(id) => TransferError::ProviderNotFound(id),
            ProviderError::Unavailable(msg) => TransferError::Store(msg),
        }
    }
}

/// Resolves a provider id to the account payments are made to.
pub trait ProviderResolver: Send + Sync {
    fn resolve(&self, provider_id: &str) -> Result<ProviderAccount, ProviderError>;
}

impl<P> ProviderResolver for Arc<P>
where
    P: ProviderResolver + ?Sized,
{
    fn resolve(&self, provider_id: &str) -> Result<ProviderAccount, ProviderError> {
        (**self).resolve(provider_id)
    }
}

/// In-memory provider registry for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProviderRegistry {
    providers: RwLock<HashMap<String, ProviderAccount>>,
}

impl InMemoryProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a provider.
    pub fn register(&self, provider: ProviderAccount) -> Result<(), ProviderError> {
        let mut providers = self
            .providers
            .write()
            .map_err(|_| ProviderError::Unavailable("lock poisoned".to_string()))?;
        providers.insert(provider.provider_id.clone(), provider);
        Ok(())
    }

    /// Builder form of [`register`](Self::register); takes the registry by value.
    pub fn with_provider(mut self, provider: ProviderAccount) -> Self {
        self.providers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider.provider_id.clone(), provider);
        self
    }
}

impl ProviderResolver for InMemoryProviderRegistry {
    fn resolve(&self, provider_id: &str) -> Result<ProviderAccount, ProviderError> {
        let providers = self
            .providers
            .read()
            .map_err(|_| ProviderError::Unavailable("lock poisoned".to_string()))?;
        providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(provider_id.to_string()))
    }
}
