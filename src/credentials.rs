//! Per-tenant Epistola credentials and their resolution.
//!
//! Each tenant connects to its own Epistola instance with its own API key.
//! The resolver is queried once per poll cycle and the resulting map is only
//! borrowed for the duration of that cycle.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Connection details for one tenant's Epistola instance.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantCredentials {
    pub tenant_id: String,
    pub base_url: String,
    pub api_key: String,
}

/// Errors from resolving tenant credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Maps tenant ids to the credentials needed to query their jobs.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve every known tenant's credentials, indexed by tenant id.
    async fn resolve_all(&self) -> Result<HashMap<String, TenantCredentials>, CredentialError>;
}

/// Resolver backed by a fixed set of credentials, typically loaded from the
/// bridge configuration file at startup.
#[derive(Debug, Default)]
pub struct StaticCredentialResolver {
    by_tenant: HashMap<String, TenantCredentials>,
}

impl StaticCredentialResolver {
    pub fn new(tenants: impl IntoIterator<Item = TenantCredentials>) -> Self {
        let by_tenant = tenants
            .into_iter()
            .map(|c| (c.tenant_id.clone(), c))
            .collect();
        Self { by_tenant }
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve_all(&self) -> Result<HashMap<String, TenantCredentials>, CredentialError> {
        Ok(self.by_tenant.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(tenant: &str) -> TenantCredentials {
        TenantCredentials {
            tenant_id: tenant.into(),
            base_url: format!("https://{tenant}.epistola.app"),
            api_key: format!("key-{tenant}"),
        }
    }

    #[tokio::test]
    async fn static_resolver_indexes_by_tenant() {
        let resolver = StaticCredentialResolver::new([creds("acme"), creds("globex")]);

        let all = resolver.resolve_all().await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all["acme"].api_key, "key-acme");
        assert_eq!(all["globex"].base_url, "https://globex.epistola.app");
    }

    #[tokio::test]
    async fn static_resolver_empty_by_default() {
        let resolver = StaticCredentialResolver::default();
        assert!(resolver.resolve_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn later_entry_wins_on_duplicate_tenant() {
        let mut second = creds("acme");
        second.api_key = "rotated".into();
        let resolver = StaticCredentialResolver::new([creds("acme"), second]);

        let all = resolver.resolve_all().await.unwrap();
        assert_eq!(all["acme"].api_key, "rotated");
    }
}
