use async_trait::async_trait;

use crate::api::types::{BuyConfigRequest, BuyConfigResponse, Credentials, UserConfigsResponse};
use crate::error::ClientError;

/// The panel's HTTP contract, one method per endpoint.
///
/// Components hold an `Arc<dyn Backend>` so tests can swap the real
/// [`ApiClient`](crate::api::ApiClient) for a mock. Methods that need a
/// credential take the raw token; callers must never invoke them without one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// POST /api/register. `Ok` on any 2xx, body ignored.
    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError>;

    /// POST /api/login. Returns the bearer token from `obj`.
    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError>;

    /// GET /api/Auth-check. `Ok` only on 2xx.
    async fn auth_check(&self, token: &str) -> Result<(), ClientError>;

    /// POST /api/BuyConfig. The envelope is returned whatever the status;
    /// `success` decides the outcome.
    async fn buy_config(
        &self,
        token: &str,
        request: &BuyConfigRequest,
    ) -> Result<BuyConfigResponse, ClientError>;

    /// GET /api/Get-user-configs, envelope returned whatever the status.
    async fn user_configs(&self, token: &str) -> Result<UserConfigsResponse, ClientError>;
}

/// Backend that never answers, for exercising abandoned requests
#[cfg(test)]
pub struct SilentBackend;

#[cfg(test)]
#[async_trait]
impl Backend for SilentBackend {
    async fn register(&self, _: &Credentials) -> Result<(), ClientError> {
        std::future::pending().await
    }

    async fn login(&self, _: &Credentials) -> Result<String, ClientError> {
        std::future::pending().await
    }

    async fn auth_check(&self, _: &str) -> Result<(), ClientError> {
        std::future::pending().await
    }

    async fn buy_config(
        &self,
        _: &str,
        _: &BuyConfigRequest,
    ) -> Result<BuyConfigResponse, ClientError> {
        std::future::pending().await
    }

    async fn user_configs(&self, _: &str) -> Result<UserConfigsResponse, ClientError> {
        std::future::pending().await
    }
}
