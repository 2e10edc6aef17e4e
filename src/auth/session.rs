use std::sync::Arc;

use crate::api::{Backend, Credentials};
use crate::auth::storage::SessionStore;
use crate::error::ClientError;

pub const REGISTER_SUCCESS: &str = "Registration successful! You can now log in.";
pub const REGISTER_FAILED: &str = "Registration failed.";
pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed.";

/// Register/login/logout. Login is the only writer of the session slot.
pub struct AccountService {
    backend: Arc<dyn Backend>,
    store: Arc<dyn SessionStore>,
}

impl AccountService {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn SessionStore>) -> Self {
        Self { backend, store }
    }

    pub async fn register(&self, email: &str, passwd: &str) -> Result<(), ClientError> {
        let credentials = validate_credentials(email, passwd)?;
        self.backend.register(&credentials).await?;

        log::info!("Account registered: {}", credentials.email);
        Ok(())
    }

    pub async fn login(&self, email: &str, passwd: &str) -> Result<(), ClientError> {
        let credentials = validate_credentials(email, passwd)?;
        let token = self.backend.login(&credentials).await?;

        self.store.set(&token)?;
        log::info!("Logged in as {}", credentials.email);
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.clear()?;
        log::info!("Logged out");
        Ok(())
    }
}

fn validate_credentials(email: &str, passwd: &str) -> Result<Credentials, ClientError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ClientError::Validation("Email cannot be empty".to_string()));
    }

    if passwd.is_empty() {
        return Err(ClientError::Validation("Password cannot be empty".to_string()));
    }

    Ok(Credentials::new(email, passwd))
}

/// Line shown after a register attempt
pub fn register_message(result: &Result<(), ClientError>) -> String {
    match result {
        Ok(()) => REGISTER_SUCCESS.to_string(),
        Err(e) => failure_message(e, REGISTER_FAILED),
    }
}

/// Line shown after a login attempt
pub fn login_message(result: &Result<(), ClientError>) -> String {
    match result {
        Ok(()) => LOGIN_SUCCESS.to_string(),
        Err(e) => failure_message(e, LOGIN_FAILED),
    }
}

fn failure_message(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Rejected { .. } => err.server_message().unwrap_or(fallback).to_string(),
        ClientError::Validation(reason) => reason.clone(),
        other => format!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::auth::storage::MemorySessionStore;

    #[tokio::test]
    async fn test_login_stores_token() {
        let mut backend = MockBackend::new();
        backend
            .expect_login()
            .withf(|creds| creds.email == "alice@example.com" && creds.passwd == "pw")
            .returning(|_| Ok("tok-1".to_string()));

        let store = Arc::new(MemorySessionStore::new());
        let accounts = AccountService::new(Arc::new(backend), store.clone());

        let result = accounts.login(" alice@example.com ", "pw").await;
        assert_eq!(login_message(&result), LOGIN_SUCCESS);
        assert_eq!(store.get().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_store_untouched() {
        let mut backend = MockBackend::new();
        backend.expect_login().returning(|_| {
            Err(ClientError::Rejected {
                status: 401,
                message: Some("Invalid credentials".to_string()),
            })
        });

        let store = Arc::new(MemorySessionStore::with_token("old"));
        let accounts = AccountService::new(Arc::new(backend), store.clone());

        let result = accounts.login("alice@example.com", "bad").await;
        assert_eq!(login_message(&result), "Invalid credentials");
        assert_eq!(store.get().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_register_messages() {
        let mut accepting = MockBackend::new();
        accepting.expect_register().times(1).returning(|_| Ok(()));
        let accounts =
            AccountService::new(Arc::new(accepting), Arc::new(MemorySessionStore::new()));

        let ok = accounts.register("bob@example.com", "pw").await;
        assert_eq!(register_message(&ok), REGISTER_SUCCESS);

        let mut refusing = MockBackend::new();
        refusing.expect_register().returning(|_| {
            Err(ClientError::Rejected {
                status: 500,
                message: None,
            })
        });
        let accounts = AccountService::new(Arc::new(refusing), Arc::new(MemorySessionStore::new()));

        let failed = accounts.register("bob@example.com", "pw").await;
        assert_eq!(register_message(&failed), REGISTER_FAILED);
    }

    #[tokio::test]
    async fn test_transport_failure_is_prefixed() {
        let mut backend = MockBackend::new();
        backend
            .expect_register()
            .returning(|_| Err(ClientError::Transport("connection refused".into())));

        let accounts = AccountService::new(Arc::new(backend), Arc::new(MemorySessionStore::new()));
        let result = accounts.register("bob@example.com", "pw").await;
        assert!(register_message(&result).starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_empty_fields_never_reach_backend() {
        let mut backend = MockBackend::new();
        backend.expect_login().never();
        backend.expect_register().never();

        let accounts = AccountService::new(Arc::new(backend), Arc::new(MemorySessionStore::new()));
        assert!(matches!(
            accounts.login("  ", "pw").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            accounts.register("a@b.c", "").await,
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_logout_clears_store() {
        let store = Arc::new(MemorySessionStore::with_token("tok"));
        let accounts = AccountService::new(Arc::new(MockBackend::new()), store.clone());

        accounts.logout().unwrap();
        assert_eq!(store.get(), None);
    }
}
