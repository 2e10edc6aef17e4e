use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::api::backend::Backend;
use crate::api::types::{
    BuyConfigRequest, BuyConfigResponse, Credentials, LoginResponse, MessageBody,
    UserConfigsResponse,
};
use crate::config::ClientConfig;
use crate::error::ClientError;

pub const REGISTER_PATH: &str = "/api/register";
pub const LOGIN_PATH: &str = "/api/login";
pub const AUTH_CHECK_PATH: &str = "/api/Auth-check";
pub const BUY_CONFIG_PATH: &str = "/api/BuyConfig";
pub const USER_CONFIGS_PATH: &str = "/api/Get-user-configs";

/// reqwest-backed [`Backend`] talking JSON to the panel
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_root().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// Parse a JSON envelope whatever the status. A body that does not parse is a
// rejection when the status already says so, and malformed otherwise.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<T>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(e) if status.is_success() => {
            log::error!("Unparseable {} response: {}", status, e);
            Err(ClientError::Malformed(e.to_string()))
        }
        Err(_) => Err(ClientError::Rejected {
            status: status.as_u16(),
            message: None,
        }),
    }
}

async fn rejection(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<MessageBody>()
        .await
        .ok()
        .and_then(|body| body.message);

    ClientError::Rejected { status, message }
}

#[async_trait]
impl Backend for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        log::info!("Registering account: {}", credentials.email);

        let response = self
            .client
            .post(self.url(REGISTER_PATH))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        log::info!("Register response status: {}", status);

        if status.is_success() {
            Ok(())
        } else {
            let err = rejection(response).await;
            log::warn!("Registration rejected: {}", err);
            Err(err)
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        log::info!("Logging in: {}", credentials.email);

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .header("Accept", "application/json")
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        log::info!("Login response status: {}", status);

        if !status.is_success() {
            let err = rejection(response).await;
            log::warn!("Login rejected: {}", err);
            return Err(err);
        }

        let login: LoginResponse = response.json().await?;
        match login.obj {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ClientError::Malformed(
                "login response carried no token".to_string(),
            )),
        }
    }

    async fn auth_check(&self, token: &str) -> Result<(), ClientError> {
        log::debug!("Checking session with backend");

        let response = self
            .client
            .get(self.url(AUTH_CHECK_PATH))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            log::warn!("Auth check rejected with status {}", status);
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message: None,
            })
        }
    }

    async fn buy_config(
        &self,
        token: &str,
        request: &BuyConfigRequest,
    ) -> Result<BuyConfigResponse, ClientError> {
        log::info!(
            "Buying config on server {}: {} bytes, expiry {}",
            request.server,
            request.total,
            request.expiry_time
        );

        let response = self
            .client
            .post(self.url(BUY_CONFIG_PATH))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        log::info!("BuyConfig response status: {}", response.status());
        read_envelope(response).await
    }

    async fn user_configs(&self, token: &str) -> Result<UserConfigsResponse, ClientError> {
        log::info!("Fetching user configs");

        let response = self
            .client
            .get(self.url(USER_CONFIGS_PATH))
            .bearer_auth(token)
            .send()
            .await?;

        log::info!("Get-user-configs response status: {}", response.status());
        read_envelope(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{GateState, MemorySessionStore, SessionGate};
    use crate::orders::{
        purchase_message, DurationSpec, OrderBuilder, OrderForm, TrafficSpec,
        PURCHASE_NETWORK_ERROR,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use warp::http::StatusCode;
    use warp::Filter;

    const GOOD_TOKEN: &str = "tok-123";

    fn bearer_is(expected: &'static str) -> impl Fn(Option<String>) -> bool + Clone {
        move |header: Option<String>| header == Some(format!("Bearer {}", expected))
    }

    // In-process stand-in for the panel
    async fn spawn_fake_panel() -> SocketAddr {
        let register = warp::path!("api" / "register")
            .and(warp::post())
            .and(warp::body::json())
            .map(|creds: Credentials| {
                if creds.email == "taken@example.com" {
                    let body = serde_json::json!({"message": "Email already registered"});
                    warp::reply::with_status(warp::reply::json(&body), StatusCode::CONFLICT)
                } else {
                    let body = serde_json::json!({});
                    warp::reply::with_status(warp::reply::json(&body), StatusCode::OK)
                }
            });

        let login = warp::path!("api" / "login")
            .and(warp::post())
            .and(warp::body::json())
            .map(|creds: Credentials| {
                if creds.passwd == "hunter2" {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"obj": GOOD_TOKEN})),
                        StatusCode::OK,
                    )
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"message": "Wrong password"})),
                        StatusCode::UNAUTHORIZED,
                    )
                }
            });

        let check = bearer_is(GOOD_TOKEN);
        let auth_check = warp::path!("api" / "Auth-check")
            .and(warp::get())
            .and(warp::header::optional::<String>("authorization"))
            .map(move |auth: Option<String>| {
                if check(auth) {
                    StatusCode::OK
                } else {
                    StatusCode::UNAUTHORIZED
                }
            });

        let buy = warp::path!("api" / "BuyConfig")
            .and(warp::post())
            .and(warp::body::json())
            .map(|request: BuyConfigRequest| match request.total {
                0 => {
                    let body = serde_json::json!({"success": false, "error": "No traffic"});
                    warp::reply::with_status(warp::reply::json(&body), StatusCode::OK)
                }
                // Refusal carried on an error status
                7 => {
                    let body =
                        serde_json::json!({"success": false, "error": "Insufficient balance"});
                    warp::reply::with_status(warp::reply::json(&body), StatusCode::PAYMENT_REQUIRED)
                }
                _ => {
                    let body =
                        serde_json::json!({"success": true, "obj": {"server": request.server}});
                    warp::reply::with_status(warp::reply::json(&body), StatusCode::OK)
                }
            });

        let configs = warp::path!("api" / "Get-user-configs")
            .and(warp::get())
            .map(|| {
                warp::reply::json(&serde_json::json!({
                    "success": true,
                    "obj": {"current_config_list": [{
                        "inbound": {
                            "protocol": "vless",
                            "ip": "203.0.113.7",
                            "port": 443,
                            "remark": "Main"
                        },
                        "client_config": {
                            "uuid": "u-1",
                            "email": "alice@example.com",
                            "up": 1,
                            "down": 2,
                            "total": 10
                        }
                    }]}
                }))
            });

        let broken = warp::path!("api" / "broken").map(|| "<html>oops</html>");

        let routes = register.or(login).or(auth_check).or(buy).or(configs).or(broken);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    // Panel that answers every request only after `delay`
    async fn spawn_slow_panel(delay: Duration) -> SocketAddr {
        let routes = warp::any().then(move || async move {
            tokio::time::sleep(delay).await;
            warp::reply::json(&serde_json::json!({"success": true}))
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn client_with_timeout(addr: SocketAddr, request_timeout_secs: u64) -> ApiClient {
        let config = ClientConfig {
            base_url: format!("http://{}/", addr),
            request_timeout_secs,
            storage_dir: None,
        };
        ApiClient::new(&config).unwrap()
    }

    fn client_for(addr: SocketAddr) -> ApiClient {
        client_with_timeout(addr, 5)
    }

    fn one_hour_request(total: u64) -> BuyConfigRequest {
        BuyConfigRequest {
            server: 1,
            total,
            flow: String::new(),
            expiry_time: 1_700_003_600_000,
        }
    }

    #[tokio::test]
    async fn test_register_success_and_rejection_message() {
        let client = client_for(spawn_fake_panel().await);

        assert!(client
            .register(&Credentials::new("new@example.com", "pw"))
            .await
            .is_ok());

        let err = client
            .register(&Credentials::new("taken@example.com", "pw"))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Email already registered"));
    }

    #[tokio::test]
    async fn test_login_returns_token_from_obj() {
        let client = client_for(spawn_fake_panel().await);

        let token = client
            .login(&Credentials::new("alice@example.com", "hunter2"))
            .await
            .unwrap();
        assert_eq!(token, GOOD_TOKEN);

        let err = client
            .login(&Credentials::new("alice@example.com", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 401, .. }));
        assert_eq!(err.server_message(), Some("Wrong password"));
    }

    #[tokio::test]
    async fn test_auth_check_sends_bearer_header() {
        let client = client_for(spawn_fake_panel().await);

        assert!(client.auth_check(GOOD_TOKEN).await.is_ok());
        assert!(matches!(
            client.auth_check("stale").await,
            Err(ClientError::Rejected { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_buy_config_returns_envelope() {
        let client = client_for(spawn_fake_panel().await);

        let mut request = one_hour_request(1024);
        let ok = client.buy_config(GOOD_TOKEN, &request).await.unwrap();
        assert!(ok.success);

        request.total = 0;
        let refused = client.buy_config(GOOD_TOKEN, &request).await.unwrap();
        assert!(!refused.success);
        assert_eq!(refused.error.as_deref(), Some("No traffic"));
    }

    #[tokio::test]
    async fn test_user_configs_lists_entries() {
        let client = client_for(spawn_fake_panel().await);

        let response = client.user_configs(GOOD_TOKEN).await.unwrap();
        assert!(response.success);
        let entries = response.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].client_config.total, 10);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let addr = spawn_fake_panel().await;
        let client = client_for(addr);

        let response = client
            .client
            .get(client.url("/api/broken"))
            .send()
            .await
            .unwrap();
        let result: Result<UserConfigsResponse, _> = read_envelope(response).await;
        assert!(matches!(result, Err(ClientError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        let err = client.auth_check(GOOD_TOKEN).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_refusal_on_error_status_keeps_server_text() {
        let addr = spawn_fake_panel().await;
        let client = client_for(addr);

        let refused = client.buy_config(GOOD_TOKEN, &one_hour_request(7)).await.unwrap();
        assert!(!refused.success);
        assert_eq!(refused.error.as_deref(), Some("Insufficient balance"));

        let builder = OrderBuilder::new(
            Arc::new(client_for(addr)),
            Arc::new(MemorySessionStore::with_token(GOOD_TOKEN)),
        );
        let form = OrderForm::new(
            DurationSpec::Preset { seconds: 3600 },
            TrafficSpec::Custom {
                megabytes: 7.0 / (1024.0 * 1024.0),
            },
        );
        let result = builder.submit(&form).await;
        assert_eq!(purchase_message(&result), "Insufficient balance");
    }

    #[tokio::test]
    async fn test_slow_panel_times_out_as_transport_error() {
        let addr = spawn_slow_panel(Duration::from_secs(3)).await;
        let client = client_with_timeout(addr, 1);

        let err = client.auth_check(GOOD_TOKEN).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_timeout_fails_gate_closed_and_purchase_generically() {
        let addr = spawn_slow_panel(Duration::from_secs(3)).await;

        let gate = SessionGate::mount(
            Arc::new(MemorySessionStore::with_token(GOOD_TOKEN)),
            Arc::new(client_with_timeout(addr, 1)),
        );
        assert_eq!(gate.resolve().await, GateState::Unauthenticated);

        let builder = OrderBuilder::new(
            Arc::new(client_with_timeout(addr, 1)),
            Arc::new(MemorySessionStore::with_token(GOOD_TOKEN)),
        );
        let form = OrderForm::new(
            DurationSpec::Preset { seconds: 3600 },
            TrafficSpec::Preset { megabytes: 1024 },
        );
        let result = builder.submit(&form).await;
        assert_eq!(purchase_message(&result), PURCHASE_NETWORK_ERROR);
    }
}
