use crate::auth::Rendering;
use crate::commands::auth::REDIRECT_TO_LOGIN;
use crate::state::AppState;
use crate::usage::{ConfigCard, UsageState};

// "My configs" screen. The list is only fetched once the gate has accepted
// the stored token.
pub async fn list_configs(state: &AppState) -> Result<Vec<ConfigCard>, String> {
    log::info!("Command: list_configs called");

    let gate = state.gate();
    gate.resolve().await;

    let view = match gate.render(|| state.usage_view()) {
        Rendering::Content(view) => view,
        Rendering::RedirectToLogin => return Err(REDIRECT_TO_LOGIN.to_string()),
        Rendering::Placeholder => return Err("Session check did not complete.".to_string()),
    };

    match view.load().await {
        UsageState::Loaded(cards) => Ok(cards),
        UsageState::Failed(message) => {
            log::error!("Failed to list configs: {}", message);
            Err(message)
        }
        UsageState::Loading => Err("Loading...".to_string()),
    }
}

pub fn describe_card(card: &ConfigCard) -> String {
    format!(
        "Config {}\n  URL: {}\n  {} ({:.2}% used)\n  Expiry Time: {}",
        card.key,
        card.url,
        card.usage.traffic_line(),
        card.usage.percent_used,
        card.usage.expiry_label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ClientRecord, ConfigEntry, Inbound, MockBackend, UserConfigsPayload, UserConfigsResponse,
    };
    use crate::auth::MemorySessionStore;
    use crate::config::ClientConfig;
    use crate::error::ClientError;
    use mockall::Sequence;
    use std::sync::Arc;

    fn app(backend: MockBackend, store: MemorySessionStore) -> AppState {
        AppState::with_parts(ClientConfig::default(), Arc::new(backend), Arc::new(store))
    }

    #[tokio::test]
    async fn test_no_token_redirects_before_any_request() {
        let mut backend = MockBackend::new();
        backend.expect_auth_check().never();
        backend.expect_user_configs().never();

        let result = list_configs(&app(backend, MemorySessionStore::new())).await;
        assert_eq!(result, Err(REDIRECT_TO_LOGIN.to_string()));
    }

    #[tokio::test]
    async fn test_rejected_gate_blocks_config_fetch() {
        let mut backend = MockBackend::new();
        backend
            .expect_auth_check()
            .returning(|_| Err(ClientError::Transport("offline".into())));
        backend.expect_user_configs().never();

        let result = list_configs(&app(backend, MemorySessionStore::with_token("tok"))).await;
        assert_eq!(result, Err(REDIRECT_TO_LOGIN.to_string()));
    }

    #[tokio::test]
    async fn test_gate_resolves_before_fetch() {
        let mut seq = Sequence::new();
        let mut backend = MockBackend::new();
        backend
            .expect_auth_check()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        backend
            .expect_user_configs()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(UserConfigsResponse {
                    success: true,
                    msg: None,
                    obj: Some(UserConfigsPayload {
                        current_config_list: vec![ConfigEntry {
                            inbound: Inbound {
                                ip: "203.0.113.7".to_string(),
                                port: 443,
                                remark: Some("Main".to_string()),
                                ..Default::default()
                            },
                            client_config: ClientRecord {
                                uuid: "u".to_string(),
                                email: Some("alice".to_string()),
                                up: 1024,
                                total: 2048,
                                ..Default::default()
                            },
                        }],
                    }),
                })
            });

        let cards = list_configs(&app(backend, MemorySessionStore::with_token("tok")))
            .await
            .unwrap();
        assert_eq!(cards.len(), 1);

        let text = describe_card(&cards[0]);
        assert!(text.contains("vless://u@203.0.113.7:443?type=tcp&security=none#Main-alice"));
        assert!(text.contains("Used: 1.00 KB / Total: 2.00 KB | Remain: 1.00 KB (50.00% used)"));
        assert!(text.contains("Expiry Time: No expiry"));
    }

    #[tokio::test]
    async fn test_server_message_passed_through() {
        let mut backend = MockBackend::new();
        backend.expect_auth_check().returning(|_| Ok(()));
        backend.expect_user_configs().returning(|_| {
            Ok(UserConfigsResponse {
                success: false,
                msg: Some("expired".to_string()),
                obj: None,
            })
        });

        let result = list_configs(&app(backend, MemorySessionStore::with_token("tok"))).await;
        assert_eq!(result, Err("expired".to_string()));
    }
}
