use crate::auth::{login_message, register_message, GateState};
use crate::state::AppState;

pub const REDIRECT_TO_LOGIN: &str =
    "Not logged in. Run `onwardpath login <email> <password>` first.";

pub async fn register(state: &AppState, email: String, passwd: String) -> Result<String, String> {
    log::info!("Command: register called");

    let result = state.accounts().register(&email, &passwd).await;
    let message = register_message(&result);

    match result {
        Ok(()) => Ok(message),
        Err(e) => {
            log::error!("Failed to register: {}", e);
            Err(message)
        }
    }
}

pub async fn login(state: &AppState, email: String, passwd: String) -> Result<String, String> {
    log::info!("Command: login called");

    let result = state.accounts().login(&email, &passwd).await;
    let message = login_message(&result);

    match result {
        Ok(()) => Ok(message),
        Err(e) => {
            log::error!("Failed to log in: {}", e);
            Err(message)
        }
    }
}

pub fn logout(state: &AppState) -> Result<String, String> {
    log::info!("Command: logout called");

    state
        .accounts()
        .logout()
        .map(|()| "Logged out.".to_string())
        .map_err(|e| {
            log::error!("Failed to log out: {}", e);
            e.to_string()
        })
}

// Profile screen behind the session gate
pub async fn status(state: &AppState) -> Result<String, String> {
    log::info!("Command: status called");

    let gate = state.gate();
    match gate.resolve().await {
        GateState::Authenticated => Ok("Session valid.".to_string()),
        other => {
            log::info!("Session gate settled as {}", other);
            Err(REDIRECT_TO_LOGIN.to_string())
        }
    }
}
