use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::{Backend, BuyConfigRequest, BuyConfigResponse};
use crate::auth::SessionStore;
use crate::error::ClientError;
use crate::orders::presets::{default_server, server_name};
use crate::orders::selection::{DurationSpec, TrafficSpec};

pub const PURCHASE_SUCCESS: &str = "Config purchased successfully!";
pub const PURCHASE_FAILED: &str = "Failed to buy config.";
pub const PURCHASE_NETWORK_ERROR: &str = "Network error. Please try again.";
pub const NOT_AUTHENTICATED: &str = "Not authenticated. Please log in.";
pub const PURCHASE_IN_PROGRESS: &str = "A purchase is already in progress.";

/// What the user picked on the buy form
#[derive(Debug, Clone, PartialEq)]
pub struct OrderForm {
    pub server: u32,
    pub duration: DurationSpec,
    pub traffic: TrafficSpec,
}

impl OrderForm {
    pub fn new(duration: DurationSpec, traffic: TrafficSpec) -> Self {
        Self {
            server: default_server().id,
            duration,
            traffic,
        }
    }

    /// Zero duration or zero traffic disables the buy button
    pub fn can_submit(&self) -> bool {
        !self.duration.is_zero() && !self.traffic.is_zero()
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            server: server_name(self.server).unwrap_or("Unknown server").to_string(),
            duration: self.duration.label(),
            traffic: self.traffic.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub server: String,
    pub duration: String,
    pub traffic: String,
}

/// A resolved, submittable purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub server: u32,
    pub total_bytes: u64,
    pub expiry: DateTime<Utc>,
}

impl Order {
    /// Resolve `form` against `now`. `now` is truncated to whole seconds
    /// before the duration is added.
    pub fn resolve(form: &OrderForm, now: DateTime<Utc>) -> Result<Self, ClientError> {
        let seconds = form.duration.seconds();
        if seconds == 0 {
            return Err(ClientError::Validation("Duration must be greater than zero".to_string()));
        }

        let total_bytes = form
            .traffic
            .total_bytes()
            .ok_or_else(|| ClientError::Validation("Traffic is too large".to_string()))?;
        if total_bytes == 0 {
            return Err(ClientError::Validation("Traffic must be greater than zero".to_string()));
        }

        let expiry = now
            .timestamp()
            .checked_add(seconds)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| ClientError::Validation("Duration is too long".to_string()))?;

        Ok(Self {
            server: form.server,
            total_bytes,
            expiry,
        })
    }

    pub fn to_request(&self) -> BuyConfigRequest {
        BuyConfigRequest {
            server: self.server,
            total: self.total_bytes,
            flow: String::new(),
            expiry_time: self.expiry.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded(BuyConfigResponse),
    Failed(String),
}

/// Submits orders with the stored credential, one at a time
pub struct OrderBuilder {
    backend: Arc<dyn Backend>,
    store: Arc<dyn SessionStore>,
    in_flight: AtomicBool,
    state: Mutex<SubmitState>,
}

// Clears the in-flight flag however the submission ends. A submission
// dropped mid-request goes back to Idle rather than staying Submitting.
struct FlightGuard<'a> {
    in_flight: &'a AtomicBool,
    state: &'a Mutex<SubmitState>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.state.lock();
            if *state == SubmitState::Submitting {
                *state = SubmitState::Idle;
            }
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

impl OrderBuilder {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmitState::Idle),
        }
    }

    pub fn state(&self) -> SubmitState {
        self.state.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn set_state(&self, next: SubmitState) {
        *self.state.lock() = next;
    }

    pub async fn submit(&self, form: &OrderForm) -> Result<BuyConfigResponse, ClientError> {
        self.submit_at(form, Utc::now()).await
    }

    /// Submit against an explicit "now"
    pub async fn submit_at(
        &self,
        form: &OrderForm,
        now: DateTime<Utc>,
    ) -> Result<BuyConfigResponse, ClientError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Purchase already in flight, ignoring second submission");
            return Err(ClientError::AlreadySubmitting);
        }
        let _guard = FlightGuard {
            in_flight: &self.in_flight,
            state: &self.state,
        };

        // Blocked locally, the form stays as it was
        let order = Order::resolve(form, now)?;

        let token = match self.store.get() {
            Some(token) => token,
            None => {
                self.set_state(SubmitState::Failed(NOT_AUTHENTICATED.to_string()));
                return Err(ClientError::NotAuthenticated);
            }
        };

        self.set_state(SubmitState::Submitting);
        let request = order.to_request();

        let result = match self.backend.buy_config(&token, &request).await {
            Ok(response) if response.success => Ok(response),
            Ok(response) => Err(ClientError::ServerError {
                message: response.error,
            }),
            Err(e) => Err(e),
        };

        match &result {
            Ok(response) => {
                log::info!("Config purchased on server {}", order.server);
                self.set_state(SubmitState::Succeeded(response.clone()));
            }
            Err(e) => {
                log::error!("Config purchase failed: {}", e);
                self.set_state(SubmitState::Failed(purchase_error_message(e)));
            }
        }

        result
    }
}

/// Line shown under the buy form
pub fn purchase_message(result: &Result<BuyConfigResponse, ClientError>) -> String {
    match result {
        Ok(_) => PURCHASE_SUCCESS.to_string(),
        Err(e) => purchase_error_message(e),
    }
}

fn purchase_error_message(err: &ClientError) -> String {
    match err {
        ClientError::ServerError { .. } | ClientError::Rejected { .. } => {
            err.server_message().unwrap_or(PURCHASE_FAILED).to_string()
        }
        ClientError::NotAuthenticated => NOT_AUTHENTICATED.to_string(),
        ClientError::Transport(_) | ClientError::Malformed(_) => PURCHASE_NETWORK_ERROR.to_string(),
        ClientError::AlreadySubmitting => PURCHASE_IN_PROGRESS.to_string(),
        ClientError::Validation(reason) => reason.clone(),
        ClientError::Storage(_) => PURCHASE_FAILED.to_string(),
    }
}
