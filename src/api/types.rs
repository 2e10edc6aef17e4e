use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Request/Response types for the panel API

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub passwd: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, passwd: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            passwd: passwd.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub obj: Option<String>,
}

// Error body shared by register and login
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyConfigRequest {
    pub server: u32,
    pub total: u64,
    pub flow: String, // always empty for now
    pub expiry_time: i64, // epoch milliseconds
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyConfigResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfigsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<UserConfigsPayload>,
}

impl UserConfigsResponse {
    /// Owned configs; a successful envelope without a list means none
    pub fn into_entries(self) -> Vec<ConfigEntry> {
        self.obj
            .map(|payload| payload.current_config_list)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfigsPayload {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub current_config_list: Vec<ConfigEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub inbound: Inbound,
    pub client_config: ClientRecord,
}

/// Server-side listener a purchased config connects through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inbound {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "default_if_null")]
    pub ip: String,
    #[serde(default, deserialize_with = "default_if_null")]
    pub port: u16,
    #[serde(rename = "streamSettings", default)]
    pub stream_settings: Option<StreamSettings>,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub security: Option<String>,
}

/// One provisioned config: identity plus usage counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(default, deserialize_with = "default_if_null")]
    pub uuid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub up: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub down: u64,
    // 0 = unlimited
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total: u64,
    // epoch seconds, 0 or absent = never
    #[serde(rename = "expiryTime", default)]
    pub expiry_time: Option<i64>,
    #[serde(default)]
    pub id: Option<Value>,
}

fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Byte counters sometimes come back as floats ("up": 1.0)
#[derive(Deserialize)]
#[serde(untagged)]
enum Counter {
    Whole(u64),
    Float(f64),
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Counter>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Counter::Whole(n)) => Ok(n),
        Some(Counter::Float(f)) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
            Ok(f as u64)
        }
        Some(Counter::Float(f)) => Err(D::Error::custom(format!(
            "invalid byte counter {}, expected a whole non-negative number",
            f
        ))),
    }
}

fn empty_if_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
