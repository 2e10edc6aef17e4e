use crate::api::{ClientRecord, Inbound};

pub const DEFAULT_PROTOCOL: &str = "vless";
pub const DEFAULT_NETWORK: &str = "tcp";
pub const DEFAULT_SECURITY: &str = "none";

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

/// Shareable connection URI for one client on one inbound:
/// `scheme://uuid@host:port?type=<network>&security=<security>#<remark>-<email>`
///
/// The fragment is percent-encoded and IPv6 hosts are bracketed so the result
/// always parses as a URI.
pub fn build_config_url(inbound: &Inbound, client: &ClientRecord) -> String {
    let protocol = or_default(inbound.protocol.as_deref(), DEFAULT_PROTOCOL);
    let stream = inbound.stream_settings.as_ref();
    let network = or_default(stream.and_then(|s| s.network.as_deref()), DEFAULT_NETWORK);
    let security = or_default(stream.and_then(|s| s.security.as_deref()), DEFAULT_SECURITY);

    let host = if inbound.ip.contains(':') && !inbound.ip.starts_with('[') {
        format!("[{}]", inbound.ip)
    } else {
        inbound.ip.clone()
    };

    let fragment = format!(
        "{}-{}",
        inbound.remark.as_deref().unwrap_or(""),
        client.email.as_deref().unwrap_or("")
    );

    format!(
        "{}://{}@{}:{}?type={}&security={}#{}",
        protocol,
        client.uuid,
        host,
        inbound.port,
        network,
        security,
        urlencoding::encode(&fragment)
    )
}
