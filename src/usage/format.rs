use chrono::{DateTime, Local, TimeZone, Utc};

pub const NO_EXPIRY: &str = "No expiry";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Largest base-1024 unit that keeps the value at or above one.
/// Whole bytes print without decimals, everything else with two.
pub fn format_bytes(bytes: u64) -> String {
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", bytes as f64 / scale as f64, UNITS[unit])
    }
}

/// Epoch seconds as a local date and time; absent or zero means never
pub fn format_expiry(seconds: Option<i64>) -> String {
    format_expiry_in(seconds, &Local)
}

pub fn format_expiry_in<Tz>(seconds: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let seconds = match seconds {
        Some(s) if s > 0 => s,
        _ => return NO_EXPIRY.to_string(),
    };

    match DateTime::<Utc>::from_timestamp(seconds, 0) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => {
            log::warn!("Expiry {} is outside the representable range", seconds);
            NO_EXPIRY.to_string()
        }
    }
}
