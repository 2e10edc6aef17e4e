use chrono::Duration;

use crate::orders::presets::{format_duration_secs, format_traffic_mb, DurationPreset};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How long the purchased config stays valid.
///
/// Everything resolves to whole seconds: presets are stored in seconds,
/// custom input is entered in minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationSpec {
    Preset { seconds: i64 },
    Custom { minutes: i64 },
}

impl DurationSpec {
    pub fn preset(preset: DurationPreset) -> Self {
        DurationSpec::Preset {
            seconds: preset.seconds,
        }
    }

    /// Custom minutes as typed into the form; anything that does not start
    /// with a positive integer resolves to zero.
    pub fn custom_from_input(input: &str) -> Self {
        DurationSpec::Custom {
            minutes: parse_leading_int(input).unwrap_or(0),
        }
    }

    pub fn seconds(&self) -> i64 {
        match *self {
            DurationSpec::Preset { seconds } => seconds.max(0),
            DurationSpec::Custom { minutes } if minutes > 0 => minutes.saturating_mul(60),
            DurationSpec::Custom { .. } => 0,
        }
    }

    pub fn resolve(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    pub fn is_zero(&self) -> bool {
        self.seconds() == 0
    }

    pub fn label(&self) -> String {
        format_duration_secs(self.seconds())
    }
}

/// Traffic allowance in megabytes (base 1024)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrafficSpec {
    Preset { megabytes: u64 },
    Custom { megabytes: f64 },
}

impl TrafficSpec {
    /// Custom megabytes as typed; fractional values are allowed
    pub fn custom_from_input(input: &str) -> Self {
        TrafficSpec::Custom {
            megabytes: parse_leading_float(input).unwrap_or(0.0),
        }
    }

    pub fn megabytes(&self) -> f64 {
        match *self {
            TrafficSpec::Preset { megabytes } => megabytes as f64,
            TrafficSpec::Custom { megabytes } if megabytes.is_finite() && megabytes > 0.0 => {
                megabytes
            }
            TrafficSpec::Custom { .. } => 0.0,
        }
    }

    /// Allowance in bytes; `None` when it does not fit in a `u64`
    pub fn total_bytes(&self) -> Option<u64> {
        match *self {
            TrafficSpec::Preset { megabytes } => megabytes.checked_mul(1024 * 1024),
            TrafficSpec::Custom { .. } => {
                let bytes = (self.megabytes() * BYTES_PER_MB).round();
                // u64::MAX as f64 rounds up to 2^64
                (bytes < u64::MAX as f64).then_some(bytes as u64)
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_bytes() == Some(0)
    }

    pub fn label(&self) -> String {
        format_traffic_mb(self.megabytes())
    }
}

// Leading integer of a form field, the way number inputs are read: "12abc" is
// 12, "1.9" is 1, "" is nothing.
fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len() - sign_len);

    if digits == 0 {
        return None;
    }

    trimmed[..sign_len + digits].parse().ok()
}

// Longest leading decimal number ("1.5MB" is 1.5, "2e3" is 2000)
fn parse_leading_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let candidate_len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(trimmed.len());

    (1..=candidate_len)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
