// Purchase catalogue offered by the buy form

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPreset {
    pub label: &'static str,
    pub seconds: i64,
}

pub const DURATION_PRESETS: &[DurationPreset] = &[
    DurationPreset { label: "5 Minutes", seconds: 5 * MINUTE },
    DurationPreset { label: "1 Hour", seconds: HOUR },
    DurationPreset { label: "1 Day", seconds: DAY },
    DurationPreset { label: "1 Week", seconds: 7 * DAY },
    DurationPreset { label: "1 Month", seconds: 30 * DAY },
    DurationPreset { label: "3 Months", seconds: 90 * DAY },
    DurationPreset { label: "6 Months", seconds: 180 * DAY },
    DurationPreset { label: "1 Year", seconds: 365 * DAY },
];

pub const TRAFFIC_PRESETS_MB: &[u64] = &[
    500,    // 500 MB
    1024,   // 1 GB
    5120,   // 5 GB
    10240,  // 10 GB
    51200,  // 50 GB
    102400, // 100 GB
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOption {
    pub id: u32,
    pub name: &'static str,
}

// Only one server is sold today
pub const SERVER_OPTIONS: &[ServerOption] = &[ServerOption { id: 1, name: "Main Server" }];

pub fn default_server() -> ServerOption {
    SERVER_OPTIONS[0]
}

pub fn server_name(id: u32) -> Option<&'static str> {
    SERVER_OPTIONS.iter().find(|s| s.id == id).map(|s| s.name)
}

/// Look up a duration preset by label, ignoring case and surrounding space
pub fn find_duration_preset(label: &str) -> Option<DurationPreset> {
    let wanted = label.trim();
    DURATION_PRESETS
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(wanted))
        .copied()
}

/// "1.00 GB" from 1024 and up, plain megabytes below
pub fn format_traffic_mb(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{} MB", mb)
    }
}

/// "None", "<n> minutes" under an hour, "<h.hh> hours" otherwise
pub fn format_duration_secs(seconds: i64) -> String {
    if seconds <= 0 {
        return "None".to_string();
    }

    let minutes = seconds as f64 / 60.0;
    if minutes < 60.0 {
        format!("{} minutes", minutes.round() as i64)
    } else {
        format!("{:.2} hours", seconds as f64 / 3600.0)
    }
}
