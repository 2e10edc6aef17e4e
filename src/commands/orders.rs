use crate::orders::{
    presets, purchase_message, DurationSpec, OrderForm, OrderSummary, TrafficSpec,
    DURATION_PRESETS, SERVER_OPTIONS, TRAFFIC_PRESETS_MB,
};
use crate::state::AppState;

/// Buy-form selections as given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyArgs {
    pub duration_preset: Option<String>,
    pub custom_minutes: Option<String>,
    pub traffic_preset_mb: Option<u64>,
    pub custom_mb: Option<String>,
}

impl BuyArgs {
    /// Defaults to the first preset of each kind, like the form does
    pub fn to_form(&self) -> Result<OrderForm, String> {
        let duration = match (&self.custom_minutes, &self.duration_preset) {
            (Some(minutes), _) => DurationSpec::custom_from_input(minutes),
            (None, Some(label)) => presets::find_duration_preset(label)
                .map(DurationSpec::preset)
                .ok_or_else(|| format!("Unknown duration preset: {}", label))?,
            (None, None) => DurationSpec::preset(DURATION_PRESETS[0]),
        };

        let traffic = match (&self.custom_mb, self.traffic_preset_mb) {
            (Some(mb), _) => TrafficSpec::custom_from_input(mb),
            (None, Some(mb)) if TRAFFIC_PRESETS_MB.contains(&mb) => {
                TrafficSpec::Preset { megabytes: mb }
            }
            (None, Some(mb)) => return Err(format!("Unknown traffic preset: {} MB", mb)),
            (None, None) => TrafficSpec::Preset {
                megabytes: TRAFFIC_PRESETS_MB[0],
            },
        };

        Ok(OrderForm::new(duration, traffic))
    }
}

pub fn describe_summary(summary: &OrderSummary) -> String {
    format!(
        "Server: {}\nDuration: {}\nTraffic: {}",
        summary.server, summary.duration, summary.traffic
    )
}

pub async fn buy_config(state: &AppState, args: BuyArgs) -> Result<String, String> {
    log::info!("Command: buy_config called");

    let form = args.to_form()?;
    if !form.can_submit() {
        return Err("Choose a duration and traffic amount greater than zero.".to_string());
    }

    log::info!("Selected:\n{}", describe_summary(&form.summary()));

    let builder = state.order_builder();
    let result = builder.submit(&form).await;
    let message = purchase_message(&result);

    match result {
        Ok(_) => Ok(message),
        Err(e) => {
            log::error!("Failed to buy config: {}", e);
            Err(message)
        }
    }
}

/// Catalogue listing for `onwardpath presets`
pub fn list_presets() -> String {
    let mut out = String::from("Servers:\n");
    for server in SERVER_OPTIONS {
        out.push_str(&format!("  {} ({})\n", server.name, server.id));
    }

    out.push_str("Durations:\n");
    for preset in DURATION_PRESETS {
        out.push_str(&format!("  {}\n", preset.label));
    }

    out.push_str("Traffic:\n");
    for mb in TRAFFIC_PRESETS_MB {
        out.push_str(&format!("  {} ({} MB)\n", presets::format_traffic_mb(*mb as f64), mb));
    }

    out
}
