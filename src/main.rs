//! OnwardPath command-line client

use std::process::ExitCode;

use onwardpath::commands::{self, BuyArgs};
use onwardpath::{AppState, ClientConfig};

const USAGE: &str = "\
Usage: onwardpath <command> [args]

Commands:
  register <email> <password>   Create an account
  login <email> <password>      Log in and store the session token
  logout                        Forget the stored session token
  status                        Check the stored session with the panel
  presets                       List servers, durations and traffic presets
  buy [options]                 Buy a config
      --duration <label>        Duration preset, e.g. \"1 Hour\"
      --minutes <n>             Custom duration in minutes
      --traffic-mb <mb>         Traffic preset in MB, e.g. 1024
      --custom-mb <mb>          Custom traffic in MB, fractions allowed
  configs                       Show owned configs and their usage

Environment:
  ONWARDPATH_API_URL, ONWARDPATH_TIMEOUT_SECS, ONWARDPATH_STORAGE_DIR, RUST_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    onwardpath::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<String, String> {
    let (command, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;

    // Commands that need neither the panel nor the session slot
    match command.as_str() {
        "help" | "--help" | "-h" => return Ok(USAGE.to_string()),
        "presets" => return Ok(commands::list_presets()),
        _ => {}
    }

    let config = ClientConfig::from_env().map_err(|e| format!("{:#}", e))?;
    let state = AppState::new(config).map_err(|e| format!("{:#}", e))?;

    match command.as_str() {
        "register" => {
            let (email, passwd) = credentials(rest)?;
            commands::register(&state, email, passwd).await
        }
        "login" => {
            let (email, passwd) = credentials(rest)?;
            commands::login(&state, email, passwd).await
        }
        "logout" => commands::logout(&state),
        "status" => commands::status(&state).await,
        "buy" => commands::buy_config(&state, parse_buy_args(rest)?).await,
        "configs" => {
            let cards = commands::list_configs(&state).await?;
            if cards.is_empty() {
                Ok("No configs found.".to_string())
            } else {
                Ok(cards
                    .iter()
                    .map(commands::describe_card)
                    .collect::<Vec<_>>()
                    .join("\n\n"))
            }
        }
        other => Err(format!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}

fn credentials(rest: &[String]) -> Result<(String, String), String> {
    match rest {
        [email, passwd] => Ok((email.clone(), passwd.clone())),
        _ => Err("Expected <email> <password>".to_string()),
    }
}

fn parse_buy_args(rest: &[String]) -> Result<BuyArgs, String> {
    let mut args = BuyArgs::default();
    let mut iter = rest.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .cloned()
            .ok_or_else(|| format!("{} needs a value", flag))?;

        match flag.as_str() {
            "--duration" => args.duration_preset = Some(value),
            "--minutes" => args.custom_minutes = Some(value),
            "--traffic-mb" => {
                let mb = value
                    .parse()
                    .map_err(|_| format!("--traffic-mb expects a whole number, got {}", value))?;
                args.traffic_preset_mb = Some(mb);
            }
            "--custom-mb" => args.custom_mb = Some(value),
            other => return Err(format!("Unknown option for buy: {}", other)),
        }
    }

    Ok(args)
}
