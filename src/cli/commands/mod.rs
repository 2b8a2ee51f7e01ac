use crate::guard::config::FailPolicy;
use clap::{
    Arg, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("gardisto")
        .about("Security guard layer: rate limiting, lockout and audit alerting")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GARDISTO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("store-url")
                .long("store-url")
                .help("Key-value store REST endpoint, example: https://kv.example.dev")
                .env("GARDISTO_STORE_URL")
                .required(true),
        )
        .arg(
            Arg::new("store-token")
                .long("store-token")
                .help("Bearer token for the key-value store")
                .env("GARDISTO_STORE_TOKEN")
                .required(true),
        )
        .arg(
            Arg::new("operators")
                .long("operators")
                .help("Comma-separated operator emails allowed on admin and emergency paths")
                .env("GARDISTO_OPERATORS"),
        )
        .arg(
            Arg::new("failure-threshold")
                .long("failure-threshold")
                .help("Consecutive failures before an identifier is locked")
                .default_value("5")
                .env("GARDISTO_FAILURE_THRESHOLD")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("failure-window")
                .long("failure-window")
                .help("Failure counting window in seconds")
                .default_value("600")
                .env("GARDISTO_FAILURE_WINDOW")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("lock-duration")
                .long("lock-duration")
                .help("Lock duration in seconds")
                .default_value("900")
                .env("GARDISTO_LOCK_DURATION")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("audit-window")
                .long("audit-window")
                .help("Audit counting window in seconds")
                .default_value("600")
                .env("GARDISTO_AUDIT_WINDOW")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("alert-threshold")
                .long("alert-threshold")
                .help("Audit count that raises a security alert within the window")
                .default_value("20")
                .env("GARDISTO_ALERT_THRESHOLD")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("emergency-rate-limit")
                .long("emergency-rate-limit")
                .help("Emergency access requests allowed per origin IP per window")
                .default_value("5")
                .env("GARDISTO_EMERGENCY_RATE_LIMIT")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("emergency-rate-window")
                .long("emergency-rate-window")
                .help("Emergency access rate window in seconds")
                .default_value("3600")
                .env("GARDISTO_EMERGENCY_RATE_WINDOW")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("fail-open")
                .long("fail-open")
                .help("Allow requests when the store is unreachable (default: fail closed)")
                .env("GARDISTO_FAIL_OPEN")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GARDISTO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

/// Split the operators argument into normalized emails.
#[must_use]
pub fn parse_operators(operators: Option<&String>) -> Vec<String> {
    operators
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

/// Fail-open/fail-closed policy from the CLI flag.
#[must_use]
pub fn parse_fail_policy(fail_open: bool) -> FailPolicy {
    if fail_open {
        FailPolicy::Open
    } else {
        FailPolicy::Closed
    }
}
