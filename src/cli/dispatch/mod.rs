use crate::cli::{actions::Action, commands};
use anyhow::{Context, Result};

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        store_url: matches
            .get_one::<String>("store-url")
            .map(String::to_string)
            .context("missing required argument: --store-url")?,
        store_token: matches
            .get_one::<String>("store-token")
            .map(String::to_string)
            .context("missing required argument: --store-token")?,
        operators: commands::parse_operators(matches.get_one::<String>("operators")),
        failure_threshold: matches
            .get_one::<i64>("failure-threshold")
            .copied()
            .unwrap_or(5),
        failure_window_seconds: matches
            .get_one::<u64>("failure-window")
            .copied()
            .unwrap_or(600),
        lock_duration_seconds: matches
            .get_one::<u64>("lock-duration")
            .copied()
            .unwrap_or(900),
        audit_window_seconds: matches
            .get_one::<u64>("audit-window")
            .copied()
            .unwrap_or(600),
        alert_threshold: matches
            .get_one::<i64>("alert-threshold")
            .copied()
            .unwrap_or(20),
        emergency_rate_limit: matches
            .get_one::<i64>("emergency-rate-limit")
            .copied()
            .unwrap_or(5),
        emergency_rate_window_seconds: matches
            .get_one::<u64>("emergency-rate-window")
            .copied()
            .unwrap_or(3600),
        fail_open: matches.get_flag("fail-open"),
    })
}
