use crate::{
    api,
    cli::{actions::Action, globals::GlobalArgs},
    guard::{GuardConfig, GuardState},
    store::RestStore,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            store_url,
            store_token,
            operators,
            failure_threshold,
            failure_window_seconds,
            lock_duration_seconds,
            audit_window_seconds,
            alert_threshold,
            emergency_rate_limit,
            emergency_rate_window_seconds,
            fail_open,
        } => {
            let mut globals = GlobalArgs::new(store_url);
            globals.set_token(SecretString::from(store_token));

            let config = GuardConfig::new()
                .with_failure_threshold(failure_threshold)
                .with_failure_window_seconds(failure_window_seconds)
                .with_lock_duration_seconds(lock_duration_seconds)
                .with_audit_window_seconds(audit_window_seconds)
                .with_alert_threshold(alert_threshold)
                .with_emergency_rate_limit(emergency_rate_limit)
                .with_emergency_rate_window_seconds(emergency_rate_window_seconds)
                .with_fail_policy(crate::cli::commands::parse_fail_policy(fail_open))
                .with_operator_emails(operators);

            debug!("Guard config: {:?}", config);

            let store_url =
                Url::parse(&globals.store_url).context("Invalid key-value store URL")?;
            let store = RestStore::new(store_url.as_str(), globals.store_token.clone())
                .context("Failed to build key-value store client")?;
            let state = Arc::new(GuardState::new(Arc::new(store), config));

            api::new(port, state).await?;
        }
    }

    Ok(())
}
