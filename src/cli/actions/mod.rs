pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        store_url: String,
        store_token: String,
        operators: Vec<String>,
        failure_threshold: i64,
        failure_window_seconds: u64,
        lock_duration_seconds: u64,
        audit_window_seconds: u64,
        alert_threshold: i64,
        emergency_rate_limit: i64,
        emergency_rate_window_seconds: u64,
        fail_open: bool,
    },
}
