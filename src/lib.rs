//! Security guard layer for authentication-adjacent request paths.
//!
//! Everything here coordinates through a shared key-value store with per-key
//! expiry: a fixed-window rate limiter, a progressive account lockout state
//! machine, a security audit recorder with alerting, and a break-glass
//! emergency access path for a fixed operator allow-list.

pub mod api;
pub mod cli;
pub mod guard;
pub mod store;
