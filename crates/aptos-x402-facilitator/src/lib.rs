//! x402 facilitator for Aptos: verifies exact fungible-asset payments and
//! settles them on-chain, optionally sponsoring gas.
//!
//! The pipeline itself lives in the core [`x402`] crate; this crate provides
//! the HTTP server, configuration and metrics.
//!
//! # Modules
//!
//! - [`routes`]: HTTP endpoints (health, supported, verify, settle, metrics)
//! - [`state`]: Shared [`AppState`](state::AppState)
//! - [`config`]: Environment configuration
//! - [`metrics`]: Prometheus metrics for verification and settlement

pub mod config;
pub mod metrics;
pub mod routes;
pub mod state;
