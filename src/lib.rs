//! keyed-gate: per-key debounce and throttle engines
//!
//! A library for gating actions by a time window, independently per key,
//! with a lifecycle directory that evicts keys and shuts engines down
//! across a whole application.

pub mod config;
pub mod debounce;
pub mod directory;
pub mod engine;
pub mod scheduler;
pub mod throttle;
pub mod time;
