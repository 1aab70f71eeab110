//! Sync engine integration tests: fetch coalescing, close semantics,
//! degraded modes, and the new-alert signal.

mod support;

mod engine;
mod notifications;
