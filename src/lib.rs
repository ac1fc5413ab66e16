//! Library crate for creature-memory-back, exposing modules for binaries and integration tests.

/// Remote creature catalog client.
pub mod catalog;
/// Application configuration loading.
pub mod config;
mod dto;
mod error;
/// HTTP routes.
pub mod routes;
/// Game services and their HTTP-facing operations.
pub mod services;
/// Board model, state machine and shared application state.
pub mod state;
