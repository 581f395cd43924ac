//! Quayside terminal service library.
//!
//! This crate primarily ships a `terminal` binary, but exposes its modules so
//! the HTTP API can be driven from integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod placement;
pub mod state;
