//! repovis library
//!
//! This module exports the service layer of repovis (configuration, on-disk
//! stores and request handlers) for use in integration tests and as a library.

pub mod config;
pub mod handlers;
pub mod store;
