//! Media file server library.
//!
//! Serves public and permission-gated media files, streaming video in
//! bounded byte ranges and handing everything else to a local reader or
//! an accelerated redirect.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
