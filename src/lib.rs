//! Best-effort translation gateway for localizing blog posts.
//!
//! Library crate that exposes all modules for use in binaries and tests.

pub mod config;
pub mod i18n;
pub mod retry;
pub mod security;
pub mod server;
pub mod translation;
