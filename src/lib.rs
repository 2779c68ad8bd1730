//! Pixelforge - Image upload and transformation service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod archive;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod transform;
