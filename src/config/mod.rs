//! Configuration module for sign-speech.
//!
//! Provides CLI argument parsing and configuration management.

#[allow(clippy::module_inception)]
mod config;
mod voices;

pub use config::{AppConfig, PlayerKind, Provider, RendererKind};
