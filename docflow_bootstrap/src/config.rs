// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap-phase application configuration
//!
//! `AppConfig` holds validated configuration after CLI parsing and security
//! validation, before the `docflow` infrastructure layer's `PipelineConfig`
//! (layered file + environment) takes over. It is immutable once built.
//!
//! ## Usage
//!
//! ```rust
//! use docflow_bootstrap::config::{AppConfig, LogLevel};
//!
//! let config = AppConfig::builder()
//!     .app_name("docflow")
//!     .log_level(LogLevel::Info)
//!     .build();
//!
//! println!("Running: {}", config.app_name());
//! ```

use std::path::PathBuf;

/// Log level configuration, mapped to a `tracing::Level` at init time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    /// Info, warnings, and errors (default)
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Bootstrap-phase application configuration.
///
/// Immutable once built. `config_path` is the `--config` override that the
/// `docflow` infrastructure layer's `PipelineConfig::load` consumes; this
/// struct only carries it through, it does not itself read the file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    app_name: String,
    log_level: LogLevel,
    config_path: Option<PathBuf>,
    verbose: bool,
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    config_path: Option<PathBuf>,
    verbose: bool,
}

impl AppConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// # Panics
    /// Panics if `app_name` was not set.
    pub fn build(self) -> AppConfig {
        AppConfig {
            app_name: self.app_name.expect("app_name is required"),
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            verbose: self.verbose,
        }
    }

    pub fn try_build(self) -> Result<AppConfig, String> {
        Ok(AppConfig {
            app_name: self.app_name.ok_or("app_name is required")?,
            log_level: self.log_level.unwrap_or_default(),
            config_path: self.config_path,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_minimal_uses_defaults() {
        let config = AppConfig::builder().app_name("test-app").build();

        assert_eq!(config.app_name(), "test-app");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert!(config.config_path().is_none());
        assert!(!config.is_verbose());
    }

    #[test]
    fn builder_full_sets_every_field() {
        let config = AppConfig::builder()
            .app_name("full-app")
            .log_level(LogLevel::Debug)
            .config_path("/etc/docflow/config.toml")
            .verbose(true)
            .build();

        assert_eq!(config.app_name(), "full-app");
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.config_path(), Some(&PathBuf::from("/etc/docflow/config.toml")));
        assert!(config.is_verbose());
    }

    #[test]
    #[should_panic(expected = "app_name is required")]
    fn build_without_app_name_panics() {
        AppConfig::builder().build();
    }

    #[test]
    fn try_build_without_app_name_fails() {
        let result = AppConfig::builder().try_build();
        assert_eq!(result.unwrap_err(), "app_name is required");
    }

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_maps_to_tracing_level() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
