//! Core registry functionality
//!
//! This module contains the configuration layer, the shared I/O helpers,
//! the error types and the build-data registry.

pub mod config;
pub mod error;
pub mod io;
pub mod registry;

pub use config::{Config, PathResolution, ResourceKey, CONFIG_FILE_NAME, DEFAULT_SECTION};
pub use error::{
    ConfigError, ConfigResult, FormatError, FormatResult, RefDataError, Result, SequenceError,
    SequenceResult,
};
pub use registry::{BuildDataset, DatasetLoader, FileLoader, ReferenceRegistry, INSTALL_DIR_ENV};
