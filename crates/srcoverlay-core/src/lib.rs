//! srcoverlay Core
//!
//! Core types, configuration and the shared error type for the override
//! consistency checker and the feature-definition splicer.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CheckConfig, Exclusions};
pub use error::{Error, Result};
pub use types::*;
