//! Core types: configuration, project manifest, error taxonomy

pub mod config;
pub mod error;
pub mod project;

pub use config::Config;
pub use error::PipelineError;
pub use project::{Manifest, Project};
