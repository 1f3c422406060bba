//! Command implementations

pub mod assembly;
pub mod bom;
pub mod completions;
pub mod mfr;
pub mod new;
pub mod package;
