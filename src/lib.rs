//! KiFisher: KiCad project documentation pipeline
//!
//! A batch CLI that turns the artifacts a KiCad project exports (netlist,
//! board file, placement files, gerbers) into bills of materials,
//! manufacturing packages, assembly files, and a final release bundle.

pub mod artifact;
pub mod bom;
pub mod cli;
pub mod core;
pub mod package;
pub mod render;
