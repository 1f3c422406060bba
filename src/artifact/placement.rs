//! Placement (.pos) file reader
//!
//! KiCad placement exports are whitespace-padded columns:
//! `Ref Val Package PosX PosY Rot Side`, with `#` comment lines. Position
//! columns are indexed from the line's end because the value column can
//! itself contain spaces.

use std::path::Path;

use crate::artifact::{malformed, read_to_string, ArtifactKind};
use crate::core::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// One part position from a placement export, in millimeters.
#[derive(Debug, Clone)]
pub struct PlacementRecord {
    pub reference: String,
    pub x_mm: f64,
    pub y_mm: f64,
    pub rotation: f64,
    pub side: Side,
}

/// Read and parse a placement artifact from disk.
pub fn read(path: &Path) -> Result<Vec<PlacementRecord>, PipelineError> {
    let text = read_to_string(ArtifactKind::Placement, path)?;
    parse(&text).map_err(|detail| malformed(ArtifactKind::Placement, path, detail))
}

pub fn parse(text: &str) -> Result<Vec<PlacementRecord>, String> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 7 {
            return Err(format!(
                "line {}: expected 7 columns (Ref Val Package PosX PosY Rot Side), found {}",
                index + 1,
                cols.len()
            ));
        }

        let n = cols.len();
        let number = |col: &str, what: &str| -> Result<f64, String> {
            col.parse::<f64>()
                .map_err(|_| format!("line {}: bad {what} value {col:?}", index + 1))
        };

        let side = match cols[n - 1].to_ascii_lowercase().as_str() {
            "top" | "f.cu" | "front" => Side::Top,
            "bottom" | "b.cu" | "back" => Side::Bottom,
            other => {
                return Err(format!(
                    "line {}: unknown side {other:?} (expected top or bottom)",
                    index + 1
                ))
            }
        };

        records.push(PlacementRecord {
            reference: cols[0].to_string(),
            x_mm: number(cols[n - 4], "PosX")?,
            y_mm: number(cols[n - 3], "PosY")?,
            rotation: number(cols[n - 2], "Rot")?,
            side,
        });
    }

    Ok(records)
}
