//! Board outline dimensions from the edge-cuts gerber
//!
//! KiCad plots gerbers with a 4.6 metric coordinate format, so raw X/Y
//! integers divide by 1e6 to give millimeters. Scanning the edge-cuts
//! layer for coordinate extents gives the board's bounding box without
//! touching the layout editor.

use regex::Regex;
use std::path::Path;

use crate::artifact::{malformed, read_to_string, ArtifactKind};
use crate::core::error::PipelineError;

const UNITS_PER_MM: f64 = 1_000_000.0;
const MM_PER_INCH: f64 = 25.4;

/// Bounding-box dimensions of the board outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl BoardSize {
    pub fn width_in(&self) -> f64 {
        self.width_mm / MM_PER_INCH
    }

    pub fn height_in(&self) -> f64 {
        self.height_mm / MM_PER_INCH
    }
}

/// Read the edge-cuts gerber and compute the board size.
pub fn board_size(path: &Path) -> Result<BoardSize, PipelineError> {
    let text = read_to_string(ArtifactKind::Gerber, path)?;
    parse_size(&text).map_err(|detail| malformed(ArtifactKind::Gerber, path, detail))
}

fn parse_size(text: &str) -> Result<BoardSize, String> {
    let coord = Regex::new(r"^X(-?\d+)Y(-?\d+)").map_err(|e| e.to_string())?;

    let mut bounds: Option<(i64, i64, i64, i64)> = None;
    for line in text.lines() {
        let Some(caps) = coord.captures(line.trim()) else {
            continue;
        };
        let x: i64 = caps[1].parse().map_err(|_| "coordinate out of range")?;
        let y: i64 = caps[2].parse().map_err(|_| "coordinate out of range")?;

        bounds = Some(match bounds {
            None => (x, x, y, y),
            Some((xmin, xmax, ymin, ymax)) => {
                (xmin.min(x), xmax.max(x), ymin.min(y), ymax.max(y))
            }
        });
    }

    let (xmin, xmax, ymin, ymax) =
        bounds.ok_or("no X/Y coordinates found in edge-cuts gerber")?;
    let width_mm = (xmax - xmin) as f64 / UNITS_PER_MM;
    let height_mm = (ymax - ymin) as f64 / UNITS_PER_MM;

    // A zero dimension means the outline is degenerate, e.g. a circular
    // board described by a single flash. Not supported.
    if width_mm <= 0.0 || height_mm <= 0.0 {
        return Err(format!(
            "degenerate board outline ({width_mm:.2} x {height_mm:.2} mm)"
        ));
    }

    Ok(BoardSize {
        width_mm,
        height_mm,
    })
}
