//! Board file reader
//!
//! Extracts the title block and copper layer count from a `.kicad_pcb`
//! file. Geometry stays with the layout editor; fabrication documents only
//! need the identifying metadata.

use std::path::Path;

use crate::artifact::sexpr;
use crate::artifact::{malformed, read_to_string, ArtifactKind};
use crate::core::error::PipelineError;

/// Identifying metadata pulled from a board file.
#[derive(Debug, Clone, Default)]
pub struct BoardInfo {
    pub title: Option<String>,
    pub date: Option<String>,
    pub revision: Option<String>,
    pub company: Option<String>,
    pub copper_layers: usize,
}

/// Read and parse a board artifact from disk.
pub fn read(path: &Path) -> Result<BoardInfo, PipelineError> {
    let text = read_to_string(ArtifactKind::Board, path)?;
    parse(&text).map_err(|detail| malformed(ArtifactKind::Board, path, detail))
}

pub fn parse(text: &str) -> Result<BoardInfo, String> {
    let root = sexpr::parse(text).map_err(|e| e.to_string())?;
    if root.tag() != Some("kicad_pcb") {
        return Err("top-level form is not (kicad_pcb ...)".to_string());
    }

    let mut info = BoardInfo::default();

    if let Some(block) = root.child("title_block") {
        info.title = block.child_text("title").map(str::to_string);
        info.date = block.child_text("date").map(str::to_string);
        info.revision = block.child_text("rev").map(str::to_string);
        info.company = block.child_text("company").map(str::to_string);
    }

    // Layer entries look like (0 "F.Cu" signal); copper names end in ".Cu".
    if let Some(layers) = root.child("layers") {
        info.copper_layers = layers
            .as_list()
            .unwrap_or(&[])
            .iter()
            .filter_map(|layer| layer.as_list())
            .filter_map(|items| items.get(1).and_then(|name| name.as_text()))
            .filter(|name| name.ends_with(".Cu"))
            .count();
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"(kicad_pcb (version 20230620) (generator "pcbnew")
  (general (thickness 1.6))
  (paper "A4")
  (title_block
    (title "Blink Demo")
    (date "2026-01-15")
    (rev "1.0")
    (company "Wickerbox Electronics"))
  (layers
    (0 "F.Cu" signal)
    (31 "B.Cu" signal)
    (36 "B.SilkS" user)
    (44 "Edge.Cuts" user)))"#;

    #[test]
    fn test_parse_title_block_and_layers() {
        let info = parse(BOARD).unwrap();
        assert_eq!(info.title.as_deref(), Some("Blink Demo"));
        assert_eq!(info.date.as_deref(), Some("2026-01-15"));
        assert_eq!(info.revision.as_deref(), Some("1.0"));
        assert_eq!(info.company.as_deref(), Some("Wickerbox Electronics"));
        assert_eq!(info.copper_layers, 2);
    }

    #[test]
    fn test_board_without_title_block() {
        let info = parse("(kicad_pcb (layers (0 \"F.Cu\" signal)))").unwrap();
        assert!(info.title.is_none());
        assert_eq!(info.copper_layers, 1);
    }

    #[test]
    fn test_not_a_board() {
        let err = parse("(export)").unwrap_err();
        assert!(err.contains("kicad_pcb"));
    }
}
