//! KiCad netlist reader
//!
//! Parses the `(export (components ...))` section of a netlist exported
//! from the schematic editor into flat part records. Libparts and nets are
//! ignored; the pipeline only needs part identity data.

use std::path::Path;

use crate::artifact::sexpr::{self, Sexpr};
use crate::artifact::{malformed, read_to_string, ArtifactKind};
use crate::core::error::PipelineError;

/// Mount classification carried in the netlist `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountKind {
    Smt,
    Th,
    /// Do not populate: on the BOM, never placed
    Dnp,
    #[default]
    Unspecified,
}

impl MountKind {
    fn from_field(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "smt" | "smd" => Self::Smt,
            "th" | "tht" => Self::Th,
            "dnp" => Self::Dnp,
            _ => Self::Unspecified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smt => "smt",
            Self::Th => "th",
            Self::Dnp => "dnp",
            Self::Unspecified => "",
        }
    }

    /// Whether the part lands on the assembly (XYRS) export. Only parts
    /// explicitly marked for population are emitted; `dnp` and untyped
    /// parts stay on the BOM but never in the placement file.
    pub fn is_placeable(self) -> bool {
        matches!(self, Self::Smt | Self::Th)
    }

    /// MacroFab XYRS mount code: 1 for surface mount, 2 for through hole.
    pub fn xyrs_code(self) -> &'static str {
        match self {
            Self::Smt => "1",
            Self::Th => "2",
            Self::Dnp | Self::Unspecified => "",
        }
    }
}

/// One component entry from the netlist, as drawn in the schematic.
#[derive(Debug, Clone)]
pub struct NetlistEntry {
    pub reference: String,
    pub value: String,
    /// "Library:Footprint" as exported
    pub footprint: Option<String>,
    pub datasheet: Option<String>,
    pub description: Option<String>,
    pub mf_name: Option<String>,
    pub mf_pn: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_pn: Option<String>,
    pub mount: MountKind,
}

impl NetlistEntry {
    /// Footprint name without the library prefix.
    pub fn footprint_name(&self) -> Option<&str> {
        self.footprint
            .as_deref()
            .map(|f| f.rsplit(':').next().unwrap_or(f))
    }

    /// Library half of the footprint identifier, when present.
    pub fn footprint_lib(&self) -> Option<&str> {
        self.footprint
            .as_deref()
            .and_then(|f| f.split_once(':').map(|(lib, _)| lib))
    }
}

/// Read and parse a netlist artifact from disk.
pub fn read(path: &Path) -> Result<Vec<NetlistEntry>, PipelineError> {
    let text = read_to_string(ArtifactKind::Netlist, path)?;
    parse(&text).map_err(|detail| malformed(ArtifactKind::Netlist, path, detail))
}

/// Parse netlist text. The error names the first offending component.
pub fn parse(text: &str) -> Result<Vec<NetlistEntry>, String> {
    let root = sexpr::parse(text).map_err(|e| e.to_string())?;
    if root.tag() != Some("export") {
        return Err("top-level form is not (export ...)".to_string());
    }
    let components = root
        .child("components")
        .ok_or_else(|| "netlist has no (components ...) section".to_string())?;

    components.children("comp").map(parse_comp).collect()
}

fn parse_comp(comp: &Sexpr) -> Result<NetlistEntry, String> {
    let reference = comp
        .child_text("ref")
        .ok_or_else(|| "component without a (ref ...) designator".to_string())?
        .to_string();
    let value = comp
        .child_text("value")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("component {reference} has no value"))?
        .to_string();

    let mut entry = NetlistEntry {
        reference,
        value,
        footprint: non_empty(comp.child_text("footprint")),
        datasheet: non_empty(comp.child_text("datasheet")),
        description: comp
            .child("libsource")
            .and_then(|lib| lib.child_text("description"))
            .map(str::to_string),
        mf_name: None,
        mf_pn: None,
        supplier_name: None,
        supplier_pn: None,
        mount: MountKind::Unspecified,
    };

    // Custom schematic fields: (fields (field (name "MF_PN") "RC0603..."))
    if let Some(fields) = comp.child("fields") {
        for field in fields.children("field") {
            let Some(name) = field.child_text("name") else {
                continue;
            };
            let value = field
                .as_list()
                .and_then(|items| items.get(2))
                .and_then(Sexpr::as_text)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            match name.to_ascii_lowercase().as_str() {
                "mf_name" | "manufacturer" => entry.mf_name = value,
                "mf_pn" | "mpn" => entry.mf_pn = value,
                "s1_name" | "supplier" => entry.supplier_name = value,
                "s1_pn" | "supplier_pn" | "sku" => entry.supplier_pn = value,
                "type" => {
                    if let Some(v) = value {
                        entry.mount = MountKind::from_field(&v);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(entry)
}

/// Treat KiCad's "~" placeholder and empty strings as absent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.is_empty() && *v != "~")
        .map(str::to_string)
}
