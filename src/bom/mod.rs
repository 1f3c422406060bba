//! Part aggregation: netlist entries to quantity-annotated BOM records
//!
//! Aggregation is a pure function of the entry set. Entries are grouped by
//! canonical key (value + footprint + manufacturer part number, exact and
//! case-sensitive), and the output is sorted by ascending canonical key
//! string, so the same entries in any order always produce the same BOM.

use crate::artifact::netlist::{MountKind, NetlistEntry};

/// Canonical grouping key for identical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartKey {
    pub value: String,
    /// Full "Library:Footprint" identifier; empty when the entry has none
    pub footprint: String,
    /// Absent manufacturer data downgrades the match to value+footprint
    pub mf_pn: Option<String>,
}

impl PartKey {
    fn for_entry(entry: &NetlistEntry) -> Self {
        Self {
            value: entry.value.clone(),
            footprint: entry.footprint.clone().unwrap_or_default(),
            mf_pn: entry.mf_pn.clone(),
        }
    }

    /// Sort key: fields joined with a separator that cannot occur in them.
    pub fn canonical(&self) -> String {
        format!(
            "{}\u{1f}{}\u{1f}{}",
            self.value,
            self.footprint,
            self.mf_pn.as_deref().unwrap_or_default()
        )
    }
}

/// A BOM line: one part type with its quantity and reference designators.
#[derive(Debug, Clone)]
pub struct AggregatedPart {
    pub key: PartKey,
    /// Naturally sorted reference designators
    pub refs: Vec<String>,
    pub description: Option<String>,
    pub datasheet: Option<String>,
    pub mf_name: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_pn: Option<String>,
    pub mount: MountKind,
    /// Set when the entry had no manufacturer part number, so the grouping
    /// is only approximate (value + footprint)
    pub approximate: bool,
}

impl AggregatedPart {
    pub fn quantity(&self) -> usize {
        self.refs.len()
    }

    /// Run-compressed designator list for display, e.g. "R1-R3 R7".
    pub fn refs_display(&self) -> String {
        compress_refs(&self.refs)
    }

    /// Footprint name without the library prefix.
    pub fn footprint_name(&self) -> &str {
        self.key
            .footprint
            .rsplit(':')
            .next()
            .unwrap_or(&self.key.footprint)
    }

    pub fn footprint_lib(&self) -> &str {
        self.key
            .footprint
            .split_once(':')
            .map(|(lib, _)| lib)
            .unwrap_or_default()
    }
}

/// Group entries into sorted, quantity-annotated BOM lines.
pub fn aggregate(entries: &[NetlistEntry]) -> Vec<AggregatedPart> {
    // Sorting up front makes the fold independent of input order, including
    // which entry donates the descriptive fields.
    let mut sorted: Vec<&NetlistEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        PartKey::for_entry(a)
            .canonical()
            .cmp(&PartKey::for_entry(b).canonical())
            .then_with(|| natural_cmp(&a.reference, &b.reference))
    });

    let mut parts: Vec<AggregatedPart> = Vec::new();
    for entry in sorted {
        let key = PartKey::for_entry(entry);
        match parts.last_mut() {
            Some(last) if last.key == key => {
                last.refs.push(entry.reference.clone());
                if last.description.is_none() {
                    last.description = entry.description.clone();
                }
                if last.datasheet.is_none() {
                    last.datasheet = entry.datasheet.clone();
                }
                if last.mf_name.is_none() {
                    last.mf_name = entry.mf_name.clone();
                }
                if last.supplier_name.is_none() {
                    last.supplier_name = entry.supplier_name.clone();
                }
                if last.supplier_pn.is_none() {
                    last.supplier_pn = entry.supplier_pn.clone();
                }
            }
            _ => {
                let approximate = key.mf_pn.is_none();
                parts.push(AggregatedPart {
                    key,
                    refs: vec![entry.reference.clone()],
                    description: entry.description.clone(),
                    datasheet: entry.datasheet.clone(),
                    mf_name: entry.mf_name.clone(),
                    supplier_name: entry.supplier_name.clone(),
                    supplier_pn: entry.supplier_pn.clone(),
                    mount: entry.mount,
                    approximate,
                });
            }
        }
    }

    parts
}

/// Split a designator into its alphabetic prefix and numeric suffix.
fn split_ref(reference: &str) -> Option<(&str, u64)> {
    let digits_at = reference.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = reference.split_at(digits_at);
    if prefix.is_empty() || digits.chars().any(|c| !c.is_ascii_digit()) {
        return None;
    }
    Some((prefix, digits.parse().ok()?))
}

/// Compare designators as (prefix, number) where possible: R2 before R10.
pub fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    match (split_ref(a), split_ref(b)) {
        (Some((pa, na)), Some((pb, nb))) => pa.cmp(pb).then(na.cmp(&nb)),
        _ => a.cmp(b),
    }
}

/// Compress runs of consecutive designators: R1 R2 R3 R7 becomes "R1-R3 R7".
pub fn compress_refs(refs: &[String]) -> String {
    let mut pieces: Vec<String> = Vec::new();
    let mut i = 0;

    while i < refs.len() {
        let Some((prefix, start)) = split_ref(&refs[i]) else {
            pieces.push(refs[i].clone());
            i += 1;
            continue;
        };

        let mut end = start;
        let mut j = i + 1;
        while j < refs.len() {
            match split_ref(&refs[j]) {
                Some((p, n)) if p == prefix && n == end + 1 => {
                    end = n;
                    j += 1;
                }
                _ => break,
            }
        }

        if end > start + 1 {
            pieces.push(format!("{prefix}{start}-{prefix}{end}"));
        } else {
            for n in start..=end {
                pieces.push(format!("{prefix}{n}"));
            }
        }
        i = j;
    }

    pieces.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reference: &str, value: &str, footprint: &str, mf_pn: Option<&str>) -> NetlistEntry {
        NetlistEntry {
            reference: reference.to_string(),
            value: value.to_string(),
            footprint: Some(footprint.to_string()),
            datasheet: None,
            description: None,
            mf_name: None,
            mf_pn: mf_pn.map(str::to_string),
            supplier_name: None,
            supplier_pn: None,
            mount: MountKind::Smt,
        }
    }

    #[test]
    fn test_identical_parts_aggregate_to_one_line() {
        let entries = vec![
            entry("R1", "470", "Resistor_SMD:R_0603", None),
            entry("R2", "470", "Resistor_SMD:R_0603", None),
            entry("LED1", "BLUE-1206", "LED_SMD:LED_1206", Some("APT3216QBC/D")),
        ];

        let parts = aggregate(&entries);
        assert_eq!(parts.len(), 2);

        let resistor = parts.iter().find(|p| p.key.value == "470").unwrap();
        assert_eq!(resistor.quantity(), 2);
        assert_eq!(resistor.refs, ["R1", "R2"]);
        assert!(resistor.approximate);

        let led = parts.iter().find(|p| p.key.value == "BLUE-1206").unwrap();
        assert_eq!(led.quantity(), 1);
        assert_eq!(led.refs, ["LED1"]);
        assert!(!led.approximate);
    }

    #[test]
    fn test_quantity_invariant() {
        let entries = vec![
            entry("R1", "470", "R_0603", None),
            entry("R2", "470", "R_0603", None),
            entry("R3", "1k", "R_0603", None),
            entry("C1", "1uF", "C_0402", Some("GRM155")),
        ];
        let parts = aggregate(&entries);
        let total: usize = parts.iter().map(AggregatedPart::quantity).sum();
        assert_eq!(total, entries.len());
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut entries = vec![
            entry("R10", "470", "R_0603", None),
            entry("R2", "470", "R_0603", None),
            entry("LED1", "BLUE-1206", "LED_1206", Some("APT3216QBC/D")),
            entry("R1", "470", "R_0603", None),
        ];

        let forward = aggregate(&entries);
        entries.reverse();
        let backward = aggregate(&entries);

        let summarize = |parts: &[AggregatedPart]| -> Vec<(String, Vec<String>)> {
            parts
                .iter()
                .map(|p| (p.key.canonical(), p.refs.clone()))
                .collect()
        };
        assert_eq!(summarize(&forward), summarize(&backward));
        // Natural sort: R2 before R10
        let resistor = forward.iter().find(|p| p.key.value == "470").unwrap();
        assert_eq!(resistor.refs, ["R1", "R2", "R10"]);
    }

    #[test]
    fn test_differing_mf_pn_splits_the_group() {
        let entries = vec![
            entry("R1", "470", "R_0603", Some("RC0603-A")),
            entry("R2", "470", "R_0603", Some("RC0603-B")),
        ];
        assert_eq!(aggregate(&entries).len(), 2);
    }

    #[test]
    fn test_case_sensitive_matching() {
        let entries = vec![
            entry("C1", "1uF", "C_0402", None),
            entry("C2", "1uf", "C_0402", None),
        ];
        assert_eq!(aggregate(&entries).len(), 2);
    }

    #[test]
    fn test_output_sorted_by_canonical_key() {
        let entries = vec![
            entry("R1", "470", "R_0603", None),
            entry("C1", "1uF", "C_0402", None),
        ];
        let parts = aggregate(&entries);
        let keys: Vec<String> = parts.iter().map(|p| p.key.canonical()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_compress_refs() {
        let refs = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(compress_refs(&refs(&["R1", "R2", "R3", "R7"])), "R1-R3 R7");
        assert_eq!(compress_refs(&refs(&["R1", "R2"])), "R1 R2");
        assert_eq!(compress_refs(&refs(&["LED1"])), "LED1");
        assert_eq!(
            compress_refs(&refs(&["C1", "C2", "C3", "D1", "D2"])),
            "C1-C3 D1 D2"
        );
        assert_eq!(compress_refs(&refs(&["XTAL"])), "XTAL");
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("R2", "R10"), std::cmp::Ordering::Less);
        assert_eq!(natural_cmp("C1", "R1"), std::cmp::Ordering::Less);
        assert_eq!(natural_cmp("R5", "R5"), std::cmp::Ordering::Equal);
    }
}
