//! End-to-end tests for the `kf` binary, driving a full project through
//! the pipeline in a temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NETLIST: &str = r#"(export (version "E")
  (design (source "blink.kicad_sch"))
  (components
    (comp (ref "R1")
      (value "470")
      (footprint "Resistor_SMD:R_0603_1608Metric")
      (fields
        (field (name "Type") "smt"))
      (libsource (lib "Device") (part "R") (description "Resistor")))
    (comp (ref "R2")
      (value "470")
      (footprint "Resistor_SMD:R_0603_1608Metric")
      (fields
        (field (name "Type") "smt"))
      (libsource (lib "Device") (part "R") (description "Resistor")))
    (comp (ref "LED1")
      (value "BLUE-1206")
      (footprint "LED_SMD:LED_1206_3216Metric")
      (fields
        (field (name "MF_Name") "Kingbright")
        (field (name "MF_PN") "APT3216QBC/D")
        (field (name "Type") "smt"))
      (libsource (lib "Device") (part "LED") (description "Light emitting diode"))))
  (nets))"#;

const BOARD: &str = r#"(kicad_pcb (version 20230620) (generator "pcbnew")
  (general (thickness 1.6))
  (title_block
    (title "Blink Demo")
    (rev "1.0"))
  (layers
    (0 "F.Cu" signal)
    (31 "B.Cu" signal)
    (44 "Edge.Cuts" user)))"#;

const EDGE_CUTS: &str = "G04 outline*\n\
%FSLAX46Y46*%\n\
%MOMM*%\n\
X0Y0D02*\n\
X25400000Y0D01*\n\
X25400000Y15240000D01*\n\
X0Y15240000D01*\n\
X0Y0D01*\n\
M02*\n";

const POS_TOP: &str = "### Footprint positions\n\
# Ref     Val       Package                PosX       PosY       Rot  Side\n\
R1        470       R_0603_1608Metric    10.1600     5.0800    90.0000  top\n\
R2        470       R_0603_1608Metric    12.7000     5.0800    90.0000  top\n\
LED1      BLUE-1206 LED_1206_3216Metric  20.3200     5.0800   270.0000  top\n\
## End\n";

fn kf(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kf").unwrap();
    cmd.current_dir(cwd);
    // Isolate from the developer's global config
    cmd.env("KF_COMPANY", "Test Co").env("KF_AUTHOR", "tester");
    cmd
}

/// Scaffold a project named "blink" and return its root.
fn scaffold(tmp: &TempDir) -> PathBuf {
    kf(tmp.path())
        .args(["new", "blink", "--description", "An LED blinker"])
        .assert()
        .success();
    tmp.path().join("blink")
}

fn write_netlist(root: &Path) {
    std::fs::write(root.join("blink.net"), NETLIST).unwrap();
}

fn write_board_exports(root: &Path) {
    std::fs::write(root.join("blink.kicad_pcb"), BOARD).unwrap();
    let gerbers = root.join("gerbers");
    std::fs::write(gerbers.join("blink-Edge.Cuts.gko"), EDGE_CUTS).unwrap();
    std::fs::write(gerbers.join("blink-F.Cu.gtl"), "G04 top*\nM02*\n").unwrap();
    std::fs::write(gerbers.join("blink-B.Cu.gbl"), "G04 bottom*\nM02*\n").unwrap();
    std::fs::write(gerbers.join("blink-F.Paste.gtp"), "G04 paste*\nM02*\n").unwrap();
    std::fs::write(gerbers.join("blink.drl"), "M48\nM95\n").unwrap();
}

fn write_placement(root: &Path) {
    std::fs::write(root.join("blink-top.pos"), POS_TOP).unwrap();
}

/// Run the pipeline up to and including `mfr`.
fn run_through_mfr(tmp: &TempDir, root: &Path) {
    write_netlist(root);
    write_board_exports(root);
    kf(tmp.path()).args(["bom", "blink"]).assert().success();
    kf(tmp.path()).args(["mfr", "blink"]).assert().success();
}

#[test]
fn test_new_scaffolds_project() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);

    assert!(root.join("kf.json").is_file());
    assert!(root.join("README.md").is_file());
    assert!(root.join("blink.kicad_sch").is_file());
    assert!(root.join("bom").is_dir());
    assert!(root.join("gerbers").is_dir());

    let readme = std::fs::read_to_string(root.join("README.md")).unwrap();
    assert!(readme.contains("<!-- bom:start -->"));
    assert!(readme.contains("Test Co"));
}

#[test]
fn test_new_refuses_existing_directory() {
    let tmp = TempDir::new().unwrap();
    scaffold(&tmp);

    kf(tmp.path())
        .args(["new", "blink"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_bom_without_netlist_is_missing_artifact() {
    let tmp = TempDir::new().unwrap();
    scaffold(&tmp);

    kf(tmp.path())
        .args(["bom", "blink"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("blink.net"));
}

#[test]
fn test_bom_outside_a_project_is_missing_manifest() {
    let tmp = TempDir::new().unwrap();

    kf(tmp.path())
        .args(["bom"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("kf.json"));
}

#[test]
fn test_bom_generates_csvs_and_markdown() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    write_netlist(&root);

    kf(tmp.path()).args(["bom", "blink"]).assert().success();

    let readable =
        std::fs::read_to_string(root.join("bom/blink-v1.0-bom-readable.csv")).unwrap();
    assert!(readable.contains("R1 R2,2"));
    assert!(readable.contains("APT3216QBC/D"));

    let markdown = std::fs::read_to_string(root.join("bom/blink-v1.0-bom.md")).unwrap();
    assert!(markdown.contains("Generated:"));

    // BOM table spliced into the README between its markers
    let readme = std::fs::read_to_string(root.join("README.md")).unwrap();
    assert!(readme.contains("APT3216QBC/D"));
    assert!(readme.contains("<!-- bom:end -->"));
}

#[test]
fn test_bom_rerun_is_idempotent_for_csv_outputs() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    write_netlist(&root);

    kf(tmp.path()).args(["bom", "blink"]).assert().success();
    let master = root.join("bom/blink-v1.0-bom-master.csv");
    let first = std::fs::read(&master).unwrap();

    kf(tmp.path()).args(["bom", "blink"]).assert().success();
    assert_eq!(first, std::fs::read(&master).unwrap());
}

#[test]
fn test_malformed_netlist_is_reported() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    std::fs::write(root.join("blink.net"), "(export (components (comp").unwrap();

    kf(tmp.path())
        .args(["bom", "blink"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("blink.net"));
}

#[test]
fn test_mfr_without_board_is_missing_artifact() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);

    kf(tmp.path())
        .args(["mfr", "blink"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("blink.kicad_pcb"));

    // A failed run leaves no archives behind
    assert!(!root.join("gerbers/blink-v1.0-gerbers.zip").exists());
}

#[test]
fn test_mfr_builds_notes_and_archives() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    write_netlist(&root);
    write_board_exports(&root);

    kf(tmp.path()).args(["mfr", "blink"]).assert().success();

    let notes = std::fs::read_to_string(root.join("bom/blink-v1.0-fab-notes.md")).unwrap();
    assert!(notes.contains("25.40 x 15.24 mm"));
    assert!(notes.contains("blink-F.Cu.gtl"));

    assert!(root.join("gerbers/blink-v1.0-gerbers.zip").is_file());
    assert!(root.join("gerbers/blink-v1.0-stencil.zip").is_file());
}

#[test]
fn test_assembly_before_mfr_is_a_sequence_error() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    write_netlist(&root);
    write_placement(&root);

    kf(tmp.path())
        .args(["assembly", "blink"])
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("mfr"));
}

#[test]
fn test_assembly_generates_xyrs() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    run_through_mfr(&tmp, &root);
    write_placement(&root);

    kf(tmp.path()).args(["assembly", "blink"]).assert().success();

    let xyrs = std::fs::read_to_string(root.join("bom/blink-v1.0-assy.xyrs")).unwrap();
    assert!(xyrs.starts_with("#Designator"));
    assert!(xyrs.contains("R1\t"));
    assert!(xyrs.contains("LED1\t"));

    let readme = std::fs::read_to_string(root.join("README.md")).unwrap();
    assert!(readme.contains("Placements"));
}

#[test]
fn test_package_with_missing_member_fails_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    run_through_mfr(&tmp, &root);
    write_placement(&root);
    kf(tmp.path()).args(["assembly", "blink"]).assert().success();

    std::fs::remove_file(root.join("bom/blink-v1.0-assy.xyrs")).unwrap();

    kf(tmp.path())
        .args(["package", "blink"])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("blink-v1.0-assy.xyrs"));

    assert!(!root.join("blink-v1.0.zip").exists());
    assert!(!root.join("blink-v1.0-release.md").exists());
}

#[test]
fn test_package_builds_release() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    run_through_mfr(&tmp, &root);
    write_placement(&root);
    kf(tmp.path()).args(["assembly", "blink"]).assert().success();

    kf(tmp.path()).args(["package", "blink"]).assert().success();

    let release = std::fs::read_to_string(root.join("blink-v1.0-release.md")).unwrap();
    assert!(release.contains("Bill of Materials"));
    assert!(release.contains("Fabrication Notes"));

    let archive = std::fs::File::open(root.join("blink-v1.0.zip")).unwrap();
    let mut zip = zip::ZipArchive::new(archive).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"blink-v1.0-bom-master.csv".to_string()));
    assert!(names.contains(&"blink-v1.0-gerbers.zip".to_string()));
    assert!(names.contains(&"blink-v1.0-release.md".to_string()));
}

#[test]
fn test_short_aliases_resolve() {
    let tmp = TempDir::new().unwrap();
    let root = scaffold(&tmp);
    write_netlist(&root);

    kf(tmp.path()).args(["b", "blink"]).assert().success();
}
