//! Archive assembly and release verification
//!
//! Builds deterministic zip archives from export files and verifies a
//! release's member set. Verification happens before any archive byte is
//! written, so a failed packaging run never leaves a partial archive
//! behind.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::PipelineError;

/// Extensions KiCad assigns to gerber and drill exports.
pub const GERBER_EXTENSIONS: &[&str] = &[
    "xln", "drl", "gbl", "gtl", "gbo", "gto", "gbs", "gts", "gbr", "gko", "gtp", "gbp", "gm1",
];

/// The subset a stencil fab needs: outline plus both paste layers.
pub const STENCIL_EXTENSIONS: &[&str] = &["gko", "gtp", "gbp"];

/// Collect files under `dir` whose extension is in `extensions`, sorted by
/// path for deterministic archive ordering. Any previously built archives
/// in the directory are skipped by extension.
pub fn collect_by_extension(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    let ext = ext.to_ascii_lowercase();
                    extensions.iter().any(|want| *want == ext)
                })
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// A set of files destined for one archive.
#[derive(Debug, Clone)]
pub struct OutputBundle {
    pub archive: PathBuf,
    pub members: Vec<PathBuf>,
}

impl OutputBundle {
    pub fn new(archive: impl Into<PathBuf>, members: Vec<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            members,
        }
    }

    /// Write the archive with all members stored flat under their file
    /// names.
    pub fn write(&self) -> Result<(), PipelineError> {
        zip_files(&self.archive, &self.members)
    }
}

/// Verify that every expected member exists, reporting all absentees at
/// once rather than the first.
pub fn verify_members(expected: &[PathBuf]) -> Result<(), PipelineError> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|path| !path.is_file())
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::IncompletePackage { missing })
    }
}

/// Create a deflate-compressed zip holding `files`, flattened to their
/// base names.
pub fn zip_files(archive: &Path, files: &[PathBuf]) -> Result<(), PipelineError> {
    let out = File::create(archive).map_err(|e| PipelineError::io(archive, e))?;
    let mut writer = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        writer
            .start_file(&name, options)
            .map_err(|e| PipelineError::io(archive, std::io::Error::other(e)))?;
        let data = std::fs::read(file).map_err(|e| PipelineError::io(file, e))?;
        writer
            .write_all(&data)
            .map_err(|e| PipelineError::io(archive, e))?;
    }

    writer
        .finish()
        .map_err(|e| PipelineError::io(archive, std::io::Error::other(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_collect_by_extension_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("blink-B.Cu.gbl"));
        touch(&tmp.path().join("blink-F.Cu.gtl"));
        touch(&tmp.path().join("blink.drl"));
        touch(&tmp.path().join("notes.txt"));

        let files = collect_by_extension(tmp.path(), GERBER_EXTENSIONS);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["blink-B.Cu.gbl", "blink-F.Cu.gtl", "blink.drl"]);
    }

    #[test]
    fn test_stencil_subset() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("blink-Edge.Cuts.gko"));
        touch(&tmp.path().join("blink-F.Paste.gtp"));
        touch(&tmp.path().join("blink-F.Cu.gtl"));

        let files = collect_by_extension(tmp.path(), STENCIL_EXTENSIONS);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_verify_reports_every_missing_member() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("blink-bom.md");
        touch(&present);

        let err = verify_members(&[
            present,
            tmp.path().join("blink-assy.xyrs"),
            tmp.path().join("blink-gerbers.zip"),
        ])
        .unwrap_err();

        match err {
            PipelineError::IncompletePackage { missing } => {
                assert_eq!(missing, ["blink-assy.xyrs", "blink-gerbers.zip"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zip_is_nonempty_and_deterministic_membership() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.gtl");
        let b = tmp.path().join("b.gbl");
        touch(&a);
        touch(&b);

        let archive = tmp.path().join("out.zip");
        let bundle = OutputBundle::new(&archive, vec![a, b]);
        bundle.write().unwrap();

        let reader = File::open(&archive).unwrap();
        let mut zip = zip::ZipArchive::new(reader).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["a.gtl", "b.gbl"]);
    }

    #[test]
    fn test_zip_missing_member_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("out.zip");
        let err = zip_files(&archive, &[tmp.path().join("absent.gtl")]).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
