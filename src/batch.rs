//! Batch driver: find inputs, unpack each one, write canonical outputs.
//!
//! ```no_run
//! use swfnorm::batch::{run, BatchInputs, BatchOptions};
//!
//! let inputs = BatchInputs { dir: Some("samples".into()), file: None };
//! let report = run(&inputs, &BatchOptions::default())?;
//! println!("{} written, {} failed", report.written.len(), report.failed.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every per-file problem (unreadable, truncated, bad zlib, write failure)
//! is logged with its path, recorded in the [`BatchReport`] and skipped.
//! Only setup problems (no input given, output directory not creatable)
//! fail the run.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::UnpackError;
use crate::filter::should_exclude;
use crate::recovery::{unpack_with, DecodedContainer, UnpackOptions};
use crate::repack::write_output;

pub const DEFAULT_EXTENSION:  &str = "swf";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Decoded containers keyed by output file name.
pub type BatchResult = BTreeMap<String, DecodedContainer>;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("{}: {}", .path.display(), .source)]
    Unpack { path: PathBuf, #[source] source: UnpackError },
    #[error("{}: write failed: {}", .path.display(), .source)]
    Write { path: PathBuf, #[source] source: io::Error },
    #[error("duplicate output name '{name}'")]
    DuplicateName { name: String },
    #[error("no input given: need an input directory or a single input file")]
    NoInput,
}

// ── Options ───────────────────────────────────────────────────────────────────

/// What to do when two inputs map to the same output name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Last writer wins.
    #[default]
    Overwrite,
    /// First writer wins; later ones are dropped quietly.
    SkipDuplicate,
    /// First writer wins; later ones are reported as failures.
    ErrorOnDuplicate,
}

impl DuplicatePolicy {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "overwrite" => Some(DuplicatePolicy::Overwrite),
            "skip"      => Some(DuplicatePolicy::SkipDuplicate),
            "error"     => Some(DuplicatePolicy::ErrorOnDuplicate),
            _           => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One file per entry, named after the input.
    Directory(PathBuf),
    /// Exactly this path (single-file mode).
    File(PathBuf),
}

impl OutputTarget {
    pub fn path_for(&self, name: &str) -> PathBuf {
        match self {
            OutputTarget::Directory(dir) => dir.join(name),
            OutputTarget::File(path)     => path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub unpack:       UnpackOptions,
    /// Already-decoded exclude pattern; empty disables the filter.
    pub exclude:      Vec<u8>,
    /// Extension (without the dot) that directory traversal picks up.
    pub extension:    String,
    pub on_duplicate: DuplicatePolicy,
    pub output:       OutputTarget,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            unpack:       UnpackOptions::default(),
            exclude:      Vec::new(),
            extension:    DEFAULT_EXTENSION.to_string(),
            on_duplicate: DuplicatePolicy::default(),
            output:       OutputTarget::Directory(PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchInputs {
    pub dir:  Option<PathBuf>,
    pub file: Option<PathBuf>,
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailedEntry {
    pub path:  String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct BatchReport {
    pub written:  Vec<String>,
    pub excluded: Vec<String>,
    pub failed:   Vec<FailedEntry>,
}

impl BatchReport {
    fn fail(&mut self, err: &BatchError) {
        warn!("{}", err);
        let path = match err {
            BatchError::Unpack { path, .. } | BatchError::Write { path, .. } => path.display().to_string(),
            BatchError::DuplicateName { name } => name.clone(),
            BatchError::NoInput => String::new(),
        };
        self.failed.push(FailedEntry { path, error: err.to_string() });
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ── Stages ────────────────────────────────────────────────────────────────────

/// All files under `dir` whose extension is exactly `extension`, sorted.
/// Unreadable directory entries are logged and skipped.
pub fn discover_inputs(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map_or(false, |ext| ext == extension))
        .collect();
    paths.sort();
    paths
}

/// Open `path` and decode it.  The version byte is taken from the single
/// header read; the source is not reopened.
pub fn process_file(path: &Path, opts: &UnpackOptions) -> Result<DecodedContainer, BatchError> {
    let wrap = |source: UnpackError| BatchError::Unpack { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    let decoded = unpack_with(BufReader::new(file), opts).map_err(wrap)?;
    if decoded.recovery_depth() > 0 {
        info!(
            path = %path.display(),
            depth = decoded.recovery_depth(),
            "recovered embedded container"
        );
    }
    Ok(decoded)
}

fn decode_all(paths: &[PathBuf], opts: &UnpackOptions) -> Vec<Result<DecodedContainer, BatchError>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        paths.par_iter().map(|p| process_file(p, opts)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        paths.iter().map(|p| process_file(p, opts)).collect()
    }
}

/// Decode `paths` and merge them by file name in input order, so the
/// duplicate policy sees the same sequence with or without `parallel`.
pub fn collect(paths: &[PathBuf], opts: &BatchOptions, report: &mut BatchReport) -> BatchResult {
    let mut result = BatchResult::new();
    for (path, decoded) in paths.iter().zip(decode_all(paths, &opts.unpack)) {
        let decoded = match decoded {
            Ok(d)    => d,
            Err(err) => { report.fail(&err); continue; }
        };
        let name = output_name(path);
        if result.contains_key(&name) {
            match opts.on_duplicate {
                DuplicatePolicy::Overwrite => {
                    debug!(name = %name, path = %path.display(), "replacing earlier entry");
                }
                DuplicatePolicy::SkipDuplicate => {
                    debug!(name = %name, path = %path.display(), "skipping duplicate");
                    continue;
                }
                DuplicatePolicy::ErrorOnDuplicate => {
                    report.fail(&BatchError::DuplicateName { name });
                    continue;
                }
            }
        }
        result.insert(name, decoded);
    }
    result
}

/// Filter and write every entry.  Failures are recorded, never returned.
pub fn write_outputs(result: &BatchResult, opts: &BatchOptions, report: &mut BatchReport) {
    for (name, decoded) in result {
        let path = opts.output.path_for(name);
        if should_exclude(&decoded.body, &opts.exclude) {
            info!(path = %path.display(), "excluded by content pattern");
            report.excluded.push(name.clone());
            continue;
        }
        match write_output(&path, decoded) {
            Ok(()) => {
                debug!(path = %path.display(), bytes = decoded.body.len() + 8, "written");
                report.written.push(name.clone());
            }
            Err(source) => report.fail(&BatchError::Write { path, source }),
        }
    }
}

/// Directory entries first, then the single file, as one batch.
pub fn run(inputs: &BatchInputs, opts: &BatchOptions) -> Result<BatchReport, BatchError> {
    if inputs.dir.is_none() && inputs.file.is_none() {
        return Err(BatchError::NoInput);
    }

    let mut paths = Vec::new();
    if let Some(dir) = &inputs.dir {
        info!(dir = %dir.display(), "processing directory");
        paths.extend(discover_inputs(dir, &opts.extension));
    }
    if let Some(file) = &inputs.file {
        info!(file = %file.display(), "processing file");
        paths.push(file.clone());
    }

    let mut report = BatchReport::default();
    let result = collect(&paths, opts, &mut report);

    let out_dir = match &opts.output {
        OutputTarget::Directory(dir) => Some(dir.as_path()),
        OutputTarget::File(path)     => path.parent().filter(|p| !p.as_os_str().is_empty()),
    };
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir)
            .map_err(|source| BatchError::Write { path: dir.to_path_buf(), source })?;
    }

    write_outputs(&result, opts, &mut report);
    info!(
        written = report.written.len(),
        excluded = report.excluded.len(),
        failed = report.failed.len(),
        "batch complete"
    );
    Ok(report)
}

fn output_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repack::repack;
    use tempfile::TempDir;

    #[test]
    fn duplicate_policy_names() {
        assert_eq!(DuplicatePolicy::from_name("overwrite"), Some(DuplicatePolicy::Overwrite));
        assert_eq!(DuplicatePolicy::from_name("SKIP"), Some(DuplicatePolicy::SkipDuplicate));
        assert_eq!(DuplicatePolicy::from_name("error"), Some(DuplicatePolicy::ErrorOnDuplicate));
        assert_eq!(DuplicatePolicy::from_name("merge"), None);
    }

    #[test]
    fn output_target_paths() {
        let dir = OutputTarget::Directory(PathBuf::from("out"));
        assert_eq!(dir.path_for("a.swf"), PathBuf::from("out/a.swf"));
        let file = OutputTarget::File(PathBuf::from("x/fixed.swf"));
        assert_eq!(file.path_for("a.swf"), PathBuf::from("x/fixed.swf"));
    }

    fn two_same_named(tmp: &TempDir) -> Vec<PathBuf> {
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("same.swf"), repack(1, b"first")).unwrap();
        fs::write(b.join("same.swf"), repack(2, b"second")).unwrap();
        discover_inputs(tmp.path(), "swf")
    }

    #[test]
    fn duplicates_follow_policy() {
        let tmp = TempDir::new().unwrap();
        let paths = two_same_named(&tmp);
        assert_eq!(paths.len(), 2);

        let mut opts = BatchOptions::default();
        let mut report = BatchReport::default();
        let r = collect(&paths, &opts, &mut report);
        assert_eq!(r["same.swf"].body, b"second");
        assert!(report.failed.is_empty());

        opts.on_duplicate = DuplicatePolicy::SkipDuplicate;
        let r = collect(&paths, &opts, &mut report);
        assert_eq!(r["same.swf"].body, b"first");
        assert!(report.failed.is_empty());

        opts.on_duplicate = DuplicatePolicy::ErrorOnDuplicate;
        let r = collect(&paths, &opts, &mut report);
        assert_eq!(r["same.swf"].body, b"first");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "same.swf");
    }

    #[test]
    fn discovery_matches_extension_exactly() {
        let tmp = TempDir::new().unwrap();
        for name in ["one.swf", "two.SWF", "three.swf.bak", "four.txt"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }
        fs::create_dir(tmp.path().join("dir.swf")).unwrap();
        let found = discover_inputs(tmp.path(), "swf");
        assert_eq!(found, vec![tmp.path().join("one.swf")]);
    }

    #[test]
    fn no_input_is_an_error() {
        assert!(matches!(
            run(&BatchInputs::default(), &BatchOptions::default()),
            Err(BatchError::NoInput)
        ));
    }
}
