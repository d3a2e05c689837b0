//! Test helpers for writing stop files and reading CLI output.

use camino::{Utf8Path, Utf8PathBuf};
use courier_engine::OptimizationSummary;
use tempfile::TempDir;

/// A stop list written into its own temporary directory.
pub(super) struct StopFile {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl StopFile {
    pub(super) fn new(contents: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("stops.txt");
        std::fs::write(&path, contents).expect("write stop file");
        Self { _dir: dir, path }
    }

    pub(super) fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub(super) fn dir(&self) -> &Utf8Path {
        self.path.parent().expect("stop file has a parent")
    }
}

/// Split CLI output into the JSON summary and the trailing status line.
pub(super) fn split_output(bytes: &[u8]) -> (OptimizationSummary, String) {
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 output");
    let trimmed = text.trim_end();
    let (payload, status) = trimmed.rsplit_once('\n').expect("summary and status line");
    let summary = serde_json::from_str(payload).expect("summary JSON");
    (summary, status.to_owned())
}

pub(super) fn diagnostics_text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).expect("utf-8 diagnostics")
}
