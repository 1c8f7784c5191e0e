//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tempfile::TempDir;

/// Write `relative` below `root`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn datafile(root: &Path, relative: &str) -> PathBuf {
    write_file(root, relative, "RUNSPEC\n")
}

/// `<tmp>/<case>/realization-<n>/iter-0`, returned with its guard
pub fn realization(case: &str, realization: u32) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir
        .path()
        .join(case)
        .join(format!("realization-{}", realization))
        .join("iter-0");
    fs::create_dir_all(&root).unwrap();
    (temp_dir, root)
}

/// Parse a `sim2sumo` section
pub fn section(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}
