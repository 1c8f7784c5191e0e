//! Test utilities for sim2sumo
//!
//! Builds throwaway realization runpaths on disk for the resolver, planner
//! and metadata tests.

#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Content written to fake simulator datafiles
pub const FAKE_DATAFILE_CONTENT: &[u8] = b"RUNSPEC\nTITLE\n  FAKE\n";

/// A runpath in a temporary directory, removed on drop
pub struct FakeRunpath {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl FakeRunpath {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// A runpath laid out as `<case>/realization-<n>/<iteration>`
    pub fn realization(case: &str, realization: u32, iteration: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir
            .path()
            .join(case)
            .join(format!("realization-{}", realization))
            .join(iteration);
        fs::create_dir_all(&root).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write a file below the runpath, creating parent directories
    pub fn write(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn datafile(&self, relative: &str) -> PathBuf {
        self.write(relative, FAKE_DATAFILE_CONTENT)
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.write(relative, b"not a datafile")
    }
}

impl Default for FakeRunpath {
    fn default() -> Self {
        Self::new()
    }
}
