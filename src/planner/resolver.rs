//! Resolution of configured datafile entries against a realization runpath.
//!
//! An entry can be a datafile, a file next to one (`CASE.UNSMRY`), a stub
//! without extension, a directory, or a bare case name. Every form ends up as
//! a canonical absolute path to a simulator datafile.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{DatafileEntry, DatatypeSelection, OptionsTable};
use crate::constants::{DATAFILE_EXTENSIONS, DEFAULT_MODEL_DIR};
use crate::error::{PlanError, PlanResult};

/// A resolved datafile together with the selection it was configured with
#[derive(Debug, Clone, PartialEq)]
pub struct DatafileSpec {
    /// Canonical absolute path
    pub path: PathBuf,
    pub selection: DatatypeSelection,
    pub options: OptionsTable,
    /// The configuration entry this file was resolved from
    pub entry: String,
}

/// Check whether a path carries one of the simulator datafile extensions
pub fn is_datafile(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| DATAFILE_EXTENSIONS.contains(&ext))
}

pub struct DatafileResolver {
    runpath: PathBuf,
}

impl DatafileResolver {
    pub fn new(runpath: impl Into<PathBuf>) -> Self {
        Self {
            runpath: runpath.into(),
        }
    }

    pub fn runpath(&self) -> &Path {
        &self.runpath
    }

    /// Resolve every entry, in order, dropping repeated paths.
    ///
    /// No entries means default discovery with inherited selections.
    pub fn resolve(&self, entries: &[DatafileEntry]) -> PlanResult<Vec<DatafileSpec>> {
        let mut specs = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        if entries.is_empty() {
            for path in self.discover()? {
                push_unique(&mut specs, &mut seen, path, &DatafileEntry::inheriting(""));
            }
            info!("Discovered {} datafile(s) below {}", specs.len(), self.runpath.display());
            return Ok(specs);
        }

        for entry in entries {
            for path in self.resolve_entry(&entry.seed)? {
                push_unique(&mut specs, &mut seen, path, entry);
            }
        }
        info!("Resolved {} datafile(s) from {} entries", specs.len(), entries.len());
        Ok(specs)
    }

    /// Datafiles in `<runpath>/*/model/`, sorted. Finding none is an error.
    pub fn discover(&self) -> PlanResult<Vec<PathBuf>> {
        let found = self.discover_candidates();
        if found.is_empty() {
            return Err(PlanError::resolution(
                self.runpath.display().to_string(),
                format!("no datafiles found in */{}/", DEFAULT_MODEL_DIR),
            ));
        }
        found
            .into_iter()
            .map(|path| canonical(&path, &path.display().to_string()))
            .collect()
    }

    fn discover_candidates(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.runpath)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable path during discovery: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.parent()
                    .and_then(Path::file_name)
                    .map_or(false, |name| name == DEFAULT_MODEL_DIR)
            })
            .filter(|path| is_datafile(path))
            .collect()
    }

    /// Resolve one entry to one or more datafiles
    pub fn resolve_entry(&self, seed: &str) -> PlanResult<Vec<PathBuf>> {
        let path = self.runpath.join(seed);
        debug!("Resolving datafile entry '{}' as {}", seed, path.display());

        if path.is_dir() {
            return self.datafiles_in_directory(&path, seed);
        }

        if path.is_file() {
            if is_datafile(&path) {
                return Ok(vec![canonical(&path, seed)?]);
            }
            return match sibling_datafile(&path) {
                Some(sibling) => {
                    debug!("Using {} instead of {}", sibling.display(), path.display());
                    Ok(vec![canonical(&sibling, seed)?])
                }
                None => Err(PlanError::resolution(
                    seed,
                    format!(
                        "not a datafile and no sibling with extension {} exists",
                        extension_list()
                    ),
                )),
            };
        }

        if !is_datafile(&path) {
            if let Some(completed) = complete_stub(&path) {
                return Ok(vec![canonical(&completed, seed)?]);
            }
        }

        if is_bare_name(seed) {
            let matches = self.match_bare_name(seed);
            if !matches.is_empty() {
                debug!("Bare name '{}' matched {} discovered datafile(s)", seed, matches.len());
                return matches.iter().map(|found| canonical(found, seed)).collect();
            }
        }

        Err(PlanError::resolution(
            seed,
            format!(
                "no such file, directory or stub ({} tried) below {}",
                extension_list(),
                self.runpath.display()
            ),
        ))
    }

    fn datafiles_in_directory(&self, dir: &Path, seed: &str) -> PlanResult<Vec<PathBuf>> {
        let found: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_datafile(path))
            .collect();

        if found.is_empty() {
            return Err(PlanError::resolution(
                seed,
                format!("directory contains no datafiles ({})", extension_list()),
            ));
        }
        found.iter().map(|path| canonical(path, seed)).collect()
    }

    fn match_bare_name(&self, name: &str) -> Vec<PathBuf> {
        self.discover_candidates()
            .into_iter()
            .filter(|path| {
                let file_name = path.file_name().and_then(|n| n.to_str());
                let stem = path.file_stem().and_then(|n| n.to_str());
                file_name == Some(name) || stem == Some(name)
            })
            .collect()
    }
}

fn push_unique(
    specs: &mut Vec<DatafileSpec>,
    seen: &mut HashSet<PathBuf>,
    path: PathBuf,
    entry: &DatafileEntry,
) {
    if !seen.insert(path.clone()) {
        warn!(
            "Datafile {} is listed more than once, keeping the first occurrence",
            path.display()
        );
        return;
    }
    let entry_text = if entry.seed.is_empty() {
        path.display().to_string()
    } else {
        entry.seed.clone()
    };
    specs.push(DatafileSpec {
        path,
        selection: entry.selection.clone(),
        options: entry.options.clone(),
        entry: entry_text,
    });
}

fn canonical(path: &Path, seed: &str) -> PlanResult<PathBuf> {
    fs::canonicalize(path).map_err(|e| {
        PlanError::resolution(seed, format!("cannot canonicalize {}: {}", path.display(), e))
    })
}

/// `CASE.UNSMRY` -> `CASE.DATA` (or `.afi`, `.in`) when that file exists
fn sibling_datafile(path: &Path) -> Option<PathBuf> {
    DATAFILE_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// `model/CASE` -> `model/CASE.DATA` for the first extension that exists
fn complete_stub(path: &Path) -> Option<PathBuf> {
    DATAFILE_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut name: OsString = path.as_os_str().to_owned();
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        })
        .find(|candidate| candidate.is_file())
}

fn is_bare_name(seed: &str) -> bool {
    Path::new(seed).components().count() == 1
}

fn extension_list() -> String {
    DATAFILE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}
