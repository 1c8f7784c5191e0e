//! Global constants for sim2sumo.
//!
//! This module centralizes hardcoded values: default locations inside a
//! realization runpath, the simulator datafile conventions and the settings
//! used when talking to the extraction and upload collaborators.

// Configuration
/// Default location of the global variables file, relative to the run directory
pub const DEFAULT_CONFIG_PATH: &str = "fmuconfig/output/global_variables.yml";

/// Key holding the sim2sumo section inside the global variables file
pub const CONFIG_SECTION_KEY: &str = "sim2sumo";

/// Blocks copied verbatim from the global variables file into object metadata
pub const METADATA_BLOCKS: &[&str] = &["masterdata", "access", "model"];

// Datafile discovery
/// Extensions (without the dot) of simulator datafiles, in lookup order.
/// `DATA` covers Eclipse and OPM Flow, `afi` is IX and `in` is PFLOTRAN.
pub const DATAFILE_EXTENSIONS: &[&str] = &["DATA", "afi", "in"];

/// Name of the model directory searched below every simulator directory
/// (`<runpath>/<simulator>/model/`) when no datafile is configured
pub const DEFAULT_MODEL_DIR: &str = "model";

// Grid
/// Restart properties extracted for `grid` unless configured otherwise
pub const DEFAULT_RESTART_PROPERTIES: &[&str] = &["SWAT", "SGAS", "SOIL", "PRESSURE"];

/// Option key holding the restart property list for `grid`
pub const RESTART_PROPERTIES_KEY: &str = "rstprops";

/// Flag of the extraction tool's grid subcommand that receives the
/// restart property list
pub const GRID_VECTORS_FLAG: &str = "vectors";

/// Option keys only meaningful for `grid`
pub const GRID_ONLY_OPTIONS: &[&str] = &[RESTART_PROPERTIES_KEY];

/// Option keys accepted by every datatype. They select the output format
/// and are never passed to the extraction tool.
pub const COMMON_OPTIONS: &[&str] = &["arrow"];

// Extraction
/// External program used by the command extractor
pub const DEFAULT_EXTRACTOR_PROGRAM: &str = "res2csv";

// Upload
/// Default number of units dispatched concurrently
pub const DEFAULT_UPLOAD_THREADS: usize = 5;

/// Directory (relative to the iteration folder) where tables are placed
pub const TABLES_RELATIVE_DIR: &str = "share/results/tables";

// Error messages
pub const ERROR_FAILED_TO_EXTRACT: &str = "Failed to extract results";
pub const ERROR_FAILED_TO_UPLOAD: &str = "Failed to upload object";
pub const ERROR_FAILED_TO_READ_FILE: &str = "Failed to read file";
pub const ERROR_FAILED_TO_WRITE_FILE: &str = "Failed to write file";
