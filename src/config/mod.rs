// Re-export all items from the submodules
mod datatypes;
mod global;
mod normalize;
mod options;
mod raw;
mod registry;

// Re-export datatype names and selections
pub use datatypes::{Datatype, DatatypeRequest, DatatypeSelection, ALL_SENTINEL};

// Re-export the global variables document
pub use global::{load_global_config, GlobalConfig};

// Re-export normalization
pub use normalize::{ConfigNormalizer, DatafileEntry, NormalizedConfig, Overrides};

// Re-export options
pub use options::{ExtractionOptions, OptionsTable};

// Re-export the raw section
pub use raw::{RawConfig, RawDatafileEntry, RawDatafiles, RawSection, RawSelection};

// Re-export the registry
pub use registry::{DatatypeRegistry, RegistryEntry};
