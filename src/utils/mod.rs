//! Utility functions for run reporting and payload integrity.
//!
//! ## Components
//!
//! - **Hashing**: SHA-256 of extracted payloads and exported files
//! - **Summary**: JSON run and plan reports
//!
//! ### Hashing a Payload
//!
//! ```no_run
//! use sim2sumo::utils::hash::sha256_bytes;
//!
//! let checksum = sha256_bytes(b"DATE,FOPT\n2020-01-01,0.0\n");
//! println!("SHA-256: {}", checksum);
//! ```

/// Run and plan summary generation
pub mod summary;

/// Cryptographic hash calculation utilities
pub mod hash;
