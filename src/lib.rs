// lib.rs - lincode library root

//! # lincode - incremental hierarchical LINcode assignment for bacterial cgMLST profiles
//!
//! Assigns hierarchical, stable taxonomic identifiers (LINcodes) to allelic
//! profiles as they arrive, by comparing each new profile against the
//! already-labeled set and walking a ladder of allelic-difference
//! thresholds to decide how much of the nearest neighbour's code to reuse.
//!
//! ## Features
//!
//! - **Incremental**: new profiles extend the labeled set without
//!   recomputing codes already assigned.
//! - **Restartable**: batched, single-writer, crash-safe append-only store.
//! - **Missing-allele aware**: the distance kernel excludes loci missing in
//!   either profile from its denominator.
//! - **Scales independently of total unlabeled count**: batching bounds the
//!   quadratic cost of the per-batch distance matrix.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use lincode::prelude::*;
//! use std::path::Path;
//!
//! let store = ProfileStore::open(Path::new("scheme"), 1)?;
//! let thresholds = SchemeThresholds::load(&store.thresholds_path(), store.l())?;
//! let options = EngineOptions {
//!     batch_size: 10_000,
//!     min_id: None,
//!     max_id: None,
//!     max_missing: 0,
//!     use_mmap: false,
//!     quiet: false,
//! };
//! let mut engine = Engine::new(&store, &thresholds, options, None);
//! engine.run_to_completion()?;
//! # Ok::<(), LinCodeError>(())
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

pub mod prelude {
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::core::{Engine, EngineOptions, SchemeLock, SchemeThresholds};
    pub use crate::data::ProfileStore;
    pub use crate::error::LinCodeError;
}

pub use data::ProfileStore;
pub use error::LinCodeError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("lincode v{} - incremental hierarchical LINcode assignment", VERSION)
}
