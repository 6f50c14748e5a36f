// mod.rs - data structures module (C1: profile store)

pub mod profile;
pub mod store;

pub use profile::{
    format_lincode, normalize_allele, normalize_profile, parse_lincode, LabeledEntry, LabeledSet,
    LinCode, MISSING,
};
pub use store::ProfileStore;
