// mod.rs - Core logic module

pub mod anchor;
pub mod code;
pub mod distance;
pub mod engine;
pub mod lock;
pub mod matrix;
pub mod prim;
pub mod threshold;

pub use anchor::anchor_adjust;
pub use code::{derive, derive_code, Derivation};
pub use distance::{pairwise, pairwise_detailed, INF};
pub use engine::{open_debug_log, Engine, EngineOptions};
pub use lock::SchemeLock;
pub use matrix::{build_distance_matrix, DistanceMatrix};
pub use prim::prim_order;
pub use threshold::SchemeThresholds;