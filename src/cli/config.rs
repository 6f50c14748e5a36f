// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub dir: Option<String>,
    pub scheme_id: Option<u32>,

    pub batch_size: Option<usize>,
    pub missing: Option<usize>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub mmap: Option<bool>,

    pub input_profiles: Option<String>,
    pub log: Option<String>,

    pub quiet: Option<bool>,
    pub debug: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# lincode.toml - Configuration file for lincode
# Command line arguments will override these settings

# =============================================================================
# SCHEME LOCATION
# =============================================================================

# Scheme directory holding scheme_<id>_{loci,profiles,thresholds,lincodes} files
dir = "/path/to/scheme"

# Scheme id
scheme_id = 1

# =============================================================================
# BATCHING
# =============================================================================

# Maximum unlabeled profiles pulled per batch
batch_size = 10000

# Maximum missing alleles tolerated per profile before it is skipped
missing = 0

# Numeric profile id range to consider (omit for unbounded)
# min = 1
# max = 100000

# Memory-map the scratch distance matrix instead of keeping it in RAM
mmap = false

# =============================================================================
# INPUT
# =============================================================================

# TSV file of new profiles to append to the store before assignment begins
# input_profiles = "new_profiles.tsv"

# Append a per-assignment debug trace to this file
# log = "assignment.log"

# =============================================================================
# OUTPUT
# =============================================================================

# Suppress per-assignment progress lines
quiet = false

# Print extra per-assignment diagnostics
debug = false
"#
        .to_string()
    }
}
