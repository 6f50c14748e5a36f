// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file.
    /// CLI arguments take precedence over config file values.
    pub fn merge_with_config(mut self, config: Config) -> Self {
        if self.dir.is_none() {
            self.dir = config.dir;
        }
        if self.scheme_id.is_none() {
            self.scheme_id = config.scheme_id;
        }

        if self.batch_size == 10000 {
            if let Some(v) = config.batch_size {
                self.batch_size = v;
            }
        }
        if self.missing == 0 {
            if let Some(v) = config.missing {
                self.missing = v;
            }
        }
        if self.min.is_none() {
            self.min = config.min;
        }
        if self.max.is_none() {
            self.max = config.max;
        }
        if !self.mmap && config.mmap.unwrap_or(false) {
            self.mmap = true;
        }

        if self.input_profiles.is_none() {
            self.input_profiles = config.input_profiles;
        }
        if self.log.is_none() {
            self.log = config.log;
        }
        if !self.quiet && config.quiet.unwrap_or(false) {
            self.quiet = true;
        }
        if !self.debug && config.debug.unwrap_or(false) {
            self.debug = true;
        }

        self
    }

    /// Load configuration and merge with CLI args.
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
