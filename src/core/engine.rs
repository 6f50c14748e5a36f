// engine.rs - batched assignment loop (C8)

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use crate::core::anchor::anchor_adjust;
use crate::core::code::{derive, Derivation};
use crate::core::matrix::build_distance_matrix_with_progress;
use crate::core::prim::prim_order;
use crate::core::threshold::SchemeThresholds;
use crate::data::{format_lincode, LabeledSet, ProfileStore, MISSING};
use crate::error::LinCodeError;

/// Tunable knobs for one run of the assignment loop.
pub struct EngineOptions {
    pub batch_size: usize,
    pub min_id: Option<i64>,
    pub max_id: Option<i64>,
    pub max_missing: usize,
    pub use_mmap: bool,
    pub quiet: bool,
    pub debug: bool,
}

/// Drives the batched, restartable assignment loop. Owns the profile store
/// and the in-memory labeled set, which is reloaded from disk between
/// batches so a crash mid-batch resumes correctly.
pub struct Engine<'a> {
    store: &'a ProfileStore,
    thresholds: &'a SchemeThresholds,
    options: EngineOptions,
    debug_log: Option<std::fs::File>,
}

impl<'a> Engine<'a> {
    pub fn new(
        store: &'a ProfileStore,
        thresholds: &'a SchemeThresholds,
        options: EngineOptions,
        debug_log: Option<std::fs::File>,
    ) -> Self {
        Self { store, thresholds, options, debug_log }
    }

    /// Run to completion: repeatedly pull batches of unlabeled profiles
    /// until none remain. Returns the total number of profiles labeled.
    pub fn run_to_completion(&mut self) -> Result<usize, LinCodeError> {
        let mut labeled = self.reload_labeled()?;
        let mut total = 0usize;

        loop {
            let exclude: HashSet<String> = labeled.entries().iter().map(|e| e.id.clone()).collect();
            let batch = self.store.iterate_profiles(
                self.options.min_id,
                self.options.max_id,
                self.options.max_missing,
                &exclude,
                self.options.batch_size,
            )?;

            if batch.is_empty() {
                break;
            }

            let order = self.order_batch(&batch, &labeled)?;

            for idx in order {
                let (id, profile) = &batch[idx];
                let derivation = derive(&labeled, profile, self.thresholds);

                if !self.options.quiet {
                    println!("assigned {} -> {}", id, format_lincode(&derivation.code));
                }
                if self.options.debug && !self.options.quiet {
                    println!(
                        "  closest={} diffs={} common={} missing_in_either={} distance={:.4}",
                        derivation.closest_id.as_deref().unwrap_or("-"),
                        derivation.diffs,
                        derivation.common_alleles,
                        derivation.missing_in_either,
                        derivation.distance
                    );
                }
                self.trace(id, profile, &derivation)?;

                self.store.append_labeled(id, profile, &derivation.code)?;
                labeled.push(id.clone(), profile.clone(), derivation.code);
                total += 1;
            }

            // Restart condition: reload from disk before the next batch so a
            // crash mid-batch leaves a consistent resume point.
            labeled = self.reload_labeled()?;
        }

        Ok(total)
    }

    fn reload_labeled(&self) -> Result<LabeledSet, LinCodeError> {
        let mut set = LabeledSet::new();
        for (id, profile, code) in self.store.load_labeled()? {
            set.push(id, profile, code);
        }
        Ok(set)
    }

    fn order_batch(&self, batch: &[(String, Vec<u32>)], labeled: &LabeledSet) -> Result<Vec<usize>, LinCodeError> {
        let order = if batch.len() > 1 {
            let profiles: Vec<Vec<u32>> = batch.iter().map(|(_, p)| p.clone()).collect();
            let tmp_dir = self.store.tmp_dir();
            std::fs::create_dir_all(&tmp_dir)
                .map_err(|e| LinCodeError::io(format!("creating temp directory '{}': {}", tmp_dir.display(), e)))?;
            let matrix = build_distance_matrix_with_progress(&profiles, self.options.use_mmap, &tmp_dir, self.options.quiet)?;
            let prim = prim_order(&matrix);
            if labeled.is_empty() {
                prim
            } else {
                anchor_adjust(labeled, &prim, &profiles)
            }
        } else {
            (0..batch.len()).collect()
        };
        Ok(order)
    }

    /// Append one line to the debug log, if one is open. Columns:
    /// `profile_id, closest_profile_id, common_alleles, missing_alleles,
    /// missing_in_either, identity, distance, chosen_prefix, new_lincode`.
    fn trace(&mut self, id: &str, profile: &[u32], derivation: &Derivation) -> Result<(), LinCodeError> {
        let Some(log) = self.debug_log.as_mut() else {
            return Ok(());
        };

        let missing_alleles = profile.iter().filter(|&&a| a == MISSING).count();
        let identity = 100.0 - derivation.distance;
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{}\t{}\n",
            id,
            derivation.closest_id.as_deref().unwrap_or("-"),
            derivation.common_alleles,
            missing_alleles,
            derivation.missing_in_either,
            identity,
            derivation.distance,
            format_lincode(&derivation.chosen_prefix),
            format_lincode(&derivation.code),
        );
        log.write_all(line.as_bytes())
            .map_err(|e| LinCodeError::io(format!("writing debug log: {}", e)))?;
        Ok(())
    }
}

/// Per-scheme debug log path, opened in append mode so multiple runs
/// accumulate a single trace file.
pub fn open_debug_log(path: &Option<PathBuf>) -> Result<Option<std::fs::File>, LinCodeError> {
    match path {
        None => Ok(None),
        Some(path) => {
            crate::output::write_debug_log_header_if_new(path)?;
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LinCodeError::io(format!("opening debug log '{}': {}", path.display(), e)))?;
            Ok(Some(file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_scheme(dir: &std::path::Path, loci: usize, profiles: &[(&str, &str)]) {
        fs::write(dir.join("scheme_1_loci.txt"), (0..loci).map(|i| format!("locus{}\n", i)).collect::<String>()).unwrap();
        let mut body = String::from("id\talleles\n");
        for (id, alleles) in profiles {
            body.push_str(id);
            body.push('\t');
            body.push_str(alleles);
            body.push('\n');
        }
        fs::write(dir.join("scheme_1_profiles.tsv"), body).unwrap();
        fs::write(dir.join("scheme_1_thresholds.txt"), "1;2\n").unwrap();
    }

    #[test]
    fn labels_every_profile_exactly_once() {
        let tmp = tempfile::tempdir().unwrap();
        write_scheme(
            tmp.path(),
            4,
            &[("1", "1,1,1,1"), ("2", "1,1,1,2"), ("3", "2,2,2,2")],
        );
        let store = ProfileStore::open(tmp.path(), 1).unwrap();
        let thresholds = SchemeThresholds::load(&store.thresholds_path(), store.l()).unwrap();

        let options = EngineOptions {
            batch_size: 10,
            min_id: None,
            max_id: None,
            max_missing: 0,
            use_mmap: false,
            quiet: true,
            debug: false,
        };
        let mut engine = Engine::new(&store, &thresholds, options, None);
        let total = engine.run_to_completion().unwrap();
        assert_eq!(total, 3);

        let labeled = store.load_labeled().unwrap();
        assert_eq!(labeled.len(), 3);
    }

    #[test]
    fn resumes_without_relabeling_existing() {
        let tmp = tempfile::tempdir().unwrap();
        write_scheme(tmp.path(), 4, &[("1", "1,1,1,1"), ("2", "1,1,1,2")]);
        let store = ProfileStore::open(tmp.path(), 1).unwrap();
        let thresholds = SchemeThresholds::load(&store.thresholds_path(), store.l()).unwrap();

        let opts = || EngineOptions {
            batch_size: 10,
            min_id: None,
            max_id: None,
            max_missing: 0,
            use_mmap: false,
            quiet: true,
            debug: false,
        };

        let mut engine = Engine::new(&store, &thresholds, opts(), None);
        engine.run_to_completion().unwrap();

        let mut engine2 = Engine::new(&store, &thresholds, opts(), None);
        let total = engine2.run_to_completion().unwrap();
        assert_eq!(total, 0);
    }
}
