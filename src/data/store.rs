// store.rs - profile store (C1): read/append profiles, normalize missing
// alleles, iterate in id order.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::data::profile::{format_lincode, normalize_profile, parse_lincode, LinCode};
use crate::error::LinCodeError;

const LINCODES_HEADER: &str = "profile_id\tlincode\tprofile";

/// Owns the on-disk layout under `<dir>` for one scheme id.
pub struct ProfileStore {
    dir: PathBuf,
    scheme_id: u32,
    pub loci: Vec<String>,
}

impl ProfileStore {
    /// Open a scheme directory, loading the loci file (it fixes `L`).
    pub fn open(dir: &Path, scheme_id: u32) -> Result<Self, LinCodeError> {
        let loci_path = Self::loci_path_for(dir, scheme_id);
        let content = fs::read_to_string(&loci_path).map_err(|e| {
            LinCodeError::config(format!("missing loci file '{}': {}", loci_path.display(), e))
        })?;

        let loci: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();

        if loci.is_empty() {
            return Err(LinCodeError::config(format!(
                "loci file '{}' defines no loci",
                loci_path.display()
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            scheme_id,
            loci,
        })
    }

    pub fn l(&self) -> usize {
        self.loci.len()
    }

    fn loci_path_for(dir: &Path, scheme_id: u32) -> PathBuf {
        dir.join(format!("scheme_{}_loci.txt", scheme_id))
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.dir.join(format!("scheme_{}_profiles.tsv", self.scheme_id))
    }

    pub fn thresholds_path(&self) -> PathBuf {
        self.dir.join(format!("scheme_{}_thresholds.txt", self.scheme_id))
    }

    pub fn lincodes_path(&self) -> PathBuf {
        self.dir.join(format!("scheme_{}_lincodes.tsv", self.scheme_id))
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.dir.join(".locks")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.dir.join(".tmp")
    }

    /// Yield up to `limit` unlabeled profiles, in id order as stored, skipping
    /// ids in `exclude`, profiles whose missing-allele count exceeds
    /// `max_missing`, and ids outside `[min_id, max_id]`.
    pub fn iterate_profiles(
        &self,
        min_id: Option<i64>,
        max_id: Option<i64>,
        max_missing: usize,
        exclude: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<(String, Vec<u32>)>, LinCodeError> {
        let path = self.profiles_path();
        let file = File::open(&path)
            .map_err(|e| LinCodeError::config(format!("missing profile file '{}': {}", path.display(), e)))?;
        let mut lines = BufReader::new(file).lines();

        lines.next(); // header

        let mut out = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if out.len() >= limit {
                break;
            }
            let line = line.map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, '\t');
            let id = parts
                .next()
                .ok_or_else(|| LinCodeError::config(format!("'{}' line {}: missing id field", path.display(), line_no + 2)))?
                .to_string();
            let alleles_field = parts.next().unwrap_or("");

            if exclude.contains(&id) {
                continue;
            }

            if let (Some(lo), Some(hi)) = (min_id, max_id) {
                if let Ok(numeric) = id.parse::<i64>() {
                    if numeric < lo || numeric > hi {
                        continue;
                    }
                }
            } else if let Some(lo) = min_id {
                if let Ok(numeric) = id.parse::<i64>() {
                    if numeric < lo {
                        continue;
                    }
                }
            } else if let Some(hi) = max_id {
                if let Ok(numeric) = id.parse::<i64>() {
                    if numeric > hi {
                        continue;
                    }
                }
            }

            let raw_tokens: Vec<&str> = alleles_field.split(',').collect();
            if raw_tokens.len() != self.l() {
                return Err(LinCodeError::config(format!(
                    "'{}' line {}: profile '{}' has {} alleles, expected {}",
                    path.display(),
                    line_no + 2,
                    id,
                    raw_tokens.len(),
                    self.l()
                )));
            }

            let alleles = normalize_profile(&raw_tokens)
                .map_err(|e| LinCodeError::config(format!("'{}' line {}: {}", path.display(), line_no + 2, e)))?;

            let missing = alleles.iter().filter(|&&a| a == 0).count();
            if missing > max_missing {
                continue;
            }

            out.push((id, alleles));
        }

        Ok(out)
    }

    /// Whether `id` already has a LINcode on disk.
    pub fn has_label(&self, id: &str) -> Result<bool, LinCodeError> {
        let path = self.lincodes_path();
        if !path.exists() {
            return Ok(false);
        }
        let file = File::open(&path).map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
        let mut lines = BufReader::new(file).lines();
        lines.next(); // header
        for line in lines {
            let line = line.map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
            if let Some(found_id) = line.split('\t').next() {
                if found_id == id {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Load the full labeled set from disk, in file order (insertion order).
    pub fn load_labeled(&self) -> Result<Vec<(String, Vec<u32>, LinCode)>, LinCodeError> {
        let path = self.lincodes_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path).map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
        let mut lines = BufReader::new(file).lines();
        lines.next(); // header

        let mut out = Vec::new();
        for (line_no, line) in lines.enumerate() {
            let line = line.map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                return Err(LinCodeError::config(format!(
                    "'{}' line {}: expected 3 columns, got {}",
                    path.display(),
                    line_no + 2,
                    fields.len()
                )));
            }
            let id = fields[0].to_string();
            let code = parse_lincode(fields[1])
                .map_err(|e| LinCodeError::config(format!("'{}' line {}: {}", path.display(), line_no + 2, e)))?;
            let raw_tokens: Vec<&str> = fields[2].split(',').collect();
            let profile = normalize_profile(&raw_tokens)
                .map_err(|e| LinCodeError::config(format!("'{}' line {}: {}", path.display(), line_no + 2, e)))?;
            out.push((id, profile, code));
        }
        Ok(out)
    }

    /// Append one (id, profile, code) record. Atomic with respect to readers:
    /// the whole line is built in memory and written with a single `write_all`
    /// call, so a partial append is never observed. Writes the header on the
    /// very first append.
    pub fn append_labeled(&self, id: &str, profile: &[u32], code: &LinCode) -> Result<(), LinCodeError> {
        let path = self.lincodes_path();
        let needs_header = !path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LinCodeError::io(format!("appending to '{}': {}", path.display(), e)))?;

        let mut buf = String::new();
        if needs_header {
            buf.push_str(LINCODES_HEADER);
            buf.push('\n');
        }
        buf.push_str(id);
        buf.push('\t');
        buf.push_str(&format_lincode(code));
        buf.push('\t');
        buf.push_str(
            &profile
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        );
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .map_err(|e| LinCodeError::io(format!("appending to '{}': {}", path.display(), e)))?;
        file.flush().map_err(|e| LinCodeError::io(format!("flushing '{}': {}", path.display(), e)))?;
        Ok(())
    }

    /// Append new profiles from an input TSV before assignment begins.
    /// Duplicates (by id) already present in the store are skipped without
    /// error. Returns the number of rows actually appended.
    pub fn append_new_profiles(&self, input_path: &Path) -> Result<usize, LinCodeError> {
        let existing_ids = self.existing_profile_ids()?;

        let input = File::open(input_path)
            .map_err(|e| LinCodeError::config(format!("missing input profiles file '{}': {}", input_path.display(), e)))?;
        let mut lines = BufReader::new(input).lines();
        lines.next(); // header

        let profiles_path = self.profiles_path();
        let needs_header = !profiles_path.exists();
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&profiles_path)
            .map_err(|e| LinCodeError::io(format!("appending to '{}': {}", profiles_path.display(), e)))?;

        if needs_header {
            let mut header = String::from("id\t");
            header.push_str(&self.loci.join(","));
            header.push('\n');
            out.write_all(header.as_bytes())
                .map_err(|e| LinCodeError::io(format!("writing header to '{}': {}", profiles_path.display(), e)))?;
        }

        let mut appended = 0usize;
        for line in lines {
            let line = line.map_err(|e| LinCodeError::io(format!("reading '{}': {}", input_path.display(), e)))?;
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, '\t');
            let id = parts.next().unwrap_or("").to_string();
            if id.is_empty() || existing_ids.contains(&id) {
                continue;
            }
            let alleles_field = parts.next().unwrap_or("");
            // The field may be tab- or comma-separated; normalize to comma form.
            let comma_form = if alleles_field.contains('\t') {
                alleles_field.replace('\t', ",")
            } else {
                alleles_field.to_string()
            };

            let mut row = id;
            row.push('\t');
            row.push_str(&comma_form);
            row.push('\n');
            out.write_all(row.as_bytes())
                .map_err(|e| LinCodeError::io(format!("appending to '{}': {}", profiles_path.display(), e)))?;
            appended += 1;
        }
        out.flush().map_err(|e| LinCodeError::io(format!("flushing '{}': {}", profiles_path.display(), e)))?;
        Ok(appended)
    }

    fn existing_profile_ids(&self) -> Result<HashSet<String>, LinCodeError> {
        let path = self.profiles_path();
        if !path.exists() {
            return Ok(HashSet::new());
        }
        let file = File::open(&path).map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
        let mut lines = BufReader::new(file).lines();
        lines.next();
        let mut ids = HashSet::new();
        for line in lines {
            let line = line.map_err(|e| LinCodeError::io(format!("reading '{}': {}", path.display(), e)))?;
            if let Some(id) = line.split('\t').next() {
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scheme(dir: &Path, loci: usize, profiles: &[(&str, &str)]) -> ProfileStore {
        fs::write(dir.join("scheme_1_loci.txt"), (0..loci).map(|i| format!("locus{}\n", i)).collect::<String>()).unwrap();
        let mut body = String::from("id\talleles\n");
        for (id, alleles) in profiles {
            body.push_str(id);
            body.push('\t');
            body.push_str(alleles);
            body.push('\n');
        }
        fs::write(dir.join("scheme_1_profiles.tsv"), body).unwrap();
        ProfileStore::open(dir, 1).unwrap()
    }

    #[test]
    fn iterates_and_filters_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = scheme(
            tmp.path(),
            4,
            &[("1", "1,1,1,1"), ("2", "1,1,1,N")],
        );
        let exclude = HashSet::new();
        let got = store.iterate_profiles(None, None, 0, &exclude, 10).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].0, "1");

        let got_all = store.iterate_profiles(None, None, 1, &exclude, 10).unwrap();
        assert_eq!(got_all.len(), 2);
    }

    #[test]
    fn append_then_reload_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = scheme(tmp.path(), 2, &[("1", "1,1")]);
        store.append_labeled("1", &[1, 1], &vec![0, 0]).unwrap();
        let labeled = store.load_labeled().unwrap();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].0, "1");
        assert_eq!(labeled[0].2, vec![0, 0]);
        assert!(store.has_label("1").unwrap());
        assert!(!store.has_label("2").unwrap());
    }

    #[test]
    fn rejects_width_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = scheme(tmp.path(), 4, &[("1", "1,1")]);
        let exclude = HashSet::new();
        assert!(store.iterate_profiles(None, None, 0, &exclude, 10).is_err());
    }
}
