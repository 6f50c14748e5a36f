// threshold.rs - threshold model (C2)

use std::fs;
use std::path::Path;

use crate::error::LinCodeError;

/// Parsed, cached scheme thresholds: the allelic-difference cut-offs and
/// their derived identity percentages.
#[derive(Debug, Clone)]
pub struct SchemeThresholds {
    pub diffs: Vec<i64>,
    pub identity: Vec<f64>,
}

impl SchemeThresholds {
    /// Parse `scheme_<S>_thresholds.txt`: a single semicolon-separated line
    /// of integers, optional whitespace. Fails if empty, non-monotonic, or
    /// non-integral.
    pub fn load(path: &Path, l: usize) -> Result<Self, LinCodeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LinCodeError::config(format!("missing thresholds file '{}': {}", path.display(), e))
        })?;

        let line = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| LinCodeError::config(format!("thresholds file '{}' is empty", path.display())))?;

        let diffs: Vec<i64> = line
            .split(';')
            .map(|tok| {
                tok.trim()
                    .parse::<i64>()
                    .map_err(|_| LinCodeError::config(format!("threshold token '{}' in '{}' is not an integer", tok, path.display())))
            })
            .collect::<Result<_, _>>()?;

        Self::from_diffs(diffs, l, path)
    }

    fn from_diffs(diffs: Vec<i64>, l: usize, path: &Path) -> Result<Self, LinCodeError> {
        if diffs.is_empty() {
            return Err(LinCodeError::config(format!("thresholds file '{}' defines no thresholds", path.display())));
        }
        if !diffs.windows(2).all(|w| w[0] < w[1]) {
            return Err(LinCodeError::config(format!(
                "thresholds in '{}' are not strictly increasing: {:?}",
                path.display(),
                diffs
            )));
        }

        let identity = diffs
            .iter()
            .map(|&t| 100.0 * (l as f64 - t as f64) / l as f64)
            .collect();

        Ok(Self { diffs, identity })
    }

    pub fn k(&self) -> usize {
        self.diffs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_thresholds(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("thresholds.txt");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_and_derives_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_thresholds(tmp.path(), "1;2\n");
        let t = SchemeThresholds::load(&path, 4).unwrap();
        assert_eq!(t.diffs, vec![1, 2]);
        assert_eq!(t.identity, vec![75.0, 50.0]);
        assert_eq!(t.k(), 2);
    }

    #[test]
    fn rejects_non_monotonic() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_thresholds(tmp.path(), "4;2\n");
        assert!(SchemeThresholds::load(&path, 4).is_err());
    }

    #[test]
    fn rejects_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_thresholds(tmp.path(), "\n");
        assert!(SchemeThresholds::load(&path, 4).is_err());
    }

    #[test]
    fn rejects_non_integer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_thresholds(tmp.path(), "1;x\n");
        assert!(SchemeThresholds::load(&path, 4).is_err());
    }
}
