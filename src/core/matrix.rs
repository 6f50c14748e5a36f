// matrix.rs - pairwise distance matrix storage and computation (C4)

use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};
use memmap2::MmapMut;
use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::core::distance::pairwise;
use crate::error::LinCodeError;

/// Square distance matrix over a batch of profiles, stored either entirely
/// in RAM or backed by a memory-mapped scratch file under the scheme's
/// `.tmp` directory.
///
/// The mapped variant owns its `NamedTempFile`; the file is unlinked when
/// this value is dropped, so no separate cleanup pass is needed even on an
/// early return or panic unwind.
pub enum DistanceMatrix {
    Ram { n: usize, data: Vec<f64> },
    Mapped { n: usize, mmap: MmapMut, _file: NamedTempFile },
}

impl DistanceMatrix {
    pub fn n(&self) -> usize {
        match self {
            DistanceMatrix::Ram { n, .. } => *n,
            DistanceMatrix::Mapped { n, .. } => *n,
        }
    }

    #[inline]
    fn index(n: usize, i: usize, j: usize) -> usize {
        i * n + j
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        let n = self.n();
        let idx = Self::index(n, i, j);
        match self {
            DistanceMatrix::Ram { data, .. } => data[idx],
            DistanceMatrix::Mapped { mmap, .. } => {
                let bytes: [u8; 8] = mmap[idx * 8..idx * 8 + 8].try_into().unwrap();
                f64::from_le_bytes(bytes)
            }
        }
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let n = self.n();
        let idx = Self::index(n, i, j);
        match self {
            DistanceMatrix::Ram { data, .. } => data[idx] = value,
            DistanceMatrix::Mapped { mmap, .. } => {
                mmap[idx * 8..idx * 8 + 8].copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    fn new_ram(n: usize) -> Self {
        DistanceMatrix::Ram { n, data: vec![0.0; n * n] }
    }

    fn new_mapped(n: usize, tmp_dir: &std::path::Path) -> Result<Self, LinCodeError> {
        let file = NamedTempFile::new_in(tmp_dir)
            .map_err(|e| LinCodeError::io(format!("creating scratch matrix file in '{}': {}", tmp_dir.display(), e)))?;

        let byte_len = n * n * 8;
        file.as_file()
            .set_len(byte_len as u64)
            .map_err(|e| LinCodeError::io(format!("sizing scratch matrix file: {}", e)))?;
        file.as_file()
            .flush()
            .map_err(|e| LinCodeError::io(format!("flushing scratch matrix file: {}", e)))?;

        let mmap = unsafe { MmapMut::map_mut(file.as_file()) }
            .map_err(|e| LinCodeError::io(format!("memory-mapping scratch matrix file: {}", e)))?;

        Ok(DistanceMatrix::Mapped { n, mmap, _file: file })
    }
}

/// Compute the full pairwise distance matrix for a batch of allelic
/// profiles, parallelized over the upper triangle with rayon, mirroring the
/// way the upstream engine batches its comparisons.
pub fn build_distance_matrix(
    profiles: &[Vec<u32>],
    use_mmap: bool,
    tmp_dir: &std::path::Path,
) -> Result<DistanceMatrix, LinCodeError> {
    build_distance_matrix_with_progress(profiles, use_mmap, tmp_dir, true)
}

/// Same as [`build_distance_matrix`], with the progress bar suppressed when
/// `quiet` is true (propagates the CLI's `--quiet` flag into batch-local
/// matrix computation).
pub fn build_distance_matrix_with_progress(
    profiles: &[Vec<u32>],
    use_mmap: bool,
    tmp_dir: &std::path::Path,
    quiet: bool,
) -> Result<DistanceMatrix, LinCodeError> {
    let n = profiles.len();
    let mut matrix = if use_mmap {
        DistanceMatrix::new_mapped(n, tmp_dir)?
    } else {
        DistanceMatrix::new_ram(n)
    };

    if n == 0 {
        return Ok(matrix);
    }

    let total_comparisons = n * (n - 1) / 2;
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total_comparisons as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    };

    let progress_counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let update_interval = std::cmp::max(1, total_comparisons / 100);

    let upper_triangle: Vec<(usize, usize, f64)> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            let progress_clone = progress_counter.clone();
            let pb_clone = pb.clone();
            (i + 1..n).into_par_iter().map(move |j| {
                let (_, distance) = pairwise(&profiles[i], &profiles[j]);
                let count = progress_clone.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
                if count % update_interval == 0 {
                    pb_clone.set_position(count as u64);
                }
                (i, j, distance)
            })
        })
        .collect();

    pb.finish_and_clear();

    for (i, j, distance) in upper_triangle {
        matrix.set(i, j, distance);
        matrix.set(j, i, distance);
    }

    Ok(matrix)
}
