// mod.rs - scheme scaffold and debug-log output helpers

use std::fs;
use std::path::Path;

use crate::error::LinCodeError;

fn ensure_parent_dir(path: &Path) -> Result<(), LinCodeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| LinCodeError::io(format!("creating directory '{}': {}", parent.display(), e)))?;
        }
    }
    Ok(())
}

/// Scaffold a fresh scheme directory: commented stub loci and thresholds
/// files, so an operator can fill in the scheme definition before the first
/// run (`--create`).
pub fn create_scheme(dir: &Path, scheme_id: u32) -> Result<(), LinCodeError> {
    fs::create_dir_all(dir).map_err(|e| LinCodeError::io(format!("creating scheme directory '{}': {}", dir.display(), e)))?;

    let loci_path = dir.join(format!("scheme_{}_loci.txt", scheme_id));
    let thresholds_path = dir.join(format!("scheme_{}_thresholds.txt", scheme_id));

    if !loci_path.exists() {
        ensure_parent_dir(&loci_path)?;
        fs::write(&loci_path, "# one locus name per line\n")
            .map_err(|e| LinCodeError::io(format!("writing '{}': {}", loci_path.display(), e)))?;
    }

    if !thresholds_path.exists() {
        ensure_parent_dir(&thresholds_path)?;
        fs::write(&thresholds_path, "# semicolon-separated, strictly increasing allelic-difference thresholds, e.g. 1;2;5;10\n")
            .map_err(|e| LinCodeError::io(format!("writing '{}': {}", thresholds_path.display(), e)))?;
    }

    println!("📁 Created scheme scaffold in '{}'", dir.display());
    println!("   edit {} and {} before running assignment", loci_path.display(), thresholds_path.display());
    Ok(())
}

const DEBUG_LOG_HEADER: &str =
    "profile_id\tclosest_profile_id\tcommon_alleles\tmissing_alleles\tmissing_in_either\tidentity\tdistance\tchosen_prefix\tnew_lincode";

/// Write the debug-log header if the file is newly created (empty).
pub fn write_debug_log_header_if_new(path: &Path) -> Result<(), LinCodeError> {
    let is_new = !path.exists() || fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if is_new {
        ensure_parent_dir(path)?;
        fs::write(path, format!("{}\n", DEBUG_LOG_HEADER))
            .map_err(|e| LinCodeError::io(format!("writing debug log header '{}': {}", path.display(), e)))?;
    }
    Ok(())
}
