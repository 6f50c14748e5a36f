// validation.rs - Input validation utilities

use std::path::PathBuf;

use crate::cli::args::Args;
use crate::error::LinCodeError;

pub struct ValidationResult {
    pub dir: PathBuf,
    pub scheme_id: u32,
    pub batch_size: usize,
    pub max_missing: usize,
    pub min_id: Option<i64>,
    pub max_id: Option<i64>,
}

/// Validate all command line arguments.
pub fn validate_args(args: &Args) -> Result<ValidationResult, LinCodeError> {
    let dir = args
        .dir
        .as_ref()
        .ok_or_else(|| LinCodeError::config("--dir is required"))?;
    let dir = PathBuf::from(dir);
    if !dir.is_dir() {
        return Err(LinCodeError::config(format!("scheme directory '{}' does not exist", dir.display())));
    }

    let scheme_id = args
        .scheme_id
        .ok_or_else(|| LinCodeError::config("--scheme-id is required"))?;

    if args.batch_size == 0 {
        return Err(LinCodeError::config("--batch-size must be greater than zero"));
    }

    if let (Some(min), Some(max)) = (args.min, args.max) {
        if min > max {
            return Err(LinCodeError::config(format!("--min ({}) must not exceed --max ({})", min, max)));
        }
    }

    Ok(ValidationResult {
        dir,
        scheme_id,
        batch_size: args.batch_size,
        max_missing: args.missing,
        min_id: args.min,
        max_id: args.max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            dir: None,
            scheme_id: None,
            batch_size: 10000,
            missing: 0,
            min: None,
            max: None,
            mmap: false,
            input_profiles: None,
            log: None,
            create: false,
            quiet: false,
            debug: false,
            config: None,
            generate_config: false,
        }
    }

    #[test]
    fn rejects_missing_dir() {
        let args = base_args();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let tmp = tempfile::tempdir().unwrap();
        let mut args = base_args();
        args.dir = Some(tmp.path().to_string_lossy().to_string());
        args.scheme_id = Some(1);
        args.min = Some(10);
        args.max = Some(5);
        assert!(validate_args(&args).is_err());
    }
}
