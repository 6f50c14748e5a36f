// main.rs - CLI entry point

use std::time::Instant;

use lincode::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_main() -> Result<(), LinCodeError> {
    let mut args: Args = argh::from_env();

    if args.generate_config {
        let sample_config = Config::generate_sample();
        match &args.config {
            Some(path) => {
                std::fs::write(path, &sample_config)
                    .map_err(|e| LinCodeError::io(format!("writing config to '{}': {}", path, e)))?;
                println!("📄 Wrote sample configuration to: {}", path);
            }
            None => {
                println!("{}", sample_config);
                println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
            }
        }
        return Ok(());
    }

    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path).map_err(LinCodeError::config)?;
    }

    if args.create {
        let dir = args.dir.as_ref().ok_or_else(|| LinCodeError::config("--dir is required"))?;
        let scheme_id = args.scheme_id.ok_or_else(|| LinCodeError::config("--scheme-id is required"))?;
        lincode::output::create_scheme(std::path::Path::new(dir), scheme_id)?;
        return Ok(());
    }

    let validated = validate_args(&args)?;

    println!("🧬 lincode v{}", env!("CARGO_PKG_VERSION"));
    println!("📁 Scheme: {} (id {})", validated.dir.display(), validated.scheme_id);

    let store = ProfileStore::open(&validated.dir, validated.scheme_id)?;

    if let Some(input_path) = &args.input_profiles {
        let appended = store.append_new_profiles(std::path::Path::new(input_path))?;
        println!("➕ Appended {} new profiles from '{}'", appended, input_path);
    }

    let thresholds = SchemeThresholds::load(&store.thresholds_path(), store.l())?;
    println!("🪜 Loaded {} threshold level(s) over {} loci", thresholds.k(), store.l());

    let _lock = SchemeLock::acquire(&store.locks_dir(), &validated.dir, validated.scheme_id)?;

    let debug_log = lincode::core::open_debug_log(&args.log.clone().map(std::path::PathBuf::from))?;

    let options = EngineOptions {
        batch_size: validated.batch_size,
        min_id: validated.min_id,
        max_id: validated.max_id,
        max_missing: validated.max_missing,
        use_mmap: args.mmap,
        quiet: args.quiet,
        debug: args.debug,
    };

    let start = Instant::now();
    let mut engine = Engine::new(&store, &thresholds, options, debug_log);
    let total = engine.run_to_completion()?;
    let elapsed = start.elapsed();

    println!("\n🎉 Assignment complete");
    println!("🔢 Profiles labeled this run: {}", total);
    println!("⏱️  Total execution time: {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
