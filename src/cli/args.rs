// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// lincode - incremental hierarchical LINcode assignment for cgMLST profiles
pub struct Args {
    /// scheme directory holding the loci, profiles, thresholds, and lincodes files
    #[argh(option)]
    pub dir: Option<String>,

    /// scheme id (selects scheme_<id>_*.{txt,tsv} files within --dir)
    #[argh(option)]
    pub scheme_id: Option<u32>,

    /// maximum unlabeled profiles to take per batch (default: 10000)
    #[argh(option, default = "10000")]
    pub batch_size: usize,

    /// maximum missing alleles tolerated per profile before it is skipped (default: 0)
    #[argh(option, default = "0")]
    pub missing: usize,

    /// minimum numeric profile id to consider
    #[argh(option)]
    pub min: Option<i64>,

    /// maximum numeric profile id to consider
    #[argh(option)]
    pub max: Option<i64>,

    /// memory-map the scratch distance matrix instead of keeping it in RAM
    #[argh(switch)]
    pub mmap: bool,

    /// TSV file of new profiles to append to the store before assignment begins
    #[argh(option)]
    pub input_profiles: Option<String>,

    /// append a per-assignment debug trace to this file
    #[argh(option)]
    pub log: Option<String>,

    /// create a fresh scheme directory (loci/thresholds/profiles scaffold) and exit
    #[argh(switch)]
    pub create: bool,

    /// suppress per-assignment progress lines
    #[argh(switch)]
    pub quiet: bool,

    /// print extra per-assignment diagnostics (nearest neighbour, allele agreement counts, distance)
    #[argh(switch)]
    pub debug: bool,

    /// path to a TOML configuration file; CLI flags take precedence over its values
    #[argh(option)]
    pub config: Option<String>,

    /// write a commented sample configuration file to --config's path and exit
    #[argh(switch)]
    pub generate_config: bool,
}
