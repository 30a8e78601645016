use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use meisomatic::aggregate::CandidateStreams;
use meisomatic::cohort::call_cohort;
use meisomatic::config::{CascadeConfig, CategoryMarkers, ConsistencyConfig};
use meisomatic::pipeline::{
    run_aggregate, run_call, run_ratio_filter, AggregateInputs, ClusterInputs, ControlInputs,
};
use meisomatic::set_filter::{
    call_mosaic, compare_case_control, filter_by_blacklist, filter_by_germline_list,
    intersect_sites, write_overlap, Blacklist,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet", global = true)]
    quiet: bool,

    /// Number of threads for parallel processing
    #[clap(short = 't', long = "threads", default_value = "8", global = true)]
    threads: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate candidates and run the case-vs-control ratio cascade
    Call {
        #[clap(flatten)]
        candidates: AggregateFiles,
        #[clap(flatten)]
        control: ControlFiles,
        #[clap(flatten)]
        consistency: ConsistencyArgs,
        #[clap(flatten)]
        cascade: CascadeArgs,
        #[clap(flatten)]
        markers: MarkerArgs,
        /// Somatic call file; sidecar files are written next to it
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Merge candidate streams with control cluster checks
    Aggregate {
        #[clap(flatten)]
        candidates: AggregateFiles,
        #[clap(flatten)]
        consistency: ConsistencyArgs,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Run only the case-vs-control ratio cascade
    RatioFilter {
        /// Aggregated candidate file
        #[clap(short = 'i', long = "input")]
        input: PathBuf,
        #[clap(flatten)]
        control: ControlFiles,
        #[clap(flatten)]
        cascade: CascadeArgs,
        #[clap(flatten)]
        markers: MarkerArgs,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Drop candidates near a germline database site
    Germline {
        /// Germline database sites (chrom pos ...)
        #[clap(long = "db")]
        db: PathBuf,
        #[clap(short = 'i', long = "input")]
        input: PathBuf,
        #[clap(short = 's', long = "slack", default_value = "50")]
        slack: i64,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Drop candidates inside blacklisted regions
    Blacklist {
        /// Sorted regions (chrom start end)
        #[clap(short = 'b', long = "blacklist")]
        blacklist: PathBuf,
        #[clap(short = 'i', long = "input")]
        input: PathBuf,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Case sites absent from both the germline database and control calls
    Mosaic {
        #[clap(long = "case")]
        case: PathBuf,
        #[clap(long = "control")]
        control: PathBuf,
        #[clap(long = "db")]
        db: PathBuf,
        #[clap(short = 's', long = "slack", default_value = "50")]
        slack: i64,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Sites of the first list with a hit in the second
    Overlap {
        first: PathBuf,
        second: PathBuf,
        #[clap(short = 's', long = "slack", default_value = "50")]
        slack: i64,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// High-confidence lines whose site is also in the raw somatic calls
    Intersect {
        #[clap(long = "high-confidence")]
        high_confidence: PathBuf,
        #[clap(long = "raw-somatic")]
        raw_somatic: PathBuf,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Case call-set sites with no control call nearby
    Compare {
        #[clap(long = "case")]
        case: PathBuf,
        #[clap(long = "control")]
        control: PathBuf,
        #[clap(short = 's', long = "slack", default_value = "50")]
        slack: i64,
        #[clap(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Case/control comparison for every matched sample of a cohort
    Cohort {
        /// `sample_id bam_id` per line
        #[clap(long = "id-map")]
        id_map: PathBuf,
        /// `bam_id path` per line
        #[clap(long = "case-results")]
        case_results: PathBuf,
        /// `sampleid_tag path` per line; the last `_` suffix is dropped
        #[clap(long = "control-results")]
        control_results: PathBuf,
        #[clap(short = 's', long = "slack", default_value = "50")]
        slack: i64,
        /// Receives the matched list and one `<bam_id>.somatic` per sample
        #[clap(short = 'o', long = "out-dir")]
        out_dir: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct AggregateFiles {
    /// Non-transduction candidates
    #[clap(long = "non-td")]
    non_td: PathBuf,
    /// Transduction candidates
    #[clap(long = "td")]
    td: PathBuf,
    /// Orphan transduction candidates
    #[clap(long = "orphan")]
    orphan: PathBuf,
    /// Control raw clip clusters at non-transduction sites
    #[clap(long = "non-td-clip-clusters")]
    non_td_clip_clusters: PathBuf,
    /// Control consensus clusters at non-transduction sites
    #[clap(long = "non-td-cns-clusters")]
    non_td_cns_clusters: PathBuf,
    /// Control raw clip clusters at transduction sites
    #[clap(long = "td-clip-clusters")]
    td_clip_clusters: PathBuf,
    /// Control consensus clusters at transduction sites
    #[clap(long = "td-cns-clusters")]
    td_cns_clusters: PathBuf,
    /// Control transduction source clusters
    #[clap(long = "td-source-clusters")]
    td_source_clusters: PathBuf,
    /// Control polyA/polyT counts on transduction flanks
    #[clap(long = "td-polya")]
    td_polya: PathBuf,
    /// Sibling transductions already called germline
    #[clap(long = "sibling-exclude")]
    sibling_exclude: PathBuf,
    /// Orphan transductions already called germline
    #[clap(long = "orphan-exclude")]
    orphan_exclude: PathBuf,
}

impl AggregateFiles {
    fn into_inputs(self) -> AggregateInputs {
        AggregateInputs {
            streams: CandidateStreams {
                non_transduction: self.non_td,
                transduction: self.td,
                orphan: self.orphan,
            },
            non_td_clusters: ClusterInputs {
                raw_clip: self.non_td_clip_clusters,
                consensus: self.non_td_cns_clusters,
            },
            td_clusters: ClusterInputs {
                raw_clip: self.td_clip_clusters,
                consensus: self.td_cns_clusters,
            },
            td_source_clusters: self.td_source_clusters,
            td_polya: self.td_polya,
            sibling_exclude: self.sibling_exclude,
            orphan_exclude: self.orphan_exclude,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct ControlFiles {
    /// Control genotype features per site
    #[clap(long = "ctrl-features")]
    ctrl_features: PathBuf,
    /// Control local depth per site
    #[clap(long = "ctrl-depth")]
    ctrl_depth: PathBuf,
}

impl ControlFiles {
    fn into_inputs(self) -> ControlInputs {
        ControlInputs {
            features: self.ctrl_features,
            depth: self.ctrl_depth,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct ConsistencyArgs {
    /// Clip cluster endpoint distance below which case and control match
    #[clap(long = "clip-consist-dist", default_value = "35")]
    clip_consist_dist: i64,
    /// Discordant cluster endpoint distance below which case and control match
    #[clap(long = "disc-consist-dist", default_value = "50")]
    disc_consist_dist: i64,
    /// PolyA read count marking a control polyA tail
    #[clap(long = "polya-cutoff", default_value = "1")]
    polya_cutoff: i64,
}

impl From<ConsistencyArgs> for ConsistencyConfig {
    fn from(args: ConsistencyArgs) -> Self {
        ConsistencyConfig {
            clip_consist_dist: args.clip_consist_dist,
            disc_consist_dist: args.disc_consist_dist,
            polya_cutoff: args.polya_cutoff,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct CascadeArgs {
    /// Minimum effective / raw discordant fraction in case
    #[clap(long = "disc-ef-ratio", default_value = "0.1")]
    disc_ef_ratio: f64,
    /// Minimum effective discordant depth ratio in case
    #[clap(long = "ef-disc-cutoff", default_value = "0.05")]
    ef_disc_cutoff: f64,
    /// Minimum raw discordant depth ratio in case
    #[clap(long = "disc-cutoff", default_value = "0.15")]
    disc_cutoff: f64,
    /// Control discordant depth ratio used by the control clip steps [default: --disc-cutoff]
    #[clap(long = "ctrl-disc-cutoff")]
    ctrl_disc_cutoff: Option<f64>,
    /// Minimum per-side raw clip depth ratio for orphans
    #[clap(long = "case-raw-clip-cutoff", default_value = "0.05")]
    case_raw_clip_cutoff: f64,
    /// Maximum control / case ratio
    #[clap(long = "case-ctrl-cutoff", default_value = "0.35")]
    case_ctrl_cutoff: f64,
    /// Maximum clip fraction in control
    #[clap(long = "ctrl-clip-ratio", default_value = "0.75")]
    ctrl_clip_ratio: f64,
    /// Maximum control raw clip fraction when case lacks polyA reads
    #[clap(long = "ctrl-raw-clip-flex-ratio", default_value = "0.35")]
    ctrl_raw_clip_flex_ratio: f64,
    /// Maximum polyA depth ratio in control
    #[clap(long = "ctrl-polya-cutoff", default_value = "0.3")]
    ctrl_polya_cutoff: f64,
}

impl From<CascadeArgs> for CascadeConfig {
    fn from(args: CascadeArgs) -> Self {
        CascadeConfig {
            disc_ef_ratio: args.disc_ef_ratio,
            ef_disc_depth_cutoff: args.ef_disc_cutoff,
            disc_cutoff: args.disc_cutoff,
            ctrl_disc_cutoff: args.ctrl_disc_cutoff.unwrap_or(args.disc_cutoff),
            case_raw_clip_cutoff: args.case_raw_clip_cutoff,
            case_ctrl_cutoff: args.case_ctrl_cutoff,
            ctrl_clip_ratio: args.ctrl_clip_ratio,
            ctrl_raw_clip_flex_ratio: args.ctrl_raw_clip_flex_ratio,
            ctrl_polya_cutoff: args.ctrl_polya_cutoff,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct MarkerArgs {
    /// Text marking non-transduction candidate lines
    #[clap(long = "not-td-marker", default_value = "not_transduction")]
    not_td_marker: String,
    /// Text marking orphan transduction lines
    #[clap(long = "orphan-marker", default_value = "orphan")]
    orphan_marker: String,
    /// Text marking sibling transduction lines
    #[clap(long = "sibling-marker", default_value = "sibling")]
    sibling_marker: String,
}

impl From<MarkerArgs> for CategoryMarkers {
    fn from(args: MarkerArgs) -> Self {
        CategoryMarkers {
            not_transduction: args.not_td_marker,
            orphan: args.orphan_marker,
            sibling: args.sibling_marker,
        }
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Set up rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    match args.command {
        Command::Call {
            candidates,
            control,
            consistency,
            cascade,
            markers,
            output,
        } => {
            run_call(
                &candidates.into_inputs(),
                &control.into_inputs(),
                &ConsistencyConfig::from(consistency),
                &CascadeConfig::from(cascade),
                &CategoryMarkers::from(markers),
                &output,
            )?;
        }
        Command::Aggregate {
            candidates,
            consistency,
            output,
        } => {
            run_aggregate(&candidates.into_inputs(), &ConsistencyConfig::from(consistency), &output)?;
        }
        Command::RatioFilter {
            input,
            control,
            cascade,
            markers,
            output,
        } => {
            run_ratio_filter(
                &input,
                &control.into_inputs(),
                &CascadeConfig::from(cascade),
                &CategoryMarkers::from(markers),
                &output,
            )?;
        }
        Command::Germline {
            db,
            input,
            slack,
            output,
        } => {
            filter_by_germline_list(&db, &input, slack, create_output(&output)?)?;
        }
        Command::Blacklist {
            blacklist,
            input,
            output,
        } => {
            let blacklist = Blacklist::load(&blacklist)?;
            filter_by_blacklist(&input, &blacklist, create_output(&output)?)?;
        }
        Command::Mosaic {
            case,
            control,
            db,
            slack,
            output,
        } => {
            call_mosaic(&case, &control, &db, slack, create_output(&output)?)?;
        }
        Command::Overlap {
            first,
            second,
            slack,
            output,
        } => {
            write_overlap(&first, &second, slack, create_output(&output)?)?;
        }
        Command::Intersect {
            high_confidence,
            raw_somatic,
            output,
        } => {
            intersect_sites(&high_confidence, &raw_somatic, create_output(&output)?)?;
        }
        Command::Compare {
            case,
            control,
            slack,
            output,
        } => {
            compare_case_control(&case, &control, slack, create_output(&output)?)?;
        }
        Command::Cohort {
            id_map,
            case_results,
            control_results,
            slack,
            out_dir,
        } => {
            call_cohort(&id_map, &case_results, &control_results, slack, &out_dir)?;
        }
    }

    info!("Done");
    Ok(())
}
