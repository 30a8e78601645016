//! End-to-end somatic calling: aggregate candidate streams, then run the
//! ratio cascade against control features.
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::aggregate::{aggregate_candidates, AggregateEvidence, AggregateStats, CandidateStreams};
use crate::cascade::{ratio_filter, CascadeStats, ControlEvidence};
use crate::cluster_check::ControlClusters;
use crate::config::{CascadeConfig, CategoryMarkers, ConsistencyConfig};
use crate::evidence::{
    load_clip_clusters, load_consensus_clusters, load_control_depth, load_control_features,
    load_td_clusters, load_td_polya, write_polya_report,
};
use crate::input::load_site_set;
use crate::td_check::TransductionEvidence;

pub const BEFORE_FINAL_SUFFIX: &str = ".before_final_filter";
pub const FILTER_LOG_SUFFIX: &str = ".filter_log";
pub const POLYA_REPORT_SUFFIX: &str = ".tmp_ctrl_clip_polyA";

/// `<path><suffix>`, keeping whatever extension `path` already has
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Control-derived cluster files for one candidate category
#[derive(Debug, Clone)]
pub struct ClusterInputs {
    pub raw_clip: PathBuf,
    pub consensus: PathBuf,
}

impl ClusterInputs {
    fn load(&self) -> Result<ControlClusters> {
        Ok(ControlClusters {
            raw_clip: load_clip_clusters(&self.raw_clip)?,
            consensus: load_consensus_clusters(&self.consensus)?,
        })
    }
}

/// Every file the aggregation stage reads
#[derive(Debug, Clone)]
pub struct AggregateInputs {
    pub streams: CandidateStreams,
    pub non_td_clusters: ClusterInputs,
    pub td_clusters: ClusterInputs,
    pub td_source_clusters: PathBuf,
    pub td_polya: PathBuf,
    pub sibling_exclude: PathBuf,
    pub orphan_exclude: PathBuf,
}

impl AggregateInputs {
    pub fn load(&self) -> Result<AggregateEvidence> {
        let evidence = AggregateEvidence {
            non_td_clusters: self.non_td_clusters.load()?,
            td_clusters: self.td_clusters.load()?,
            transduction: TransductionEvidence {
                clusters: load_td_clusters(&self.td_source_clusters)?,
                polya: load_td_polya(&self.td_polya)?,
            },
            sibling_exclude: load_site_set(&self.sibling_exclude)?,
            orphan_exclude: load_site_set(&self.orphan_exclude)?,
        };
        info!(
            "Loaded control clusters: {} non-transduction, {} transduction consensus sites",
            evidence.non_td_clusters.consensus.len(),
            evidence.td_clusters.consensus.len()
        );
        Ok(evidence)
    }
}

/// Control genotype feature and depth files
#[derive(Debug, Clone)]
pub struct ControlInputs {
    pub features: PathBuf,
    pub depth: PathBuf,
}

impl ControlInputs {
    pub fn load(&self) -> Result<ControlEvidence> {
        let control = ControlEvidence {
            features: load_control_features(&self.features)?,
            depth: load_control_depth(&self.depth)?,
        };
        info!(
            "Loaded control evidence: {} feature sites, {} depth sites",
            control.features.len(),
            control.depth.len()
        );
        Ok(control)
    }
}

/// Merge the candidate streams into `out`
pub fn run_aggregate(
    inputs: &AggregateInputs,
    config: &ConsistencyConfig,
    out: &Path,
) -> Result<AggregateStats> {
    let evidence = inputs.load()?;
    let stats = aggregate_candidates(&inputs.streams, &evidence, config, create_output(out)?)?;
    info!(
        "Aggregated {} candidates into {} ({} rejected, {} duplicates dropped)",
        stats.accepted,
        out.display(),
        stats.rejected,
        stats.duplicates
    );
    Ok(stats)
}

/// Run the ratio cascade on `candidates`, writing `out` and `<out>.filter_log`
pub fn run_ratio_filter(
    candidates: &Path,
    control: &ControlInputs,
    config: &CascadeConfig,
    markers: &CategoryMarkers,
    out: &Path,
) -> Result<CascadeStats> {
    config.validate()?;
    let control = control.load()?;
    let log_path = with_suffix(out, FILTER_LOG_SUFFIX);
    ratio_filter(
        candidates,
        &control,
        config,
        markers,
        create_output(out)?,
        create_output(&log_path)?,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStats {
    pub aggregate: AggregateStats,
    pub cascade: CascadeStats,
}

/// Full calling: polyA report, aggregation into `<out>.before_final_filter`,
/// then the cascade into `out` and `<out>.filter_log`.
pub fn run_call(
    inputs: &AggregateInputs,
    control: &ControlInputs,
    consistency: &ConsistencyConfig,
    cascade: &CascadeConfig,
    markers: &CategoryMarkers,
    out: &Path,
) -> Result<CallStats> {
    cascade.validate()?;
    let evidence = inputs.load()?;

    write_polya_report(
        &evidence.transduction.polya,
        create_output(&with_suffix(out, POLYA_REPORT_SUFFIX))?,
    )?;

    let before_final = with_suffix(out, BEFORE_FINAL_SUFFIX);
    let aggregate = aggregate_candidates(
        &inputs.streams,
        &evidence,
        consistency,
        create_output(&before_final)?,
    )?;
    drop(evidence);

    let cascade = run_ratio_filter(&before_final, control, cascade, markers, out)?;
    info!(
        "Called {} somatic sites from {} candidates",
        cascade.accepted, aggregate.read
    );
    Ok(CallStats { aggregate, cascade })
}
