//! Cluster consistency check between a case site and control-derived clusters
//!
//! A case site whose clip or discordant clusters line up with clusters built
//! from control reads is treated as germline-like and fails the check.

use log::debug;

use crate::config::ConsistencyConfig;
use crate::coord_map::{CoordMap, Position};
use crate::evidence::{ClipClusterRecord, ConsensusCluster};
use crate::interval::{sides_consistent, ClusterInterval, SidePair};
use crate::site::CaseClusters;

/// Control clusters for one candidate category
#[derive(Debug, Default)]
pub struct ControlClusters {
    /// Clip clusters formed directly from control reads
    pub raw_clip: CoordMap<ClipClusterRecord>,
    /// Clusters of control reads realigned to the repeat consensus
    pub consensus: CoordMap<ConsensusCluster>,
}

pub fn is_clip_cluster_consistent(
    case: &SidePair<ClusterInterval>,
    control: &SidePair<ClusterInterval>,
    config: &ConsistencyConfig,
) -> bool {
    sides_consistent(case, control, config.clip_consist_dist)
}

pub fn is_disc_cluster_consistent(
    case: &SidePair<ClusterInterval>,
    control: &SidePair<ClusterInterval>,
    config: &ConsistencyConfig,
) -> bool {
    sides_consistent(case, control, config.disc_consist_dist)
}

/// Returns true when the site shows no sign of the same event in control.
pub fn passes_cluster_check(
    chrom: &str,
    pos: Position,
    case: &CaseClusters,
    control: &ControlClusters,
    config: &ConsistencyConfig,
) -> bool {
    // Raw control clip clusters take priority over everything else
    if let Some(raw) = control.raw_clip.get(chrom, pos) {
        if is_clip_cluster_consistent(&case.clip, &raw.clusters, config) {
            debug!("{chrom}:{pos} clip cluster also forms in control");
            return false;
        }
    }

    let Some(cns) = control.consensus.get(chrom, pos) else {
        debug!("{chrom}:{pos} doesn't form clip and disc cluster in control");
        return true;
    };

    if cns.polya.left > config.polya_cutoff && cns.polya.right > config.polya_cutoff {
        debug!("{chrom}:{pos} has polyA support on both sides in control");
        return false;
    }

    !(is_clip_cluster_consistent(&case.clip, &cns.clip, config)
        || is_disc_cluster_consistent(&case.disc, &cns.disc, config))
}
