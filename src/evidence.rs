//! Control-side evidence records produced by the upstream collectors
//!
//! Every file is keyed by chromosome and position in columns 0 and 1:
//!
//! - raw clip clusters: `n_lclip n_rclip lstart lend rstart rend`
//! - consensus clusters: `nlclip nrclip nldisc nrdisc nlpolyA nrpolyA lclip rclip ldisc rdisc`
//! - transduction clusters: `source_label`
//! - transduction polyA: `lpolyA rpolyA lpolyT rpolyT s0 s1`
//! - control features: `clip full_map raw_lclip raw_rclip disc concord large_indel clip_lens polyA`
//! - control depth: `lcov rcov`

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::coord_map::CoordMap;
use crate::error::ParseError;
use crate::input::load_coord_map;
use crate::interval::{ClusterInterval, SidePair};
use crate::record::Record;

/// Clip clusters formed directly from control reads
#[derive(Debug, Clone, PartialEq)]
pub struct ClipClusterRecord {
    pub counts: SidePair<i64>,
    pub clusters: SidePair<ClusterInterval>,
}

impl ClipClusterRecord {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        rec.require(8)?;
        let (lstart, lend) = (rec.int(4)?, rec.int(5)?);
        let (rstart, rend) = (rec.int(6)?, rec.int(7)?);
        Ok(ClipClusterRecord {
            counts: rec.int_pair(2)?,
            clusters: SidePair::new(
                ClusterInterval::from_endpoints(lstart, lend),
                ClusterInterval::from_endpoints(rstart, rend),
            ),
        })
    }
}

/// Clusters of control reads realigned to the repeat consensus
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusCluster {
    pub clip_counts: SidePair<i64>,
    pub disc_counts: SidePair<i64>,
    pub polya: SidePair<i64>,
    pub clip: SidePair<ClusterInterval>,
    pub disc: SidePair<ClusterInterval>,
}

impl ConsensusCluster {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        rec.require(12)?;
        Ok(ConsensusCluster {
            clip_counts: rec.int_pair(2)?,
            disc_counts: rec.int_pair(4)?,
            polya: rec.int_pair(6)?,
            clip: rec.interval_pair(8)?,
            disc: rec.interval_pair(10)?,
        })
    }
}

/// Transduction source observed in control
#[derive(Debug, Clone, PartialEq)]
pub struct TdCluster {
    pub source: String,
}

impl TdCluster {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        Ok(TdCluster {
            source: rec.text(2)?.to_string(),
        })
    }
}

/// PolyA/polyT tails of control reads realigned to transduction flanks
#[derive(Debug, Clone, PartialEq)]
pub struct TdPolyA {
    pub polya: SidePair<i64>,
    pub polyt: SidePair<i64>,
    /// Further support counts, carried through to the diagnostic report
    pub support: [i64; 2],
}

impl TdPolyA {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        rec.require(8)?;
        Ok(TdPolyA {
            polya: rec.int_pair(2)?,
            polyt: rec.int_pair(4)?,
            support: [rec.int(6)?, rec.int(7)?],
        })
    }
}

/// Genotype features of a site collected from control alignments
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFeature {
    pub clip: i64,
    pub full_map: i64,
    pub raw_clip: SidePair<i64>,
    pub disc_pairs: i64,
    pub concord_pairs: i64,
    pub large_indel_disc: i64,
    pub clip_lens: String,
    pub polya: i64,
}

impl ControlFeature {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        rec.require(11)?;
        Ok(ControlFeature {
            clip: rec.int(2)?,
            full_map: rec.int(3)?,
            raw_clip: rec.int_pair(4)?,
            disc_pairs: rec.int(6)?,
            concord_pairs: rec.int(7)?,
            large_indel_disc: rec.int(8)?,
            clip_lens: rec.text(9)?.to_string(),
            polya: rec.int(10)?,
        })
    }
}

/// Local coverage left and right of a site in control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDepth {
    pub coverage: SidePair<f64>,
}

impl ControlDepth {
    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        Ok(ControlDepth {
            coverage: rec.float_pair(2)?,
        })
    }
}

pub fn load_clip_clusters<P: AsRef<Path>>(path: P) -> Result<CoordMap<ClipClusterRecord>> {
    load_coord_map(path, ClipClusterRecord::parse)
}

pub fn load_consensus_clusters<P: AsRef<Path>>(path: P) -> Result<CoordMap<ConsensusCluster>> {
    load_coord_map(path, ConsensusCluster::parse)
}

pub fn load_td_clusters<P: AsRef<Path>>(path: P) -> Result<CoordMap<TdCluster>> {
    load_coord_map(path, TdCluster::parse)
}

pub fn load_td_polya<P: AsRef<Path>>(path: P) -> Result<CoordMap<TdPolyA>> {
    load_coord_map(path, TdPolyA::parse)
}

pub fn load_control_features<P: AsRef<Path>>(path: P) -> Result<CoordMap<ControlFeature>> {
    load_coord_map(path, ControlFeature::parse)
}

pub fn load_control_depth<P: AsRef<Path>>(path: P) -> Result<CoordMap<ControlDepth>> {
    load_coord_map(path, ControlDepth::parse)
}

/// Write the control polyA diagnostic table.
///
/// Layout per site: `chrom pos lpolyA rpolyA lpolyT rpolyT s0 <empty> s1`.
pub fn write_polya_report<W: Write>(polya: &CoordMap<TdPolyA>, mut out: W) -> Result<()> {
    for (chrom, pos, rcd) in polya.iter() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t\t{}",
            chrom,
            pos,
            rcd.polya.left,
            rcd.polya.right,
            rcd.polyt.left,
            rcd.polyt.right,
            rcd.support[0],
            rcd.support[1],
        )?;
    }
    out.flush()?;
    Ok(())
}
