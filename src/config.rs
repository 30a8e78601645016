//! Tunable cutoffs for the somatic filtering stages
//!
//! Each stage receives its configuration by reference; nothing here is global.

use anyhow::{bail, Result};

/// Cutoffs of the case-vs-control ratio cascade
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeConfig {
    /// Minimum (left+right effective discordant) / raw discordant in case
    pub disc_ef_ratio: f64,
    /// Minimum effective discordant depth ratio in case
    pub ef_disc_depth_cutoff: f64,
    /// Minimum raw discordant depth ratio in case
    pub disc_cutoff: f64,
    /// Control discordant depth ratio above which control looks like carrier
    pub ctrl_disc_cutoff: f64,
    /// Minimum per-side raw clip depth ratio for orphan transductions
    pub case_raw_clip_cutoff: f64,
    /// Maximum control-ratio / case-ratio
    pub case_ctrl_cutoff: f64,
    /// Maximum clip fraction at the breakpoint in control
    pub ctrl_clip_ratio: f64,
    /// Maximum control raw clip fraction when case has no polyA support
    pub ctrl_raw_clip_flex_ratio: f64,
    /// Maximum polyA depth ratio in control
    pub ctrl_polya_cutoff: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        CascadeConfig {
            disc_ef_ratio: 0.1,
            ef_disc_depth_cutoff: 0.05,
            disc_cutoff: 0.15,
            ctrl_disc_cutoff: 0.15,
            case_raw_clip_cutoff: 0.05,
            case_ctrl_cutoff: 0.35,
            ctrl_clip_ratio: 0.75,
            ctrl_raw_clip_flex_ratio: 0.35,
            ctrl_polya_cutoff: 0.3,
        }
    }
}

impl CascadeConfig {
    pub fn validate(&self) -> Result<()> {
        let cutoffs = [
            ("disc-ef-ratio", self.disc_ef_ratio),
            ("ef-disc-cutoff", self.ef_disc_depth_cutoff),
            ("disc-cutoff", self.disc_cutoff),
            ("ctrl-disc-cutoff", self.ctrl_disc_cutoff),
            ("case-raw-clip-cutoff", self.case_raw_clip_cutoff),
            ("case-ctrl-cutoff", self.case_ctrl_cutoff),
            ("ctrl-clip-ratio", self.ctrl_clip_ratio),
            ("ctrl-raw-clip-flex-ratio", self.ctrl_raw_clip_flex_ratio),
            ("ctrl-polya-cutoff", self.ctrl_polya_cutoff),
        ];
        for (name, value) in cutoffs {
            if !value.is_finite() || value < 0.0 {
                bail!("--{name} must be a non-negative number, got {value}");
            }
        }
        Ok(())
    }
}

/// Settings of the cluster and transduction consistency checks
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyConfig {
    /// Maximum distance (exclusive) between matching clip cluster endpoints
    pub clip_consist_dist: i64,
    /// Maximum distance (exclusive) between matching discordant cluster endpoints
    pub disc_consist_dist: i64,
    /// PolyA read count marking a control-side polyA tail
    pub polya_cutoff: i64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        ConsistencyConfig {
            clip_consist_dist: 35,
            disc_consist_dist: 50,
            polya_cutoff: 1,
        }
    }
}

/// Text markers that tag a candidate line with its category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMarkers {
    pub not_transduction: String,
    pub orphan: String,
    pub sibling: String,
}

impl Default for CategoryMarkers {
    fn default() -> Self {
        CategoryMarkers {
            not_transduction: "not_transduction".to_string(),
            orphan: "orphan".to_string(),
            sibling: "sibling".to_string(),
        }
    }
}
