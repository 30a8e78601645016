//! Typed candidate-site records
//!
//! Candidate lines are fixed-column text. Columns are resolved here, once;
//! downstream code only sees named fields.
//!
//! | columns | content                                        |
//! |---------|------------------------------------------------|
//! | 0, 1    | chromosome, position                           |
//! | 5, 6    | effective clip count, left / right             |
//! | 7, 8    | effective discordant count, left / right       |
//! | 9, 10   | polyA read count, left / right                 |
//! | 11, 12  | local coverage, left / right                   |
//! | 19, 20  | clip cluster interval, left / right            |
//! | 21, 22  | discordant cluster interval, left / right      |
//! | 23      | transduction source label                      |
//! | 35, 36  | clip count, full-map count                     |
//! | 37, 38  | raw clip count, left / right                   |
//! | 39, 40  | discordant pair count, concordant pair count   |

use crate::config::CategoryMarkers;
use crate::coord_map::Position;
use crate::error::ParseError;
use crate::interval::{ClusterInterval, SidePair};
use crate::record::Record;

const COL_EF_CLIP: usize = 5;
const COL_EF_DISC: usize = 7;
const COL_POLYA: usize = 9;
const COL_COVERAGE: usize = 11;
const COL_CLIP_CLUSTER: usize = 19;
const COL_DISC_CLUSTER: usize = 21;
const COL_TD_SOURCE: usize = 23;
const COL_CLIP: usize = 35;
const COL_FULL_MAP: usize = 36;
const COL_RAW_CLIP: usize = 37;
const COL_DISC: usize = 39;
const COL_CONCORD: usize = 40;

/// Minimum field count of a full candidate record
pub const CANDIDATE_MIN_FIELDS: usize = COL_CONCORD + 1;

/// Category flags of a candidate site
///
/// Markers are matched independently, so a line can be both outside the
/// transduction class and an orphan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteCategory {
    pub transduction: bool,
    pub orphan: bool,
    pub sibling: bool,
}

impl SiteCategory {
    pub const NON_TRANSDUCTION: SiteCategory = SiteCategory::flags(false, false, false);
    pub const TRANSDUCTION: SiteCategory = SiteCategory::flags(true, false, false);
    pub const SIBLING: SiteCategory = SiteCategory::flags(true, false, true);
    pub const ORPHAN: SiteCategory = SiteCategory::flags(true, true, false);

    const fn flags(transduction: bool, orphan: bool, sibling: bool) -> Self {
        SiteCategory {
            transduction,
            orphan,
            sibling,
        }
    }

    /// Each flag is set by its own text marker anywhere in the line
    pub fn infer(line: &str, markers: &CategoryMarkers) -> Self {
        SiteCategory {
            transduction: !line.contains(markers.not_transduction.as_str()),
            orphan: line.contains(markers.orphan.as_str()),
            sibling: line.contains(markers.sibling.as_str()),
        }
    }

    /// Canonical, sibling and orphan transductions
    pub fn is_transduction_class(self) -> bool {
        self.transduction
    }

    pub fn is_orphan(self) -> bool {
        self.orphan
    }

    pub fn is_sibling(self) -> bool {
        self.sibling
    }
}

/// Clip and discordant cluster intervals of a case site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseClusters {
    pub clip: SidePair<ClusterInterval>,
    pub disc: SidePair<ClusterInterval>,
}

impl CaseClusters {
    pub const MIN_FIELDS: usize = COL_DISC_CLUSTER + 2;

    pub fn parse(rec: &Record<'_>) -> Result<Self, ParseError> {
        rec.require(Self::MIN_FIELDS)?;
        Ok(CaseClusters {
            clip: rec.interval_pair(COL_CLIP_CLUSTER)?,
            disc: rec.interval_pair(COL_DISC_CLUSTER)?,
        })
    }
}

/// Source-sequence label of a transduction candidate
pub fn td_source<'a>(rec: &Record<'a>) -> Result<&'a str, ParseError> {
    rec.text(COL_TD_SOURCE)
}

/// Minimum field count for reading the transduction source label
pub const TD_SOURCE_MIN_FIELDS: usize = COL_TD_SOURCE + 1;

/// Case evidence of one candidate insertion site
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSite {
    pub chrom: String,
    pub pos: Position,
    pub category: SiteCategory,
    pub ef_clip: SidePair<i64>,
    pub ef_disc: SidePair<i64>,
    pub polya: SidePair<i64>,
    pub coverage: SidePair<f64>,
    pub clusters: CaseClusters,
    pub td_source: String,
    pub n_clip: i64,
    pub n_full_map: i64,
    pub raw_clip: SidePair<i64>,
    pub n_disc: i64,
    pub n_concord: i64,
}

impl CandidateSite {
    pub fn parse(rec: &Record<'_>, markers: &CategoryMarkers) -> Result<Self, ParseError> {
        rec.require(CANDIDATE_MIN_FIELDS)?;
        let (chrom, pos) = rec.site_key()?;

        Ok(CandidateSite {
            chrom: chrom.to_string(),
            pos,
            category: SiteCategory::infer(rec.raw(), markers),
            ef_clip: rec.int_pair(COL_EF_CLIP)?,
            ef_disc: rec.int_pair(COL_EF_DISC)?,
            polya: rec.int_pair(COL_POLYA)?,
            coverage: rec.float_pair(COL_COVERAGE)?,
            clusters: CaseClusters::parse(rec)?,
            td_source: td_source(rec)?.to_string(),
            n_clip: rec.int(COL_CLIP)?,
            n_full_map: rec.int(COL_FULL_MAP)?,
            raw_clip: rec.int_pair(COL_RAW_CLIP)?,
            n_disc: rec.int(COL_DISC)?,
            n_concord: rec.int(COL_CONCORD)?,
        })
    }
}
