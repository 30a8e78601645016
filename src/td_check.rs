//! Transduction-specific control checks

use log::debug;

use crate::coord_map::{CoordMap, Position};
use crate::evidence::{TdCluster, TdPolyA};

/// Control evidence gathered by realigning reads to transduction flanks
#[derive(Debug, Default)]
pub struct TransductionEvidence {
    pub clusters: CoordMap<TdCluster>,
    pub polya: CoordMap<TdPolyA>,
}

fn shares_source(control: &str, case: &str) -> bool {
    case.contains(control) || control.contains(case)
}

/// Returns true unless control shows the same transduction event, either
/// through the same source locus or through polyA/polyT tails.
pub fn passes_transduction_check(
    chrom: &str,
    pos: Position,
    case_source: &str,
    evidence: &TransductionEvidence,
    polya_cutoff: i64,
) -> bool {
    let Some(cluster) = evidence.clusters.get(chrom, pos) else {
        return true;
    };

    if shares_source(&cluster.source, case_source) {
        debug!("{chrom}:{pos} transduction is filtered out, as it has the same source as control");
        return false;
    }

    if let Some(tails) = evidence.polya.get(chrom, pos) {
        if tails.polya.sum() >= polya_cutoff || tails.polyt.sum() >= polya_cutoff {
            debug!("{chrom}:{pos} transduction is filtered out, as there are polyA tails found in control");
            return false;
        }
    }

    true
}
