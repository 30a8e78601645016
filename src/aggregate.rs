//! Merge of the category-partitioned candidate streams
//!
//! Streams are read in fixed precedence (non-transduction, transduction,
//! orphan) and in file order within each. The first occurrence of a site
//! across all streams decides its fate; later copies are dropped.

use anyhow::Result;
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cluster_check::{passes_cluster_check, ControlClusters};
use crate::config::ConsistencyConfig;
use crate::coord_map::CoordMap;
use crate::input::for_each_record;
use crate::record::Record;
use crate::site::{td_source, CaseClusters, TD_SOURCE_MIN_FIELDS};
use crate::td_check::{passes_transduction_check, TransductionEvidence};

/// Input streams, one file per category
#[derive(Debug, Clone)]
pub struct CandidateStreams {
    pub non_transduction: PathBuf,
    pub transduction: PathBuf,
    pub orphan: PathBuf,
}

/// Control evidence consulted while merging
#[derive(Debug, Default)]
pub struct AggregateEvidence {
    pub non_td_clusters: ControlClusters,
    pub td_clusters: ControlClusters,
    pub transduction: TransductionEvidence,
    /// Sibling transductions found to be germline upstream
    pub sibling_exclude: CoordMap<()>,
    /// Orphan transductions found to be germline upstream
    pub orphan_exclude: CoordMap<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    NonTransduction,
    Transduction,
    Orphan,
}

impl Stream {
    fn min_fields(self) -> usize {
        match self {
            Stream::NonTransduction => CaseClusters::MIN_FIELDS,
            Stream::Transduction => TD_SOURCE_MIN_FIELDS.max(CaseClusters::MIN_FIELDS),
            Stream::Orphan => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Stream::NonTransduction => "non-transduction",
            Stream::Transduction => "transduction",
            Stream::Orphan => "orphan",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub read: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

struct Aggregator<'a> {
    evidence: &'a AggregateEvidence,
    config: &'a ConsistencyConfig,
    seen: CoordMap<()>,
    stats: AggregateStats,
}

impl<'a> Aggregator<'a> {
    fn accepts(&self, stream: Stream, rec: &Record<'_>) -> Result<bool> {
        rec.require(stream.min_fields())?;
        let (chrom, pos) = rec.site_key()?;

        let accepted = match stream {
            Stream::NonTransduction => {
                let case = CaseClusters::parse(rec)?;
                passes_cluster_check(chrom, pos, &case, &self.evidence.non_td_clusters, self.config)
            }
            Stream::Transduction => {
                let case = CaseClusters::parse(rec)?;
                passes_transduction_check(
                    chrom,
                    pos,
                    td_source(rec)?,
                    &self.evidence.transduction,
                    self.config.polya_cutoff,
                ) && passes_cluster_check(chrom, pos, &case, &self.evidence.td_clusters, self.config)
                    && !self.evidence.sibling_exclude.contains(chrom, pos)
            }
            Stream::Orphan => !self.evidence.orphan_exclude.contains(chrom, pos),
        };
        Ok(accepted)
    }

    fn merge<W: Write>(&mut self, stream: Stream, path: &Path, out: &mut W) -> Result<()> {
        let before = self.stats;
        for_each_record(path, |rec| {
            self.stats.read += 1;
            let (chrom, pos) = rec.site_key()?;
            if !self.seen.insert_first(chrom, pos, ()) {
                debug!("{chrom}:{pos} already seen, dropping {} copy", stream.name());
                self.stats.duplicates += 1;
                return Ok(());
            }

            if self.accepts(stream, rec)? {
                writeln!(out, "{}", rec.raw())?;
                self.stats.accepted += 1;
            } else {
                self.stats.rejected += 1;
            }
            Ok(())
        })?;

        info!(
            "{} stream: {} read, {} accepted, {} duplicates",
            stream.name(),
            self.stats.read - before.read,
            self.stats.accepted - before.accepted,
            self.stats.duplicates - before.duplicates
        );
        Ok(())
    }
}

/// Merge the three candidate streams into `out`, keeping accepted lines
/// unchanged and in stream-then-file order.
pub fn aggregate_candidates<W: Write>(
    streams: &CandidateStreams,
    evidence: &AggregateEvidence,
    config: &ConsistencyConfig,
    mut out: W,
) -> Result<AggregateStats> {
    let mut aggregator = Aggregator {
        evidence,
        config,
        seen: CoordMap::new(),
        stats: AggregateStats::default(),
    };

    aggregator.merge(Stream::NonTransduction, &streams.non_transduction, &mut out)?;
    aggregator.merge(Stream::Transduction, &streams.transduction, &mut out)?;
    aggregator.merge(Stream::Orphan, &streams.orphan, &mut out)?;
    out.flush()?;

    Ok(aggregator.stats)
}
