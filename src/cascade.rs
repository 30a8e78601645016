//! Case-vs-control ratio cascade
//!
//! Raw counts are turned into depth-normalised ratios and pushed through an
//! ordered list of checks. The first check that fires rejects the site and
//! names the reason; nothing after it is evaluated. Order matters: later
//! checks assume earlier ones passed (non-zero coverage, control present).

use anyhow::Result;
use indexmap::IndexMap;
use log::info;
use rayon::prelude::*;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::config::{CascadeConfig, CategoryMarkers};
use crate::coord_map::{CoordMap, Position};
use crate::evidence::{ControlDepth, ControlFeature};
use crate::input::for_each_record;
use crate::site::CandidateSite;

/// Coverage sums at or below this are treated as zero
pub const DEPTH_EPSILON: f64 = 1e-10;

/// Control genotype features and local depth, keyed by site
#[derive(Debug, Default)]
pub struct ControlEvidence {
    pub features: CoordMap<ControlFeature>,
    pub depth: CoordMap<ControlDepth>,
}

/// Why a site was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    CaseDepthZero,
    EfDiscRatio,
    OrphanEfDiscRatio,
    OrphanRawClipRatio,
    DiscRatio,
    NoDiscordant,
    EfDiscFraction,
    MissingFeature,
    MissingDepth,
    ControlDepthZero,
    ControlPolyA,
    TransductionInControl,
    CanonicalInControl,
    ControlClipFullMap,
    ControlRawClip,
    ControlRawClipNoCasePolyA,
}

impl Rejection {
    /// Category tag printed after the site, if any
    fn tag(self) -> Option<&'static str> {
        match self {
            Rejection::OrphanEfDiscRatio | Rejection::OrphanRawClipRatio => Some("orphan"),
            Rejection::TransductionInControl => Some("transduction"),
            _ => None,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Rejection::CaseDepthZero => "as case depth is 0",
            Rejection::EfDiscRatio | Rejection::OrphanEfDiscRatio => "as ef_disc_ratio_case is small",
            Rejection::OrphanRawClipRatio => "as raw clip ratio is small",
            Rejection::DiscRatio => "as disc_ratio_case is small",
            Rejection::NoDiscordant => "as no discordant reads",
            Rejection::EfDiscFraction => "as ef_disc_raw_disc_ratio is small",
            Rejection::MissingFeature => "as site is not in m_feature_ctrl",
            Rejection::MissingDepth => "as site is not in m_depth_ctrl",
            Rejection::ControlDepthZero => "as ctrl depth is 0",
            Rejection::ControlPolyA => "at polyA ratio step",
            Rejection::TransductionInControl | Rejection::CanonicalInControl => {
                "as event have disc and clip in ctrl"
            }
            Rejection::ControlClipFullMap => "at ctrl clip/full-map ratio step",
            Rejection::ControlRawClip => "at ctrl raw clip step",
            Rejection::ControlRawClipNoCasePolyA => "at case_polyA and ctrl raw clip step2",
        }
    }
}

/// One line of the filter log
#[derive(Debug, Clone, PartialEq)]
pub struct FilterLogEntry<'a> {
    pub chrom: &'a str,
    pub pos: Position,
    pub rejection: Rejection,
}

impl fmt::Display for FilterLogEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)?;
        if let Some(tag) = self.rejection.tag() {
            write!(f, " ({tag})")?;
        }
        write!(f, " is filtered out {}!", self.rejection.reason())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

/// `2 * count / depth`, the per-allele ratio used throughout
fn depth_ratio(count: i64, depth: f64) -> f64 {
    count as f64 * 2.0 / depth
}

/// Whether control/case exceeds `cutoff`. A zero case ratio against any
/// control signal counts as an unbounded ratio.
fn relative_exceeds(control: f64, case: f64, cutoff: f64) -> bool {
    if case <= DEPTH_EPSILON {
        control > DEPTH_EPSILON
    } else {
        control / case > cutoff
    }
}

#[derive(Debug, Clone, Copy)]
struct CaseRatios {
    ef_disc: f64,
    disc: f64,
    raw_clip: f64,
    ef_clip: f64,
}

#[derive(Debug, Clone, Copy)]
struct ControlRatios<'a> {
    feature: &'a ControlFeature,
    disc: f64,
    raw_clip: f64,
    ef_clip: f64,
    polya: f64,
}

impl ControlRatios<'_> {
    /// clip / (clip + full-map), `None` when the site has neither
    fn clip_fraction(&self) -> Option<f64> {
        let total = self.feature.clip + self.feature.full_map;
        (total != 0).then(|| self.feature.clip as f64 / total as f64)
    }

    /// raw clip / (raw clip + full-map), `None` when the site has neither
    fn raw_clip_fraction(&self) -> Option<f64> {
        let raw_clip = self.feature.raw_clip.sum();
        let total = raw_clip + self.feature.full_map;
        (total > 0).then(|| raw_clip as f64 / total as f64)
    }

    fn polya_per_raw_clip(&self) -> f64 {
        let raw_clip = self.feature.raw_clip.sum();
        if raw_clip > 0 {
            self.feature.polya as f64 / raw_clip as f64
        } else {
            0.0
        }
    }
}

/// Immutable evidence for one site, ratios precomputed where defined
struct Evidence<'a> {
    site: &'a CandidateSite,
    case: Option<CaseRatios>,
    control: Result<ControlRatios<'a>, Rejection>,
}

impl<'a> Evidence<'a> {
    fn new(site: &'a CandidateSite, control: &'a ControlEvidence) -> Self {
        let depth = site.coverage.sum();
        let case = (depth > DEPTH_EPSILON).then(|| CaseRatios {
            ef_disc: depth_ratio(site.ef_disc.sum(), depth),
            disc: depth_ratio(site.n_disc, depth),
            raw_clip: depth_ratio(site.raw_clip.sum(), depth),
            ef_clip: depth_ratio(site.ef_clip.sum(), depth),
        });

        Evidence {
            site,
            case,
            control: Self::control_ratios(site, control),
        }
    }

    fn control_ratios(
        site: &CandidateSite,
        control: &'a ControlEvidence,
    ) -> Result<ControlRatios<'a>, Rejection> {
        let feature = control
            .features
            .get(&site.chrom, site.pos)
            .ok_or(Rejection::MissingFeature)?;
        let depth = control
            .depth
            .get(&site.chrom, site.pos)
            .ok_or(Rejection::MissingDepth)?
            .coverage
            .sum();
        if depth <= DEPTH_EPSILON {
            return Err(Rejection::ControlDepthZero);
        }

        Ok(ControlRatios {
            feature,
            disc: depth_ratio(feature.disc_pairs, depth),
            raw_clip: depth_ratio(feature.raw_clip.sum(), depth),
            ef_clip: depth_ratio(feature.clip, depth),
            polya: feature.polya as f64 / depth,
        })
    }
}

/// Checks of the cascade, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    CaseDepth,
    CaseEfDiscRatio,
    OrphanSideEfDisc,
    OrphanSideRawClip,
    CaseDiscRatio,
    CaseDiscCount,
    EfDiscFraction,
    ControlPresence,
    ControlDepth,
    ControlPolyA,
    CaseControlRatio,
    ControlClipFullMap,
    ControlRawClip,
    CasePolyAControlClip,
}

pub const CASCADE: [Check; 14] = [
    Check::CaseDepth,
    Check::CaseEfDiscRatio,
    Check::OrphanSideEfDisc,
    Check::OrphanSideRawClip,
    Check::CaseDiscRatio,
    Check::CaseDiscCount,
    Check::EfDiscFraction,
    Check::ControlPresence,
    Check::ControlDepth,
    Check::ControlPolyA,
    Check::CaseControlRatio,
    Check::ControlClipFullMap,
    Check::ControlRawClip,
    Check::CasePolyAControlClip,
];

/// True when a side with coverage has a per-side ratio at or below `cutoff`
fn any_side_at_or_below(counts: (i64, i64), coverage: (f64, f64), cutoff: f64) -> bool {
    let weak = |count: i64, cov: f64| cov > 0.0 && count as f64 / cov <= cutoff;
    weak(counts.0, coverage.0) || weak(counts.1, coverage.1)
}

impl Check {
    fn evaluate(self, ev: &Evidence<'_>, config: &CascadeConfig) -> Option<Rejection> {
        let site = ev.site;
        let category = site.category;

        let Some(case) = ev.case else {
            return Some(Rejection::CaseDepthZero);
        };

        let control = match (self, &ev.control) {
            (Check::ControlPresence, Err(r @ (Rejection::MissingFeature | Rejection::MissingDepth))) => {
                return Some(*r)
            }
            (Check::ControlDepth, Err(r @ Rejection::ControlDepthZero)) => return Some(*r),
            (_, Ok(control)) => Some(control),
            (_, Err(_)) => None,
        };

        let rejected = match self {
            Check::CaseDepth => false,
            Check::CaseEfDiscRatio => case.ef_disc <= config.ef_disc_depth_cutoff,
            Check::OrphanSideEfDisc => {
                category.is_orphan()
                    && any_side_at_or_below(
                        (site.ef_disc.left, site.ef_disc.right),
                        (site.coverage.left, site.coverage.right),
                        config.ef_disc_depth_cutoff,
                    )
            }
            Check::OrphanSideRawClip => {
                category.is_orphan()
                    && any_side_at_or_below(
                        (site.raw_clip.left, site.raw_clip.right),
                        (site.coverage.left, site.coverage.right),
                        config.case_raw_clip_cutoff,
                    )
            }
            Check::CaseDiscRatio => case.disc <= config.disc_cutoff,
            Check::CaseDiscCount => site.n_disc <= 0,
            Check::EfDiscFraction => {
                !category.is_orphan()
                    && !category.is_sibling()
                    && site.n_disc > 0
                    && site.ef_disc.sum() as f64 / site.n_disc as f64 <= config.disc_ef_ratio
            }
            Check::ControlPresence | Check::ControlDepth => false,
            _ => {
                // Control checks below need control ratios; a missing control
                // was already reported by the presence and depth checks.
                let control = control?;
                self.evaluate_control(site, &case, control, config)
            }
        };

        rejected.then(|| self.rejection(category.is_transduction_class()))
    }

    fn evaluate_control(
        self,
        site: &CandidateSite,
        case: &CaseRatios,
        control: &ControlRatios<'_>,
        config: &CascadeConfig,
    ) -> bool {
        match self {
            Check::ControlPolyA => control.polya > config.ctrl_polya_cutoff,
            Check::CaseControlRatio => {
                let clip_in_control = if site.category.is_transduction_class() {
                    relative_exceeds(control.raw_clip, case.raw_clip, config.case_ctrl_cutoff)
                } else {
                    relative_exceeds(control.ef_clip, case.ef_clip, config.case_ctrl_cutoff)
                };
                relative_exceeds(control.disc, case.disc, config.case_ctrl_cutoff) && clip_in_control
            }
            Check::ControlClipFullMap => {
                let clipped = control
                    .clip_fraction()
                    .map_or(true, |fraction| fraction > config.ctrl_clip_ratio);
                clipped && control.disc > config.ctrl_disc_cutoff
            }
            Check::ControlRawClip => {
                let clipped = control
                    .raw_clip_fraction()
                    .map_or(true, |fraction| fraction > config.ctrl_clip_ratio);
                let polya_dominant = control.polya_per_raw_clip() > config.ctrl_clip_ratio / 2.0;
                clipped
                    && (control.disc > config.ctrl_disc_cutoff
                        || (polya_dominant && control.feature.disc_pairs > 0))
            }
            Check::CasePolyAControlClip => {
                site.polya.sum() == 0
                    && control.raw_clip_fraction().unwrap_or(0.0) > config.ctrl_raw_clip_flex_ratio
            }
            _ => false,
        }
    }

    fn rejection(self, transduction_class: bool) -> Rejection {
        match self {
            Check::CaseDepth => Rejection::CaseDepthZero,
            Check::CaseEfDiscRatio => Rejection::EfDiscRatio,
            Check::OrphanSideEfDisc => Rejection::OrphanEfDiscRatio,
            Check::OrphanSideRawClip => Rejection::OrphanRawClipRatio,
            Check::CaseDiscRatio => Rejection::DiscRatio,
            Check::CaseDiscCount => Rejection::NoDiscordant,
            Check::EfDiscFraction => Rejection::EfDiscFraction,
            Check::ControlPresence => Rejection::MissingFeature,
            Check::ControlDepth => Rejection::ControlDepthZero,
            Check::ControlPolyA => Rejection::ControlPolyA,
            Check::CaseControlRatio if transduction_class => Rejection::TransductionInControl,
            Check::CaseControlRatio => Rejection::CanonicalInControl,
            Check::ControlClipFullMap => Rejection::ControlClipFullMap,
            Check::ControlRawClip => Rejection::ControlRawClip,
            Check::CasePolyAControlClip => Rejection::ControlRawClipNoCasePolyA,
        }
    }
}

/// Run the cascade for one site
pub fn evaluate_site(
    site: &CandidateSite,
    control: &ControlEvidence,
    config: &CascadeConfig,
) -> Verdict {
    let evidence = Evidence::new(site, control);
    CASCADE
        .iter()
        .find_map(|check| check.evaluate(&evidence, config))
        .map_or(Verdict::Accept, Verdict::Reject)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CascadeStats {
    pub sites: usize,
    pub accepted: usize,
    pub rejected: IndexMap<Rejection, usize>,
}

impl CascadeStats {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Filter a candidate file. Accepted lines go to `out` unchanged (trailing
/// whitespace trimmed); each rejected site gets one line in `log`. Both
/// outputs follow input order.
pub fn ratio_filter<P, W, L>(
    candidates: P,
    control: &ControlEvidence,
    config: &CascadeConfig,
    markers: &CategoryMarkers,
    mut out: W,
    mut log: L,
) -> Result<CascadeStats>
where
    P: AsRef<Path>,
    W: Write,
    L: Write,
{
    let mut sites = Vec::new();
    for_each_record(candidates, |rec| {
        let site = CandidateSite::parse(rec, markers)?;
        sites.push((rec.raw().trim_end().to_string(), site));
        Ok(())
    })?;

    let verdicts: Vec<Verdict> = sites
        .par_iter()
        .map(|(_, site)| evaluate_site(site, control, config))
        .collect();

    let mut stats = CascadeStats {
        sites: sites.len(),
        ..Default::default()
    };
    for ((line, site), verdict) in sites.iter().zip(verdicts) {
        match verdict {
            Verdict::Accept => {
                writeln!(out, "{line}")?;
                stats.accepted += 1;
            }
            Verdict::Reject(rejection) => {
                let entry = FilterLogEntry {
                    chrom: &site.chrom,
                    pos: site.pos,
                    rejection,
                };
                writeln!(log, "{entry}")?;
                *stats.rejected.entry(rejection).or_insert(0) += 1;
            }
        }
    }
    out.flush()?;
    log.flush()?;

    info!(
        "Ratio filter: {} sites, {} accepted, {} rejected",
        stats.sites,
        stats.accepted,
        stats.rejected_total()
    );
    for (rejection, count) in &stats.rejected {
        info!("  {count} filtered out {}", rejection.reason());
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{ClusterInterval, SidePair};
    use crate::site::{CaseClusters, SiteCategory};

    fn site(category: SiteCategory) -> CandidateSite {
        let absent = SidePair::new(ClusterInterval::Absent, ClusterInterval::Absent);
        CandidateSite {
            chrom: "chr1".to_string(),
            pos: 1000,
            category,
            ef_clip: SidePair::new(4, 4),
            ef_disc: SidePair::new(3, 3),
            polya: SidePair::new(2, 2),
            coverage: SidePair::new(10.0, 10.0),
            clusters: CaseClusters {
                clip: absent,
                disc: absent,
            },
            td_source: "not_transduction".to_string(),
            n_clip: 10,
            n_full_map: 20,
            raw_clip: SidePair::new(5, 5),
            n_disc: 5,
            n_concord: 30,
        }
    }

    fn clean_feature() -> ControlFeature {
        ControlFeature {
            clip: 0,
            full_map: 30,
            raw_clip: SidePair::new(0, 0),
            disc_pairs: 0,
            concord_pairs: 30,
            large_indel_disc: 0,
            clip_lens: "0".to_string(),
            polya: 0,
        }
    }

    fn control_with(feature: ControlFeature, depth: (f64, f64)) -> ControlEvidence {
        let mut control = ControlEvidence::default();
        control.features.insert_first("chr1", 1000, feature);
        control.depth.insert_first(
            "chr1",
            1000,
            ControlDepth {
                coverage: SidePair::new(depth.0, depth.1),
            },
        );
        control
    }

    fn verdict(site: &CandidateSite, control: &ControlEvidence) -> Verdict {
        evaluate_site(site, control, &CascadeConfig::default())
    }

    #[test]
    fn test_clean_site_is_accepted() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        for category in [
            SiteCategory::NON_TRANSDUCTION,
            SiteCategory::TRANSDUCTION,
            SiteCategory::SIBLING,
            SiteCategory::ORPHAN,
        ] {
            assert_eq!(verdict(&site(category), &control), Verdict::Accept, "{category:?}");
        }
    }

    #[test]
    fn test_zero_case_depth() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.coverage = SidePair::new(0.0, 0.0);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::CaseDepthZero));
    }

    #[test]
    fn test_ef_disc_ratio_boundary_is_rejected() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.coverage = SidePair::new(20.0, 20.0);
        s.ef_disc = SidePair::new(1, 0);
        // 2 * 1 / 40 == 0.05 exactly
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::EfDiscRatio));
    }

    #[test]
    fn test_disc_ratio_scenario() {
        // 2 * 5 / 20 = 0.5 clears the 0.15 raw discordant cutoff
        let control = control_with(clean_feature(), (10.0, 10.0));
        let s = site(SiteCategory::NON_TRANSDUCTION);
        assert_eq!(verdict(&s, &control), Verdict::Accept);

        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.n_disc = 1;
        s.ef_disc = SidePair::new(1, 1);
        // 2 * 1 / 20 = 0.1
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::DiscRatio));
    }

    #[test]
    fn test_orphan_side_checks() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        let mut s = site(SiteCategory::ORPHAN);
        s.ef_disc = SidePair::new(6, 0);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::OrphanEfDiscRatio));

        let mut s = site(SiteCategory::ORPHAN);
        s.raw_clip = SidePair::new(5, 0);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::OrphanRawClipRatio));

        // the same evidence on a canonical site is not checked per side
        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.raw_clip = SidePair::new(5, 0);
        assert_eq!(verdict(&s, &control), Verdict::Accept);
    }

    #[test]
    fn test_no_discordant_reads() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.n_disc = 0;
        let config = CascadeConfig {
            disc_cutoff: 0.0,
            ..Default::default()
        };
        // 0 <= 0 trips the ratio check first
        assert_eq!(
            evaluate_site(&s, &control, &config),
            Verdict::Reject(Rejection::DiscRatio)
        );
        // only reachable once the ratio check lets a non-positive count through
        s.n_disc = -1;
        let config = CascadeConfig {
            disc_cutoff: -1.0,
            ..Default::default()
        };
        assert_eq!(
            evaluate_site(&s, &control, &config),
            Verdict::Reject(Rejection::NoDiscordant)
        );
    }

    #[test]
    fn test_ef_disc_fraction_skips_orphan_and_sibling() {
        let control = control_with(clean_feature(), (10.0, 10.0));
        let mut s = site(SiteCategory::TRANSDUCTION);
        s.n_disc = 100;
        s.coverage = SidePair::new(100.0, 100.0);
        s.ef_disc = SidePair::new(5, 5);
        s.raw_clip = SidePair::new(50, 50);
        // 10 / 100 == 0.1
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::EfDiscFraction));

        s.category = SiteCategory::SIBLING;
        assert_eq!(verdict(&s, &control), Verdict::Accept);
    }

    #[test]
    fn test_missing_control() {
        let s = site(SiteCategory::NON_TRANSDUCTION);
        let control = ControlEvidence::default();
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::MissingFeature));

        let mut control = ControlEvidence::default();
        control.features.insert_first("chr1", 1000, clean_feature());
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::MissingDepth));

        let control = control_with(clean_feature(), (0.0, 0.0));
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::ControlDepthZero));
    }

    #[test]
    fn test_control_polya_ratio() {
        let feature = ControlFeature {
            polya: 7,
            ..clean_feature()
        };
        // 7 / 20 = 0.35 > 0.3
        let control = control_with(feature, (10.0, 10.0));
        let s = site(SiteCategory::NON_TRANSDUCTION);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::ControlPolyA));
    }

    #[test]
    fn test_case_control_branch_by_category() {
        // control disc ratio 0.4 vs case 0.5; raw clip ratio 0.4 vs case 1.0;
        // effective clip 0 vs case 0.8
        let feature = ControlFeature {
            disc_pairs: 4,
            raw_clip: SidePair::new(2, 2),
            clip: 0,
            full_map: 100,
            ..clean_feature()
        };
        let control = control_with(feature, (10.0, 10.0));

        let s = site(SiteCategory::TRANSDUCTION);
        assert_eq!(
            verdict(&s, &control),
            Verdict::Reject(Rejection::TransductionInControl)
        );

        // canonical sites compare effective clips instead
        let s = site(SiteCategory::NON_TRANSDUCTION);
        assert_eq!(verdict(&s, &control), Verdict::Accept);
    }

    #[test]
    fn test_orphan_marker_outside_transduction_class() {
        let category = SiteCategory {
            transduction: false,
            orphan: true,
            sibling: false,
        };

        // weak right-side effective discordant support still trips the orphan side check
        let mut s = site(category);
        s.ef_disc = SidePair::new(6, 0);
        let control = control_with(clean_feature(), (10.0, 10.0));
        assert_eq!(
            verdict(&s, &control),
            Verdict::Reject(Rejection::OrphanEfDiscRatio)
        );

        // 6 / 100 effective discordant fraction is not checked for orphans
        let mut s = site(category);
        s.n_disc = 100;
        assert_eq!(verdict(&s, &control), Verdict::Accept);

        // and the case/control check compares effective clips
        let feature = ControlFeature {
            disc_pairs: 4,
            raw_clip: SidePair::new(2, 2),
            clip: 0,
            full_map: 100,
            ..clean_feature()
        };
        let control = control_with(feature, (10.0, 10.0));
        assert_eq!(verdict(&site(category), &control), Verdict::Accept);
    }

    #[test]
    fn test_control_clip_full_map_step() {
        let feature = ControlFeature {
            clip: 8,
            full_map: 2,
            disc_pairs: 2,
            ..clean_feature()
        };
        // disc ratio 0.2 > 0.15, clip fraction 0.8 > 0.75
        let control = control_with(feature, (10.0, 10.0));
        let mut s = site(SiteCategory::NON_TRANSDUCTION);
        s.ef_clip = SidePair::new(20, 20);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::ControlClipFullMap));
    }

    #[test]
    fn test_control_raw_clip_polya_dominant() {
        let feature = ControlFeature {
            raw_clip: SidePair::new(2, 2),
            full_map: 0,
            polya: 2,
            disc_pairs: 1,
            ..clean_feature()
        };
        // raw clip fraction 1.0, polyA/raw clip 0.5 > 0.375, disc ratio 0.1
        let control = control_with(feature, (10.0, 10.0));
        let mut s = site(SiteCategory::TRANSDUCTION);
        s.raw_clip = SidePair::new(20, 20);
        assert_eq!(verdict(&s, &control), Verdict::Reject(Rejection::ControlRawClip));
    }

    #[test]
    fn test_case_without_polya_against_clipped_control() {
        let feature = ControlFeature {
            raw_clip: SidePair::new(2, 2),
            full_map: 6,
            ..clean_feature()
        };
        // raw clip fraction 0.4 > 0.35
        let control = control_with(feature, (10.0, 10.0));
        let mut s = site(SiteCategory::TRANSDUCTION);
        s.raw_clip = SidePair::new(20, 20);
        assert_eq!(verdict(&s, &control), Verdict::Accept);

        s.polya = SidePair::new(0, 0);
        assert_eq!(
            verdict(&s, &control),
            Verdict::Reject(Rejection::ControlRawClipNoCasePolyA)
        );
    }

    #[test]
    fn test_log_entry_format() {
        let entry = FilterLogEntry {
            chrom: "chr1",
            pos: 1000,
            rejection: Rejection::MissingFeature,
        };
        assert_eq!(
            entry.to_string(),
            "chr1:1000 is filtered out as site is not in m_feature_ctrl!"
        );

        let entry = FilterLogEntry {
            chrom: "chr2",
            pos: 5,
            rejection: Rejection::OrphanRawClipRatio,
        };
        assert_eq!(
            entry.to_string(),
            "chr2:5 (orphan) is filtered out as raw clip ratio is small!"
        );

        let entry = FilterLogEntry {
            chrom: "chr2",
            pos: 5,
            rejection: Rejection::ControlPolyA,
        };
        assert_eq!(entry.to_string(), "chr2:5 is filtered out at polyA ratio step!");
    }
}
