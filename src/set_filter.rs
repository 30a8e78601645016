//! Positional set filters: germline databases, control call sets, blacklists
//!
//! Sites from different sources are matched within a slack window
//! `[pos - slack, pos + slack)`. Germline and blacklist comparisons ignore a
//! leading `chr` on either side.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{info, warn};
use std::io::Write;
use std::path::Path;

use crate::coord_map::{CoordMap, Position};
use crate::input::{for_each_record, load_coord_map};

/// Strip a leading `chr` from names longer than three characters
pub fn normalize_chrom(chrom: &str) -> &str {
    match chrom.strip_prefix("chr") {
        Some(rest) if chrom.len() > 3 => rest,
        _ => chrom,
    }
}

/// True if `reference` holds a position of `chrom` inside `[pos - slack, pos + slack)`
pub fn has_hit_within_slack<T>(reference: &CoordMap<T>, chrom: &str, pos: Position, slack: i64) -> bool {
    let Some(positions) = reference.positions(chrom) else {
        return false;
    };
    let slack = slack.max(0);
    (-slack..slack).any(|offset| pos.checked_add(offset).is_some_and(|p| positions.contains_key(&p)))
}

/// Sites of `case` with no hit in `reference` within the slack window
pub fn subtract_with_slack<T: Clone, U>(case: &CoordMap<T>, reference: &CoordMap<U>, slack: i64) -> CoordMap<T> {
    let mut kept = CoordMap::new();
    for (chrom, pos, value) in case.iter() {
        if !has_hit_within_slack(reference, chrom, pos, slack) {
            kept.insert_first(chrom, pos, value.clone());
        }
    }
    kept
}

/// Sites of `a` with at least one hit in `b` within the slack window
pub fn overlap_with_slack<T, U>(a: &CoordMap<T>, b: &CoordMap<U>, slack: i64) -> CoordMap<()> {
    let mut shared = CoordMap::new();
    for (chrom, pos, _) in a.iter() {
        if has_hit_within_slack(b, chrom, pos, slack) {
            shared.insert_first(chrom, pos, ());
        }
    }
    shared
}

/// Load site keys with normalised chromosome names; first record wins
pub fn load_normalized_sites<P: AsRef<Path>>(path: P) -> Result<CoordMap<()>> {
    let mut sites = CoordMap::new();
    for_each_record(path, |rec| {
        let (chrom, pos) = rec.site_key()?;
        sites.insert_first(normalize_chrom(chrom), pos, ());
        Ok(())
    })?;
    Ok(sites)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub read: usize,
    pub kept: usize,
}

impl FilterStats {
    fn log(&self, what: &str) {
        info!(
            "{what}: {} sites read, {} kept, {} removed",
            self.read,
            self.kept,
            self.read - self.kept
        );
    }
}

/// Copy candidate lines to `out`, keeping those `keep` accepts
fn filter_lines<P, W, F>(candidates: P, mut out: W, mut keep: F) -> Result<FilterStats>
where
    P: AsRef<Path>,
    W: Write,
    F: FnMut(&str, Position) -> bool,
{
    let mut stats = FilterStats::default();
    for_each_record(candidates, |rec| {
        stats.read += 1;
        let (chrom, pos) = rec.site_key()?;
        if keep(chrom, pos) {
            writeln!(out, "{}", rec.raw())?;
            stats.kept += 1;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(stats)
}

/// Drop candidate lines with a germline database hit within `slack`
pub fn filter_by_germline_list<P, Q, W>(germline_db: P, candidates: Q, slack: i64, out: W) -> Result<FilterStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    let db = load_normalized_sites(germline_db)?;
    let stats = filter_lines(candidates, out, |chrom, pos| {
        !has_hit_within_slack(&db, normalize_chrom(chrom), pos, slack)
    })?;
    stats.log("Germline filter");
    Ok(stats)
}

/// Blacklisted regions per chromosome, each list sorted and disjoint
#[derive(Debug, Default, Clone)]
pub struct Blacklist {
    regions: IndexMap<String, Vec<(Position, Position)>>,
}

impl Blacklist {
    /// Load `chrom start end` regions. Lists are expected sorted by start;
    /// they are not re-sorted, but unsorted input is reported.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut blacklist = Blacklist::default();
        for_each_record(path, |rec| {
            rec.require(3)?;
            let chrom = normalize_chrom(rec.text(0)?);
            blacklist.push(chrom, rec.int(1)?, rec.int(2)?);
            Ok(())
        })
        .with_context(|| format!("Failed to load blacklist {}", path.display()))?;

        for (chrom, regions) in &blacklist.regions {
            if regions.windows(2).any(|w| w[1].0 < w[0].0) {
                warn!("Blacklist regions of {chrom} are not sorted; lookups may miss");
            }
        }
        Ok(blacklist)
    }

    pub fn push(&mut self, chrom: &str, start: Position, end: Position) {
        match self.regions.get_mut(chrom) {
            Some(regions) => regions.push((start, end)),
            None => {
                self.regions.insert(chrom.to_string(), vec![(start, end)]);
            }
        }
    }

    /// Inclusive at both ends
    pub fn contains(&self, chrom: &str, pos: Position) -> bool {
        self.regions
            .get(chrom)
            .is_some_and(|regions| is_within_regions(regions, pos))
    }
}

fn is_within_regions(regions: &[(Position, Position)], pos: Position) -> bool {
    regions
        .binary_search_by(|&(start, end)| {
            if end < pos {
                std::cmp::Ordering::Less
            } else if start > pos {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Drop candidate lines falling inside a blacklisted region
pub fn filter_by_blacklist<P, W>(candidates: P, blacklist: &Blacklist, out: W) -> Result<FilterStats>
where
    P: AsRef<Path>,
    W: Write,
{
    let stats = filter_lines(candidates, out, |chrom, pos| {
        !blacklist.contains(normalize_chrom(chrom), pos)
    })?;
    stats.log("Blacklist filter");
    Ok(stats)
}

/// Case sites absent from both the germline database and the control calls,
/// written as `chrom\tpos`
pub fn call_mosaic<P, Q, R, W>(case: P, control: Q, germline_db: R, slack: i64, mut out: W) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
    W: Write,
{
    let case = load_normalized_sites(case)?;
    let somatic = subtract_with_slack(&case, &load_normalized_sites(germline_db)?, slack);
    let mosaic = subtract_with_slack(&somatic, &load_normalized_sites(control)?, slack);

    for (chrom, pos, _) in mosaic.iter() {
        writeln!(out, "{chrom}\t{pos}")?;
    }
    out.flush()?;

    info!(
        "Mosaic calling: {} case sites, {} not germline, {} not in control",
        case.len(),
        somatic.len(),
        mosaic.len()
    );
    Ok(mosaic.len())
}

/// Sites of `first` with a hit in `second` within `slack`, as `chrom\tpos`
pub fn write_overlap<P, Q, W>(first: P, second: Q, slack: i64, mut out: W) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    let shared = overlap_with_slack(&load_normalized_sites(first)?, &load_normalized_sites(second)?, slack);
    for (chrom, pos, _) in shared.iter() {
        writeln!(out, "{chrom}\t{pos}")?;
    }
    out.flush()?;
    info!("Overlap: {} shared sites", shared.len());
    Ok(shared.len())
}

/// Keep lines of a high-confidence call file whose exact site is also in
/// the raw somatic call set
pub fn intersect_sites<P, Q, W>(high_confidence: P, raw_somatic: Q, out: W) -> Result<FilterStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    let raw = load_coord_map(raw_somatic, |_| Ok(()))?;
    let stats = filter_lines(high_confidence, out, |chrom, pos| raw.contains(chrom, pos))?;
    stats.log("Intersection");
    Ok(stats)
}

/// Case sites without a control site within `slack`, keeping the case
/// payload: `chrom\tpos\tinfo` where info is the remaining fields tab-joined
pub fn compare_case_control<P, Q, W>(case: P, control: Q, slack: i64, mut out: W) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    W: Write,
{
    let case = load_coord_map(case, |rec| Ok(rec.fields()[2..].join("\t")))?;
    let control = load_coord_map(control, |_| Ok(()))?;
    let somatic = subtract_with_slack(&case, &control, slack);

    for (chrom, pos, info) in somatic.iter() {
        writeln!(out, "{chrom}\t{pos}\t{info}")?;
    }
    out.flush()?;
    info!("Case/control comparison: {} of {} case sites kept", somatic.len(), case.len());
    Ok(somatic.len())
}
