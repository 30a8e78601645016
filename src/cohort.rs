//! Cohort-level case/control comparison
//!
//! A sample map pairs each sample ID with the ID its tumor BAM was called
//! under. Case results are listed by BAM ID; control results by sample ID
//! plus a trailing `_<tag>` (e.g. `P1_normal`). Every sample with both a case
//! and a control result gets `<bam_id>.somatic` in the output directory.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::input::for_each_record;
use crate::set_filter::compare_case_control;

/// Index of matched samples written next to the per-sample results
pub const MATCHED_LIST_NAME: &str = "matched_case_control_rslt.list";

/// Case and control result files of one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSample {
    pub bam_id: String,
    pub case: PathBuf,
    pub control: PathBuf,
}

#[derive(Debug, Default)]
pub struct CohortStats {
    /// Somatic site count per matched sample, in sample-map order
    pub somatic: Vec<(String, usize)>,
    pub unmatched: usize,
}

/// Drop the last `_`-separated token of a control ID. An ID without `_`
/// maps to the empty string and will not match any sample.
pub fn strip_last_suffix(id: &str) -> &str {
    id.rsplit_once('_').map_or("", |(head, _)| head)
}

/// Sample map `sample_id bam_id`, keyed by BAM ID. A repeated BAM ID keeps
/// its first position and takes the last sample ID.
pub fn load_sample_map<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, String>> {
    let mut by_bam_id = IndexMap::new();
    for_each_record(path, |rec| {
        let sample_id = rec.text(0)?;
        let bam_id = rec.text(1)?;
        by_bam_id.insert(bam_id.to_string(), sample_id.to_string());
        Ok(())
    })?;
    Ok(by_bam_id)
}

/// Result list `id path`; later lines for the same ID replace earlier ones
pub fn load_result_list<P: AsRef<Path>>(path: P, strip_suffix: bool) -> Result<IndexMap<String, PathBuf>> {
    let mut results = IndexMap::new();
    for_each_record(path, |rec| {
        let mut id = rec.text(0)?;
        if strip_suffix {
            id = strip_last_suffix(id);
        }
        results.insert(id.to_string(), PathBuf::from(rec.text(1)?));
        Ok(())
    })?;
    Ok(results)
}

/// Pair every mapped sample with its case and control results. Samples
/// missing either side are logged and counted as unmatched.
pub fn match_samples(
    sample_map: &IndexMap<String, String>,
    case_results: &IndexMap<String, PathBuf>,
    control_results: &IndexMap<String, PathBuf>,
) -> (Vec<MatchedSample>, usize) {
    let mut matched = Vec::new();
    let mut unmatched = 0;

    for (bam_id, sample_id) in sample_map {
        let Some(case) = case_results.get(bam_id) else {
            warn!("{bam_id} does not have a case result");
            unmatched += 1;
            continue;
        };
        let Some(control) = control_results.get(sample_id) else {
            warn!("{sample_id} does not have a control result");
            unmatched += 1;
            continue;
        };
        matched.push(MatchedSample {
            bam_id: bam_id.clone(),
            case: case.clone(),
            control: control.clone(),
        });
    }

    (matched, unmatched)
}

fn create_in(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Match the cohort, write the matched list, then compare each sample's case
/// calls against its control calls within `slack`
pub fn call_cohort<P, Q, R>(
    sample_map: P,
    case_list: Q,
    control_list: R,
    slack: i64,
    out_dir: &Path,
) -> Result<CohortStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let sample_map = load_sample_map(sample_map)?;
    let case_results = load_result_list(case_list, false)?;
    let control_results = load_result_list(control_list, true)?;
    let (matched, unmatched) = match_samples(&sample_map, &case_results, &control_results);

    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let mut index = create_in(out_dir, MATCHED_LIST_NAME)?;
    for sample in &matched {
        writeln!(
            index,
            "{}\t{}\t{}",
            sample.bam_id,
            sample.case.display(),
            sample.control.display()
        )?;
    }
    index.flush()?;

    let mut stats = CohortStats {
        unmatched,
        ..Default::default()
    };
    for sample in &matched {
        let out = create_in(out_dir, &format!("{}.somatic", sample.bam_id))?;
        let kept = compare_case_control(&sample.case, &sample.control, slack, out)
            .with_context(|| format!("Case/control comparison failed for {}", sample.bam_id))?;
        stats.somatic.push((sample.bam_id.clone(), kept));
    }

    info!(
        "Cohort: {} samples compared, {} without a case or control result",
        stats.somatic.len(),
        stats.unmatched
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_last_suffix() {
        assert_eq!(strip_last_suffix("P1_normal"), "P1");
        assert_eq!(strip_last_suffix("P1_x_y"), "P1_x");
        assert_eq!(strip_last_suffix("P1"), "");
        assert_eq!(strip_last_suffix("_blood"), "");
    }

    #[test]
    fn test_match_samples_counts_missing_sides() {
        let sample_map: IndexMap<String, String> = [("bamA", "P1"), ("bamB", "P2"), ("bamC", "P3")]
            .iter()
            .map(|(b, s)| (b.to_string(), s.to_string()))
            .collect();
        let case: IndexMap<String, PathBuf> = [("bamA", "a.txt"), ("bamB", "b.txt")]
            .iter()
            .map(|(id, p)| (id.to_string(), PathBuf::from(p)))
            .collect();
        let control: IndexMap<String, PathBuf> = [("P1", "p1.txt"), ("P3", "p3.txt")]
            .iter()
            .map(|(id, p)| (id.to_string(), PathBuf::from(p)))
            .collect();

        let (matched, unmatched) = match_samples(&sample_map, &case, &control);
        assert_eq!(
            matched,
            vec![MatchedSample {
                bam_id: "bamA".to_string(),
                case: PathBuf::from("a.txt"),
                control: PathBuf::from("p1.txt"),
            }]
        );
        assert_eq!(unmatched, 2);
    }
}
