//! Property tests: cascade monotonicity, output subset, first-seen dedup


use meisomatic::aggregate::{aggregate_candidates, AggregateEvidence, CandidateStreams};
use meisomatic::cascade::{evaluate_site, ratio_filter, ControlEvidence, Verdict};
use meisomatic::config::{CascadeConfig, CategoryMarkers, ConsistencyConfig};
use meisomatic::evidence::{ControlDepth, ControlFeature};
use meisomatic::interval::{ClusterInterval, SidePair};
use meisomatic::site::{CandidateSite, CaseClusters, SiteCategory};
use proptest::prelude::*;
use std::collections::HashSet;
use tempfile::TempDir;
use test_utils::{read_lines, write_lines, SiteLine};

fn category() -> impl Strategy<Value = SiteCategory> {
    prop_oneof![
        Just(SiteCategory::NON_TRANSDUCTION),
        Just(SiteCategory::TRANSDUCTION),
        Just(SiteCategory::SIBLING),
        Just(SiteCategory::ORPHAN),
    ]
}

fn pair(max: i64) -> impl Strategy<Value = SidePair<i64>> {
    (0..=max, 0..=max).prop_map(|(l, r)| SidePair::new(l, r))
}

fn site() -> impl Strategy<Value = CandidateSite> {
    (
        category(),
        pair(20),
        pair(20),
        pair(5),
        (0u32..40, 0u32..40),
        pair(20),
        0i64..40,
    )
        .prop_map(|(category, ef_clip, ef_disc, polya, cov, raw_clip, n_disc)| {
            let absent = SidePair::new(ClusterInterval::Absent, ClusterInterval::Absent);
            CandidateSite {
                chrom: "chr1".to_string(),
                pos: 1000,
                category,
                ef_clip,
                ef_disc,
                polya,
                coverage: SidePair::new(cov.0 as f64, cov.1 as f64),
                clusters: CaseClusters { clip: absent, disc: absent },
                td_source: "chr7:1-100".to_string(),
                n_clip: 10,
                n_full_map: 20,
                raw_clip,
                n_disc,
                n_concord: 30,
            }
        })
}

fn control() -> impl Strategy<Value = ControlEvidence> {
    (0i64..15, 0i64..30, pair(10), 0i64..10, 0i64..8, (0u32..30, 0u32..30)).prop_map(
        |(clip, full_map, raw_clip, disc_pairs, polya, depth)| {
            let mut control = ControlEvidence::default();
            control.features.insert_first(
                "chr1",
                1000,
                ControlFeature {
                    clip,
                    full_map,
                    raw_clip,
                    disc_pairs,
                    concord_pairs: 30,
                    large_indel_disc: 0,
                    clip_lens: "0".to_string(),
                    polya,
                },
            );
            control.depth.insert_first(
                "chr1",
                1000,
                ControlDepth {
                    coverage: SidePair::new(depth.0 as f64, depth.1 as f64),
                },
            );
            control
        },
    )
}

/// Tighten one cutoff in its rejecting direction: minimums go up, ceilings down
fn tighten(config: &CascadeConfig, which: usize, delta: f64) -> CascadeConfig {
    let mut tight = config.clone();
    match which {
        0 => tight.disc_ef_ratio += delta,
        1 => tight.ef_disc_depth_cutoff += delta,
        2 => tight.disc_cutoff += delta,
        3 => tight.case_raw_clip_cutoff += delta,
        4 => tight.ctrl_disc_cutoff -= delta,
        5 => tight.case_ctrl_cutoff -= delta,
        6 => tight.ctrl_clip_ratio -= delta,
        7 => tight.ctrl_raw_clip_flex_ratio -= delta,
        _ => tight.ctrl_polya_cutoff -= delta,
    }
    tight
}

proptest! {
    #[test]
    fn prop_tightening_never_rescues_a_site(
        site in site(),
        control in control(),
        which in 0usize..9,
        delta in 0.0f64..0.5,
    ) {
        let loose = CascadeConfig::default();
        let tight = tighten(&loose, which, delta);
        if let Verdict::Reject(_) = evaluate_site(&site, &control, &loose) {
            prop_assert!(matches!(evaluate_site(&site, &control, &tight), Verdict::Reject(_)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_accepted_lines_are_a_subset_of_input(
        sites in prop::collection::vec((1i64..6, 1i64..500, 0i64..12, 0u32..30), 1..20)
    ) {
        let dir = TempDir::new().unwrap();
        let mut feature_lines = Vec::new();
        let mut depth_lines = Vec::new();
        let lines: Vec<String> = sites
            .iter()
            .enumerate()
            .map(|(i, &(chrom, pos, n_disc, cov))| {
                let chrom = format!("chr{chrom}");
                if i % 3 != 0 {
                    feature_lines.push(test_utils::clean_feature_line(&chrom, pos));
                    depth_lines.push(test_utils::depth_line(&chrom, pos, 10.0, 10.0));
                }
                let mut line = SiteLine::new(&chrom, pos);
                line.n_disc = n_disc;
                line.coverage = (cov as f64, 10.0);
                line.render()
            })
            .collect();

        let mut control = ControlEvidence::default();
        for line in &feature_lines {
            let rec = meisomatic::record::Record::new("f", 1, line);
            let (chrom, pos) = rec.site_key().unwrap();
            control.features.insert_first(chrom, pos, ControlFeature::parse(&rec).unwrap());
        }
        for line in &depth_lines {
            let rec = meisomatic::record::Record::new("d", 1, line);
            let (chrom, pos) = rec.site_key().unwrap();
            control.depth.insert_first(chrom, pos, ControlDepth::parse(&rec).unwrap());
        }

        let input = write_lines(dir.path(), "candidates.txt", &lines);
        let mut out = Vec::new();
        let mut log = Vec::new();
        let stats = ratio_filter(
            &input,
            &control,
            &CascadeConfig::default(),
            &CategoryMarkers::default(),
            &mut out,
            &mut log,
        )
        .unwrap();

        let accepted: Vec<&str> = std::str::from_utf8(&out).unwrap().lines().collect();
        let logged = std::str::from_utf8(&log).unwrap().lines().count();
        let input_set: HashSet<&str> = lines.iter().map(String::as_str).collect();
        prop_assert!(accepted.iter().all(|line| input_set.contains(line)));
        prop_assert_eq!(accepted.len() + logged, lines.len());
        prop_assert_eq!(stats.accepted, accepted.len());
    }

    #[test]
    fn prop_each_site_is_emitted_at_most_once(
        non_td in prop::collection::vec((1i64..3, 1i64..20), 0..15),
        td in prop::collection::vec((1i64..3, 1i64..20), 0..15),
        orphan in prop::collection::vec((1i64..3, 1i64..20), 0..15),
    ) {
        let dir = TempDir::new().unwrap();
        let render = |sites: &[(i64, i64)], label: &str| -> Vec<String> {
            sites
                .iter()
                .map(|&(c, p)| SiteLine::new(&format!("chr{c}"), p * 100).with_label(label).render())
                .collect()
        };
        let streams = CandidateStreams {
            non_transduction: write_lines(dir.path(), "non_td.txt", &render(&non_td, "not_transduction")),
            transduction: write_lines(dir.path(), "td.txt", &render(&td, "two_side")),
            orphan: write_lines(dir.path(), "orphan.txt", &render(&orphan, "orphan")),
        };
        let out_path = dir.path().join("merged.txt");
        let stats = aggregate_candidates(
            &streams,
            &AggregateEvidence::default(),
            &ConsistencyConfig::default(),
            std::fs::File::create(&out_path).unwrap(),
        )
        .unwrap();

        let merged = read_lines(&out_path);
        let keys: Vec<(String, String)> = merged
            .iter()
            .map(|line| {
                let mut fields = line.split('\t');
                (fields.next().unwrap().to_string(), fields.next().unwrap().to_string())
            })
            .collect();
        let unique: HashSet<&(String, String)> = keys.iter().collect();
        prop_assert_eq!(unique.len(), keys.len());

        let distinct_input: HashSet<(i64, i64)> =
            non_td.iter().chain(&td).chain(&orphan).copied().collect();
        prop_assert_eq!(merged.len(), distinct_input.len());
        prop_assert_eq!(stats.read, non_td.len() + td.len() + orphan.len());
        prop_assert_eq!(stats.duplicates, stats.read - distinct_input.len());

        // the first stream to mention a site supplies its line
        if let Some(&(c, p)) = non_td.first() {
            let expected = SiteLine::new(&format!("chr{c}"), p * 100)
                .with_label("not_transduction")
                .render();
            prop_assert!(merged.contains(&expected));
        }
    }
}
