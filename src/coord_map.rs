//! Sparse container keyed by chromosome, then position
//!
//! Every site-level data set in the pipeline (candidate sets, consensus
//! clusters, control features and depths, exclusion sets) is held in one of
//! these. Iteration follows insertion order so exports are deterministic.

use indexmap::map::Entry;
use indexmap::IndexMap;

/// Genomic position. Signed so slack windows can extend below zero.
pub type Position = i64;

/// Positions recorded for one chromosome
pub type PositionMap<T> = IndexMap<Position, T>;

/// Result of a keyed lookup, keeping the two kinds of miss apart
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a, T> {
    ChromAbsent,
    PositionAbsent,
    Found(&'a T),
}

impl<'a, T> Lookup<'a, T> {
    pub fn found(self) -> Option<&'a T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordMap<T> {
    chroms: IndexMap<String, PositionMap<T>>,
}

impl<T> Default for CoordMap<T> {
    fn default() -> Self {
        CoordMap {
            chroms: IndexMap::new(),
        }
    }
}

impl<T> CoordMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the site is already present. Returns false (and leaves
    /// the stored value untouched) for a repeated site.
    pub fn insert_first(&mut self, chrom: &str, pos: Position, value: T) -> bool {
        let positions = match self.chroms.get_index_of(chrom) {
            Some(idx) => &mut self.chroms[idx],
            None => self.chroms.entry(chrom.to_string()).or_default(),
        };

        match positions.entry(pos) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn lookup(&self, chrom: &str, pos: Position) -> Lookup<'_, T> {
        match self.chroms.get(chrom) {
            None => Lookup::ChromAbsent,
            Some(positions) => match positions.get(&pos) {
                None => Lookup::PositionAbsent,
                Some(value) => Lookup::Found(value),
            },
        }
    }

    pub fn get(&self, chrom: &str, pos: Position) -> Option<&T> {
        self.lookup(chrom, pos).found()
    }

    pub fn contains(&self, chrom: &str, pos: Position) -> bool {
        self.get(chrom, pos).is_some()
    }

    pub fn positions(&self, chrom: &str) -> Option<&PositionMap<T>> {
        self.chroms.get(chrom)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position, &T)> {
        self.chroms.iter().flat_map(|(chrom, positions)| {
            positions
                .iter()
                .map(move |(pos, value)| (chrom.as_str(), *pos, value))
        })
    }

    /// Total number of sites over all chromosomes
    pub fn len(&self) -> usize {
        self.chroms.values().map(|positions| positions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.values().all(|positions| positions.is_empty())
    }
}
