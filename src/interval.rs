//! Cluster interval descriptors and the case/control consistency test

use nom::{
    character::complete::char, combinator::all_consuming, number::complete::double,
    sequence::separated_pair, IResult,
};
use std::fmt;

/// Left/right pair of per-breakpoint-side values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SidePair<T> {
    pub left: T,
    pub right: T,
}

impl<T> SidePair<T> {
    pub fn new(left: T, right: T) -> Self {
        SidePair { left, right }
    }
}

impl SidePair<i64> {
    pub fn sum(&self) -> i64 {
        self.left.saturating_add(self.right)
    }
}

impl SidePair<f64> {
    pub fn sum(&self) -> f64 {
        self.left + self.right
    }
}

/// Interval of a clip or discordant-read cluster.
///
/// Written as `start:end` on disk; `-1:-1` marks a side where no cluster was
/// formed and is kept as `Absent` so it never enters a distance comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterInterval {
    Absent,
    Span { start: i64, end: i64 },
}

fn endpoints(input: &str) -> IResult<&str, (f64, f64)> {
    all_consuming(separated_pair(double, char(':'), double))(input)
}

impl ClusterInterval {
    pub fn from_endpoints(start: i64, end: i64) -> Self {
        if start == -1 && end == -1 {
            ClusterInterval::Absent
        } else {
            ClusterInterval::Span { start, end }
        }
    }

    /// Parse `start:end`. Endpoints may be written as floats and are truncated.
    pub fn parse(text: &str) -> Option<Self> {
        let (_, (start, end)) = endpoints(text.trim()).ok()?;
        if !start.is_finite() || !end.is_finite() {
            return None;
        }
        Some(Self::from_endpoints(start.trunc() as i64, end.trunc() as i64))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ClusterInterval::Absent)
    }

    /// True when any endpoint of `self` lies strictly within `tolerance` of
    /// any endpoint of `other`, pairing start/start and end/end as well as
    /// start/end and end/start. Absent on either side is never near.
    pub fn is_near(&self, other: &ClusterInterval, tolerance: i64) -> bool {
        let (
            ClusterInterval::Span { start: s1, end: e1 },
            ClusterInterval::Span { start: s2, end: e2 },
        ) = (*self, *other)
        else {
            return false;
        };

        let close = |a: i64, b: i64| u64::try_from(tolerance).is_ok_and(|t| a.abs_diff(b) < t);
        close(s1, s2) || close(e1, e2) || close(s1, e2) || close(e1, s2)
    }
}

impl fmt::Display for ClusterInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterInterval::Absent => write!(f, "-1:-1"),
            ClusterInterval::Span { start, end } => write!(f, "{start}:{end}"),
        }
    }
}

/// Case and control clusters are consistent when either breakpoint side
/// independently has nearby intervals.
pub fn sides_consistent(
    case: &SidePair<ClusterInterval>,
    control: &SidePair<ClusterInterval>,
    tolerance: i64,
) -> bool {
    case.left.is_near(&control.left, tolerance) || case.right.is_near(&control.right, tolerance)
}
