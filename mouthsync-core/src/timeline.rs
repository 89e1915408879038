//! Viseme timeline data structures

use crate::{Error, Result, VisemeCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single time-stamped viseme interval, as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisemeInterval {
    /// Viseme category id (0-17 for known categories)
    pub viseme: u32,
    /// Phoneme label, for display and debugging only
    #[serde(default)]
    pub phoneme: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl VisemeInterval {
    /// Creates a new interval
    pub fn new(viseme: u32, phoneme: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            viseme,
            phoneme: phoneme.into(),
            start,
            end,
        }
    }

    /// Known category of this interval, if any
    pub fn category(&self) -> Option<VisemeCategory> {
        VisemeCategory::from_id(self.viseme)
    }

    /// Checks if `time` falls within this interval, both ends inclusive
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Returns the duration of this interval in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, non-overlapping sequence of viseme intervals for one audio clip.
///
/// A timeline can only be built through [`Timeline::new`], which rejects
/// unsorted, overlapping or degenerate intervals. Intervals that merely touch
/// (`previous.end == next.start`) are accepted. Cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    intervals: Arc<[VisemeInterval]>,
}

impl Timeline {
    /// Validates and wraps a list of intervals
    pub fn new(intervals: Vec<VisemeInterval>) -> Result<Self> {
        validate(&intervals)?;
        Ok(Self {
            intervals: intervals.into(),
        })
    }

    /// A timeline without intervals
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new().into(),
        }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VisemeInterval> {
        self.intervals.get(index)
    }

    pub fn intervals(&self) -> &[VisemeInterval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VisemeInterval> {
        self.intervals.iter()
    }

    /// End time of the last interval, or zero for an empty timeline
    pub fn duration(&self) -> f64 {
        self.intervals.last().map_or(0.0, |last| last.end)
    }

    /// Sum of the interval durations, excluding gaps
    pub fn voiced_duration(&self) -> f64 {
        self.intervals.iter().map(VisemeInterval::duration).sum()
    }

    /// Number of intervals per viseme id
    pub fn statistics(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for interval in self.intervals.iter() {
            *counts.entry(interval.viseme).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<VisemeInterval>> for Timeline {
    type Error = Error;

    fn try_from(intervals: Vec<VisemeInterval>) -> Result<Self> {
        Self::new(intervals)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a VisemeInterval;
    type IntoIter = std::slice::Iter<'a, VisemeInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate(intervals: &[VisemeInterval]) -> Result<()> {
    let mut previous: Option<&VisemeInterval> = None;

    for (index, interval) in intervals.iter().enumerate() {
        if !interval.start.is_finite() || !interval.end.is_finite() {
            return Err(Error::NonFiniteTime { index });
        }
        if interval.start < 0.0 || interval.start >= interval.end {
            return Err(Error::InvalidInterval {
                index,
                start: interval.start,
                end: interval.end,
            });
        }
        if let Some(prev) = previous {
            if interval.start < prev.start {
                return Err(Error::Unsorted { index });
            }
            if interval.start < prev.end {
                return Err(Error::Overlapping { index });
            }
        }
        previous = Some(interval);
    }

    Ok(())
}
