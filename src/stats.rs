//! Descriptive statistics of metric samples

use itertools::{Itertools, MinMaxResult::MinMax, MinMaxResult::OneElement};
use serde::Serialize;
use std::{cmp::Ordering, fmt};

fn partition(data: &[f64]) -> Option<(Vec<f64>, f64, Vec<f64>)> {
    let (pivot, tail) = data.split_first()?;
    let (left, right): (Vec<f64>, Vec<f64>) = tail.iter().partition(|&x| x < pivot);
    Some((left, *pivot, right))
}

/// k-th smallest value
fn select(data: &[f64], k: usize) -> Option<f64> {
    let (left, pivot, right) = partition(data)?;
    let pivot_idx = left.len();
    match pivot_idx.cmp(&k) {
        Ordering::Equal => Some(pivot),
        Ordering::Greater => select(&left, k),
        Ordering::Less => select(&right, k - (pivot_idx + 1)),
    }
}

pub fn median(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        even if even % 2 == 0 => Some((select(data, even / 2 - 1)? + select(data, even / 2)?) / 2.),
        odd => select(data, odd / 2),
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Percentage of `data` below `score`, ties counting for half
///
/// This is the average of the strict (`<`) and weak (`<=`) percentages,
/// a score equal to the mean of a symmetric sample ranks at 50.
pub fn percentile_of_score(data: &[f64], score: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let strict = data.iter().filter(|&&x| x < score).count();
    let weak = data.iter().filter(|&&x| x <= score).count();
    Some((strict + weak) as f64 * 50. / data.len() as f64)
}

/// Sample summary: count, mean, median and range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}
impl Summary {
    pub fn new(data: &[f64]) -> Option<Self> {
        let (min, max) = match data.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMax(x, y) => (x, y),
            OneElement(x) => (x, x),
            _ => return None,
        };
        Some(Self {
            count: data.len(),
            mean: mean(data)?,
            median: median(data)?,
            min,
            max,
        })
    }
}
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            self.count, self.mean, self.median, self.min, self.max
        )
    }
}

/// Equal-width histogram with the bin of a marked value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Bin holding the marked value
    pub marker: Option<usize>,
}
impl Histogram {
    /// Bins `data` into `n_bins` bins spanning the data and the `marker` value
    pub fn new(data: &[f64], n_bins: usize, marker: Option<f64>) -> Option<Self> {
        if n_bins == 0 {
            return None;
        }
        let (lo, hi) = match data.iter().chain(marker.iter()).copied().minmax_by(|a, b| a.total_cmp(b)) {
            MinMax(x, y) => (x, y),
            OneElement(x) => (x, x),
            _ => return None,
        };
        let width = if hi > lo { (hi - lo) / n_bins as f64 } else { 1. };
        let bin = |x: f64| (((x - lo) / width).floor() as usize).min(n_bins - 1);
        let mut counts = vec![0; n_bins];
        data.iter().for_each(|&x| counts[bin(x)] += 1);
        Some(Self {
            edges: (0..=n_bins).map(|i| lo + width * i as f64).collect(),
            counts,
            marker: marker.map(bin),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medians() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.]), Some(3.));
        assert_eq!(median(&[5., 1., 3.]), Some(3.));
        assert_eq!(median(&[4., 1., 3., 2.]), Some(2.5));
        assert_eq!(median(&[2., 2., 2., 1.]), Some(2.));
    }

    #[test]
    fn percentile_ties() {
        let data = [1., 2., 3., 4., 5.];
        // symmetric sample, score at the mean
        assert!((percentile_of_score(&data, 3.).unwrap() - 50.).abs() < 1e-12);
        assert!((percentile_of_score(&[1., 2., 4., 5.], 3.).unwrap() - 50.).abs() < 1e-12);
        assert_eq!(percentile_of_score(&data, 0.), Some(0.));
        assert_eq!(percentile_of_score(&data, 5.), Some(90.));
        assert_eq!(percentile_of_score(&data, 6.), Some(100.));
        assert_eq!(percentile_of_score(&[], 6.), None);
    }

    #[test]
    fn summary() {
        let s = Summary::new(&[4., 1., 3., 2.]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!((s.min, s.max), (1., 4.));
        assert!(Summary::new(&[]).is_none());
    }

    #[test]
    fn histogram() {
        let h = Histogram::new(&[0., 1., 2., 3., 4.], 2, Some(10.)).unwrap();
        assert_eq!(h.edges, vec![0., 5., 10.]);
        assert_eq!(h.counts, vec![5, 0]);
        assert_eq!(h.marker, Some(1));
        let h = Histogram::new(&[2., 2.], 3, None).unwrap();
        assert_eq!(h.counts, vec![2, 0, 0]);
        assert!(Histogram::new(&[], 3, None).is_none());
        assert!(Histogram::new(&[1.], 0, None).is_none());
    }
}
