//! Empirical flow-size CDF with piecewise-linear sampling.

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CdfError {
    #[error("CDF table needs at least two points")]
    TooFewPoints,
    #[error("CDF percentiles must be non-decreasing (saw {prev} then {next})")]
    NotMonotone { prev: f64, next: f64 },
    #[error("CDF sizes must be sorted ascending (saw {prev} then {next})")]
    UnsortedSizes { prev: u64, next: u64 },
    #[error("CDF must end at 100 percent (ends at {last})")]
    IncompleteTail { last: f64 },
}

/// Flow sizes (bytes) against cumulative percentage, sorted by size.
#[derive(Debug, Clone)]
pub struct FlowSizeCdf {
    points: Vec<(u64, f64)>,
}

impl FlowSizeCdf {
    pub fn new(points: Vec<(u64, f64)>) -> Result<Self, CdfError> {
        if points.len() < 2 {
            return Err(CdfError::TooFewPoints);
        }
        for pair in points.windows(2) {
            if pair[1].1 < pair[0].1 {
                return Err(CdfError::NotMonotone {
                    prev: pair[0].1,
                    next: pair[1].1,
                });
            }
            if pair[1].0 < pair[0].0 {
                return Err(CdfError::UnsortedSizes {
                    prev: pair[0].0,
                    next: pair[1].0,
                });
            }
        }
        let last = points.last().expect("len checked").1;
        if last < 100.0 {
            return Err(CdfError::IncompleteTail { last });
        }
        Ok(Self { points })
    }

    /// Hadoop workload flow sizes (web-search style heavy tail).
    pub fn hadoop() -> Self {
        Self::new(vec![
            (0, 0.0),
            (100, 1.0),
            (200, 2.0),
            (300, 5.0),
            (350, 15.0),
            (400, 20.0),
            (500, 30.0),
            (600, 40.0),
            (700, 50.0),
            (1_000, 60.0),
            (2_000, 67.0),
            (7_000, 70.0),
            (30_000, 72.0),
            (50_000, 82.0),
            (80_000, 87.0),
            (120_000, 90.0),
            (300_000, 95.0),
            (1_000_000, 97.5),
            (2_000_000, 99.0),
            (10_000_000, 100.0),
        ])
        .expect("built-in table is valid")
    }

    /// Mean flow size in bytes, weighting each point by its probability mass.
    pub fn mean_bytes(&self) -> f64 {
        let mut mean = 0.0;
        for pair in self.points.windows(2) {
            let prob = pair[1].1 - pair[0].1;
            mean += pair[1].0 as f64 * prob / 100.0;
        }
        mean
    }

    /// Sample a flow size, interpolating linearly between adjacent points.
    pub fn sample(&self, rng: &mut impl Rng) -> u64 {
        let p: f64 = rng.gen_range(0.0..100.0);
        for (i, &(size, cdf)) in self.points.iter().enumerate() {
            if p <= cdf {
                if i == 0 {
                    return size;
                }
                let (prev_size, prev_cdf) = self.points[i - 1];
                let span = cdf - prev_cdf;
                if span <= 0.0 {
                    return size;
                }
                let ratio = (p - prev_cdf) / span;
                return prev_size + (ratio * (size - prev_size) as f64) as u64;
            }
        }
        self.points.last().expect("len checked").0
    }
}
