//! HdrHistogram-backed latency and skew recording.
//!
//! [`LatencyHistogram`] records non-negative microsecond samples.
//! [`SignedHistogram`] records clock-skew samples, which can be negative;
//! HdrHistogram is unsigned, so it keeps two buckets (negative magnitudes
//! and non-negative values) and combines them for mean and quantiles.
//!
//! Both are single-owner: the drivers record from the calling task only,
//! so no internal locking is needed. Histograms use 3 significant figures
//! with auto-resize enabled.

use std::io;

use hdrhistogram::Histogram;

/// Microsecond latency histogram.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    h: Histogram<u64>,
}

impl LatencyHistogram {
    /// Creates an empty histogram with auto-resize enabled.
    pub fn new() -> Self {
        let mut h = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        h.auto(true);
        Self { h }
    }

    /// Records one sample in microseconds.
    pub fn record(&mut self, micros: u64) {
        let _ = self.h.record(micros);
    }

    /// Number of samples recorded.
    pub fn len(&self) -> u64 {
        self.h.len()
    }

    /// Returns `true` if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.h.is_empty()
    }

    /// Mean sample value in microseconds. Returns 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.h.is_empty() {
            return 0.0;
        }
        self.h.mean()
    }

    /// Minimum recorded value in microseconds.
    pub fn min(&self) -> u64 {
        self.h.min()
    }

    /// Maximum recorded value in microseconds.
    pub fn max(&self) -> u64 {
        self.h.max()
    }

    /// Value at quantile `q` (0.0..=1.0) in microseconds. Returns 0 when
    /// empty.
    pub fn value_at_quantile(&self, q: f64) -> u64 {
        if self.h.is_empty() {
            return 0;
        }
        self.h.value_at_quantile(q)
    }

    /// Prints a one-block summary with the requested percentiles
    /// (expressed as 0..=100 values, e.g. `&[50.0]` for the median).
    pub fn print<W: io::Write>(
        &self,
        out: &mut W,
        title: &str,
        percentiles: &[f64],
    ) -> io::Result<()> {
        writeln!(
            out,
            "{} : count {}, min {}, mean {:.2}, max {}",
            title,
            self.len(),
            self.min(),
            self.mean(),
            self.max()
        )?;
        for p in percentiles {
            writeln!(out, "p{} : {}", p, self.value_at_quantile(p / 100.0))?;
        }
        Ok(())
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed microsecond histogram for clock-skew samples.
///
/// Negative samples are stored by magnitude in a separate bucket, the same
/// dual-histogram arrangement the latency recorder uses for success/error
/// separation elsewhere in this family of tools.
#[derive(Debug, Clone)]
pub struct SignedHistogram {
    positive: Histogram<u64>,
    negative: Histogram<u64>,
}

impl SignedHistogram {
    /// Creates an empty signed histogram with auto-resize enabled.
    pub fn new() -> Self {
        let mut positive = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        positive.auto(true);
        let mut negative = Histogram::<u64>::new(3).expect("3 sigfigs is always valid");
        negative.auto(true);
        Self { positive, negative }
    }

    /// Records one signed sample in microseconds.
    pub fn record(&mut self, micros: i64) {
        if micros < 0 {
            let _ = self.negative.record(micros.unsigned_abs());
        } else {
            let _ = self.positive.record(micros as u64);
        }
    }

    /// Number of samples recorded.
    pub fn len(&self) -> u64 {
        self.positive.len() + self.negative.len()
    }

    /// Returns `true` if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean sample value in microseconds. Returns 0.0 when empty.
    pub fn mean(&self) -> f64 {
        let total = self.len();
        if total == 0 {
            return 0.0;
        }
        let pos_sum = self.positive.mean() * self.positive.len() as f64;
        let neg_sum = self.negative.mean() * self.negative.len() as f64;
        (pos_sum - neg_sum) / total as f64
    }

    /// Value at quantile `q` (0.0..=1.0) in microseconds.
    ///
    /// Ranks ascend from the most negative sample; the negative bucket is
    /// therefore walked in reverse magnitude order before the positive
    /// bucket is consulted.
    pub fn value_at_quantile(&self, q: f64) -> i64 {
        let total = self.len();
        if total == 0 {
            return 0;
        }
        let neg = self.negative.len();
        let rank = (q.clamp(0.0, 1.0) * total as f64).ceil().max(1.0) as u64;
        if rank <= neg {
            let inner_q = 1.0 - (rank as f64 - 0.5) / neg as f64;
            -(self.negative.value_at_quantile(inner_q) as i64)
        } else if self.positive.is_empty() {
            -(self.negative.value_at_quantile(0.0) as i64)
        } else {
            let inner_q = (rank - neg) as f64 / self.positive.len() as f64;
            self.positive.value_at_quantile(inner_q.min(1.0)) as i64
        }
    }

    /// Prints a one-block summary with the requested percentiles
    /// (expressed as 0..=100 values).
    pub fn print<W: io::Write>(
        &self,
        out: &mut W,
        title: &str,
        percentiles: &[f64],
    ) -> io::Result<()> {
        writeln!(
            out,
            "{} : count {}, mean {:.2}",
            title,
            self.len(),
            self.mean()
        )?;
        for p in percentiles {
            writeln!(out, "p{} : {}", p, self.value_at_quantile(p / 100.0))?;
        }
        Ok(())
    }
}

impl Default for SignedHistogram {
    fn default() -> Self {
        Self::new()
    }
}
