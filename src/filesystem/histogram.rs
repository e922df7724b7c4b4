/// Buckets from 1 B up to 256 MiB, doubling
pub const HISTOGRAM_BUCKETS: usize = 29;

/// Regular file sizes grouped by the smallest power of two above them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeHistogram {
    counts: [u64; HISTOGRAM_BUCKETS],
    /// Files of 256 MiB or more
    overflow: u64,
    total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    /// Exclusive upper size bound in bytes
    pub limit: u64,
    /// Files smaller than `limit` but not smaller than the previous limit
    pub count: u64,
    pub percent: Option<f64>,
    /// Share of files smaller than `limit`
    pub cumulative_percent: Option<f64>,
}

impl SizeHistogram {
    pub fn record(&mut self, size: i32) {
        self.total += 1;
        // Negative sizes come from the high bit of the 32-bit field and land in the first bucket
        let size = size.max(0) as u64;
        let bucket = (u64::BITS - size.leading_zeros()) as usize;
        match self.counts.get_mut(bucket) {
            Some(count) => *count += 1,
            None => self.overflow += 1,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        for (count, extra) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += extra;
        }
        self.overflow += other.overflow;
        self.total += other.total;
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn buckets(&self) -> Vec<HistogramBucket> {
        let mut cumulative = 0;
        self.counts
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                cumulative += count;
                HistogramBucket {
                    limit: 1 << index,
                    count,
                    percent: self.share(count),
                    cumulative_percent: self.share(cumulative),
                }
            })
            .collect()
    }

    fn share(&self, count: u64) -> Option<f64> {
        (self.total != 0).then(|| 100.0 * count as f64 / self.total as f64)
    }
}

impl FromIterator<i32> for SizeHistogram {
    fn from_iter<I: IntoIterator<Item = i32>>(sizes: I) -> Self {
        let mut histogram = Self::default();
        sizes.into_iter().for_each(|size| histogram.record(size));
        histogram
    }
}
