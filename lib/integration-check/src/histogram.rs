use std::ops::Range;

use super::Tags;

/// One bucket of a pre-aggregated histogram.
///
/// `value` is the number of samples that fell in `[lower_bound, upper_bound)` since the previous submission, or since
/// the start of the series when `monotonic` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub metric_name: String,
    pub value: i64,
    pub lower_bound: f32,
    pub upper_bound: f32,
    pub monotonic: bool,
    pub tags: Tags,
}

impl Histogram {
    pub fn bucket(metric_name: impl Into<String>, bounds: Range<f32>, value: i64, tags: Tags) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            lower_bound: bounds.start,
            upper_bound: bounds.end,
            monotonic: false,
            tags,
        }
    }

    pub fn monotonic(mut self) -> Self {
        self.monotonic = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_bounds() {
        let bucket = Histogram::bucket("latency", 0.5..1.0, 3, vec!["env:test".to_string()]).monotonic();
        assert_eq!(bucket.lower_bound, 0.5);
        assert_eq!(bucket.upper_bound, 1.0);
        assert_eq!(bucket.value, 3);
        assert!(bucket.monotonic);
    }
}
