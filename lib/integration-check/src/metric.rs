use super::Tags;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Type {
    Gauge = 0,
    Rate,
    Count,
    MonotonicCount,
    Counter,
    Histogram,
    Historate,
}

/// A single metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub metric_type: Type,
    pub name: String,
    pub value: f64,
    pub tags: Tags,
    pub hostname: Option<String>,
}

impl Metric {
    pub fn new(metric_type: Type, name: impl Into<String>, value: f64, tags: Tags) -> Self {
        Self {
            metric_type,
            name: name.into(),
            value,
            tags,
            hostname: None,
        }
    }

    pub fn gauge(name: impl Into<String>, value: f64, tags: Tags) -> Self {
        Self::new(Type::Gauge, name, value, tags)
    }

    pub fn count(name: impl Into<String>, value: f64, tags: Tags) -> Self {
        Self::new(Type::Count, name, value, tags)
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }
}
