use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::*;

#[derive(Default)]
struct Recorded {
    metrics: Vec<metric::Metric>,
    service_checks: Vec<service_check::ServiceCheck>,
    events: Vec<event::Event>,
    histograms: Vec<histogram::Histogram>,
    logs: Vec<(log::Level, String)>,
}

/// Sink that keeps everything it receives, for assertions in tests.
#[derive(Default)]
pub struct Recorder {
    recorded: Mutex<Recorded>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn metrics(&self) -> Vec<metric::Metric> {
        self.recorded().metrics.clone()
    }

    pub fn service_checks(&self) -> Vec<service_check::ServiceCheck> {
        self.recorded().service_checks.clone()
    }

    pub fn events(&self) -> Vec<event::Event> {
        self.recorded().events.clone()
    }

    pub fn histograms(&self) -> Vec<histogram::Histogram> {
        self.recorded().histograms.clone()
    }

    pub fn logs(&self) -> Vec<(log::Level, String)> {
        self.recorded().logs.clone()
    }

    /// Metrics with the given name carrying every one of `tags`.
    pub fn find_metrics(&self, name: &str, tags: &[&str]) -> Vec<metric::Metric> {
        self.recorded()
            .metrics
            .iter()
            .filter(|m| m.name == name && has_tags(&m.tags, tags))
            .cloned()
            .collect()
    }

    /// Service checks with the given name carrying every one of `tags`.
    pub fn find_service_checks(&self, name: &str, tags: &[&str]) -> Vec<service_check::ServiceCheck> {
        self.recorded()
            .service_checks
            .iter()
            .filter(|sc| sc.name == name && has_tags(&sc.tags, tags))
            .cloned()
            .collect()
    }

    /// Panics unless a metric with the given name, tags and value was submitted.
    pub fn assert_metric(&self, name: &str, value: f64, tags: &[&str]) {
        let found = self.find_metrics(name, tags);
        assert!(
            found.iter().any(|m| m.value == value),
            "expected metric {} = {} with tags {:?}, found {:?}",
            name,
            value,
            tags,
            found
        );
    }

    /// Panics if a metric with the given name was submitted.
    pub fn assert_no_metric(&self, name: &str) {
        let found = self.find_metrics(name, &[]);
        assert!(found.is_empty(), "expected no metric {}, found {:?}", name, found);
    }

    /// Panics unless a service check with the given name, status and tags was submitted.
    pub fn assert_service_check(&self, name: &str, status: service_check::Status, tags: &[&str]) {
        let found = self.find_service_checks(name, tags);
        assert!(
            found.iter().any(|sc| sc.status == status),
            "expected service check {} = {:?} with tags {:?}, found {:?}",
            name,
            status,
            tags,
            found
        );
    }

    /// Returns `true` if a log line at `level` contains `needle`.
    pub fn has_log(&self, level: log::Level, needle: &str) -> bool {
        self.recorded()
            .logs
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    /// Forgets everything recorded so far.
    pub fn reset(&self) {
        *self.recorded() = Recorded::default();
    }
}

fn has_tags(actual: &[String], expected: &[&str]) -> bool {
    expected.iter().all(|tag| actual.iter().any(|t| t == tag))
}

#[async_trait]
impl Sink for Recorder {
    async fn submit_metric(&self, metric: metric::Metric, _flush_first: bool) {
        self.recorded().metrics.push(metric);
    }

    async fn submit_service_check(&self, service_check: service_check::ServiceCheck) {
        self.recorded().service_checks.push(service_check);
    }

    async fn submit_event(&self, event: event::Event) {
        self.recorded().events.push(event);
    }

    async fn submit_histogram(&self, histogram: histogram::Histogram, _flush_first: bool) {
        self.recorded().histograms.push(histogram);
    }

    async fn log(&self, level: log::Level, message: String) {
        self.recorded().logs.push((level, message));
    }
}
