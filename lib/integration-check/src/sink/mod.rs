use async_trait::async_trait;

pub use super::{event, histogram, log, metric, service_check};

mod console;
pub use self::console::Console;

#[cfg(any(test, feature = "testing"))]
mod recorder;
#[cfg(any(test, feature = "testing"))]
pub use self::recorder::Recorder;

/// Destination for everything a check reports.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn submit_metric(&self, metric: metric::Metric, flush_first: bool);
    async fn submit_service_check(&self, service_check: service_check::ServiceCheck);
    async fn submit_event(&self, event: event::Event);
    async fn submit_histogram(&self, histogram: histogram::Histogram, flush_first: bool);

    /// Emits a log line the agent surfaces to the user.
    async fn log(&self, level: log::Level, message: String);
}
