use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use super::*;

/// Sink that prints everything it receives to standard output.
pub struct Console {
    check_id: String,
}

impl Console {
    pub fn new(check_id: &str) -> Self {
        Self {
            check_id: check_id.to_string(),
        }
    }
}

#[async_trait]
impl Sink for Console {
    async fn submit_metric(&self, metric: metric::Metric, _flush_first: bool) {
        println!("[{}] submit_metric: {metric:#?}", self.check_id);
    }

    async fn submit_service_check(&self, service_check: service_check::ServiceCheck) {
        println!("[{}] submit_service_check: {service_check:#?}", self.check_id);
    }

    async fn submit_event(&self, event: event::Event) {
        println!("[{}] submit_event: {event:#?}", self.check_id);
    }

    async fn submit_histogram(&self, histogram: histogram::Histogram, _flush_first: bool) {
        println!("[{}] submit_histogram: {histogram:#?}", self.check_id);
    }

    async fn log(&self, level: log::Level, message: String) {
        let check_id = self.check_id.as_str();
        match level {
            log::Level::Trace => trace!(check_id, "{}", message),
            log::Level::Debug => debug!(check_id, "{}", message),
            log::Level::Info => info!(check_id, "{}", message),
            log::Level::Warning => warn!(check_id, "{}", message),
            log::Level::Error | log::Level::Critical => error!(check_id, level = %level, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_kind_is_accepted() {
        let sink = Console::new("ibm_mq:default");
        sink.submit_metric(metric::Metric::gauge("queue.depth", 3.0, vec![]), false)
            .await;
        sink.submit_service_check(service_check::ServiceCheck::new(
            "can_connect",
            service_check::Status::Ok,
            vec![],
        ))
        .await;
        sink.submit_event(event::Event::default()).await;
        sink.submit_histogram(histogram::Histogram::bucket("latency", 0.0..1.0, 1, vec![]), false)
            .await;
        sink.log(log::Level::Critical, "queue manager gone".to_string()).await;
    }
}
