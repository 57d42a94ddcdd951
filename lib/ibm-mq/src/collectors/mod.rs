//! Metric collectors.
//!
//! Every collector works over a connected [`MqiSession`] and reports through the check's [`Sink`]. Failures of a
//! single inquiry are reported as warnings (or debug logs, for the expected ones) and never abort the rest of the
//! collection.

use integration_check::{
    log::Level,
    metric::{Metric, Type},
    service_check::{ServiceCheck, Status},
    sink::Sink,
    Tags,
};
use mqi::pcf::{ParameterMap, PcfCommand, PcfValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    config::IbmMqConfig,
    connection::MqiSession,
    metrics::metric_name,
    pcf_execute::{execute_once, PcfSettings},
};

pub mod channel;
pub mod queue;
pub mod stats;

/// Everything a collector needs for one run.
pub struct CollectionContext<'a, S> {
    pub sink: &'a S,
    pub config: &'a IbmMqConfig,
    pub session: &'a dyn MqiSession,
    pub settings: &'a PcfSettings,
    pub cancel: &'a CancellationToken,
}

impl<'a, S> CollectionContext<'a, S>
where
    S: Sink,
{
    /// Runs a single PCF command on its own reply queue.
    pub async fn execute(&self, command: &PcfCommand) -> mqi::Result<Vec<ParameterMap>> {
        execute_once(self.session, self.settings, command).await
    }

    pub async fn submit(&self, metric_type: Type, name: impl Into<String>, value: f64, tags: Tags) {
        let metric = Metric::new(metric_type, name, value, tags).with_hostname(self.config.hostname.clone());
        self.sink.submit_metric(metric, false).await;
    }

    pub async fn gauge(&self, name: impl Into<String>, value: f64, tags: Tags) {
        self.submit(Type::Gauge, name, value, tags).await;
    }

    pub async fn service_check(&self, name: &str, status: Status, tags: Tags, message: Option<String>) {
        let mut service_check = ServiceCheck::new(name, status, tags).with_hostname(self.config.hostname.clone());
        if let Some(message) = message {
            service_check = service_check.with_message(message);
        }
        self.sink.submit_service_check(service_check).await;
    }

    /// Reports a warning to the agent as well as to the local log.
    pub async fn warning(&self, message: String) {
        warn!("{}", message);
        self.sink.log(Level::Warning, message).await;
    }

    /// Submits every attribute of `table` found in `properties` under `<family>.<name>`.
    ///
    /// List values are summed. Missing attributes are skipped.
    pub async fn submit_properties(
        &self, properties: &ParameterMap, table: &[(&str, i32, Type)], family: &str, tags: &Tags,
    ) {
        for (name, selector, metric_type) in table {
            match properties.get(selector).and_then(PcfValue::sum_i64) {
                Some(value) => {
                    self.submit(*metric_type, metric_name(family, name), value as f64, tags.clone())
                        .await
                }
                None => debug!(metric = name, selector, family, "Attribute not found in response."),
            }
        }
    }

    /// Submits every attribute of `table` found in `properties` as a gauge under `<family>.<name>`.
    pub async fn submit_gauges(&self, properties: &ParameterMap, table: &[(&str, i32)], family: &str, tags: &Tags) {
        for (name, selector) in table {
            match properties.get(selector).and_then(PcfValue::sum_i64) {
                Some(value) => self.gauge(metric_name(family, name), value as f64, tags.clone()).await,
                None => debug!(metric = name, selector, family, "Attribute not found in response."),
            }
        }
    }
}

/// `base` with extra tags appended.
pub fn with_tags<I>(base: &Tags, extra: I) -> Tags
where
    I: IntoIterator<Item = String>,
{
    let mut tags = base.clone();
    tags.extend(extra);
    tags
}
