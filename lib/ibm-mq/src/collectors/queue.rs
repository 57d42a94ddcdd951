//! Queue manager and queue metrics.

use std::collections::BTreeSet;

use chrono::Utc;
use integration_check::{service_check::Status, sink::Sink, Tags};
use mqi::{
    constants::{cmqc::*, cmqcfc::*},
    pcf::{PcfCommand, PcfValue},
    structure::ObjectDescriptor,
    MqLevel,
};
use tracing::{debug, warn};

use super::{with_tags, CollectionContext};
use crate::{
    config::IbmMqConfig,
    metrics::{
        depth_percent, last_get_time, last_put_time, metric_name, QUEUE_MANAGER_METRICS, QUEUE_METRICS,
        QUEUE_RESET_METRICS, QUEUE_STATUS_METRICS,
    },
};

pub const QUEUE_SERVICE_CHECK: &str = "ibm_mq.queue";
pub const QUEUE_MANAGER_SERVICE_CHECK: &str = "ibm_mq.queue_manager";

const DISCOVERED_QUEUE_TYPES: [i32; 2] = [MQQT_LOCAL, MQQT_MODEL];

/// Inquires the queue manager attributes and reports the `ibm_mq.queue_manager` service check.
pub async fn collect_queue_manager_stats<S: Sink>(ctx: &CollectionContext<'_, S>) {
    let tags = &ctx.config.tags;

    let mut od = ObjectDescriptor::queue_manager(MqLevel::default(), &ctx.config.queue_manager_name);
    let handle = match ctx.session.open(&mut od, MQOO_INQUIRE | MQOO_FAIL_IF_QUIESCING).await {
        Ok(handle) => handle,
        Err(e) => {
            ctx.warning(format!("Error getting queue manager stats: {}", e)).await;
            ctx.service_check(QUEUE_MANAGER_SERVICE_CHECK, Status::Critical, tags.clone(), Some(e.to_string()))
                .await;
            return;
        }
    };

    let mut failure = None;
    for (name, selector) in QUEUE_MANAGER_METRICS {
        match ctx.session.inquire(handle, *selector).await {
            Ok(value) => match value.as_i64() {
                Some(value) => ctx.gauge(metric_name("queue_manager", name), value as f64, tags.clone()).await,
                None => debug!(metric = name, "Queue manager attribute is not an integer."),
            },
            Err(e) => {
                ctx.warning(format!("Error getting queue manager stats: {}", e)).await;
                failure.get_or_insert(e.to_string());
            }
        }
    }

    if let Err(e) = ctx.session.close(handle, MQCO_NONE).await {
        debug!(error = %e, "Failed to close queue manager object.");
    }

    let status = if failure.is_some() { Status::Critical } else { Status::Ok };
    ctx.service_check(QUEUE_MANAGER_SERVICE_CHECK, status, tags.clone(), failure)
        .await;
}

/// Discovers the monitored queues and reports metrics and the `ibm_mq.queue` service check for each.
///
/// A queue whose inquiry fails at the MQI level is still reported OK, with a warning. Only replies the check cannot
/// make sense of turn the service check CRITICAL. Stops early, between queues, when the run is cancelled.
pub async fn collect<S: Sink>(ctx: &CollectionContext<'_, S>) {
    let queues = discover_queues(ctx).await;

    for queue in &queues {
        if ctx.cancel.is_cancelled() {
            debug!(remaining = queues.len(), "Collection cancelled, skipping remaining queues.");
            return;
        }

        let tags = queue_tags(ctx.config, queue);
        match queue_stats(ctx, queue, &tags).await {
            Ok(()) => {
                if IbmMqConfig::allows_queue_inquiries(queue) {
                    queue_status(ctx, queue, &tags).await;
                    if ctx.config.collect_reset_queue_metrics {
                        queue_reset(ctx, queue, &tags).await;
                    }
                }
                ctx.service_check(QUEUE_SERVICE_CHECK, Status::Ok, tags, None).await;
            }
            Err(e) => {
                ctx.warning(format!("Cannot connect to queue {}: {}", queue, e)).await;
                ctx.service_check(QUEUE_SERVICE_CHECK, Status::Critical, tags, Some(e.to_string()))
                    .await;
            }
        }
    }
}

/// Base tags plus `queue:<name>` and the tags of every `queue_tag_re` pattern matching the name.
pub fn queue_tags(config: &IbmMqConfig, queue: &str) -> Tags {
    let mut tags = with_tags(&config.tags, [format!("queue:{}", queue)]);
    for (pattern, extra) in &config.queue_tag_re {
        if pattern.is_match(queue) {
            tags.extend(extra.iter().cloned());
        }
    }
    tags
}

/// Resolves the set of queues to monitor.
///
/// A `*` inquiry runs when auto-discovery is on without patterns, or when regexes are configured. Patterns each run
/// their own inquiry. Regexes then filter what was discovered, and configured queues are always kept.
pub async fn discover_queues<S: Sink>(ctx: &CollectionContext<'_, S>) -> BTreeSet<String> {
    let config = ctx.config;
    let mut discovered = BTreeSet::new();

    if (config.auto_discover_queues && config.queue_patterns.is_empty()) || !config.queue_regex.is_empty() {
        discovered.extend(discover_matching(ctx, "*").await);
    }
    for pattern in &config.queue_patterns {
        discovered.extend(discover_matching(ctx, pattern).await);
    }

    if !config.queue_regex.is_empty() {
        let total = discovered.len();
        discovered.retain(|queue| config.queue_regex.iter().any(|re| re.is_match(queue)));
        debug!(
            matching = discovered.len(),
            discovered = total,
            "Filtered discovered queues by queue_regex."
        );
    }

    discovered.extend(config.queues.iter().cloned());
    discovered
}

async fn discover_matching<S: Sink>(ctx: &CollectionContext<'_, S>, pattern: &str) -> Vec<String> {
    let mut queues = Vec::new();

    for queue_type in DISCOVERED_QUEUE_TYPES {
        let command = PcfCommand::new(MQCMD_INQUIRE_Q)
            .with_string(MQCA_Q_NAME, pattern)
            .with_integer(MQIA_Q_TYPE, queue_type);
        match ctx.execute(&command).await {
            Ok(replies) => {
                for reply in replies {
                    match reply.get(&MQCA_Q_NAME).and_then(PcfValue::as_str) {
                        Some(name) if !name.is_empty() => {
                            debug!(queue = %name, "Discovered queue.");
                            queues.push(name);
                        }
                        _ => debug!("Discovered queue with empty name, skipping."),
                    }
                }
            }
            Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => debug!("No queue info available."),
            Err(e) if e.is_reason(MQRC_UNKNOWN_OBJECT_NAME) => {
                debug!(queue_type, pattern, "No matching queue of this type.")
            }
            Err(e) => ctx.warning(format!("Error discovering queue: {}", e)).await,
        }
    }

    if queues.is_empty() {
        ctx.warning(format!(
            "No matching queue of type MQQT_LOCAL or MQQT_MODEL for pattern {}",
            pattern
        ))
        .await;
    }
    debug!(pattern, discovered = queues.len(), "Queue discovery finished.");
    queues
}

async fn queue_stats<S: Sink>(ctx: &CollectionContext<'_, S>, queue: &str, tags: &Tags) -> mqi::Result<()> {
    let command = PcfCommand::new(MQCMD_INQUIRE_Q)
        .with_string(MQCA_Q_NAME, queue)
        .with_integer(MQIA_Q_TYPE, MQQT_ALL);
    let replies = match ctx.execute(&command).await {
        Ok(replies) => replies,
        Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => {
            debug!(queue, "No stat messages available for queue.");
            return Ok(());
        }
        Err(e) if e.as_mqi().is_some() => {
            ctx.warning(format!("Error getting queue stats for {}: {}", queue, e)).await;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    for info in &replies {
        ctx.submit_gauges(info, QUEUE_METRICS, "queue", tags).await;
        match depth_percent(info) {
            Some(percent) => ctx.gauge(metric_name("queue", "depth_percent"), percent, tags.clone()).await,
            None => debug!(queue, "Depth percentage unavailable."),
        }
    }
    Ok(())
}

async fn queue_status<S: Sink>(ctx: &CollectionContext<'_, S>, queue: &str, tags: &Tags) {
    let command = PcfCommand::new(MQCMD_INQUIRE_Q_STATUS)
        .with_string(MQCA_Q_NAME, queue)
        .with_integer(MQIA_Q_TYPE, MQQT_ALL)
        .with_integer(MQIACF_Q_STATUS_ATTRS, MQIACF_ALL);
    let replies = match ctx.execute(&command).await {
        Ok(replies) => replies,
        Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => {
            debug!(queue, "No queue status messages available.");
            return;
        }
        Err(e) => {
            ctx.warning(format!("Error getting pcf queue status for {}: {}", queue, e))
                .await;
            return;
        }
    };

    let timezone = ctx.config.queue_manager_timezone;
    let now = Utc::now();
    for info in &replies {
        for metric in QUEUE_STATUS_METRICS {
            let name = metric_name("queue", metric.name);
            match info.get(&metric.selector).and_then(PcfValue::as_i64) {
                Some(value) if value > metric.failure => ctx.gauge(name, value as f64, tags.clone()).await,
                Some(_) => debug!(metric = %name, queue, "Queue monitoring is off, turn it on to collect this metric."),
                None => warn!(metric = %name, queue, "Unable to get metric from queue status."),
            }
        }

        let times = [
            ("last_get_time", last_get_time(timezone, info, now)),
            ("last_put_time", last_put_time(timezone, info, now)),
        ];
        for (metric, value) in times {
            match value {
                Some(seconds) => ctx.gauge(metric_name("queue", metric), seconds, tags.clone()).await,
                None => debug!(metric, queue, "Queue monitoring is off, check `DISPLAY QSTATUS MONITOR`."),
            }
        }
    }
}

async fn queue_reset<S: Sink>(ctx: &CollectionContext<'_, S>, queue: &str, tags: &Tags) {
    let command = PcfCommand::new(MQCMD_RESET_Q_STATS).with_string(MQCA_Q_NAME, queue);
    match ctx.execute(&command).await {
        Ok(replies) => {
            for info in &replies {
                ctx.submit_properties(info, QUEUE_RESET_METRICS, "queue", tags).await;
            }
        }
        Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => {
            debug!(queue, "No queue reset metrics messages available.")
        }
        Err(e) => {
            ctx.warning(format!("Error getting pcf queue reset metrics for {}: {}", queue, e))
                .await
        }
    }
}
