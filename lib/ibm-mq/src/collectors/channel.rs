//! Channel definitions and channel status.

use integration_check::{service_check::Status, sink::Sink, Tags};
use mqi::{
    constants::{cmqc::*, cmqcfc::*},
    pcf::{PcfCommand, PcfValue},
};
use tracing::{debug, warn};

use super::{with_tags, CollectionContext};
use crate::metrics::{label, metric_name, CHANNEL_METRICS, CHANNEL_STATUSES, CHANNEL_STATUS_METRICS};

pub const CHANNEL_SERVICE_CHECK: &str = "ibm_mq.channel";
pub const CHANNEL_STATUS_SERVICE_CHECK: &str = "ibm_mq.channel.status";
pub const CHANNEL_COUNT_METRIC: &str = "ibm_mq.channel.count";

/// Reports channel definitions, then the status of configured and discovered channels.
pub async fn collect<S: Sink>(ctx: &CollectionContext<'_, S>) {
    channel_definitions(ctx).await;

    for channel in &ctx.config.channels {
        if ctx.cancel.is_cancelled() {
            debug!("Collection cancelled, skipping remaining channels.");
            return;
        }
        channel_status(ctx, channel, &[]).await;
    }

    if ctx.config.auto_discover_channels && !ctx.cancel.is_cancelled() {
        channel_status(ctx, "*", &ctx.config.channels).await;
    }
}

async fn channel_definitions<S: Sink>(ctx: &CollectionContext<'_, S>) {
    let command = PcfCommand::new(MQCMD_INQUIRE_CHANNEL).with_string(MQCACH_CHANNEL_NAME, "*");
    let replies = match ctx.execute(&command).await {
        Ok(replies) => replies,
        Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => {
            debug!("No channel definitions available.");
            return;
        }
        Err(e) => {
            warn!(error = %e, "Error getting channel definitions.");
            return;
        }
    };

    let base = &ctx.config.tags_no_channel;
    ctx.gauge(metric_name("channel", "channels"), replies.len() as f64, base.clone())
        .await;

    for info in &replies {
        let Some(channel) = info.get(&MQCACH_CHANNEL_NAME).and_then(PcfValue::as_str) else {
            debug!("Channel definition without a name, skipping.");
            continue;
        };
        let tags = with_tags(base, [format!("channel:{}", channel)]);
        ctx.submit_gauges(info, CHANNEL_METRICS, "channel", &tags).await;
    }
}

/// Inquires the status of channels matching `search`, skipping the channels in `skip`.
///
/// The `ibm_mq.channel` service check is tagged with the searched name: OK when the inquiry succeeds, CRITICAL when
/// the channel has no status or the inquiry fails, UNKNOWN when no reply arrives.
async fn channel_status<S: Sink>(ctx: &CollectionContext<'_, S>, search: &str, skip: &[String]) {
    let base = &ctx.config.tags_no_channel;
    let search_tags = with_tags(base, [format!("channel:{}", search)]);

    let command = PcfCommand::new(MQCMD_INQUIRE_CHANNEL_STATUS).with_string(MQCACH_CHANNEL_NAME, search);
    let replies = match ctx.execute(&command).await {
        Ok(replies) => {
            ctx.service_check(CHANNEL_SERVICE_CHECK, Status::Ok, search_tags, None).await;
            replies
        }
        Err(e) if e.is_reason(MQRCCF_CHL_STATUS_NOT_FOUND) => {
            debug!(channel = search, error = %e, "Channel status not found.");
            ctx.service_check(CHANNEL_SERVICE_CHECK, Status::Critical, search_tags, Some(e.to_string()))
                .await;
            return;
        }
        Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => {
            debug!(channel = search, "No messages available for channel.");
            ctx.service_check(CHANNEL_SERVICE_CHECK, Status::Unknown, search_tags, None)
                .await;
            return;
        }
        Err(e) => {
            warn!(channel = search, error = %e, "Error getting channel status.");
            ctx.service_check(CHANNEL_SERVICE_CHECK, Status::Critical, search_tags, Some(e.to_string()))
                .await;
            return;
        }
    };

    for info in &replies {
        let Some(channel) = info.get(&MQCACH_CHANNEL_NAME).and_then(PcfValue::as_str) else {
            debug!("Channel status without a name, skipping.");
            continue;
        };
        if skip.contains(&channel) {
            continue;
        }

        let tags = with_tags(base, [format!("channel:{}", channel)]);
        ctx.submit_gauges(info, CHANNEL_STATUS_METRICS, "channel", &tags).await;

        match info
            .get(&MQIACH_CHANNEL_STATUS)
            .and_then(PcfValue::as_i64)
            .and_then(|status| i32::try_from(status).ok())
        {
            Some(status) => {
                channel_count(ctx, &channel, status, &tags).await;
                status_check(ctx, &channel, status, tags).await;
            }
            None => debug!(channel = %channel, "Channel status attribute missing."),
        }
    }
}

/// Emits `ibm_mq.channel.count` once per known status: 1 for the channel's current status, 0 for the others.
async fn channel_count<S: Sink>(ctx: &CollectionContext<'_, S>, channel: &str, status: i32, tags: &Tags) {
    if label(CHANNEL_STATUSES, status).is_none() {
        warn!(channel, status, "Unknown channel status.");
    }
    for (code, status_label) in CHANNEL_STATUSES {
        let active = if *code == status { 1.0 } else { 0.0 };
        let tags = with_tags(tags, [format!("status:{}", status_label)]);
        ctx.gauge(CHANNEL_COUNT_METRIC, active, tags).await;
    }
}

async fn status_check<S: Sink>(ctx: &CollectionContext<'_, S>, channel: &str, status: i32, tags: Tags) {
    let service_check_status = match ctx.config.channel_status_mapping.get(&status) {
        Some(mapped) => *mapped,
        None => {
            ctx.warning(format!("Status `{}` not found for channel `{}`", status, channel))
                .await;
            Status::Unknown
        }
    };
    ctx.service_check(CHANNEL_STATUS_SERVICE_CHECK, service_check_status, tags, None)
        .await;
}

#[cfg(test)]
mod tests {
    use integration_check::log::Level;
    use mqi::{pcf::ParameterMap, MqiError};

    use super::*;
    use crate::{
        collectors::tests::Harness,
        testing::{response, InMemoryQueueManager},
    };

    fn channel_status_reply(channel: &'static str, status: i32) -> ParameterMap {
        response([
            (MQCACH_CHANNEL_NAME, PcfValue::from(channel)),
            (MQIACH_CHANNEL_STATUS, PcfValue::from(status)),
            (MQIACH_MSGS, PcfValue::from(42)),
        ])
    }

    #[tokio::test]
    async fn channel_definitions_are_counted() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_CHANNEL, |_| {
            Ok(vec![
                response([
                    (MQCACH_CHANNEL_NAME, PcfValue::from("DEV.ADMIN.SVRCONN")),
                    (MQIACH_BATCH_SIZE, PcfValue::from(50)),
                ]),
                response([(MQCACH_CHANNEL_NAME, PcfValue::from("DEV.APP.SVRCONN"))]),
            ])
        });
        let harness = Harness::new(
            qm,
            "channel: DEV.ADMIN.SVRCONN\nqueue_manager: QM1\nauto_discover_channels: false\n",
        )
        .await;

        collect(&harness.context()).await;

        let channels = harness.sink.find_metrics("ibm_mq.channel.channels", &["queue_manager:QM1"]);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].value, 2.0);
        assert!(!channels[0].tags.iter().any(|tag| tag.starts_with("channel:")));
        harness
            .sink
            .assert_metric("ibm_mq.channel.batch_size", 50.0, &["channel:DEV.ADMIN.SVRCONN"]);
    }

    #[tokio::test]
    async fn configured_channel_status() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_CHANNEL_STATUS, |request| {
            match request.string(MQCACH_CHANNEL_NAME).as_deref() {
                Some("APP.SVRCONN") => Ok(vec![channel_status_reply("APP.SVRCONN", MQCHS_RUNNING)]),
                _ => Err(MqiError::new(MQCC_FAILED, MQRCCF_CHL_STATUS_NOT_FOUND)),
            }
        });
        let harness = Harness::new(
            qm,
            "channel: C\nqueue_manager: QM1\nchannels: [APP.SVRCONN, GONE.SVRCONN]\nauto_discover_channels: false\n",
        )
        .await;

        collect(&harness.context()).await;

        let sink = &harness.sink;
        sink.assert_service_check(CHANNEL_SERVICE_CHECK, Status::Ok, &["channel:APP.SVRCONN"]);
        sink.assert_service_check(CHANNEL_SERVICE_CHECK, Status::Critical, &["channel:GONE.SVRCONN"]);
        sink.assert_service_check(CHANNEL_STATUS_SERVICE_CHECK, Status::Ok, &["channel:APP.SVRCONN"]);
        sink.assert_metric("ibm_mq.channel.msgs", 42.0, &["channel:APP.SVRCONN"]);
        sink.assert_metric("ibm_mq.channel.channel_status", MQCHS_RUNNING as f64, &["channel:APP.SVRCONN"]);

        sink.assert_metric(CHANNEL_COUNT_METRIC, 1.0, &["channel:APP.SVRCONN", "status:running"]);
        sink.assert_metric(CHANNEL_COUNT_METRIC, 0.0, &["channel:APP.SVRCONN", "status:stopped"]);
        assert_eq!(
            sink.find_metrics(CHANNEL_COUNT_METRIC, &["channel:APP.SVRCONN"]).len(),
            CHANNEL_STATUSES.len()
        );
    }

    #[tokio::test]
    async fn discovery_skips_configured_channels() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_CHANNEL_STATUS, |request| {
            match request.string(MQCACH_CHANNEL_NAME).as_deref() {
                Some("*") => Ok(vec![
                    channel_status_reply("APP.SVRCONN", MQCHS_RUNNING),
                    channel_status_reply("OTHER.SVRCONN", MQCHS_RETRYING),
                ]),
                _ => Ok(vec![channel_status_reply("APP.SVRCONN", MQCHS_RUNNING)]),
            }
        });
        let harness = Harness::new(qm, "channel: C\nqueue_manager: QM1\nchannels: [APP.SVRCONN]\n").await;

        collect(&harness.context()).await;

        let sink = &harness.sink;
        assert_eq!(
            sink.find_service_checks(CHANNEL_STATUS_SERVICE_CHECK, &["channel:APP.SVRCONN"])
                .len(),
            1
        );
        sink.assert_service_check(CHANNEL_STATUS_SERVICE_CHECK, Status::Warning, &["channel:OTHER.SVRCONN"]);
        sink.assert_service_check(CHANNEL_SERVICE_CHECK, Status::Ok, &["channel:*"]);
    }

    #[tokio::test]
    async fn unmapped_status_is_unknown() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_CHANNEL_STATUS, |_| {
            Ok(vec![channel_status_reply("APP.SVRCONN", MQCHS_STOPPED)])
        });
        let harness = Harness::new(
            qm,
            "channel: C\nqueue_manager: QM1\nchannels: [APP.SVRCONN]\nauto_discover_channels: false\n\
             channel_status_mapping:\n  running: ok\n",
        )
        .await;

        collect(&harness.context()).await;

        harness
            .sink
            .assert_service_check(CHANNEL_STATUS_SERVICE_CHECK, Status::Unknown, &["channel:APP.SVRCONN"]);
        assert!(harness.sink.has_log(Level::Warning, "not found for channel `APP.SVRCONN`"));
    }

    #[tokio::test]
    async fn missing_reply_is_unknown() {
        let harness = Harness::new(
            InMemoryQueueManager::new("QM1"),
            "channel: C\nqueue_manager: QM1\nchannels: [APP.SVRCONN]\nauto_discover_channels: false\n",
        )
        .await;

        collect(&harness.context()).await;

        harness
            .sink
            .assert_service_check(CHANNEL_SERVICE_CHECK, Status::Unknown, &["channel:APP.SVRCONN"]);
        harness.sink.assert_no_metric("ibm_mq.channel.channels");
    }
}
