//! Statistics messages.
//!
//! When statistics are enabled on the queue manager (`STATCHL`, `STATQ`), it periodically writes PCF statistics
//! messages to `SYSTEM.ADMIN.STATISTICS.QUEUE`. They are read destructively: each message is reported exactly once,
//! by whichever collector gets it first.

use integration_check::sink::Sink;
use mqi::{
    constants::{cmqc::*, cmqcfc::*},
    pcf::{decode_response, ParameterMap, PcfValue},
    structure::{GetMessageOptions, MessageDescriptor, ObjectDescriptor},
    Layout, MqLevel,
};
use tracing::{debug, trace};

use super::{with_tags, CollectionContext};
use crate::{
    connection::ObjectHandle,
    metrics::{label, CHANNEL_STATS_METRICS, CHANNEL_TYPES, DEFINITION_TYPES, QUEUE_STATS_METRICS, QUEUE_TYPES},
};

pub const STATISTICS_QUEUE: &str = "SYSTEM.ADMIN.STATISTICS.QUEUE";

/// Drains the statistics queue, reporting every channel and queue statistics record found.
///
/// # Errors
///
/// If the statistics queue cannot be opened or read, or a message cannot be decoded, an error is returned. Messages
/// read before the failure have already been reported.
pub async fn collect<S: Sink>(ctx: &CollectionContext<'_, S>) -> mqi::Result<()> {
    let mut od = ObjectDescriptor::queue(MqLevel::default(), STATISTICS_QUEUE);
    let handle = ctx
        .session
        .open(&mut od, MQOO_INPUT_SHARED | MQOO_FAIL_IF_QUIESCING)
        .await?;

    let result = drain(ctx, handle).await;
    if let Err(e) = ctx.session.close(handle, MQCO_NONE).await {
        debug!(error = %e, "Failed to close statistics queue.");
    }
    result
}

async fn drain<S: Sink>(ctx: &CollectionContext<'_, S>, handle: ObjectHandle) -> mqi::Result<()> {
    let mut gmo = GetMessageOptions::new(MqLevel::default());
    gmo.options = MQGMO_NO_WAIT | MQGMO_NO_SYNCPOINT | MQGMO_FAIL_IF_QUIESCING;
    if ctx.settings.convert {
        gmo.options |= MQGMO_CONVERT;
    }

    let mut messages = 0usize;
    loop {
        if ctx.cancel.is_cancelled() {
            debug!(messages, "Collection cancelled, leaving remaining statistics messages.");
            return Ok(());
        }

        let mut md = MessageDescriptor::default();
        let message = match ctx.session.get(handle, &mut md, &mut gmo).await {
            Ok(message) => message,
            Err(e) if e.is_reason(MQRC_NO_MSG_AVAILABLE) => break,
            Err(e) => return Err(e),
        };
        messages += 1;

        let (parameters, header) = decode_response(&message, Layout::for_encoding(md.encoding))?;
        match header.command {
            MQCMD_STATISTICS_CHANNEL => {
                for channel in groups(&parameters, MQGACF_CHL_STATISTICS_DATA) {
                    channel_stats(ctx, channel).await;
                }
            }
            MQCMD_STATISTICS_Q => {
                for queue in groups(&parameters, MQGACF_Q_STATISTICS_DATA) {
                    queue_stats(ctx, queue).await;
                }
            }
            other => debug!(command = other, "Ignoring statistics message of unsupported type."),
        }
    }

    trace!(messages, "Drained statistics queue.");
    Ok(())
}

fn groups(parameters: &ParameterMap, group: i32) -> &[ParameterMap] {
    parameters.get(&group).and_then(PcfValue::as_groups).unwrap_or_default()
}

fn string(info: &ParameterMap, selector: i32) -> String {
    info.get(&selector).and_then(PcfValue::as_str).unwrap_or_default()
}

fn code_label(info: &ParameterMap, selector: i32, table: &[(i32, &'static str)]) -> String {
    info.get(&selector)
        .and_then(PcfValue::as_i64)
        .and_then(|code| i32::try_from(code).ok())
        .map(|code| label(table, code).map_or_else(|| code.to_string(), str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

async fn channel_stats<S: Sink>(ctx: &CollectionContext<'_, S>, info: &ParameterMap) {
    let tags = with_tags(
        &ctx.config.tags_no_channel,
        [
            format!("channel:{}", string(info, MQCACH_CHANNEL_NAME)),
            format!("channel_type:{}", code_label(info, MQIACH_CHANNEL_TYPE, CHANNEL_TYPES)),
            format!("remote_q_mgr_name:{}", string(info, MQCA_REMOTE_Q_MGR_NAME)),
            format!("connection_name:{}", string(info, MQCACH_CONNECTION_NAME)),
        ],
    );
    ctx.submit_properties(info, CHANNEL_STATS_METRICS, "stats.channel", &tags)
        .await;
}

async fn queue_stats<S: Sink>(ctx: &CollectionContext<'_, S>, info: &ParameterMap) {
    let tags = with_tags(
        &ctx.config.tags_no_channel,
        [
            format!("queue:{}", string(info, MQCA_Q_NAME)),
            format!("queue_type:{}", code_label(info, MQIA_Q_TYPE, QUEUE_TYPES)),
            format!("definition_type:{}", code_label(info, MQIA_DEFINITION_TYPE, DEFINITION_TYPES)),
        ],
    );
    ctx.submit_properties(info, QUEUE_STATS_METRICS, "stats.queue", &tags)
        .await;
}
