use mqi::{
    constants::{cmqc::*, cmqcfc::MQCFC_LAST},
    pcf::{decode_response, ParameterMap, PcfCommand},
    structure::{fixed_chars, trim_chars, GetMessageOptions, MessageDescriptor, ObjectDescriptor, PutMessageOptions},
    ByteOrder, Layout, MqLevel,
};
use tracing::{debug, trace};

use crate::{
    config::IbmMqConfig,
    connection::{MqiSession, ObjectHandle},
};

pub const COMMAND_QUEUE: &str = "SYSTEM.ADMIN.COMMAND.QUEUE";
pub const MODEL_QUEUE: &str = "SYSTEM.DEFAULT.MODEL.QUEUE";
pub const DYNAMIC_QUEUE_PREFIX: &str = "DDPCF.*";

/// How PCF commands are sent and their replies awaited.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcfSettings {
    /// How long to wait for each reply, in milliseconds.
    pub wait_interval_ms: i32,

    /// Asks the queue manager to convert replies to the client's encoding.
    pub convert: bool,
    pub command_queue: String,
    pub model_queue: String,
    pub dynamic_queue_name: String,
}

impl PcfSettings {
    pub fn new(wait_interval_ms: i32, convert: bool) -> Self {
        Self {
            wait_interval_ms,
            convert,
            command_queue: COMMAND_QUEUE.to_string(),
            model_queue: MODEL_QUEUE.to_string(),
            dynamic_queue_name: DYNAMIC_QUEUE_PREFIX.to_string(),
        }
    }

    pub fn from_config(config: &IbmMqConfig) -> Self {
        Self::new(config.wait_interval_ms(), config.convert_endianness)
    }
}

/// Sends PCF commands to the command server and collects the replies.
///
/// Replies arrive on a temporary dynamic queue created from the model queue when the executor is opened. Call
/// [`disconnect`](Self::disconnect) when done so that the reply queue is deleted rather than left to fill up.
pub struct PcfExecute<'a> {
    session: &'a dyn MqiSession,
    settings: &'a PcfSettings,
    reply_queue: ObjectHandle,
    reply_queue_name: String,
}

impl<'a> PcfExecute<'a> {
    /// Opens the reply queue.
    ///
    /// # Errors
    ///
    /// If the dynamic reply queue cannot be created, an error is returned.
    pub async fn open(session: &'a dyn MqiSession, settings: &'a PcfSettings) -> mqi::Result<Self> {
        let mut od = ObjectDescriptor::queue(MqLevel::default(), &settings.model_queue);
        od.dynamic_q_name = fixed_chars(&settings.dynamic_queue_name);

        let reply_queue = session.open(&mut od, MQOO_INPUT_EXCLUSIVE).await?;
        let reply_queue_name = trim_chars(&od.object_name);
        trace!(reply_queue = %reply_queue_name, "Opened PCF reply queue.");

        Ok(Self {
            session,
            settings,
            reply_queue,
            reply_queue_name,
        })
    }

    /// Name the queue manager gave the dynamic reply queue.
    pub fn reply_queue_name(&self) -> &str {
        &self.reply_queue_name
    }

    /// Sends a command and returns the parameters of every reply, in order.
    ///
    /// # Errors
    ///
    /// If the command cannot be put, no reply arrives within the wait interval (`MQRC_NO_MSG_AVAILABLE`), or a reply
    /// reports a failure, an error is returned.
    pub async fn execute(&self, command: &PcfCommand) -> mqi::Result<Vec<ParameterMap>> {
        let message = command.encode(Layout::packed(ByteOrder::native()));

        let mut put_md = MessageDescriptor {
            format: *MQFMT_ADMIN,
            msg_type: MQMT_REQUEST,
            reply_to_q: fixed_chars(&self.reply_queue_name),
            feedback: MQFB_NONE,
            expiry: self.settings.wait_interval_ms / 100,
            report: MQRO_PASS_DISCARD_AND_EXPIRY | MQRO_DISCARD_MSG,
            ..MessageDescriptor::default()
        };
        let mut pmo = PutMessageOptions::new(MqLevel::default());
        pmo.options = MQPMO_NO_SYNCPOINT;

        let mut od = ObjectDescriptor::queue(MqLevel::default(), &self.settings.command_queue);
        let command_queue = self.session.open(&mut od, MQOO_OUTPUT).await?;
        let put = self.session.put(command_queue, &mut put_md, &mut pmo, &message).await;
        if let Err(e) = self.session.close(command_queue, MQCO_NONE).await {
            debug!(error = %e, "Failed to close command queue.");
        }
        put?;

        let mut gmo = GetMessageOptions::new(MqLevel::default());
        gmo.options = MQGMO_NO_SYNCPOINT | MQGMO_FAIL_IF_QUIESCING | MQGMO_WAIT;
        if self.settings.convert {
            gmo.options |= MQGMO_CONVERT;
        }
        gmo.version = MQGMO_VERSION_2;
        gmo.match_options = MQMO_MATCH_CORREL_ID;
        gmo.wait_interval = self.settings.wait_interval_ms;

        let mut replies = Vec::new();
        loop {
            let mut get_md = MessageDescriptor {
                correl_id: put_md.msg_id,
                ..MessageDescriptor::default()
            };
            let reply = self.session.get(self.reply_queue, &mut get_md, &mut gmo).await?;
            let (parameters, header) = decode_response(&reply, Layout::for_encoding(get_md.encoding))?;
            replies.push(parameters);

            if header.control == MQCFC_LAST {
                break;
            }
        }

        debug!(
            command = command.command(),
            replies = replies.len(),
            reply_queue = %self.reply_queue_name,
            "Executed PCF command."
        );
        Ok(replies)
    }

    /// Closes the reply queue, which deletes it.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn disconnect(self) {
        if let Err(e) = self.session.close(self.reply_queue, MQCO_NONE).await {
            debug!(reply_queue = %self.reply_queue_name, error = %e, "Failed to close PCF reply queue.");
        }
    }
}

/// Opens an executor, runs a single command and closes the reply queue again.
///
/// # Errors
///
/// If the reply queue cannot be opened or the command fails, an error is returned.
pub async fn execute_once(
    session: &dyn MqiSession, settings: &PcfSettings, command: &PcfCommand,
) -> mqi::Result<Vec<ParameterMap>> {
    let pcf = PcfExecute::open(session, settings).await?;
    let result = pcf.execute(command).await;
    pcf.disconnect().await;
    result
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use mqi::{
        constants::cmqcfc::*,
        pcf::{Parameter, PcfValue},
    };

    use super::*;
    use crate::{
        connection::QueueManagerConnector as _,
        testing::{connection_options, response, InMemoryQueueManager},
    };

    fn settings() -> PcfSettings {
        PcfSettings::new(5000, false)
    }

    async fn session(qm: &InMemoryQueueManager) -> Box<dyn MqiSession> {
        qm.connect(&connection_options("QM1"))
            .await
            .expect("should connect")
    }

    #[tokio::test]
    async fn replies_are_collected_until_last() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_Q, |request| {
            assert_eq!(request.string(MQCA_Q_NAME).as_deref(), Some("APP.*"));
            assert_eq!(request.integer(MQIA_Q_TYPE), Some(MQQT_LOCAL));
            Ok(vec![
                response([(MQCA_Q_NAME, PcfValue::from("APP.IN"))]),
                response([(MQCA_Q_NAME, PcfValue::from("APP.OUT"))]),
            ])
        });
        let session = session(&qm).await;

        let settings = settings();
        let pcf = PcfExecute::open(session.as_ref(), &settings)
            .await
            .expect("should open reply queue");
        assert!(pcf.reply_queue_name().starts_with("DDPCF."));

        let command = PcfCommand::new(MQCMD_INQUIRE_Q)
            .with_string(MQCA_Q_NAME, "APP.*")
            .with_integer(MQIA_Q_TYPE, MQQT_LOCAL);
        let replies = pcf.execute(&command).await.expect("should execute");
        let names = replies
            .iter()
            .filter_map(|reply| reply.get(&MQCA_Q_NAME).and_then(PcfValue::as_str))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["APP.IN", "APP.OUT"]);

        pcf.disconnect().await;
        assert_eq!(qm.open_handles(), 0);
    }

    #[tokio::test]
    async fn request_is_an_admin_message() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_PING_Q_MGR, |_| Ok(vec![ParameterMap::new()]));
        let session = session(&qm).await;

        let settings = PcfSettings::new(3000, true);
        execute_once(session.as_ref(), &settings, &PcfCommand::new(MQCMD_PING_Q_MGR))
            .await
            .expect("should execute");

        let request = qm.requests().pop().expect("should have a request");
        assert_eq!(&request.md.format, MQFMT_ADMIN);
        assert_eq!(request.md.msg_type, MQMT_REQUEST);
        assert_eq!(request.md.expiry, 30);
        assert_eq!(request.md.report, MQRO_PASS_DISCARD_AND_EXPIRY | MQRO_DISCARD_MSG);
        assert!(trim_chars(&request.md.reply_to_q).starts_with("DDPCF."));
        assert_eq!(request.pmo_options, MQPMO_NO_SYNCPOINT);
        assert_eq!(request.queue, COMMAND_QUEUE);

        let gmo = qm.last_get_options().expect("should have waited for a reply");
        assert_eq!(
            gmo.options,
            MQGMO_NO_SYNCPOINT | MQGMO_FAIL_IF_QUIESCING | MQGMO_WAIT | MQGMO_CONVERT
        );
        assert_eq!(gmo.version, MQGMO_VERSION_2);
        assert_eq!(gmo.match_options, MQMO_MATCH_CORREL_ID);
        assert_eq!(gmo.wait_interval, 3000);
        assert_eq!(qm.open_handles(), 0);
    }

    #[tokio::test]
    async fn failed_reply_is_an_mqi_error() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_CHANNEL_STATUS, |_| {
            Err(mqi::MqiError::new(MQCC_FAILED, MQRCCF_CHL_STATUS_NOT_FOUND))
        });
        let session = session(&qm).await;

        let command = PcfCommand::new(MQCMD_INQUIRE_CHANNEL_STATUS).with_string(MQCACH_CHANNEL_NAME, "APP.SVRCONN");
        let error = execute_once(session.as_ref(), &settings(), &command)
            .await
            .expect_err("should fail");
        assert!(error.is_reason(MQRCCF_CHL_STATUS_NOT_FOUND));
        assert_eq!(qm.open_handles(), 0);
    }

    #[tokio::test]
    async fn missing_reply_is_no_message_available() {
        let qm = InMemoryQueueManager::new("QM1");
        let session = session(&qm).await;

        let error = execute_once(session.as_ref(), &settings(), &PcfCommand::new(MQCMD_INQUIRE_Q))
            .await
            .expect_err("should time out");
        assert!(error.is_reason(MQRC_NO_MSG_AVAILABLE));
        assert_eq!(qm.open_handles(), 0);
    }

    #[tokio::test]
    async fn command_parameters_reach_the_command_server() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.respond(MQCMD_INQUIRE_Q_STATUS, |_| Ok(vec![ParameterMap::new()]));
        let session = session(&qm).await;

        let command = PcfCommand::new(MQCMD_INQUIRE_Q_STATUS)
            .with_string(MQCA_Q_NAME, "APP.IN")
            .with_integer(MQIACF_Q_STATUS_ATTRS, MQIACF_ALL);
        execute_once(session.as_ref(), &settings(), &command)
            .await
            .expect("should execute");

        let request = qm.requests().pop().expect("should have a request");
        assert_eq!(request.command, MQCMD_INQUIRE_Q_STATUS);
        assert_eq!(
            request.parameters,
            vec![
                Parameter::String {
                    parameter: MQCA_Q_NAME,
                    ccsid: 0,
                    value: Bytes::from_static(b"APP.IN"),
                },
                Parameter::IntegerList {
                    parameter: MQIACF_Q_STATUS_ATTRS,
                    values: vec![MQIACF_ALL],
                },
            ]
        );
    }
}
