//! An in-memory queue manager.
//!
//! It answers PCF commands through per-command responders, serves MQINQ from a fixed attribute table, and holds plain
//! queues that tests can fill with messages, such as statistics messages. Everything the check sends is recorded so
//! tests can assert on it.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use mqi::{
    constants::{cmqc::*, cmqcfc::*},
    pcf::{decode_command, CommandHeader, Parameter, ParameterMap, PcfValue},
    structure::{
        fixed_chars, pack_into, trim_chars, ChannelDefinition, GetMessageOptions, MessageDescriptor, ObjectDescriptor,
        PutMessageOptions,
    },
    ByteOrder, Layout, MqLevel, MqiError,
};

use crate::{
    connection::{ConnectionOptions, InquiryValue, MqiSession, ObjectHandle, QueueManagerConnector},
    pcf_execute::COMMAND_QUEUE,
};

type Responder = Arc<dyn Fn(&PcfRequest) -> Result<Vec<ParameterMap>, MqiError> + Send + Sync>;

/// A PCF command received by the command server.
#[derive(Clone, Debug)]
pub struct PcfRequest {
    pub command: i32,
    pub parameters: Vec<Parameter>,
    pub md: MessageDescriptor,
    pub pmo_options: i32,
    pub queue: String,
}

impl PcfRequest {
    /// Value of a string parameter, trimmed.
    pub fn string(&self, selector: i32) -> Option<String> {
        self.parameters.iter().find_map(|parameter| match parameter {
            Parameter::String { parameter, value, .. } if *parameter == selector => Some(trim_chars(value)),
            _ => None,
        })
    }

    pub fn integer(&self, selector: i32) -> Option<i32> {
        self.parameters.iter().find_map(|parameter| match parameter {
            Parameter::Integer { parameter, value } if *parameter == selector => Some(*value),
            _ => None,
        })
    }
}

struct Message {
    md: MessageDescriptor,
    data: Bytes,
}

enum OpenObject {
    QueueManager,
    CommandQueue,
    Queue { name: String, dynamic: bool },
}

struct State {
    name: String,
    reply_encoding: i32,
    attributes: HashMap<i32, InquiryValue>,
    failing_inquiries: HashMap<i32, MqiError>,
    responders: HashMap<i32, Responder>,
    truncated_replies: HashMap<i32, usize>,
    queues: HashMap<String, VecDeque<Message>>,
    handles: HashMap<i32, OpenObject>,
    next_handle: i32,
    next_id: u64,
    requests: Vec<PcfRequest>,
    last_gmo: Option<GetMessageOptions>,
    connect_error: Option<MqiError>,
    connections: Vec<ConnectionOptions>,
    disconnects: usize,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn object(&self, handle: ObjectHandle) -> Result<&OpenObject, MqiError> {
        self.handles
            .get(&handle.0)
            .ok_or(MqiError::new(MQCC_FAILED, MQRC_HOBJ_ERROR))
    }

    fn register(&mut self, object: OpenObject) -> ObjectHandle {
        self.next_handle += 1;
        self.handles.insert(self.next_handle, object);
        ObjectHandle(self.next_handle)
    }
}

/// A queue manager living in memory.
///
/// Clones share the same state, so a test keeps one clone for assertions while the check connects through another.
#[derive(Clone)]
pub struct InMemoryQueueManager {
    state: Arc<Mutex<State>>,
}

impl InMemoryQueueManager {
    pub fn new(name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                name: name.to_string(),
                reply_encoding: MQENC_NATIVE,
                attributes: HashMap::new(),
                failing_inquiries: HashMap::new(),
                responders: HashMap::new(),
                truncated_replies: HashMap::new(),
                queues: HashMap::new(),
                handles: HashMap::new(),
                next_handle: 0,
                next_id: 0,
                requests: Vec::new(),
                last_gmo: None,
                connect_error: None,
                connections: Vec::new(),
                disconnects: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answers every command with the given code using `responder`.
    ///
    /// Each returned map becomes one reply message. An error becomes a single failed reply carrying its codes.
    /// Commands without a responder get no reply at all.
    pub fn respond<F>(&self, command: i32, responder: F)
    where
        F: Fn(&PcfRequest) -> Result<Vec<ParameterMap>, MqiError> + Send + Sync + 'static,
    {
        self.state().responders.insert(command, Arc::new(responder));
    }

    /// Cuts every reply to the given command down to `len` bytes.
    pub fn truncate_replies(&self, command: i32, len: usize) {
        self.state().truncated_replies.insert(command, len);
    }

    /// Encoding replies are written in.
    pub fn set_reply_encoding(&self, encoding: i32) {
        self.state().reply_encoding = encoding;
    }

    /// Sets a queue manager attribute returned by MQINQ.
    pub fn set_attribute(&self, selector: i32, value: InquiryValue) {
        self.state().attributes.insert(selector, value);
    }

    /// Makes MQINQ of the given selector fail.
    pub fn fail_inquiry(&self, selector: i32, error: MqiError) {
        self.state().failing_inquiries.insert(selector, error);
    }

    /// Makes every connection attempt fail.
    pub fn fail_connect(&self, error: MqiError) {
        self.state().connect_error = Some(error);
    }

    /// Creates an empty local queue.
    pub fn define_queue(&self, name: &str) {
        self.state().queues.entry(name.to_string()).or_default();
    }

    /// Appends a message to a local queue, creating the queue if needed.
    pub fn put_message(&self, queue: &str, encoding: i32, data: Bytes) {
        let mut state = self.state();
        let mut md = MessageDescriptor {
            encoding,
            ..MessageDescriptor::default()
        };
        md.msg_id[..8].copy_from_slice(&state.next_id().to_be_bytes());
        state
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(Message { md, data });
    }

    /// Number of messages on a queue.
    pub fn depth(&self, queue: &str) -> usize {
        self.state().queues.get(queue).map_or(0, VecDeque::len)
    }

    /// Every PCF command received, in order.
    pub fn requests(&self) -> Vec<PcfRequest> {
        self.state().requests.clone()
    }

    /// Codes of every PCF command received, in order.
    pub fn commands(&self) -> Vec<i32> {
        self.state().requests.iter().map(|request| request.command).collect()
    }

    /// Number of objects currently open.
    pub fn open_handles(&self) -> usize {
        self.state().handles.len()
    }

    pub fn last_get_options(&self) -> Option<GetMessageOptions> {
        self.state().last_gmo.clone()
    }

    pub fn connections(&self) -> Vec<ConnectionOptions> {
        self.state().connections.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.state().disconnects
    }

    fn dispatch(&self, request: PcfRequest) {
        let (responder, reply_encoding, truncate) = {
            let mut state = self.state();
            state.requests.push(request.clone());
            (
                state.responders.get(&request.command).cloned(),
                state.reply_encoding,
                state.truncated_replies.get(&request.command).copied(),
            )
        };
        let Some(responder) = responder else {
            return;
        };

        let layout = Layout::for_encoding(reply_encoding);
        let mut messages = match responder(&request) {
            Ok(replies) => {
                let total = replies.len();
                replies
                    .iter()
                    .enumerate()
                    .map(|(i, reply)| {
                        let header = CommandHeader {
                            type_: MQCFT_RESPONSE,
                            command: request.command,
                            msg_seq_number: i32::try_from(i + 1).unwrap_or(i32::MAX),
                            control: if i + 1 == total { MQCFC_LAST } else { MQCFC_NOT_LAST },
                            ..CommandHeader::default()
                        };
                        pcf_message(header, reply, layout)
                    })
                    .collect::<Vec<_>>()
            }
            Err(e) => {
                let header = CommandHeader {
                    type_: MQCFT_RESPONSE,
                    command: request.command,
                    comp_code: e.comp,
                    reason: e.reason,
                    ..CommandHeader::default()
                };
                vec![pcf_message(header, &ParameterMap::new(), layout)]
            }
        };

        if let Some(len) = truncate {
            messages.iter_mut().for_each(|data| data.truncate(len));
        }

        let reply_queue = trim_chars(&request.md.reply_to_q);
        let mut state = self.state();
        if let Some(queue) = state.queues.get_mut(&reply_queue) {
            for data in messages {
                let md = MessageDescriptor {
                    msg_type: MQMT_REPLY,
                    format: *MQFMT_ADMIN,
                    encoding: reply_encoding,
                    correl_id: request.md.msg_id,
                    ..MessageDescriptor::default()
                };
                queue.push_back(Message { md, data });
            }
        }
    }
}

#[async_trait]
impl QueueManagerConnector for InMemoryQueueManager {
    async fn connect(&self, options: &ConnectionOptions) -> mqi::Result<Box<dyn MqiSession>> {
        let mut state = self.state();
        if let Some(error) = state.connect_error {
            return Err(error.into());
        }
        if options.queue_manager_name != state.name {
            return Err(MqiError::new(MQCC_FAILED, MQRC_Q_MGR_NAME_ERROR).into());
        }
        state.connections.push(options.clone());

        Ok(Box::new(InMemorySession { qm: self.clone() }))
    }
}

struct InMemorySession {
    qm: InMemoryQueueManager,
}

#[async_trait]
impl MqiSession for InMemorySession {
    async fn open(&self, od: &mut ObjectDescriptor, _options: i32) -> mqi::Result<ObjectHandle> {
        let mut state = self.qm.state();
        if od.object_type == MQOT_Q_MGR {
            return Ok(state.register(OpenObject::QueueManager));
        }

        let name = trim_chars(&od.object_name);
        if name == COMMAND_QUEUE {
            return Ok(state.register(OpenObject::CommandQueue));
        }
        if name.ends_with("MODEL.QUEUE") {
            let id = state.next_id();
            let dynamic = trim_chars(&od.dynamic_q_name).replace('*', &format!("{:016X}", id));
            od.object_name = fixed_chars(&dynamic);
            state.queues.insert(dynamic.clone(), VecDeque::new());
            return Ok(state.register(OpenObject::Queue {
                name: dynamic,
                dynamic: true,
            }));
        }
        if state.queues.contains_key(&name) {
            return Ok(state.register(OpenObject::Queue { name, dynamic: false }));
        }

        Err(MqiError::new(MQCC_FAILED, MQRC_UNKNOWN_OBJECT_NAME).into())
    }

    async fn close(&self, handle: ObjectHandle, _options: i32) -> mqi::Result<()> {
        let mut state = self.qm.state();
        match state.handles.remove(&handle.0) {
            Some(OpenObject::Queue { name, dynamic: true }) => {
                state.queues.remove(&name);
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(MqiError::new(MQCC_FAILED, MQRC_HOBJ_ERROR).into()),
        }
    }

    async fn put(
        &self, handle: ObjectHandle, md: &mut MessageDescriptor, pmo: &mut PutMessageOptions, message: &[u8],
    ) -> mqi::Result<()> {
        let queue = {
            let mut state = self.qm.state();
            let queue = match state.object(handle)? {
                OpenObject::CommandQueue => None,
                OpenObject::Queue { name, .. } => Some(name.clone()),
                OpenObject::QueueManager => return Err(MqiError::new(MQCC_FAILED, MQRC_HOBJ_ERROR).into()),
            };
            md.msg_id = [0; 24];
            md.msg_id[..8].copy_from_slice(&state.next_id().to_be_bytes());
            queue
        };

        match queue {
            Some(queue) => {
                let data = Bytes::copy_from_slice(message);
                let mut state = self.qm.state();
                state
                    .queues
                    .entry(queue)
                    .or_default()
                    .push_back(Message { md: md.clone(), data });
            }
            None => {
                let (header, parameters) = decode_command(message, Layout::for_encoding(md.encoding))?;
                self.qm.dispatch(PcfRequest {
                    command: header.command,
                    parameters,
                    md: md.clone(),
                    pmo_options: pmo.options,
                    queue: COMMAND_QUEUE.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn get(
        &self, handle: ObjectHandle, md: &mut MessageDescriptor, gmo: &mut GetMessageOptions,
    ) -> mqi::Result<Bytes> {
        let mut state = self.qm.state();
        state.last_gmo = Some(gmo.clone());

        let name = match state.object(handle)? {
            OpenObject::Queue { name, .. } => name.clone(),
            _ => return Err(MqiError::new(MQCC_FAILED, MQRC_HOBJ_ERROR).into()),
        };
        let queue = state.queues.entry(name).or_default();
        let position = if gmo.match_options & MQMO_MATCH_CORREL_ID != 0 {
            queue.iter().position(|message| message.md.correl_id == md.correl_id)
        } else {
            (!queue.is_empty()).then_some(0)
        };

        let message = position
            .and_then(|position| queue.remove(position))
            .ok_or(MqiError::new(MQCC_FAILED, MQRC_NO_MSG_AVAILABLE))?;
        *md = message.md;
        Ok(message.data)
    }

    async fn inquire(&self, handle: ObjectHandle, selector: i32) -> mqi::Result<InquiryValue> {
        let state = self.qm.state();
        match state.object(handle)? {
            OpenObject::QueueManager => {}
            _ => return Err(MqiError::new(MQCC_FAILED, MQRC_HOBJ_ERROR).into()),
        }
        if let Some(error) = state.failing_inquiries.get(&selector) {
            return Err((*error).into());
        }
        state
            .attributes
            .get(&selector)
            .cloned()
            .ok_or_else(|| MqiError::new(MQCC_FAILED, MQRC_SELECTOR_ERROR).into())
    }

    async fn disconnect(&self) -> mqi::Result<()> {
        let mut state = self.qm.state();
        state.handles.clear();
        state.disconnects += 1;
        Ok(())
    }
}

/// Connection options for a queue manager with the given name.
pub fn connection_options(queue_manager: &str) -> ConnectionOptions {
    ConnectionOptions {
        queue_manager_name: queue_manager.to_string(),
        channel_definition: ChannelDefinition::client(MqLevel::default(), "DEV.ADMIN.SVRCONN", "localhost(1414)"),
        ssl_options: None,
        credentials: None,
    }
}

/// Builds a parameter map from `(selector, value)` pairs.
pub fn response<I>(parameters: I) -> ParameterMap
where
    I: IntoIterator<Item = (i32, PcfValue)>,
{
    parameters.into_iter().collect()
}

/// Encodes a PCF message from a header and parameter map.
///
/// The header's parameter count is computed from the map; each occurrence of a group counts as one parameter.
pub fn pcf_message(header: CommandHeader, parameters: &ParameterMap, layout: Layout) -> Bytes {
    let header = CommandHeader {
        parameter_count: parameter_count(parameters),
        ..header
    };

    let mut buf = BytesMut::new();
    pack_into(&header, layout, &mut buf);
    for parameter in to_parameters(parameters) {
        parameter.encode(layout, &mut buf);
    }
    buf.freeze()
}

/// Encodes a big-endian statistics message of the given command.
pub fn statistics_message(command: i32, parameters: &ParameterMap) -> Bytes {
    let header = CommandHeader {
        type_: MQCFT_STATISTICS,
        command,
        ..CommandHeader::default()
    };
    pcf_message(header, parameters, Layout::packed(ByteOrder::Big))
}

/// Flattens a parameter map back into parameter records, groups followed by their children.
pub fn to_parameters(map: &ParameterMap) -> Vec<Parameter> {
    let mut out = Vec::new();
    for (&parameter, value) in map {
        push_parameters(parameter, value, &mut out);
    }
    out
}

fn parameter_count(map: &ParameterMap) -> i32 {
    let count: usize = map
        .values()
        .map(|value| match value {
            PcfValue::Group(groups) => groups.len(),
            _ => 1,
        })
        .sum();
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn push_parameters(parameter: i32, value: &PcfValue, out: &mut Vec<Parameter>) {
    let record = match value {
        PcfValue::Integer(value) => Parameter::Integer {
            parameter,
            value: *value,
        },
        PcfValue::Integer64(value) => Parameter::Integer64 {
            parameter,
            value: *value,
        },
        PcfValue::String(value) => Parameter::String {
            parameter,
            ccsid: 0,
            value: value.clone(),
        },
        PcfValue::ByteString(value) => Parameter::ByteString {
            parameter,
            value: value.clone(),
        },
        PcfValue::IntegerList(values) => Parameter::IntegerList {
            parameter,
            values: values.clone(),
        },
        PcfValue::Integer64List(values) => Parameter::Integer64List {
            parameter,
            values: values.clone(),
        },
        PcfValue::StringList(values) => Parameter::StringList {
            parameter,
            ccsid: 0,
            values: values.clone(),
        },
        PcfValue::Group(groups) => {
            for group in groups {
                out.push(Parameter::Group {
                    parameter,
                    count: parameter_count(group),
                });
                for (&child, value) in group {
                    push_parameters(child, value, out);
                }
            }
            return;
        }
        PcfValue::Filter { operator, value } => match value.as_ref() {
            PcfValue::Integer(value) => Parameter::IntegerFilter {
                parameter,
                operator: *operator,
                value: *value,
            },
            PcfValue::String(value) => Parameter::StringFilter {
                parameter,
                operator: *operator,
                ccsid: 0,
                value: value.clone(),
            },
            PcfValue::ByteString(value) => Parameter::ByteStringFilter {
                parameter,
                operator: *operator,
                value: value.clone(),
            },
            _ => return,
        },
    };
    out.push(record);
}

#[cfg(test)]
mod tests {
    use mqi::pcf::decode_response;
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn messages_decode_to_the_same_map() {
        let mut inner = ParameterMap::new();
        inner.insert(MQCA_Q_NAME, PcfValue::from("APP.IN"));
        inner.insert(MQIAMO_PUTS, PcfValue::IntegerList(vec![3, 4]));

        let mut map = ParameterMap::new();
        map.insert(MQCA_Q_MGR_NAME, PcfValue::from("QM1"));
        map.insert(MQGACF_Q_STATISTICS_DATA, PcfValue::Group(vec![inner.clone(), inner]));

        let message = statistics_message(MQCMD_STATISTICS_Q, &map);
        let (decoded, header) = decode_response(&message, Layout::packed(ByteOrder::Big)).expect("should decode");
        assert_eq!(header.parameter_count, 3);
        assert_eq!(header.command, MQCMD_STATISTICS_Q);
        assert_eq!(decoded, map);
    }

    #[tokio::test]
    async fn dynamic_queues_are_deleted_on_close() {
        let qm = InMemoryQueueManager::new("QM1");
        let session = qm.connect(&connection_options("QM1")).await.expect("should connect");

        let mut od = ObjectDescriptor::queue(MqLevel::default(), "SYSTEM.DEFAULT.MODEL.QUEUE");
        od.dynamic_q_name = fixed_chars("TEST.*");
        let handle = session.open(&mut od, MQOO_INPUT_EXCLUSIVE).await.expect("should open");
        let name = trim_chars(&od.object_name);
        assert!(name.starts_with("TEST."));
        assert_eq!(qm.depth(&name), 0);

        session.close(handle, MQCO_NONE).await.expect("should close");
        assert_eq!(qm.open_handles(), 0);
        assert!(session.close(handle, MQCO_NONE).await.is_err());
    }

    #[tokio::test]
    async fn wrong_queue_manager_name_is_rejected() {
        let qm = InMemoryQueueManager::new("QM1");
        let error = qm
            .connect(&connection_options("QM2"))
            .await
            .err()
            .expect("should fail");
        assert!(error.is_reason(MQRC_Q_MGR_NAME_ERROR));
    }
}
