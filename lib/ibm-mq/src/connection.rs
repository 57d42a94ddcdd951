//! Queue manager connections.
//!
//! The MQI verbs are reached through [`MqiSession`], which works on the typed MQI structures and reports failures as
//! [`mqi::Error`]. A client binding provides a [`QueueManagerConnector`] that opens sessions from
//! [`ConnectionOptions`]; the check never talks to the client library directly.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use mqi::{
    structure::{
        fixed_chars, ChannelDefinition, GetMessageOptions, MessageDescriptor, ObjectDescriptor, PutMessageOptions,
        SslConfigurationOptions,
    },
    MqLevel,
};
use tracing::debug;

use crate::config::IbmMqConfig;

/// Handle of an object opened on a session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ObjectHandle(pub i32);

/// Value returned by MQINQ.
#[derive(Clone, Debug, PartialEq)]
pub enum InquiryValue {
    Integer(i32),
    String(Bytes),
}

impl InquiryValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(i64::from(*value)),
            Self::String(_) => None,
        }
    }
}

/// An established connection to a queue manager.
#[async_trait]
pub trait MqiSession: Send + Sync {
    /// Opens an object (MQOPEN). The descriptor is updated with the names the queue manager resolved, including the
    /// name given to a dynamic queue.
    async fn open(&self, od: &mut ObjectDescriptor, options: i32) -> mqi::Result<ObjectHandle>;

    /// Closes an object (MQCLOSE).
    async fn close(&self, handle: ObjectHandle, options: i32) -> mqi::Result<()>;

    /// Puts a message (MQPUT). The descriptor is updated with the generated message identifier.
    async fn put(
        &self, handle: ObjectHandle, md: &mut MessageDescriptor, pmo: &mut PutMessageOptions, message: &[u8],
    ) -> mqi::Result<()>;

    /// Gets a message (MQGET), waiting according to the get message options.
    ///
    /// The descriptor is updated with the descriptor of the message returned.
    async fn get(
        &self, handle: ObjectHandle, md: &mut MessageDescriptor, gmo: &mut GetMessageOptions,
    ) -> mqi::Result<Bytes>;

    /// Inquires an attribute of an open object (MQINQ).
    async fn inquire(&self, handle: ObjectHandle, selector: i32) -> mqi::Result<InquiryValue>;

    /// Disconnects from the queue manager (MQDISC).
    async fn disconnect(&self) -> mqi::Result<()>;
}

/// Opens sessions to queue managers (MQCONNX).
#[async_trait]
pub trait QueueManagerConnector: Send + Sync {
    async fn connect(&self, options: &ConnectionOptions) -> mqi::Result<Box<dyn MqiSession>>;
}

/// User credentials sent with MQCONNX.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to connect to a queue manager as a client.
#[derive(Clone, Debug)]
pub struct ConnectionOptions {
    pub queue_manager_name: String,
    pub channel_definition: ChannelDefinition,
    pub ssl_options: Option<SslConfigurationOptions>,
    pub credentials: Option<Credentials>,
}

impl ConnectionOptions {
    /// Builds the client channel definition, and the TLS options when TLS is enabled.
    pub fn from_config(config: &IbmMqConfig) -> Self {
        let mut cd = ChannelDefinition::client(MqLevel::default(), &config.channel, &config.connection_name);
        cd.version = config.mqcd_version;

        let ssl_options = config.ssl_auth.then(|| {
            cd.ssl_cipher_spec = fixed_chars(&config.ssl_cipher_spec);

            let mut sco = SslConfigurationOptions::new(MqLevel::default());
            sco.key_repository = fixed_chars(&config.ssl_key_repository_location);
            if let Some(label) = &config.ssl_certificate_label {
                sco.certificate_label = fixed_chars(label);
            }
            sco
        });

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(password)) => Some(Credentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        debug!(
            queue_manager = %config.queue_manager_name,
            connection_name = %config.connection_name,
            channel = %config.channel,
            mqcd_version = config.mqcd_version,
            tls = config.ssl_auth,
            cipher_spec = config.ssl_auth.then_some(config.ssl_cipher_spec.as_str()),
            key_repository = config.ssl_auth.then_some(config.ssl_key_repository_location.as_str()),
            user = credentials.as_ref().map(|c| c.user.as_str()),
            "Built queue manager connection options."
        );

        Self {
            queue_manager_name: config.queue_manager_name.clone(),
            channel_definition: cd,
            ssl_options,
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use integration_check::Mapping;
    use mqi::{
        constants::{cmqc::*, cmqxc::MQCD_VERSION_9},
        structure::trim_chars,
    };

    use super::*;

    fn config(yaml: &str) -> IbmMqConfig {
        let instance: Mapping = serde_yaml::from_str(yaml).expect("should parse mapping");
        IbmMqConfig::from_mappings(&Mapping::new(), &instance).expect("should be valid")
    }

    #[test]
    fn plain_connection() {
        let options = ConnectionOptions::from_config(&config(
            "channel: DEV.ADMIN.SVRCONN\nqueue_manager: QM1\nhost: mq\nport: 11414\nmqcd_version: 9\n",
        ));

        let cd = &options.channel_definition;
        assert_eq!(options.queue_manager_name, "QM1");
        assert_eq!(trim_chars(&cd.channel_name), "DEV.ADMIN.SVRCONN");
        assert_eq!(trim_chars(&cd.connection_name), "mq(11414)");
        assert_eq!(cd.channel_type, MQCHT_CLNTCONN);
        assert_eq!(cd.transport_type, MQXPT_TCP);
        assert_eq!(cd.version, MQCD_VERSION_9);
        assert!(options.ssl_options.is_none());
        assert!(options.credentials.is_none());
    }

    #[test]
    fn tls_connection_with_credentials() {
        let options = ConnectionOptions::from_config(&config(
            "channel: C\nssl_auth: true\nssl_certificate_label: agent\nusername: admin\npassword: passw0rd\n",
        ));

        assert_eq!(
            trim_chars(&options.channel_definition.ssl_cipher_spec),
            "TLS_RSA_WITH_AES_256_CBC_SHA"
        );
        let sco = options.ssl_options.as_ref().expect("should have TLS options");
        assert_eq!(trim_chars(&sco.key_repository), "/var/mqm/ssl-db/client/KeyringClient");
        assert_eq!(trim_chars(&sco.certificate_label), "agent");

        let credentials = options.credentials.as_ref().expect("should have credentials");
        assert_eq!(credentials.user, "admin");
        assert!(!format!("{:?}", credentials).contains("passw0rd"));
    }
}
