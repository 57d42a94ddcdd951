use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use integration_check::{
    check::{Check, InitCfg, InstanceCfg},
    config::ConfigurationError,
    runner::CheckRunner,
    service_check::{ServiceCheck, Status},
    sink::Sink,
    Mapping, Result,
};
use snafu::{OptionExt as _, Snafu};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    collectors::{channel, queue, stats, CollectionContext},
    config::IbmMqConfig,
    connection::{ConnectionOptions, MqiSession, QueueManagerConnector},
    pcf_execute::PcfSettings,
    process_matcher::{ProcessLister, QueueManagerProcessMatcher},
};

pub const CHECK_NAME: &str = "ibm_mq";
pub const CAN_CONNECT_SERVICE_CHECK: &str = "ibm_mq.can_connect";

/// Factory behind [`Check::build`].
///
/// `Check::build` takes no receiver, so this is the only way it can reach the shared connector and process matcher.
/// It is the crate's single global: the process that hosts the check installs it once at startup. Everything else
/// can call [`IbmMqCheckFactory::build`] on a factory it owns and never touch this.
static FACTORY: OnceLock<IbmMqCheckFactory> = OnceLock::new();

/// An error while building or running the check.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum CheckError {
    #[snafu(display("No IBM MQ check factory installed, call `IbmMqCheckFactory::install` before building checks."))]
    FactoryNotInstalled,

    #[snafu(display("Cannot connect to queue manager '{}': {}", queue_manager, source))]
    Connect { queue_manager: String, source: mqi::Error },
}

/// Shared services for every IBM MQ check instance.
///
/// The factory owns the queue manager connector and the process matcher, so that all instances on a host share one
/// view of which queue managers are running.
pub struct IbmMqCheckFactory {
    connector: Arc<dyn QueueManagerConnector>,
    lister: Arc<dyn ProcessLister>,
    matcher: OnceLock<Arc<QueueManagerProcessMatcher>>,
}

impl IbmMqCheckFactory {
    pub fn new(connector: Arc<dyn QueueManagerConnector>, lister: Arc<dyn ProcessLister>) -> Self {
        Self {
            connector,
            lister,
            matcher: OnceLock::new(),
        }
    }

    /// Installs this factory as the one used by [`Check::build`].
    ///
    /// # Errors
    ///
    /// If a factory is already installed, the given factory is handed back.
    pub fn install(self) -> std::result::Result<(), Self> {
        FACTORY.set(self)
    }

    /// Builds a check instance.
    ///
    /// The process matcher is created on first use, bounded by that instance's `queue_manager_process_limit`.
    /// `init_config` is shared by all instances, so later instances get the same limit.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, an error is returned.
    pub fn build<S: Sink>(
        &self, sink: S, init_config: &Mapping, instance: &Mapping,
    ) -> std::result::Result<IbmMqCheck<S>, ConfigurationError> {
        let config = IbmMqConfig::from_mappings(init_config, instance)?;
        let matcher = self
            .matcher
            .get_or_init(|| {
                Arc::new(QueueManagerProcessMatcher::new(
                    config.queue_manager_process_limit,
                    Arc::clone(&self.lister),
                ))
            })
            .clone();

        info!(
            check = CHECK_NAME,
            queue_manager = %config.queue_manager_name,
            connection_name = %config.connection_name,
            channel = %config.channel,
            "Built IBM MQ check."
        );

        Ok(IbmMqCheck {
            sink,
            settings: PcfSettings::from_config(&config),
            connection_options: ConnectionOptions::from_config(&config),
            config,
            connector: Arc::clone(&self.connector),
            matcher,
            cancel: CancellationToken::new(),
        })
    }
}

/// The IBM MQ check.
pub struct IbmMqCheck<S> {
    sink: S,
    config: IbmMqConfig,
    settings: PcfSettings,
    connection_options: ConnectionOptions,
    connector: Arc<dyn QueueManagerConnector>,
    matcher: Arc<QueueManagerProcessMatcher>,
    cancel: CancellationToken,
}

#[async_trait]
impl<S> Check for IbmMqCheck<S>
where
    S: Sink + Send + Sync,
{
    type Snk = S;

    fn build(sink: S, init_cfg: InitCfg, instance_cfg: InstanceCfg) -> Result<Self> {
        let factory = FACTORY.get().context(FactoryNotInstalled)?;
        Ok(factory.build(sink, &init_cfg, &instance_cfg)?)
    }

    async fn run(&self) -> Result<()> {
        if let Some(pattern) = &self.config.queue_manager_process {
            if !self.matcher.is_running(pattern).await {
                debug!(
                    queue_manager = %self.config.queue_manager_name,
                    pattern = %pattern,
                    "Queue manager process not found, skipping run."
                );
                return Ok(());
            }
        }

        let session = match self.connector.connect(&self.connection_options).await {
            Ok(session) => session,
            Err(e) => {
                warn!(queue_manager = %self.config.queue_manager_name, error = %e, "Cannot connect to queue manager.");
                self.can_connect(Status::Critical, Some(e.to_string())).await;
                return Err(CheckError::Connect {
                    queue_manager: self.config.queue_manager_name.clone(),
                    source: e,
                }
                .into());
            }
        };
        self.can_connect(Status::Ok, None).await;

        self.collect(session.as_ref()).await;

        if let Err(e) = session.disconnect().await {
            debug!(error = %e, "Failed to disconnect from queue manager.");
        }
        Ok(())
    }
}

impl<S> IbmMqCheck<S>
where
    S: Sink + Send + Sync + 'static,
{
    /// Wraps the check in a runner scheduled every `min_collection_interval`.
    ///
    /// The runner is identified as `ibm_mq:<queue manager>`.
    pub fn into_runner(self) -> CheckRunner<Self> {
        let check_id = format!("{}:{}", CHECK_NAME, self.config.queue_manager_name);
        let interval = self.config.min_collection_interval;
        CheckRunner::new(check_id, self, interval)
    }
}

impl<S> IbmMqCheck<S>
where
    S: Sink,
{
    pub fn config(&self) -> &IbmMqConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Token that interrupts a running collection between queues, channels or statistics messages.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn can_connect(&self, status: Status, message: Option<String>) {
        let mut service_check = ServiceCheck::new(CAN_CONNECT_SERVICE_CHECK, status, self.config.tags.clone())
            .with_hostname(self.config.hostname.clone());
        if let Some(message) = message {
            service_check = service_check.with_message(message);
        }
        self.sink.submit_service_check(service_check).await;
    }

    async fn collect(&self, session: &dyn MqiSession) {
        let ctx = CollectionContext {
            sink: &self.sink,
            config: &self.config,
            session,
            settings: &self.settings,
            cancel: &self.cancel,
        };

        queue::collect_queue_manager_stats(&ctx).await;
        if self.cancelled() {
            return;
        }
        queue::collect(&ctx).await;
        if self.cancelled() {
            return;
        }
        channel::collect(&ctx).await;
        if self.cancelled() || !self.config.collect_statistics_metrics {
            return;
        }
        if let Err(e) = stats::collect(&ctx).await {
            ctx.warning(format!("Error collecting statistics metrics: {}", e)).await;
        }
    }

    fn cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            debug!(queue_manager = %self.config.queue_manager_name, "Collection cancelled.");
        }
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use integration_check::{log::Level, sink::Recorder};
    use mqi::{
        constants::{cmqc::*, cmqcfc::*},
        pcf::PcfValue,
        MqiError,
    };

    use std::time::Duration;

    use super::*;
    use crate::{
        connection::InquiryValue,
        process_matcher::testing::StaticProcessLister,
        testing::{response, InMemoryQueueManager},
    };

    const INSTANCE: &str = "channel: DEV.ADMIN.SVRCONN\nqueue_manager: QM1\nhost: mq\nport: 1414\n";

    fn factory(qm: &InMemoryQueueManager, processes: &[&str]) -> IbmMqCheckFactory {
        IbmMqCheckFactory::new(
            Arc::new(qm.clone()),
            Arc::new(StaticProcessLister::new(processes.iter().copied())),
        )
    }

    fn build(factory: &IbmMqCheckFactory, init: &str, instance: &str) -> IbmMqCheck<Recorder> {
        let init: Mapping = serde_yaml::from_str(init).expect("should parse init_config");
        let instance: Mapping = serde_yaml::from_str(instance).expect("should parse instance");
        factory
            .build(Recorder::new(), &init, &instance)
            .expect("should build check")
    }

    #[tokio::test]
    async fn connected_run_reports_and_disconnects() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.set_attribute(MQIA_DIST_LISTS, InquiryValue::Integer(1));
        qm.set_attribute(MQIA_MAX_MSG_LENGTH, InquiryValue::Integer(4_194_304));
        qm.respond(MQCMD_INQUIRE_CHANNEL_STATUS, |_| {
            Ok(vec![response([
                (MQCACH_CHANNEL_NAME, PcfValue::from("DEV.ADMIN.SVRCONN")),
                (MQIACH_CHANNEL_STATUS, PcfValue::from(MQCHS_RUNNING)),
            ])])
        });
        let check = build(&factory(&qm, &[]), "{}", INSTANCE);

        check.run().await.expect("should run");

        let sink = check.sink();
        sink.assert_service_check(CAN_CONNECT_SERVICE_CHECK, Status::Ok, &["channel:DEV.ADMIN.SVRCONN"]);
        sink.assert_service_check("ibm_mq.queue_manager", Status::Ok, &["queue_manager:QM1"]);
        sink.assert_metric("ibm_mq.queue_manager.dist_lists", 1.0, &["queue_manager:QM1"]);
        sink.assert_service_check("ibm_mq.channel.status", Status::Ok, &["channel:DEV.ADMIN.SVRCONN"]);

        assert_eq!(qm.connections().len(), 1);
        assert_eq!(qm.disconnects(), 1);
        assert_eq!(qm.open_handles(), 0);
        assert!(!qm.commands().contains(&MQCMD_RESET_Q_STATS));
    }

    #[tokio::test]
    async fn failed_connection_is_critical() {
        let qm = InMemoryQueueManager::new("QM1");
        qm.fail_connect(MqiError::new(MQCC_FAILED, MQRC_HOST_NOT_AVAILABLE));
        let check = build(&factory(&qm, &[]), "{}", INSTANCE);

        let error = check.run().await.expect_err("should fail");
        assert!(error.to_string().contains("QM1"));

        let checks = check.sink().find_service_checks(CAN_CONNECT_SERVICE_CHECK, &["queue_manager:QM1"]);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, Status::Critical);
        assert!(checks[0].message.contains(&MQRC_HOST_NOT_AVAILABLE.to_string()));
        assert!(check.sink().metrics().is_empty());
        assert_eq!(qm.disconnects(), 0);
    }

    #[tokio::test]
    async fn missing_queue_manager_process_skips_run() {
        let qm = InMemoryQueueManager::new("QM1");
        let factory = factory(&qm, &["/usr/sbin/sshd -D"]);
        let init = "queue_manager_process: amqpcsea <queue_manager>\n";
        let check = build(&factory, init, INSTANCE);

        check.run().await.expect("should skip");
        assert!(qm.connections().is_empty());
        assert!(check.sink().service_checks().is_empty());
    }

    #[tokio::test]
    async fn running_queue_manager_process_allows_run() {
        let qm = InMemoryQueueManager::new("QM1");
        let factory = factory(&qm, &["/opt/mqm/bin/amqpcsea QM1"]);
        let init = "queue_manager_process: amqpcsea <queue_manager>\n";
        let check = build(&factory, init, INSTANCE);

        check.run().await.expect("should run");
        assert_eq!(qm.connections().len(), 1);
        check
            .sink()
            .assert_service_check(CAN_CONNECT_SERVICE_CHECK, Status::Ok, &["queue_manager:QM1"]);
    }

    #[tokio::test]
    async fn cancelled_run_still_disconnects() {
        let qm = InMemoryQueueManager::new("QM1");
        let check = build(&factory(&qm, &[]), "{}", INSTANCE);
        check.cancellation_token().cancel();

        check.run().await.expect("should run");
        assert_eq!(qm.disconnects(), 1);
        assert!(!qm.commands().contains(&MQCMD_INQUIRE_CHANNEL));
    }

    #[tokio::test]
    async fn statistics_failure_is_a_warning() {
        let qm = InMemoryQueueManager::new("QM1");
        let instance = format!("{}collect_statistics_metrics: true\n", INSTANCE);
        let check = build(&factory(&qm, &[]), "{}", &instance);

        check.run().await.expect("should run");
        assert!(check.sink().has_log(Level::Warning, "Error collecting statistics metrics"));
        assert_eq!(qm.disconnects(), 1);
    }

    #[tokio::test]
    async fn invalid_configuration_is_rejected() {
        let factory = factory(&InMemoryQueueManager::new("QM1"), &[]);
        let instance: Mapping = serde_yaml::from_str("queue_manager: QM1\n").expect("should parse instance");

        assert!(factory.build(Recorder::new(), &Mapping::new(), &instance).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn runner_follows_min_collection_interval() {
        let qm = InMemoryQueueManager::new("QM1");
        let instance = format!("{}min_collection_interval: 30\n", INSTANCE);
        let runner = build(&factory(&qm, &[]), "{}", &instance).into_runner();
        assert_eq!(runner.check_id(), "ibm_mq:QM1");
        assert_eq!(runner.interval(), Duration::from_secs(30));

        let cancel = CancellationToken::new();
        let handle = runner.spawn(cancel.clone());
        tokio::time::sleep(Duration::from_secs(45)).await;
        cancel.cancel();

        let runs = handle.await.expect("should join runner");
        assert_eq!(runs, 2);
        assert_eq!(qm.connections().len(), 2);
    }

    #[tokio::test]
    async fn check_build_uses_installed_factory() {
        let qm = InMemoryQueueManager::new("QM1");
        let _ = factory(&qm, &[]).install();
        let instance: Mapping = serde_yaml::from_str(INSTANCE).expect("should parse instance");

        let check = IbmMqCheck::<Recorder>::build(Recorder::new(), Mapping::new(), instance).expect("should build");
        assert_eq!(check.config().queue_manager_name, "QM1");
    }
}
