use async_trait::async_trait;

use super::sink::Sink;
use super::{Mapping, Result};

pub type InitCfg = Mapping;
pub type InstanceCfg = Mapping;

/// A check.
///
/// A check is built once per configured instance and then run on every collection interval.
#[async_trait]
pub trait Check: Send + Sync {
    type Snk: Sink + Send + Sync;

    /// Builds the check from its `init_config` and instance configuration.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, an error is returned and the instance is never scheduled.
    fn build(sink: Self::Snk, init_cfg: InitCfg, instance_cfg: InstanceCfg) -> Result<Self>
    where
        Self: Sized;

    /// Runs one collection.
    async fn run(&self) -> Result<()>;
}
