//! Queue manager process detection.
//!
//! An instance can be configured to run only while its queue manager process is alive on this host. The matcher
//! remembers the patterns it has seen running for a while so that the process table is not scanned on every run, and
//! bounds how many queue managers it tracks at once.

use std::{
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use integration_check::cache::TtlCache;
use quanta::Clock;
use regex::Regex;
use tokio::fs;
use tracing::{debug, trace, warn};

const DEFAULT_PROCFS_ROOT: &str = "/proc";

/// How long a pattern seen running is trusted before the process table is scanned again.
pub const DEFAULT_MATCH_TTL: Duration = Duration::from_secs(60);

/// Source of the command lines of running processes.
#[async_trait]
pub trait ProcessLister: Send + Sync {
    async fn command_lines(&self) -> io::Result<Vec<String>>;
}

/// Lists processes from procfs.
pub struct ProcfsProcessLister {
    procfs_root: PathBuf,
}

impl ProcfsProcessLister {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROCFS_ROOT)
    }

    /// Reads processes from a procfs mounted elsewhere, such as `/host/proc` in a container.
    pub fn with_root(procfs_root: impl AsRef<Path>) -> Self {
        Self {
            procfs_root: procfs_root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ProcessLister for ProcfsProcessLister {
    async fn command_lines(&self) -> io::Result<Vec<String>> {
        let mut command_lines = Vec::new();

        let mut entries = fs::read_dir(&self.procfs_root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let is_pid = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()));
            if !is_pid {
                continue;
            }

            // Processes can exit between listing and reading.
            let Ok(raw) = fs::read(entry.path().join("cmdline")).await else {
                continue;
            };
            let command_line = String::from_utf8_lossy(&raw).replace('\0', " ");
            let command_line = command_line.trim();
            if !command_line.is_empty() {
                command_lines.push(command_line.to_string());
            }
        }

        trace!(processes = command_lines.len(), root = %self.procfs_root.display(), "Listed processes.");
        Ok(command_lines)
    }
}

/// Finds queue manager processes by command line pattern.
pub struct QueueManagerProcessMatcher {
    running: TtlCache<String, ()>,
    lister: Arc<dyn ProcessLister>,
}

impl QueueManagerProcessMatcher {
    /// Creates a matcher tracking at most `limit` running queue managers.
    pub fn new(limit: NonZeroUsize, lister: Arc<dyn ProcessLister>) -> Self {
        Self::with_clock(limit, DEFAULT_MATCH_TTL, Clock::new(), lister)
    }

    pub fn with_clock(limit: NonZeroUsize, ttl: Duration, clock: Clock, lister: Arc<dyn ProcessLister>) -> Self {
        Self {
            running: TtlCache::with_clock(limit, ttl, clock),
            lister,
        }
    }

    /// Returns `true` if a process whose command line matches `pattern` is running.
    ///
    /// Returns `false` when the limit of tracked queue managers is reached, even if the process is running.
    pub async fn is_running(&self, pattern: &Regex) -> bool {
        let key = pattern.as_str().to_string();
        if self.running.contains(&key) {
            trace!(pattern = %key, "Queue manager process recently seen running.");
            return true;
        }

        let command_lines = match self.lister.command_lines().await {
            Ok(command_lines) => command_lines,
            Err(e) => {
                warn!(error = %e, "Failed to list processes.");
                return false;
            }
        };
        if !command_lines.iter().any(|command_line| pattern.is_match(command_line)) {
            debug!(pattern = %key, "No process matches queue manager pattern.");
            return false;
        }

        if !self.running.try_insert(key.clone(), ()) {
            warn!(
                pattern = %key,
                limit = self.running.capacity(),
                "Queue manager process limit reached, raise `queue_manager_process_limit` to monitor more queue managers."
            );
            return false;
        }
        true
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Process lister returning a fixed set of command lines.
    #[derive(Default)]
    pub struct StaticProcessLister {
        command_lines: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl StaticProcessLister {
        pub fn new<I, S>(command_lines: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                command_lines: Mutex::new(command_lines.into_iter().map(Into::into).collect()),
                calls: Mutex::new(0),
            }
        }

        pub fn set<I, S>(&self, command_lines: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            *self.command_lines.lock().unwrap_or_else(|e| e.into_inner()) =
                command_lines.into_iter().map(Into::into).collect();
        }

        /// Number of times the process table was listed.
        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl ProcessLister for StaticProcessLister {
        async fn command_lines(&self) -> io::Result<Vec<String>> {
            *self.calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
            Ok(self.command_lines.lock().unwrap_or_else(|e| e.into_inner()).clone())
        }
    }
}
