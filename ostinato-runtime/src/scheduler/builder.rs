use std::path::Path;
use std::sync::Arc;

use config::Config;
use tracing::info;

use super::scheduler::Scheduler;
use crate::config::{load_config, TaskSettings};
use crate::job::ScheduledJob;
use crate::registry::SCHEDULED_JOBS;
use crate::runnable::{Runnable, RunnableJob, ScheduledMetadata};

/// Builder collecting jobs before the scheduler starts
///
/// Jobs come from three places: explicit registration with [`job`], types
/// annotated with `#[scheduled]` on their `impl Runnable` block handed to
/// [`runnable`], and functions annotated with `#[scheduled]`, which are
/// auto-discovered at [`build`] time.
///
/// [`job`]: SchedulerBuilder::job
/// [`runnable`]: SchedulerBuilder::runnable
/// [`build`]: SchedulerBuilder::build
pub struct SchedulerBuilder {
    config: Arc<Config>,
    jobs: Vec<RunnableJob>,
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerBuilder {
    /// Builder with an empty config: placeholders without defaults will fail
    /// to resolve at start
    pub fn new() -> Self {
        Self {
            config: Arc::new(Config::default()),
            jobs: Vec::new(),
        }
    }

    /// Builder backed by a TOML or YAML config file (chosen by extension),
    /// layered under `APP_`-prefixed environment variables
    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(load_config(path)?))
    }

    /// Builder backed by an already-built config
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            jobs: Vec::new(),
        }
    }

    /// Register a job with an explicit pattern (or `${key}` placeholder)
    pub fn job(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        instance: impl Runnable + 'static,
    ) -> Self {
        self.jobs.push(
            RunnableJob::builder(name, Arc::new(instance))
                .pattern(pattern)
                .build(),
        );
        self
    }

    /// Register an instance whose schedule comes from `#[scheduled]` on its
    /// `impl Runnable` block
    pub fn runnable<T>(mut self, instance: T) -> Self
    where
        T: Runnable + ScheduledMetadata + 'static,
    {
        self.jobs.push(
            RunnableJob::builder(std::any::type_name::<T>(), Arc::new(instance))
                .pattern(T::pattern())
                .enabled(T::enabled())
                .build(),
        );
        self
    }

    /// Register an instance whose schedule lives in the config under `key`
    /// as a `{ cron, enabled }` table
    pub fn job_from_config(
        mut self,
        key: &str,
        instance: impl Runnable + 'static,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings: TaskSettings = self.config.get(key)?;
        self.jobs.push(
            RunnableJob::builder(key, Arc::new(instance))
                .pattern(settings.cron)
                .enabled(settings.enabled.to_string())
                .build(),
        );
        Ok(self)
    }

    /// Collect everything, including `#[scheduled]` functions discovered via
    /// the registry, into a scheduler ready to start
    pub fn build(self) -> Scheduler {
        let registered: Vec<ScheduledJob> = SCHEDULED_JOBS.iter().map(|f| f()).collect();
        info!(
            registered = registered.len(),
            jobs = self.jobs.len(),
            "building scheduler"
        );
        Scheduler::new(self.config, self.jobs, registered)
    }
}
