use std::sync::Arc;

use config::Config;
use tracing::{info, warn};

use super::handle::SchedulerHandle;
use crate::config::resolve_value;
use crate::job::ScheduledJob;
use crate::runnable::{Runnable, RunnableJob};
use crate::task::Task;

/// Configured scheduler ready to start
///
/// Holds the resolved config and every collected job but owns no running
/// state until [`start`] is called.
///
/// [`start`]: Scheduler::start
pub struct Scheduler {
    config: Arc<Config>,
    jobs: Vec<RunnableJob>,
    registered: Vec<ScheduledJob>,
}

impl Scheduler {
    pub(crate) fn new(
        config: Arc<Config>,
        jobs: Vec<RunnableJob>,
        registered: Vec<ScheduledJob>,
    ) -> Self {
        Self {
            config,
            jobs,
            registered,
        }
    }

    /// Resolve placeholders, skip disabled jobs and start a [`Task`] for the
    /// rest. Must be called from within a tokio runtime.
    ///
    /// Config resolution failures abort the start; a job whose pattern fails
    /// to parse is logged and skipped so one bad entry cannot take down the
    /// remaining schedule.
    pub fn start(self) -> Result<SchedulerHandle, Box<dyn std::error::Error>> {
        let mut tasks = Vec::new();

        for job in self.registered {
            Self::start_job(
                &self.config,
                &mut tasks,
                job.name,
                job.pattern,
                job.enabled,
                Arc::new(job.handler),
            )?;
        }

        for job in self.jobs {
            let RunnableJob {
                name,
                pattern,
                enabled,
                instance,
            } = job;
            Self::start_job(&self.config, &mut tasks, &name, &pattern, &enabled, instance)?;
        }

        info!(count = tasks.len(), "scheduler started");
        Ok(SchedulerHandle::new(tasks))
    }

    fn start_job(
        config: &Config,
        tasks: &mut Vec<Task>,
        name: &str,
        pattern: &str,
        enabled: &str,
        instance: Arc<dyn Runnable>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let enabled = resolve_value(enabled, config)?;
        if enabled.eq_ignore_ascii_case("false") {
            info!(job = %name, "job disabled, skipping");
            return Ok(());
        }

        let pattern = resolve_value(pattern, config)?;
        match Task::builder_shared(instance)
            .pattern(pattern.as_str())
            .name(name)
            .build()
        {
            Ok(task) => {
                info!(job = %name, pattern = %pattern, "job scheduled");
                tasks.push(task);
            }
            Err(error) => {
                warn!(job = %name, %error, "failed to schedule job");
            }
        }
        Ok(())
    }
}
