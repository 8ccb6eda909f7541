use tracing::info;

use crate::task::Task;

/// Handle for a running scheduler
///
/// Keeps hold of every started task; dropping the handle does not stop them.
pub struct SchedulerHandle {
    tasks: Vec<Task>,
}

impl SchedulerHandle {
    pub(crate) fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// The tasks this scheduler started
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Stop every task. Callbacks already running are left to finish.
    pub fn shutdown(self) {
        for task in &self.tasks {
            task.stop();
        }
        info!(count = self.tasks.len(), "scheduler shut down");
    }
}
