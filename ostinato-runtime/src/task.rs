use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDateTime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cron::{CronExpression, PatternError};
use crate::runnable::Runnable;
use crate::timer::{deadline_for, sleep_until_deadline};

/// A recurring scheduled task
///
/// Owns one or more cron expressions and a callback. While active the task
/// keeps exactly one pending wake-up for the earliest upcoming match across
/// its expressions; every firing computes a fresh wake-up *before* the
/// callback is invoked, so a panicking callback cannot break the chain.
///
/// A task with no expressions never fires on schedule: started, it stays
/// active with no pending wake-up. Handles are cheap to clone; once started,
/// the schedule keeps running until `stop` even if every handle is dropped.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    name: Option<String>,
    expressions: Vec<CronExpression>,
    runnable: Arc<dyn Runnable>,
    state: Mutex<TaskState>,
}

#[derive(Default)]
struct TaskState {
    active: bool,
    pending: Option<JoinHandle<()>>,
}

impl Task {
    /// Create an active task from a single pattern. Must be called from
    /// within a tokio runtime; scheduling starts immediately.
    pub fn new(pattern: &str, runnable: impl Runnable + 'static) -> Result<Self, PatternError> {
        Self::builder(runnable).pattern(pattern).build()
    }

    /// Create an active task from any number of patterns; none means the
    /// task never fires on schedule.
    pub fn with_patterns<I, S>(patterns: I, runnable: impl Runnable + 'static) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(runnable).patterns(patterns).build()
    }

    /// Start configuring a task around `runnable`
    pub fn builder(runnable: impl Runnable + 'static) -> TaskBuilder {
        Self::builder_shared(Arc::new(runnable))
    }

    pub(crate) fn builder_shared(runnable: Arc<dyn Runnable>) -> TaskBuilder {
        TaskBuilder {
            runnable,
            patterns: Vec::new(),
            name: None,
            active: true,
        }
    }

    /// Activate the task, scheduling its next match. Returns whether the
    /// state changed.
    pub fn start(&self) -> bool {
        let mut state = self.inner.lock_state();
        if state.active {
            return false;
        }
        state.active = true;
        TaskInner::arm(&self.inner, &mut state);
        debug!(task = self.inner.label(), "task started");
        true
    }

    /// Deactivate the task, cancelling any pending wake-up. Returns whether
    /// the state changed. A callback already running is not interrupted.
    pub fn stop(&self) -> bool {
        let mut state = self.inner.lock_state();
        if !state.active {
            return false;
        }
        state.active = false;
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
        debug!(task = self.inner.label(), "task stopped");
        true
    }

    /// Whether the task is currently active
    pub fn active(&self) -> bool {
        self.inner.lock_state().active
    }

    /// Start or stop according to `active`; returns whether the state changed
    pub fn set_active(&self, active: bool) -> bool {
        if active { self.start() } else { self.stop() }
    }

    /// Invoke the callback now, bypassing the schedule entirely
    pub async fn run(&self) {
        self.inner.runnable.run().await;
    }

    /// Whether `at` satisfies any of the task's expressions
    pub fn matches(&self, at: NaiveDateTime) -> bool {
        self.inner.expressions.iter().any(|e| e.matches(at))
    }

    /// Whether the current local time satisfies any expression
    pub fn matches_now(&self) -> bool {
        self.matches(Local::now().naive_local())
    }

    /// Earliest match strictly after `after` across all expressions; `None`
    /// for a task with no expressions
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        self.inner.next_after(after)
    }

    /// Earliest match after the current local time
    pub fn next(&self) -> Option<NaiveDateTime> {
        self.next_after(Local::now().naive_local())
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }
}

impl TaskInner {
    fn lock_state(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        self.expressions
            .iter()
            .filter_map(|e| e.next_after(after))
            .min()
    }

    /// Schedule the next wake-up, if the expressions produce one
    fn arm(inner: &Arc<TaskInner>, state: &mut TaskState) {
        let now = Local::now().naive_local();
        let Some(next) = inner.next_after(now) else {
            // No expressions: active but dormant
            return;
        };
        let worker = Arc::clone(inner);
        state.pending = Some(tokio::spawn(async move {
            sleep_until_deadline(deadline_for(next)).await;
            TaskInner::fire(&worker);
        }));
        debug!(task = inner.label(), next = %next, "task armed");
    }

    fn fire(inner: &Arc<TaskInner>) {
        {
            let mut state = inner.lock_state();
            if !state.active {
                // Stopped between the wake-up and this point
                return;
            }
            state.pending = None;
            // The next wake-up must be in place before the callback runs
            TaskInner::arm(inner, &mut state);
        }
        let runnable = Arc::clone(&inner.runnable);
        tokio::spawn(async move {
            runnable.run().await;
        });
    }
}

/// Builder for [`Task`]
pub struct TaskBuilder {
    runnable: Arc<dyn Runnable>,
    patterns: Vec<String>,
    name: Option<String>,
    active: bool,
}

impl TaskBuilder {
    /// Add one cron pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add any number of cron patterns
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Name used in log output
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the task starts active (the default)
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Parse the patterns and create the task, starting it if configured
    /// active. Fails with the parser's error on the first bad pattern.
    pub fn build(self) -> Result<Task, PatternError> {
        let expressions = self
            .patterns
            .iter()
            .map(|p| CronExpression::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        let task = Task {
            inner: Arc::new(TaskInner {
                name: self.name,
                expressions,
                runnable: self.runnable,
                state: Mutex::new(TaskState::default()),
            }),
        };
        if self.active {
            task.start();
        }
        Ok(task)
    }
}
