//! Ostinato runtime: cron engine and task execution
//!
//! This crate is the engine behind the `ostinato` facade: cron pattern
//! parsing and next-occurrence computation, recurring [`Task`]s, one-shot
//! [`At`] timers and the scheduler that wires configured jobs onto the tokio
//! runtime.

mod config;
mod cron;
mod job;
mod registry;
mod runnable;
mod scheduler;
mod task;
mod timer;

// Re-export public API
pub use config::{load_config, resolve_value, TaskSettings};
pub use cron::{CronExpression, CronField, PatternError};
pub use job::ScheduledJob;
pub use linkme;
pub use registry::SCHEDULED_JOBS;
pub use runnable::{Runnable, RunnableJob, RunnableJobBuilder, ScheduledMetadata};
pub use scheduler::{Scheduler, SchedulerBuilder, SchedulerHandle};
pub use task::{Task, TaskBuilder};
pub use timer::{schedule_at, At};
