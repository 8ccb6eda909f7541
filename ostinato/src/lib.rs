//! # Ostinato - Cron-Style Task Scheduling for Rust
//!
//! An ostinato is a musical phrase that repeats persistently. This library
//! schedules work the same way: recurring tasks driven by cron expressions,
//! plus one-shot timers for a single future instant, all running in-process
//! on the tokio runtime.
//!
//! ## Features
//!
//! - **Cron expressions**: 5 or 6 columns (optional seconds), `@hourly`-style
//!   nicknames, month/weekday names, steps, ranges and `~` random values
//! - **Recurring tasks**: each [`Task`] re-arms itself before every firing,
//!   so a panicking callback cannot break the chain
//! - **One-shot timers**: [`schedule_at`] fires once at an absolute instant,
//!   chaining bounded waits past the platform timer ceiling
//! - **Config support**: patterns and enabled flags resolve `${app.key}`
//!   placeholders from TOML/YAML files and `APP_` environment variables
//! - **`#[scheduled]` macro**: annotate functions or `impl Runnable` blocks
//!   and let the scheduler discover them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ostinato::{scheduled, SchedulerBuilder};
//!
//! #[scheduled(cron = "0 */5 * * * *")]
//! async fn every_five_minutes() {
//!     println!("this runs every 5 minutes");
//! }
//!
//! #[scheduled(cron = "${app.report.cron:@daily}")]
//! async fn from_config() {
//!     println!("pattern comes from the config file");
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = SchedulerBuilder::with_file("config/application.toml")?
//!         .build()
//!         .start()?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Working with expressions directly
//!
//! ```rust
//! use ostinato::CronExpression;
//!
//! let expr = CronExpression::parse("0 30 9 * * mon-fri").unwrap();
//! let next = expr.next().unwrap();
//! assert!(next > chrono::Local::now().naive_local());
//! ```
//!
//! ## Configuration
//!
//! Create `config/application.toml`:
//!
//! ```toml
//! [app.report]
//! cron = "0 0 7 * * mon-fri"
//! enabled = true
//! ```
//!
//! Or `config/application.yaml`:
//!
//! ```yaml
//! app:
//!   report:
//!     cron: "0 0 7 * * mon-fri"
//!     enabled: true
//! ```
//!
//! Environment variables with the `APP_` prefix override file values:
//!
//! ```bash
//! export APP_REPORT_CRON="0 0 8 * * *"
//! ```

// Re-export macros
pub use ostinato_macro::scheduled;

// Re-export core types
pub use ostinato_runtime::{
    schedule_at, At, CronExpression, PatternError, Runnable, ScheduledMetadata, Scheduler,
    SchedulerBuilder, SchedulerHandle, Task, TaskBuilder,
};

// Make ostinato_runtime available for macro expansion
pub use ostinato_runtime;
