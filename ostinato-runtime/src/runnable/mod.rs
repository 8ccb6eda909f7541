mod job;
mod metadata;
mod r#trait;

pub use job::{RunnableJob, RunnableJobBuilder};
pub use metadata::ScheduledMetadata;
pub use r#trait::Runnable;
