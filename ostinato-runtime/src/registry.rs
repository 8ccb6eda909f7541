use crate::job::ScheduledJob;

/// Global distributed slice collecting jobs registered by the `#[scheduled]`
/// macro across every linked crate
#[linkme::distributed_slice]
pub static SCHEDULED_JOBS: [fn() -> ScheduledJob] = [..];
