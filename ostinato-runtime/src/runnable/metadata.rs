/// Schedule metadata attached to a type by `#[scheduled]` on its
/// `impl Runnable` block
///
/// Values are kept as authored so `${key}` and `${key:default}` config
/// placeholders survive until the scheduler resolves them.
pub trait ScheduledMetadata {
    /// The cron pattern, or a config placeholder resolving to one
    fn pattern() -> &'static str;

    /// "true"/"false", or a config placeholder resolving to either
    fn enabled() -> &'static str {
        "true"
    }
}
