/// A function-backed job registered by the `#[scheduled]` macro
///
/// Everything is `'static` text straight from the attribute; pattern and
/// enabled flag may be `${key}` config placeholders resolved at scheduler
/// start. The handler is a plain fn pointer that hands the annotated async
/// function to the runtime.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub name: &'static str,
    pub pattern: &'static str,
    pub enabled: &'static str,
    pub handler: fn(),
}

impl ScheduledJob {
    pub fn new(
        name: &'static str,
        pattern: &'static str,
        enabled: &'static str,
        handler: fn(),
    ) -> Self {
        Self {
            name,
            pattern,
            enabled,
            handler,
        }
    }
}
