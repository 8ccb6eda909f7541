use std::sync::Arc;

use super::r#trait::Runnable;

/// A `Runnable` instance paired with its schedule configuration, queued for
/// registration with the scheduler
///
/// Pattern and enabled flag stay textual until start so they can carry
/// config placeholders.
#[derive(Clone)]
pub struct RunnableJob {
    pub name: String,
    pub pattern: String,
    pub enabled: String,
    pub instance: Arc<dyn Runnable>,
}

impl RunnableJob {
    /// Create a new builder for a job around `instance`
    pub fn builder(name: impl Into<String>, instance: Arc<dyn Runnable>) -> RunnableJobBuilder {
        RunnableJobBuilder {
            name: name.into(),
            pattern: "0 0 * * * *".to_string(),
            enabled: "true".to_string(),
            instance,
        }
    }
}

/// Builder for [`RunnableJob`]
pub struct RunnableJobBuilder {
    name: String,
    pattern: String,
    enabled: String,
    instance: Arc<dyn Runnable>,
}

impl RunnableJobBuilder {
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn enabled(mut self, enabled: impl Into<String>) -> Self {
        self.enabled = enabled.into();
        self
    }

    pub fn build(self) -> RunnableJob {
        RunnableJob {
            name: self.name,
            pattern: self.pattern,
            enabled: self.enabled,
            instance: self.instance,
        }
    }
}
