use thiserror::Error;

/// Pattern parsing failure
///
/// Both kinds carry the verbatim pattern text exactly as it was handed to the
/// parser, never the nickname-substituted or normalized form. Callers match
/// on the kind rather than the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A sub-field matched none of the accepted grammar forms
    #[error("invalid cron pattern: {0}")]
    Syntax(String),
    /// A value fell outside its column bounds, a range was inverted, a step
    /// was zero, or the requested day-of-month cannot occur in any allowed
    /// month
    #[error("invalid cron pattern: {0}")]
    Range(String),
}
