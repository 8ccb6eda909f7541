use std::future::Future;
use std::pin::Pin;

/// Trait for schedulable work
///
/// The implementing value is the callback's invocation context: whatever
/// state the work needs is captured in its fields at construction time and
/// borrowed for the duration of each run.
///
/// # Example
///
/// ```rust
/// use ostinato_runtime::Runnable;
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct Reindex {
///     index: String,
/// }
///
/// impl Runnable for Reindex {
///     fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
///         Box::pin(async move {
///             println!("reindexing {}", self.index);
///         })
///     }
/// }
/// ```
pub trait Runnable: Send + Sync {
    /// Execute the work once
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Plain closures and `fn()` handlers schedule directly; the call happens
/// synchronously when the returned future is created.
impl<F> Runnable for F
where
    F: Fn() + Send + Sync,
{
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self();
        Box::pin(async {})
    }
}
