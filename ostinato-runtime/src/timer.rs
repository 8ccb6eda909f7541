use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::runnable::Runnable;

/// Longest single sleep the timer layer will issue. Anything further out is
/// waited for in a chain of bounded chunks, re-checking the remaining delay
/// between chunks.
pub(crate) const MAX_TIMER_CHUNK: Duration = Duration::from_millis(i32::MAX as u64);

/// Sleep until `deadline` in chunks of at most `MAX_TIMER_CHUNK`.
pub(crate) async fn sleep_until_deadline(deadline: Instant) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        if deadline - now > MAX_TIMER_CHUNK {
            // Intermediate wake-up: chain another bounded wait, not the callback
            tokio::time::sleep(MAX_TIMER_CHUNK).await;
        } else {
            tokio::time::sleep_until(deadline).await;
            return;
        }
    }
}

/// Convert a wall-clock target into a monotonic deadline. Targets already in
/// the past collapse to "now", firing on the next timer turn.
pub(crate) fn deadline_for(target: NaiveDateTime) -> Instant {
    let now = Local::now().naive_local();
    match (target - now).to_std() {
        Ok(delay) => Instant::now() + delay,
        Err(_) => Instant::now(),
    }
}

/// Schedule `runnable` to run once at the wall-clock instant `target`.
///
/// Must be called from within a tokio runtime. The returned handle can fire
/// the callback manually or abort the pending wait; dropping the handle does
/// not cancel it.
pub fn schedule_at(target: NaiveDateTime, runnable: impl Runnable + 'static) -> At {
    At::new(target, runnable)
}

/// A one-shot timer for a single future instant
///
/// Owns at most one pending wait. Delays beyond `MAX_TIMER_CHUNK` are
/// decomposed into intermediate wake-ups that re-evaluate the remaining
/// delay before either chaining again or firing the callback.
pub struct At {
    inner: Arc<AtInner>,
}

struct AtInner {
    target: NaiveDateTime,
    runnable: Arc<dyn Runnable>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl At {
    /// Schedule `runnable` at `target`. Must be called from within a tokio
    /// runtime.
    pub fn new(target: NaiveDateTime, runnable: impl Runnable + 'static) -> Self {
        Self::from_shared(target, Arc::new(runnable))
    }

    pub(crate) fn from_shared(target: NaiveDateTime, runnable: Arc<dyn Runnable>) -> Self {
        let inner = Arc::new(AtInner {
            target,
            runnable,
            pending: Mutex::new(None),
        });
        let worker = Arc::clone(&inner);
        let handle = tokio::spawn(async move {
            sleep_until_deadline(deadline_for(worker.target)).await;
            worker.runnable.run().await;
        });
        *inner.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        debug!(at = %target, "scheduled one-shot timer");
        Self { inner }
    }

    /// The instant this timer fires at
    pub fn target(&self) -> NaiveDateTime {
        self.inner.target
    }

    /// Invoke the callback now, bypassing the schedule. The pending wait, if
    /// any, is left untouched.
    pub async fn run(&self) {
        self.inner.runnable.run().await;
    }

    /// Cancel whatever wait is currently pending, intermediate or final.
    /// Safe to call more than once and after the timer has fired.
    pub fn abort(&self) {
        let handle = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!(at = %self.inner.target, "aborted one-shot timer");
        }
    }
}
