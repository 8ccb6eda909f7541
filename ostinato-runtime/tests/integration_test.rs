//! End-to-end scheduling tests driven by tokio's paused clock

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use config::Config;
use ostinato_runtime::{schedule_at, SchedulerBuilder, Task};

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let cb = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, cb)
}

#[tokio::test(start_paused = true)]
async fn task_fires_repeatedly_and_stops() {
    let (count, cb) = counter();
    let task = Task::new("* * * * * *", cb).unwrap();
    assert!(task.active());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(count.load(Ordering::SeqCst) >= 2, "task should have fired");

    assert!(task.stop());
    // Let any in-flight callback finish before sampling
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stopped_at = count.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(count.load(Ordering::SeqCst), stopped_at);
}

#[tokio::test(start_paused = true)]
async fn panicking_callback_does_not_break_the_chain() {
    let (count, _) = counter();
    let cb = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            panic!("callback exploded");
        }
    };
    let task = Task::new("* * * * * *", cb).unwrap();

    // Re-arming happens before the callback runs, so the panics above are
    // confined to their own spawned tasks.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(count.load(Ordering::SeqCst) >= 2);
    task.stop();
}

#[tokio::test(start_paused = true)]
async fn start_and_stop_report_state_changes() {
    let task = Task::builder(|| {})
        .pattern("0 0 12 * * *")
        .active(false)
        .build()
        .unwrap();

    assert!(!task.active());
    assert!(task.start());
    assert!(!task.start());
    assert!(task.active());
    assert!(task.stop());
    assert!(!task.stop());

    assert!(task.set_active(true));
    assert!(!task.set_active(true));
    assert!(task.set_active(false));
}

#[tokio::test(start_paused = true)]
async fn zero_expression_task_is_active_but_dormant() {
    let (count, cb) = counter();
    let task = Task::with_patterns(std::iter::empty::<&str>(), cb).unwrap();

    assert!(task.active());
    assert_eq!(task.next(), None);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    assert!(task.stop());
    assert!(!task.stop());
}

#[tokio::test(start_paused = true)]
async fn manual_run_bypasses_the_schedule() {
    let (count, cb) = counter();
    let task = Task::builder(cb)
        .pattern("0 0 12 * * *")
        .active(false)
        .build()
        .unwrap();

    task.run().await;
    task.run().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn long_one_shot_fires_exactly_once_through_chained_waits() {
    let (count, cb) = counter();
    // Thirty days out: far beyond the single-sleep ceiling, so the wait is
    // decomposed into bounded chunks.
    let target = Local::now().naive_local() + chrono::Duration::days(30);
    let timer = schedule_at(target, cb);

    tokio::time::sleep(Duration::from_secs(60 * 60 * 24 * 31)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Aborting after the fire is a no-op
    timer.abort();
    timer.abort();
}

#[tokio::test(start_paused = true)]
async fn abort_before_any_intermediate_fire_prevents_the_callback() {
    let (count, cb) = counter();
    let target = Local::now().naive_local() + chrono::Duration::days(30);
    let timer = schedule_at(target, cb);

    timer.abort();

    tokio::time::sleep(Duration::from_secs(60 * 60 * 24 * 31)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn one_shot_manual_run_fires_without_waiting() {
    let (count, cb) = counter();
    let target = Local::now().naive_local() + chrono::Duration::days(1);
    let timer = schedule_at(target, cb);

    timer.run().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(timer.target(), target);

    timer.abort();
}

#[tokio::test(start_paused = true)]
async fn scheduler_resolves_config_and_skips_disabled_jobs() {
    let config = Config::builder()
        .set_override("app.tick.cron", "* * * * * *")
        .unwrap()
        .set_override("app.cleanup.cron", "* * * * * *")
        .unwrap()
        .set_override("app.cleanup.enabled", false)
        .unwrap()
        .build()
        .unwrap();

    let (tick_count, tick_cb) = counter();
    let (cleanup_count, cleanup_cb) = counter();

    let handle = SchedulerBuilder::with_config(config)
        .job("tick", "${app.tick.cron}", tick_cb)
        .job_from_config("app.cleanup", cleanup_cb)
        .unwrap()
        .build()
        .start()
        .unwrap();

    // The disabled cleanup job never became a task
    assert_eq!(handle.tasks().len(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(tick_count.load(Ordering::SeqCst) >= 1);
    assert_eq!(cleanup_count.load(Ordering::SeqCst), 0);

    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn scheduler_skips_jobs_with_bad_patterns() {
    let (count, cb) = counter();
    let handle = SchedulerBuilder::new()
        .job("broken", "not a pattern", cb)
        .build()
        .start()
        .unwrap();

    assert!(handle.tasks().is_empty());
    assert_eq!(count.load(Ordering::SeqCst), 0);
    handle.shutdown();
}
