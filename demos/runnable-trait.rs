use ostinato::{scheduled, Runnable, SchedulerBuilder};
use std::future::Future;
use std::pin::Pin;

/// Example task struct
struct UserTask {
    name: String,
    counter: std::sync::atomic::AtomicU32,
}

impl UserTask {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            counter: std::sync::atomic::AtomicU32::new(0),
        }
    }
}

/// Implement Runnable with the schedule attached to the impl block
#[scheduled(cron = "0 */5 * * * *")]
impl Runnable for UserTask {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let count = self.counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            println!("[UserTask] '{}' - execution #{}", self.name, count + 1);
        })
    }
}

/// A second job registered with an explicit pattern instead of the macro
struct DatabaseCleanup {
    db_name: String,
}

impl Runnable for DatabaseCleanup {
    fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            println!("[DatabaseCleanup] sweeping {}", self.db_name);
            tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
            println!("[DatabaseCleanup] done with {}", self.db_name);
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handle = SchedulerBuilder::new()
        .runnable(UserTask::new("refresh"))
        .job(
            "db-cleanup",
            "0 30 * * * *",
            DatabaseCleanup {
                db_name: "users".to_string(),
            },
        )
        .build()
        .start()?;

    tokio::signal::ctrl_c().await?;
    handle.shutdown();
    Ok(())
}
