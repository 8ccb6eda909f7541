use ostinato::{scheduled, SchedulerBuilder};
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Runs at second 0 of every minute
#[scheduled(cron = "0 * * * * *")]
async fn every_minute() {
    let count = COUNTER.fetch_add(1, Ordering::SeqCst) + 1;
    println!("[MINUTE] execution #{}", count);
}

/// Runs every 10 seconds
#[scheduled(cron = "*/10 * * * * *")]
async fn every_ten_seconds() {
    println!("[TEN-SEC] tick");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handle = SchedulerBuilder::new().build().start()?;

    println!("Scheduler running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    handle.shutdown();
    println!("Done after {} minute ticks", COUNTER.load(Ordering::SeqCst));
    Ok(())
}
