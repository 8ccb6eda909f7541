use chrono::Local;
use ostinato::{scheduled, CronExpression, SchedulerBuilder, Task};

/// Pattern and enabled flag both come from config, with defaults
#[scheduled(cron = "${app.report.cron:0 * * * * *}", enabled = "${app.report.enabled:true}")]
async fn report_task() {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    println!("[{}] [REPORT] configurable task", now);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .with_target(false)
        .init();

    // Expressions can be inspected without scheduling anything
    let expr = CronExpression::parse("0 0 9 * * mon-fri")?;
    println!("Next weekday 9am: {:?}", expr.next());

    // Tasks can also be driven directly, without the scheduler facade
    let ticker = Task::builder(|| println!("[TICKER] two-second tick"))
        .pattern("*/2 * * * * *")
        .name("ticker")
        .build()?;

    // Macro-registered jobs are discovered by the builder
    let handle = SchedulerBuilder::new().build().start()?;

    tokio::time::sleep(tokio::time::Duration::from_secs(10)).await;

    ticker.stop();
    handle.shutdown();
    Ok(())
}
