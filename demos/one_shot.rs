use chrono::{Duration, Local};
use ostinato::schedule_at;

#[tokio::main]
async fn main() {
    let target = Local::now().naive_local() + Duration::seconds(5);
    let timer = schedule_at(target, || println!("[ONE-SHOT] fired"));
    println!("Scheduled a one-shot callback for {}", timer.target());

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    // Uncomment to cancel before it fires:
    // timer.abort();

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
}
