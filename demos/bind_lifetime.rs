//! # Example: Binding a maid to a session lifetime
//!
//! A session owns a background heartbeat, a cancellation token and a child maid
//! for per-request cleanup. Everything is released when the session ends.
//!
//! Run with:
//! ```text
//! RUST_LOG=maid=info cargo run --example bind_lifetime --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use maid::{Bus, Lifetime, LogWriter, Maid, Subscribe, SubscriberSet, Task};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bus = Bus::new(256);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = Arc::new(SubscriberSet::new(subs));
    let forwarder = set.attach(&bus);

    let session = Lifetime::new();
    let maid = Maid::builder()
        .with_name("session")
        .with_bus(bus.clone())
        .build();

    let token = CancellationToken::new();
    let beat = token.clone();
    let heartbeat = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = beat.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_millis(100)) => println!("[heartbeat] tick"),
            }
        }
    });
    maid.add(token)?;
    maid.add(heartbeat)?;

    let requests = Maid::builder()
        .with_name("requests")
        .with_bus(bus.clone())
        .build();
    requests.add(Task::call(|| println!("[requests] flushed")))?;
    maid.add(requests)?;

    maid.bind(&session)?;

    tokio::time::sleep(Duration::from_millis(350)).await;
    println!("[main] ending session");
    session.terminate();
    assert!(maid.is_cleaned());

    // Late registrations are discharged on the spot.
    maid.add(Task::call(|| println!("[main] late task discharged immediately")))?;

    drop(maid);
    drop(bus);
    forwarder.await?;
    if let Ok(set) = Arc::try_unwrap(set) {
        set.shutdown().await;
    }
    Ok(())
}
