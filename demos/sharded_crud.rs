//! Walkthrough of the sharded CRUD surface over the in-memory engine.
//!
//! ```text
//! RUST_LOG=keyshard=debug cargo run --example sharded_crud
//! ```

use keyshard::storage::{InMemEngine, Table};
use keyshard::{Config, Keyed, Result, ShardingService};
use tokio::runtime::Runtime;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Event {
    id: String,
    kind: String,
}

impl Event {
    fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_owned(),
            kind: kind.to_owned(),
        }
    }
}

impl Keyed for Event {
    fn key(&self) -> Option<&str> {
        Some(&self.id)
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,keyshard=debug"));
    fmt().with_env_filter(filter).init();

    let rt = Runtime::new().expect("tokio runtime");
    rt.block_on(run())
}

async fn run() -> Result<()> {
    let engine = InMemEngine::new();
    let config = Config::builder()
        .shard_count(4)
        .base_name("events")
        .table("events", "id, kind")
        .build();
    let service = ShardingService::new(&engine, config)?;

    println!("opened {} shards:", service.shard_count());
    for shard in service.shards().iter() {
        println!("  [{}] {}", shard.index(), shard.name());
    }

    // Singles: the key alone decides the shard.
    service.insert(Event::new("a1", "signup"), "events").await?;
    service.put(Event::new("b2", "login"), "events").await?;
    service.put(Event::new("b2", "logout"), "events").await?;
    println!("b2 -> {:?}", service.get("b2", "events").await?);

    // Batch: partitioned by shard, one bulk write per shard.
    let batch: Vec<Event> = (0..20)
        .map(|i| Event::new(&format!("{:x}", i), "bulk"))
        .collect();
    service.put_batch(batch, "events").await?;

    for shard in service.shards().iter() {
        let rows = shard.table("events")?.scan().await?;
        println!("{} holds {} events", shard.name(), rows.len());
    }

    // Scatter-gather with an early exit after five hits.
    let bulk_events = service
        .search(
            |shard| async move {
                let rows = shard.table("events")?.scan().await?;
                Ok(rows.into_iter().filter(|e| e.kind == "bulk").collect())
            },
            Some(5),
        )
        .await?;
    println!("first {} bulk events: {:?}", bulk_events.len(), bulk_events);

    service.delete("a1", "events").await?;
    service.clear_all().await?;
    println!("cleared, {} left", service.get_all("events").await?.len());
    Ok(())
}
