use std::future::Future;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::record::Keyed;
use crate::storage::{InMemEngine, InMemTable};
use crate::ShardingService;

pub fn run_in_tokio<F>(f: F)
where
    F: Future + Send + 'static,
{
    let rt = Runtime::new().unwrap();
    rt.block_on(async move {
        f.await;
    });
    rt.shutdown_background();
}

/// Minimal keyed record for tests across the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub id: Option<String>,
    pub name: String,
}

impl TestItem {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_owned()),
            name: name.to_owned(),
        }
    }

    pub fn keyless(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_owned(),
        }
    }
}

impl Keyed for TestItem {
    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub fn items_config(shard_count: usize) -> Config {
    Config::builder()
        .shard_count(shard_count)
        .base_name("tester")
        .table("items", "id")
        .build()
}

/// A service over a fresh in-memory engine with one `items` table.
pub fn items_service(shard_count: usize) -> ShardingService<InMemTable<TestItem>> {
    let engine: InMemEngine<TestItem> = InMemEngine::new();
    ShardingService::new(&engine, items_config(shard_count)).unwrap()
}
