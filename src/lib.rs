//! Deterministic shard routing and fan-out over keyed record storage.
//!
//! Records carry base-36 string keys; the key alone decides which of a
//! fixed number of shards holds the record. Batches are partitioned by
//! shard and written with one concurrent bulk operation per shard, reads
//! gather shard by shard, and the per-shard storage itself is an injected
//! [`storage::Engine`]. An in-memory engine ships for tests and demos.
//!
//! ```
//! use keyshard::storage::InMemEngine;
//! use keyshard::{Config, Keyed, Result, ShardingService};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Keyed for User {
//!     fn key(&self) -> Option<&str> {
//!         Some(&self.id)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let engine = InMemEngine::new();
//!     let config = Config::builder()
//!         .shard_count(4)
//!         .table("users", "id")
//!         .build();
//!     let service = ShardingService::new(&engine, config)?;
//!
//!     let user = User {
//!         id: "a1b2".to_owned(),
//!         name: "Ada".to_owned(),
//!     };
//!     service.put(user.clone(), "users").await?;
//!     assert_eq!(service.get("a1b2", "users").await?, Some(user));
//!     Ok(())
//! }
//! ```

mod service;

pub mod config;
pub mod record;
pub mod route;
pub mod shard;
pub mod storage;
pub mod util;

pub use config::Config;
pub use record::Keyed;
pub use service::ShardingService;
pub use util::{Error, Result};
