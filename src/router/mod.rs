//! Query router.
//!
//! Turns one SQL statement into a routing plan: extract the shard-key
//! predicate, hash each value, resolve shards on the ring, and apply the
//! fanout policy. Rejections come back as a plan in `Rejected` mode so
//! the executor can short-circuit without touching a shard.

mod config;
mod errors;
mod extractor;
mod hasher;
mod planner;
mod ring;
mod service;

pub use config::RouterConfig;
pub use errors::{RouterError, RoutingError, RoutingErrorKind};
pub use extractor::{extract_shard_predicate, ExtractedPredicate, PredicateKind};
pub use hasher::{hash_value, HashValue};
pub use planner::{Planner, RoutingMode, RoutingPlan, ShardTarget};
pub use ring::Ring;
pub use service::RouterService;
