//! Remote vector index description and provisioning.

use crate::all_minilm_l6_v2::{INDEX_NAME, VECTOR_SIZE};
use crate::error::AppResult;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cosine,
    Euclid,
    Dot,
}

/// Name, dimensionality and similarity metric of a remote index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub name: String,
    pub dimension: u64,
    pub metric: Metric,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, dimension: u64, metric: Metric) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric,
        }
    }
}

impl Default for IndexDescriptor {
    fn default() -> Self {
        Self::new(INDEX_NAME, VECTOR_SIZE, Metric::Cosine)
    }
}

/// Hosting configuration sent with a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub shard_number: u32,
    pub replication_factor: u32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            shard_number: 1,
            replication_factor: 1,
        }
    }
}

/// Index lifecycle operations of a vector database.
#[async_trait::async_trait]
pub trait IndexAdmin: Send + Sync {
    async fn list_indexes(&self) -> AppResult<Vec<String>>;

    async fn create_index(&self, descriptor: &IndexDescriptor, placement: &Placement)
        -> AppResult<()>;

    async fn is_ready(&self, name: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// A create request was issued during this call.
    pub created: bool,
    /// Readiness was observed before the poll budget ran out.
    pub ready: bool,
}

/// Make sure `descriptor.name` exists, creating it when absent, then wait
/// for it to report ready.
///
/// An existing index is reused as-is, even if its settings differ. When the
/// poll budget runs out the outcome has `ready: false` and the caller is
/// left to decide whether to carry on.
pub async fn provision_index(
    admin: &dyn IndexAdmin,
    descriptor: &IndexDescriptor,
    placement: &Placement,
    poll: PollPolicy,
) -> AppResult<ProvisionOutcome> {
    let existing = admin.list_indexes().await?;
    let created = if existing.iter().any(|name| name == &descriptor.name) {
        info!("index '{}' already exists, will reuse it", descriptor.name);
        false
    } else {
        info!(
            "creating index '{}' (dim={}, metric={:?})",
            descriptor.name, descriptor.dimension, descriptor.metric
        );
        admin.create_index(descriptor, placement).await?;
        true
    };

    let ready = wait_until_ready(admin, &descriptor.name, poll).await;
    if ready {
        info!("index '{}' is ready", descriptor.name);
    } else {
        warn!(
            "index '{}' not confirmed ready after {} attempts; continuing",
            descriptor.name, poll.attempts
        );
    }
    Ok(ProvisionOutcome { created, ready })
}

async fn wait_until_ready(admin: &dyn IndexAdmin, name: &str, poll: PollPolicy) -> bool {
    for attempt in 1..=poll.attempts {
        match admin.is_ready(name).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => warn!("readiness check {} for '{}' failed: {}", attempt, name, e),
        }
        tokio::time::sleep(poll.interval).await;
    }
    false
}
