use crate::error::{AppError, AppResult};
use crate::index::{IndexAdmin, IndexDescriptor, Metric, Placement};
use crate::upsert::{VectorRecord, VectorWriter};
use qdrant_client::qdrant::{
    CollectionStatus, CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;

/// Points per upsert request. Large ingestions stay under the gRPC message
/// size limit this way.
pub const UPSERT_BATCH_SIZE: usize = 256;

/// Qdrant-backed index: a "collection" per index name.
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    pub fn connect(url: &str, api_key: &str) -> AppResult<Self> {
        let client = Qdrant::from_url(url)
            .api_key(api_key.to_string())
            .build()
            .map_err(|e| AppError::Configuration(format!("invalid Qdrant client config: {}", e)))?;
        Ok(Self { client })
    }
}

pub fn distance(metric: Metric) -> Distance {
    match metric {
        Metric::Cosine => Distance::Cosine,
        Metric::Euclid => Distance::Euclid,
        Metric::Dot => Distance::Dot,
    }
}

pub fn to_point(record: VectorRecord) -> AppResult<PointStruct> {
    let payload = Payload::try_from(json!({
        "text": record.text,
        "source": record.metadata.source,
        "page": record.metadata.page,
        "start_index": record.start_index,
    }))?;
    Ok(PointStruct::new(record.id, record.vector, payload))
}

#[async_trait::async_trait]
impl IndexAdmin for QdrantIndex {
    async fn list_indexes(&self) -> AppResult<Vec<String>> {
        let response = self.client.list_collections().await?;
        Ok(response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    async fn create_index(
        &self,
        descriptor: &IndexDescriptor,
        placement: &Placement,
    ) -> AppResult<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(descriptor.name.clone())
                    .vectors_config(VectorParamsBuilder::new(
                        descriptor.dimension,
                        distance(descriptor.metric),
                    ))
                    .shard_number(placement.shard_number)
                    .replication_factor(placement.replication_factor),
            )
            .await?;
        tracing::info!("created collection '{}' in Qdrant", descriptor.name);
        Ok(())
    }

    async fn is_ready(&self, name: &str) -> AppResult<bool> {
        let info = self.client.collection_info(name.to_string()).await?;
        Ok(info
            .result
            .map(|collection| collection.status == CollectionStatus::Green as i32)
            .unwrap_or(false))
    }
}

#[async_trait::async_trait]
impl VectorWriter for QdrantIndex {
    async fn upsert(&self, index_name: &str, records: Vec<VectorRecord>) -> AppResult<()> {
        let points = records
            .into_iter()
            .map(to_point)
            .collect::<AppResult<Vec<_>>>()?;
        let count = points.len();
        self.client
            .upsert_points_chunked(
                UpsertPointsBuilder::new(index_name, points).wait(true),
                UPSERT_BATCH_SIZE,
            )
            .await?;
        tracing::debug!(
            "wrote {} points to '{}' in batches of {}",
            count,
            index_name,
            UPSERT_BATCH_SIZE
        );
        Ok(())
    }
}
