//! Vector index boundary.
//!
//! One collection per entity kind; documents carry the owning entity's id
//! in `fields` so query hits resolve back to repository rows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineResult;

mod http;
mod memory;

pub use http::{HttpVectorIndex, HttpVectorIndexConfig};
pub use memory::MemoryVectorIndex;

/// Document stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDoc {
    /// Stable document id, `profile_{uuid}` or `project_{uuid}`
    pub id: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Opaque payload returned with hits
    pub fields: Value,
}

/// One query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document id
    pub id: String,
    /// Similarity to the query vector, higher is better
    pub score: f32,
    /// Payload stored at upsert time
    pub fields: Value,
}

/// Client for an external vector database.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces documents by id. Creates the collection on
    /// first use with the configured dimensionality and a cosine metric.
    async fn upsert(&self, collection: &str, docs: Vec<IndexDoc>) -> EngineResult<()>;

    /// Up to `top_k` nearest documents, most similar first. A collection
    /// that does not exist yet reads as empty.
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> EngineResult<Vec<SearchHit>>;
}
