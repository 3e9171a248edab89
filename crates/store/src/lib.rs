use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

mod error;
mod memory;
mod query;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{Direction, Filter, OrderBy};

/// Upper bound on values accepted by an `in` filter, mirroring the
/// persistence backend's limit. Larger id lists go through [`in_chunks`].
pub const IN_QUERY_LIMIT: usize = 10;

/// Plain structured record as returned by the document store. The id
/// lives outside the field data, Firestore style.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Document {
            id: id.into(),
            data,
        }
    }

    /// Serializes a record into a document, keeping the id out of the
    /// field data.
    pub fn encode<T: Serialize>(id: impl Into<String>, record: &T) -> Result<Self, StoreError> {
        let mut data = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut data {
            map.remove("id");
        }

        Ok(Document {
            id: id.into(),
            data,
        })
    }

    /// Deserializes the record, injecting the document id.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.insert("id".to_owned(), Value::String(self.id.clone()));
        }

        Ok(serde_json::from_value(data)?)
    }
}

/// Contract of the persistence collaborator: get-by-id, filtered queries
/// and writes over named collections of plain records. Retry policy
/// belongs to implementations, never to callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    async fn update(&self, collection: &str, document: Document) -> Result<(), StoreError>;
}

/// Runs an `in` query over an id list of any size: splits into
/// backend-sized chunks, issues the chunk queries concurrently, merges
/// and de-duplicates by document id. Chunk ordering is not preserved.
pub async fn in_chunks<S: DocumentStore + ?Sized>(
    store: &S,
    collection: &str,
    field: &str,
    ids: &[String],
    extra: &[Filter],
) -> Result<Vec<Document>, StoreError> {
    let queries = ids.chunks(IN_QUERY_LIMIT).map(|chunk| {
        let mut filters = extra.to_vec();
        filters.push(Filter::is_in(
            field,
            chunk.iter().map(|id| Value::String(id.clone())).collect(),
        ));

        async move { store.query(collection, &filters, None).await }
    });

    let results = try_join_all(queries).await?;

    let mut seen = HashSet::new();
    let mut documents = Vec::new();
    for document in results.into_iter().flatten() {
        if seen.insert(document.id.clone()) {
            documents.push(document);
        }
    }

    Ok(documents)
}
