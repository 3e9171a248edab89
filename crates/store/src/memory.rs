use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::query::compare;
use crate::{Direction, Document, DocumentStore, Filter, IN_QUERY_LIMIT, OrderBy, StoreError};

/// In-memory document store for tests and embedders. Enforces the same
/// `in`-filter limit as the real backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test convenience: serialize a record straight into a collection.
    pub fn seed<T: serde::Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let document = Document::encode(id, record)?;
        let mut collections = self.collections.write().expect("store lock poisoned");
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(document.id, document.data);

        Ok(())
    }

    fn match_view(id: &str, data: &Value) -> Value {
        let mut view = data.clone();
        if let Value::Object(map) = &mut view {
            map.insert("id".to_owned(), Value::String(id.to_owned()));
        }

        view
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        for filter in filters {
            if let Filter::In(_, values) = filter {
                if values.len() > IN_QUERY_LIMIT {
                    return Err(StoreError::InLimit {
                        limit: IN_QUERY_LIMIT,
                        got: values.len(),
                    });
                }
            }
        }

        let collections = self.collections.read().expect("store lock poisoned");
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut documents = docs
            .iter()
            .filter(|(id, data)| {
                let view = Self::match_view(id, data);
                filters.iter().all(|filter| filter.matches(&view))
            })
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect::<Vec<_>>();

        if let Some(order) = order {
            documents.sort_by(|a, b| {
                let ordering = match (a.data.get(&order.field), b.data.get(&order.field)) {
                    (Some(a), Some(b)) => compare(a, b).unwrap_or(std::cmp::Ordering::Equal),
                    _ => std::cmp::Ordering::Equal,
                };

                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        Ok(documents)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let docs = collections.entry(collection.to_owned()).or_default();

        if docs.contains_key(&document.id) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_owned(),
                id: document.id,
            });
        }
        docs.insert(document.id, document.data);

        Ok(())
    }

    async fn update(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");
        let docs = collections.entry(collection.to_owned()).or_default();

        if !docs.contains_key(&document.id) {
            return Err(StoreError::NotFound {
                collection: collection.to_owned(),
                id: document.id,
            });
        }
        docs.insert(document.id, document.data);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_people() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed("people", "a", &json!({"name": "ana", "age": 31, "city": "madrid"}))
            .unwrap();
        store
            .seed("people", "b", &json!({"name": "bruno", "age": 24, "city": "madrid"}))
            .unwrap();
        store
            .seed("people", "c", &json!({"name": "carla", "age": 45, "city": "sevilla"}))
            .unwrap();

        store
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = store_with_people();

        let document = store.get("people", "b").await.unwrap().unwrap();
        assert_eq!(document.data["name"], "bruno");

        assert!(store.get("people", "zz").await.unwrap().is_none());
        assert!(store.get("nowhere", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_filters() {
        let store = store_with_people();

        let madrid = store
            .query("people", &[Filter::eq("city", "madrid")], None)
            .await
            .unwrap();
        assert_eq!(madrid.len(), 2);

        let adults = store
            .query(
                "people",
                &[Filter::gte("age", 30), Filter::lte("age", 40)],
                None,
            )
            .await
            .unwrap();
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0].id, "a");

        let by_id = store
            .query(
                "people",
                &[Filter::is_in(
                    "id",
                    vec!["a".into(), "c".into(), "zz".into()],
                )],
                None,
            )
            .await
            .unwrap();
        assert_eq!(by_id.len(), 2);
    }

    #[tokio::test]
    async fn test_query_order() {
        let store = store_with_people();

        let documents = store
            .query("people", &[], Some(OrderBy::desc("age")))
            .await
            .unwrap();
        let ids = documents.iter().map(|d| d.id.as_str()).collect::<Vec<_>>();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_in_limit_enforced() {
        let store = store_with_people();
        let values = (0..IN_QUERY_LIMIT + 1)
            .map(|i| Value::String(i.to_string()))
            .collect::<Vec<_>>();

        let result = store
            .query("people", &[Filter::is_in("id", values)], None)
            .await;

        assert!(matches!(result, Err(StoreError::InLimit { got: 11, .. })));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate() {
        let store = store_with_people();

        let result = store
            .insert("people", Document::new("a", json!({"name": "ana"})))
            .await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_in_chunks_merges_and_dedupes() {
        let store = MemoryStore::new();
        for i in 0..25 {
            store
                .seed("items", &format!("item-{i}"), &json!({"rank": i}))
                .unwrap();
        }

        let mut ids = (0..25).map(|i| format!("item-{i}")).collect::<Vec<_>>();
        ids.push("item-3".to_owned());
        ids.push("item-404".to_owned());

        let documents = crate::in_chunks(&store, "items", "id", &ids, &[])
            .await
            .unwrap();

        assert_eq!(documents.len(), 25);
    }
}
