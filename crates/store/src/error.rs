use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} already exists in {collection}")]
    AlreadyExists { collection: String, id: String },

    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("`in` filter accepts at most {limit} values, got {got}")]
    InLimit { limit: usize, got: usize },

    #[error("failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}
