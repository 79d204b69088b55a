use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub request_id: RequestId,
    pub query: String,
    pub exclude_ids: Vec<String>,
    pub object_name: String,
    pub primary_field: String,
    pub secondary_field: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub request_id: RequestId,
    pub object_name: String,
    pub record_id: String,
    pub primary_field: String,
    pub secondary_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected search: {0}")]
    Server(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected lookup: {0}")]
    Server(String),
}

/// Remote data source behind a lookup field.
pub trait LookupBackend {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Record>, SearchError>;

    fn fetch_record_by_lookup(&self, request: &LookupRequest) -> Result<Record, FetchError>;
}

impl<B: LookupBackend + ?Sized> LookupBackend for &B {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Record>, SearchError> {
        (**self).search(request)
    }

    fn fetch_record_by_lookup(&self, request: &LookupRequest) -> Result<Record, FetchError> {
        (**self).fetch_record_by_lookup(request)
    }
}
