//! REST adapter for the dictionary-data backend
//!
//! Everything the screen does against the server goes through the
//! [`DictDataApi`] trait so the view logic can be exercised against a
//! stub in tests. [`client::HttpApi`] is the reqwest implementation.

pub mod client;
pub mod export;

pub use client::HttpApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DictDataRecord, DictTypeRecord, ListFilter, ListQuery, Page};

/// Backend endpoints, relative to the configured base URL
pub struct DictApi;

impl DictApi {
    /// Create (POST) and update (PUT) endpoint
    pub const DATA_ENDPOINT: &'static str = "/api/system/dict/data";
    /// Paginated, filterable listing
    pub const DATA_LIST_ENDPOINT: &'static str = "/api/system/dict/data/list";
    /// Server-generated spreadsheet export
    pub const DATA_EXPORT_ENDPOINT: &'static str = "/api/system/dict/data/export";
    /// Server-side dictionary cache refresh
    pub const REFRESH_CACHE_ENDPOINT: &'static str = "/api/system/dict/data/refreshCache";
    /// Dictionary-type listing, used for the filter label lookup
    pub const TYPE_LIST_ENDPOINT: &'static str = "/api/system/dict/type/list";
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected the request (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The four CRUD calls plus the auxiliary lookups the screen depends on
#[async_trait]
pub trait DictDataApi: Send + Sync {
    /// Fetch one page of records matching the query
    async fn list(&self, query: &ListQuery) -> Result<Page<DictDataRecord>, ApiError>;

    /// Fetch a single record by its code
    async fn get(&self, dict_code: i64) -> Result<DictDataRecord, ApiError>;

    /// Create a candidate record (no dictCode); returns the created record
    async fn create(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError>;

    /// Replace a full record (with dictCode); returns the updated record
    async fn update(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError>;

    /// Delete one or many records through the same call path
    async fn delete(&self, dict_codes: &[i64]) -> Result<(), ApiError>;

    /// Ask the backend to rebuild its dictionary cache
    async fn refresh_cache(&self) -> Result<(), ApiError>;

    /// Fetch all dictionary types for the filter label mapping
    async fn list_types(&self) -> Result<Vec<DictTypeRecord>, ApiError>;

    /// Request the spreadsheet export for the given filter; the raw
    /// stream is saved client-side by the caller
    async fn export(&self, filter: &ListFilter) -> Result<Vec<u8>, ApiError>;
}
