//! reqwest implementation of the dictionary-data REST adapter

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

use super::{ApiError, DictApi, DictDataApi};
use crate::config::Config;
use crate::models::{DictDataRecord, DictTypeRecord, ListFilter, ListQuery, Page};

/// HTTP client for the dictionary-data backend
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map non-success responses to an API error carrying the server's
    /// message body
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status_code: status.as_u16(),
            message,
        })
    }
}

/// Join record codes into the delimited path segment the delete and
/// get-one endpoints expect
pub fn codes_path(dict_codes: &[i64]) -> String {
    dict_codes
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl DictDataApi for HttpApi {
    async fn list(&self, query: &ListQuery) -> Result<Page<DictDataRecord>, ApiError> {
        debug!("Listing dictionary data, page {}", query.page_num);
        let response = self
            .request(Method::GET, DictApi::DATA_LIST_ENDPOINT)
            .query(&query.to_params())
            .send()
            .await?;
        Self::check(response)
            .await?
            .json::<Page<DictDataRecord>>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn get(&self, dict_code: i64) -> Result<DictDataRecord, ApiError> {
        let path = format!("{}/{}", DictApi::DATA_ENDPOINT, dict_code);
        let response = self.request(Method::GET, &path).send().await?;
        Self::check(response)
            .await?
            .json::<DictDataRecord>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn create(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError> {
        debug!("Creating dictionary data '{}'", record.dict_label);
        let response = self
            .request(Method::POST, DictApi::DATA_ENDPOINT)
            .json(record)
            .send()
            .await?;
        Self::check(response)
            .await?
            .json::<DictDataRecord>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn update(&self, record: &DictDataRecord) -> Result<DictDataRecord, ApiError> {
        debug!("Updating dictionary data {:?}", record.dict_code);
        let response = self
            .request(Method::PUT, DictApi::DATA_ENDPOINT)
            .json(record)
            .send()
            .await?;
        Self::check(response)
            .await?
            .json::<DictDataRecord>()
            .await
            .map_err(ApiError::Decode)
    }

    async fn delete(&self, dict_codes: &[i64]) -> Result<(), ApiError> {
        debug!("Deleting dictionary data {:?}", dict_codes);
        let path = format!("{}/{}", DictApi::DATA_ENDPOINT, codes_path(dict_codes));
        let response = self.request(Method::DELETE, &path).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn refresh_cache(&self) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, DictApi::REFRESH_CACHE_ENDPOINT)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_types(&self) -> Result<Vec<DictTypeRecord>, ApiError> {
        let response = self
            .request(Method::GET, DictApi::TYPE_LIST_ENDPOINT)
            .send()
            .await?;
        let page = Self::check(response)
            .await?
            .json::<Page<DictTypeRecord>>()
            .await
            .map_err(ApiError::Decode)?;
        Ok(page.rows)
    }

    async fn export(&self, filter: &ListFilter) -> Result<Vec<u8>, ApiError> {
        debug!("Requesting spreadsheet export");
        let response = self
            .request(Method::GET, DictApi::DATA_EXPORT_ENDPOINT)
            .query(&filter.to_params())
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
