use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::data::IndexStore;
use crate::error::AppError;
use crate::models::file_entry::IndexedFile;
use crate::models::search::SearchHit;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: usize,
}

/// Document id derived from the path so resubmitting a file overwrites it.
pub fn document_id(file_path: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, file_path.as_bytes()).to_string()
}

fn unavailable(e: reqwest::Error) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

async fn unexpected(action: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(300).collect();
    AppError::StoreUnavailable(format!("{action} failed with {status}: {excerpt}"))
}

/// Index store served by an Elasticsearch cluster over its REST API.
pub struct ElasticsearchStore {
    client: Client,
    base_url: Url,
}

impl ElasticsearchStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid store url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!("invalid store url {base_url}")));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("http client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// Appends each segment percent-encoded, so index names and ids can
    /// never add path components of their own.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl IndexStore for ElasticsearchStore {
    async fn index_exists(&self, index: &str) -> Result<bool, AppError> {
        let response = self
            .client
            .head(self.url(&[index]))
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected("index exists check", response).await),
        }
    }

    async fn create_index(&self, index: &str) -> Result<(), AppError> {
        let body = json!({
            "mappings": {
                "properties": {
                    "file_name": { "type": "text" },
                    "file_path": { "type": "keyword" },
                    "relative_path": { "type": "keyword" }
                }
            }
        });
        let response = self
            .client
            .put(self.url(&[index]))
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if response.status().is_success() {
            tracing::info!(index, "created index");
            return Ok(());
        }
        if response.status() == StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            // Another writer created it between the existence check and now.
            if text.contains("resource_already_exists_exception") {
                return Ok(());
            }
            return Err(AppError::StoreUnavailable(format!(
                "create index {index} rejected: {text}"
            )));
        }
        Err(unexpected("create index", response).await)
    }

    async fn submit_document(&self, index: &str, doc: &IndexedFile) -> Result<(), AppError> {
        let response = self
            .client
            .put(self.url(&[index, "_doc", &document_id(&doc.file_path)]))
            .json(doc)
            .send()
            .await
            .map_err(unavailable)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected("submit document", response).await)
        }
    }

    async fn query(
        &self,
        index: &str,
        keyword: &str,
        size: usize,
    ) -> Result<Vec<SearchHit>, AppError> {
        let body = json!({
            "query": { "match": { "file_name": keyword } },
            "size": size,
        });
        let response = self
            .client
            .post(self.url(&[index, "_search"]))
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::warn!(index, "search against missing index");
                Ok(Vec::new())
            }
            status if status.is_success() => {
                let parsed: SearchResponse = response.json().await.map_err(unavailable)?;
                Ok(parsed
                    .hits
                    .hits
                    .into_iter()
                    .map(|hit| SearchHit {
                        file_path: hit.source.file_path,
                        score: hit.score.unwrap_or(0.0),
                    })
                    .collect())
            }
            _ => Err(unexpected("search", response).await),
        }
    }

    async fn count_documents(&self, index: &str) -> Result<usize, AppError> {
        let response = self
            .client
            .get(self.url(&[index, "_count"]))
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(0),
            status if status.is_success() => {
                let parsed: CountResponse = response.json().await.map_err(unavailable)?;
                Ok(parsed.count)
            }
            _ => Err(unexpected("count", response).await),
        }
    }
}
