//! BigQuery のストリーミング挿入 API (`tabledata.insertAll`) への書き込み。

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{BackendError, Database, LogItem, StorageError};
use crate::config::StorageConfig;

const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// `bigquery://PROJECT/DATASET/TABLE` 形式で指定されたテーブル。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn parse(url: &str) -> Result<Self, BackendError> {
        let invalid = || BackendError::InvalidTable(url.to_string());

        let parsed = Url::parse(url).map_err(|_| invalid())?;
        let project = parsed.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [dataset, table] => Ok(Self {
                project: project.to_string(),
                dataset: dataset.to_string(),
                table: table.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

/// BigQuery のテーブルに 1 行ずつ挿入する保存先。
pub struct BigQuery {
    http_client: reqwest::Client,
    /// API のベース URL（エミュレータ用に差し替え可能）
    endpoint: String,
    table: TableRef,
    /// 固定のアクセストークン。未設定の場合はメタデータサーバーから取得する
    access_token: Option<String>,
    metadata_url: String,
}

#[derive(Debug, Deserialize)]
struct InsertAllResponse {
    #[serde(default, rename = "insertErrors")]
    insert_errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl BigQuery {
    pub fn new(config: &StorageConfig) -> Result<Self, BackendError> {
        let table = TableRef::parse(&config.url)?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("barometer/1.0")
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            table,
            access_token: config.access_token.clone(),
            metadata_url: config
                .metadata_url
                .clone()
                .unwrap_or_else(|| METADATA_TOKEN_URL.to_string()),
        })
    }

    fn insert_all_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}/insertAll",
            self.endpoint.trim_end_matches('/'),
            self.table.project,
            self.table.dataset,
            self.table.table
        )
    }

    async fn token(&self) -> Result<String, StorageError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let response = self
            .http_client
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?
            .error_for_status()?;
        let token: MetadataToken = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Database for BigQuery {
    async fn insert(&self, item: &LogItem) -> Result<(), StorageError> {
        // insertId を付けないので、同じ内容のリクエストも別の行として保存される
        let body = serde_json::json!({
            "rows": [{ "json": item.to_row() }]
        });

        let token = self.token().await?;
        let response = self
            .http_client
            .post(self.insert_all_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status { status, body });
        }

        let result: InsertAllResponse = response.json().await?;
        if !result.insert_errors.is_empty() {
            let detail = serde_json::Value::Array(result.insert_errors).to_string();
            return Err(StorageError::Rejected(detail));
        }

        Ok(())
    }
}
