//! Remote workbook backend
//!
//! Speaks a Sheets-style REST protocol over HTTP/JSON:
//!
//! - `GET    {endpoint}/v4/workbooks/{workbook}/values/{sheet}` (all rows)
//! - `POST   .../values/{sheet}:append` (append one row)
//! - `PUT    .../values/{sheet}!R{row}C{col}` (write one cell)
//! - `POST   .../values/{sheet}:deleteRow` (remove one row)
//!
//! Every call is a fresh request authenticated with the credential token;
//! there is no pooling, caching or retry.

use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;

use crate::config::StoreConfig;
use crate::error::StoreError;

use super::{credentials, Workbook, Worksheet};

type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// Handle to the named remote workbook.
pub struct RemoteWorkbook {
    client: HttpClient,
    endpoint: String,
    token: String,
    workbook: String,
}

impl RemoteWorkbook {
    /// Build a session from the credential blob (environment wins over the
    /// configured file). No network traffic happens here; a bad endpoint
    /// surfaces on the first operation.
    pub fn open(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let creds = credentials::load(&cfg.credentials_file)?;
        let workbook = creds.workbook.unwrap_or_else(|| cfg.workbook.clone());
        let client = Client::builder(TokioExecutor::new()).build_http();

        Ok(Self {
            client,
            endpoint: creds.endpoint.trim_end_matches('/').to_string(),
            token: creds.token,
            workbook,
        })
    }
}

#[async_trait]
impl Workbook for RemoteWorkbook {
    async fn worksheet(&self, name: &str) -> Result<Arc<dyn Worksheet>, StoreError> {
        Ok(Arc::new(RemoteWorksheet {
            client: self.client.clone(),
            values_url: format!(
                "{}/v4/workbooks/{}/values/{}",
                self.endpoint, self.workbook, name
            ),
            token: self.token.clone(),
        }))
    }
}

struct RemoteWorksheet {
    client: HttpClient,
    values_url: String,
    token: String,
}

/// Row payload of the values endpoints.
#[derive(Deserialize)]
struct ValuesPayload {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl RemoteWorksheet {
    async fn call(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Bytes, StoreError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token));

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(json.to_string()))
            }
            None => Full::new(Bytes::new()),
        };

        let request = builder
            .body(body)
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes)
    }
}

#[async_trait]
impl Worksheet for RemoteWorksheet {
    async fn all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let bytes = self.call(Method::GET, &self.values_url, None).await?;
        let payload: ValuesPayload = serde_json::from_slice(&bytes)?;
        Ok(payload.values)
    }

    async fn read_cell(&self, row: usize, col: usize) -> Result<String, StoreError> {
        let url = format!("{}!R{row}C{col}", self.values_url);
        let bytes = self.call(Method::GET, &url, None).await?;
        let payload: ValuesPayload = serde_json::from_slice(&bytes)?;
        Ok(payload
            .values
            .first()
            .and_then(|r| r.first())
            .cloned()
            .unwrap_or_default())
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let url = format!("{}!R{row}C{col}", self.values_url);
        self.call(
            Method::PUT,
            &url,
            Some(serde_json::json!({ "values": [[value]] })),
        )
        .await?;
        Ok(())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        let url = format!("{}:append", self.values_url);
        self.call(
            Method::POST,
            &url,
            Some(serde_json::json!({ "values": [row] })),
        )
        .await?;
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<(), StoreError> {
        let url = format!("{}:deleteRow", self.values_url);
        self.call(Method::POST, &url, Some(serde_json::json!({ "row": row })))
            .await?;
        Ok(())
    }
}
