//! Index store boundary: create-index, bulk-insert, and search against a ZincSearch server.

use log::debug;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

use crate::utils::config::{ConnectionConfig, HTTP_TIMEOUT_SECS, SEARCH_MAX_RESULTS};

/// Operations the pipeline and the search command need from the full-text index.
pub trait IndexStore: Send + Sync {
    /// Create the index unless it already exists.
    fn create_index_if_absent(&self) -> Result<IndexStatus, IndexStoreError>;

    /// Insert newline-delimited JSON, one record per line.
    fn bulk_insert(&self, ndjson: String) -> Result<(), IndexStoreError>;

    /// Free-text search; the response document is returned as-is.
    fn search(&self, term: &str) -> Result<Value, IndexStoreError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexStatus {
    Created,
    AlreadyExists,
}

#[derive(Error, Debug)]
pub enum IndexStoreError {
    #[error("request to index service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{op} returned HTTP {status}: {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Index mapping: every field is full-text indexed; subject and body are highlightable.
pub fn index_schema(name: &str) -> Value {
    let text = |highlightable: bool| {
        json!({
            "type": "text",
            "index": true,
            "store": false,
            "highlightable": highlightable,
        })
    };
    json!({
        "name": name,
        "storage_type": "disk",
        "shard_num": 1,
        "mappings": {
            "properties": {
                "messageId": text(false),
                "date": text(false),
                "from": text(false),
                "to": text(false),
                "subject": text(true),
                "body": text(true),
            }
        }
    })
}

/// Match query for a single term, highlighting sender, recipients, and body.
pub fn search_body(term: &str) -> Value {
    json!({
        "search_type": "match",
        "query": { "term": term },
        "max_results": SEARCH_MAX_RESULTS,
        "highlight": {
            "fields": { "from": {}, "to": {}, "body": {} }
        }
    })
}

/// Blocking HTTP client for one ZincSearch index, authenticated with basic auth.
pub struct ZincClient {
    http: Client,
    conn: ConnectionConfig,
    index: String,
}

impl ZincClient {
    pub fn new(conn: ConnectionConfig, index: &str) -> Result<Self, IndexStoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            conn,
            index: index.to_string(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn index_url(&self) -> String {
        format!("{}/api/index/{}", self.conn.base_url(), self.index)
    }

    pub fn create_url(&self) -> String {
        format!("{}/api/index", self.conn.base_url())
    }

    pub fn bulk_url(&self) -> String {
        format!("{}/api/{}/_multi", self.conn.base_url(), self.index)
    }

    pub fn search_url(&self) -> String {
        format!("{}/api/{}/_search", self.conn.base_url(), self.index)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.conn.username, Some(&self.conn.password))
            .header(CONTENT_TYPE, "application/json")
    }

    /// HEAD request: 2xx means present, 404 means absent, anything else is an error.
    pub fn index_exists(&self) -> Result<bool, IndexStoreError> {
        let resp = self.request(Method::HEAD, &self.index_url()).send()?;
        let status = resp.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(status_error("index exists", resp))
        }
    }
}

/// Turn a non-success response into [`IndexStoreError::Status`], keeping the body for the log.
fn status_error(op: &'static str, resp: Response) -> IndexStoreError {
    let status = resp.status().as_u16();
    let body = resp.text().unwrap_or_default();
    IndexStoreError::Status { op, status, body }
}

fn ensure_success(op: &'static str, resp: Response) -> Result<Response, IndexStoreError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(status_error(op, resp))
    }
}

impl IndexStore for ZincClient {
    fn create_index_if_absent(&self) -> Result<IndexStatus, IndexStoreError> {
        if self.index_exists()? {
            debug!("Index {} already exists", self.index);
            return Ok(IndexStatus::AlreadyExists);
        }
        let body = index_schema(&self.index).to_string();
        let resp = self
            .request(Method::POST, &self.create_url())
            .body(body)
            .send()?;
        ensure_success("create index", resp)?;
        Ok(IndexStatus::Created)
    }

    fn bulk_insert(&self, ndjson: String) -> Result<(), IndexStoreError> {
        let resp = self
            .request(Method::POST, &self.bulk_url())
            .body(ndjson)
            .send()?;
        ensure_success("bulk insert", resp)?;
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Value, IndexStoreError> {
        let resp = self
            .request(Method::POST, &self.search_url())
            .body(search_body(term).to_string())
            .send()?;
        let text = ensure_success("search", resp)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}
