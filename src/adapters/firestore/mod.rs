//! Firestore REST v1 adapter.
//!
//! Collections map onto `{endpoint}/projects/{project}/databases/{database}/documents/{collection}`.
//! Listing follows `nextPageToken` one page at a time; equality lookups go through
//! `:runQuery` with a single `fieldFilter`.

pub mod auth;
pub mod codec;

use self::auth::TokenSource;
use crate::config::toml_config::DatabaseConfig;
use crate::domain::model::Document;
use crate::domain::ports::{DocumentCursor, DocumentStore};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    tokens: Arc<dyn TokenSource>,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    document: Option<FirestoreDocument>,
}

impl FirestoreDocument {
    fn into_document(self) -> Result<Document> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CatalogError::Codec {
                message: format!("document name without id: {}", self.name),
            })?
            .to_string();

        Ok(Document {
            id,
            fields: codec::decode_fields(&self.fields)?,
        })
    }
}

impl FirestoreStore {
    /// Resolves credentials for `config` and builds the client.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let tokens = auth::token_source(config).await?;
        Self::with_token_source(config, tokens)
    }

    pub fn with_token_source(config: &DatabaseConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.endpoint(),
            config.project_id,
            config.database_id()
        );

        tracing::info!("Firestore documents root: {}", documents_url);

        Ok(Self {
            client,
            documents_url,
            tokens,
            page_size: config.page_size(),
        })
    }

    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let builder = self.client.request(method, url);
        Ok(match self.tokens.token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn list_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse> {
        let url = format!("{}/{}", self.documents_url, collection);
        let mut query = vec![("pageSize", self.page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        tracing::debug!("Listing {} (page token: {:?})", collection, page_token);
        let response = self.request(Method::GET, &url).await?.query(&query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn run_query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let mut query = json!({
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": codec::encode_value(value)?,
                }
            }
        });
        if let Some(limit) = limit {
            query["limit"] = json!(limit);
        }
        let body = json!({ "structuredQuery": query });

        tracing::debug!("Querying {} where {} == {}", collection, field, value);
        let response = self.request(Method::POST, &url).await?.json(&body).send().await?;
        let rows: Vec<RunQueryRow> = check_status(response).await?.json().await?;

        // A query with no matches still returns one row carrying only `readTime`
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(FirestoreDocument::into_document)
            .collect()
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    tracing::debug!("Firestore responded {}: {}", status, message);

    Err(CatalogError::Store {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(&self, collection: &str, fields: Map<String, Value>) -> Result<String> {
        let url = format!("{}/{}", self.documents_url, collection);
        let body = json!({ "fields": codec::encode_fields(&fields)? });

        let response = self.request(Method::POST, &url).await?.json(&body).send().await?;
        let created: FirestoreDocument = check_status(response).await?.json().await?;

        Ok(created.into_document()?.id)
    }

    fn query_eq<'a>(
        &'a self,
        collection: &'a str,
        field: &'a str,
        value: Value,
        limit: Option<usize>,
    ) -> Box<dyn DocumentCursor + 'a> {
        Box::new(QueryCursor {
            store: self,
            collection,
            field,
            value,
            limit,
            results: None,
        })
    }

    fn documents<'a>(&'a self, collection: &'a str) -> Box<dyn DocumentCursor + 'a> {
        Box::new(PageCursor {
            store: self,
            collection,
            buffer: VecDeque::new(),
            next_page_token: None,
            exhausted: false,
        })
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("Closing Firestore client for {}", self.documents_url);
        Ok(())
    }
}

/// Fetches one page per refill; nothing is requested until the first `next`.
struct PageCursor<'a> {
    store: &'a FirestoreStore,
    collection: &'a str,
    buffer: VecDeque<Document>,
    next_page_token: Option<String>,
    exhausted: bool,
}

#[async_trait]
impl DocumentCursor for PageCursor<'_> {
    async fn next(&mut self) -> Result<Option<Document>> {
        loop {
            if let Some(doc) = self.buffer.pop_front() {
                return Ok(Some(doc));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = self
                .store
                .list_page(self.collection, self.next_page_token.as_deref())
                .await?;

            for doc in page.documents {
                self.buffer.push_back(doc.into_document()?);
            }

            self.next_page_token = page.next_page_token.filter(|token| !token.is_empty());
            self.exhausted = self.next_page_token.is_none();
        }
    }
}

struct QueryCursor<'a> {
    store: &'a FirestoreStore,
    collection: &'a str,
    field: &'a str,
    value: Value,
    limit: Option<usize>,
    results: Option<VecDeque<Document>>,
}

#[async_trait]
impl DocumentCursor for QueryCursor<'_> {
    async fn next(&mut self) -> Result<Option<Document>> {
        if self.results.is_none() {
            let docs = self
                .store
                .run_query(self.collection, self.field, &self.value, self.limit)
                .await?;
            self.results = Some(docs.into());
        }

        Ok(self.results.as_mut().and_then(VecDeque::pop_front))
    }
}
