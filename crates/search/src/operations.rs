//! Search and document operations over an [`ElasticClient`].
//!
//! [`ElasticsearchTemplate`] is the layer between the repositories and the
//! client. It knows how to address a [`Document`] type's index, how to turn
//! entities into documents and back, and how to run the three kinds of
//! queries: structured ([`NativeSearchQuery`]), string templates (sent as
//! raw text), and counts.

use elasticsearch::http::Method;
use elasticsearch::http::headers::HeaderMap;
use elasticsearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts,
};
use elasticsearch::params::Conflicts;
use elasticsearch::{CountParts, DeleteByQueryParts, DeleteParts, GetParts, IndexParts, SearchParts};
use serde_json::{Value, json};

use crate::client::{ElasticClient, read_json};
use crate::error::{BackendError, DocumentError, StorageError, StorageResult};
use crate::query::NativeSearchQuery;
use crate::schema::{Document, create_index_body};
use crate::types::{IndexCoordinates, SearchHits};

/// Document, index and search operations for [`Document`] types.
///
/// Cloning is cheap and shares the client.
#[derive(Debug, Clone)]
pub struct ElasticsearchTemplate {
    client: ElasticClient,
}

impl ElasticsearchTemplate {
    /// Creates a template over an existing client.
    pub fn new(client: ElasticClient) -> Self {
        Self { client }
    }

    /// Returns the client.
    pub fn client(&self) -> &ElasticClient {
        &self.client
    }

    /// Returns true if the index of `T` exists.
    pub async fn index_exists<T: Document>(&self) -> StorageResult<bool> {
        let response = self
            .client
            .inner()
            .indices()
            .exists(IndicesExistsParts::Index(&[T::INDEX]))
            .send()
            .await?;
        Ok(response.status_code().is_success())
    }

    /// Creates the index of `T` with its mapping, unless it already exists.
    ///
    /// Returns true if this call created the index.
    pub async fn create_index<T: Document>(&self) -> StorageResult<bool> {
        if self.index_exists::<T>().await? {
            return Ok(false);
        }

        let body = create_index_body::<T>(self.client.config());
        let response = self
            .client
            .inner()
            .indices()
            .create(IndicesCreateParts::Index(T::INDEX))
            .body(body)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Another client created it between the check and the create.
            if body.contains("resource_already_exists_exception") {
                return Ok(false);
            }
            return Err(StorageError::from_response(status.as_u16(), &body));
        }

        tracing::info!(index = T::INDEX, "Created index");
        Ok(true)
    }

    /// Deletes the index of `T`. A missing index is not an error.
    pub async fn delete_index<T: Document>(&self) -> StorageResult<()> {
        let response = self
            .client
            .inner()
            .indices()
            .delete(IndicesDeleteParts::Index(&[T::INDEX]))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if missing_index(&body) {
                tracing::debug!(index = T::INDEX, "Index already absent");
                return Ok(());
            }
            return Err(StorageError::from_response(status.as_u16(), &body));
        }

        tracing::info!(index = T::INDEX, "Deleted index");
        Ok(())
    }

    /// Makes recent writes to the index of `T` visible to search.
    pub async fn refresh<T: Document>(&self) -> StorageResult<()> {
        let response = self
            .client
            .inner()
            .indices()
            .refresh(IndicesRefreshParts::Index(&[T::INDEX]))
            .send()
            .await?;
        read_json(response).await?;
        Ok(())
    }

    /// Indexes `entity`, creating or replacing the document.
    ///
    /// An entity without id gets one from the store, written back into the
    /// returned entity.
    pub async fn save<T: Document>(&self, mut entity: T) -> StorageResult<T> {
        let body = serde_json::to_value(&entity)?;

        let response = match entity.id() {
            Some(id) => {
                tracing::debug!(index = T::INDEX, id, "Indexing document");
                self.client
                    .inner()
                    .index(IndexParts::IndexId(T::INDEX, id))
                    .body(body)
                    .send()
                    .await?
            }
            None => {
                tracing::debug!(index = T::INDEX, "Indexing new document");
                self.client
                    .inner()
                    .index(IndexParts::Index(T::INDEX))
                    .body(body)
                    .send()
                    .await?
            }
        };

        let result = read_json(response).await?;
        let id = result
            .get("_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                StorageError::Backend(BackendError::Serialization {
                    message: "index response has no _id".to_string(),
                })
            })?;
        entity.set_id(id.to_string());
        Ok(entity)
    }

    /// Reads a document by id. A missing document is `None`.
    pub async fn get<T: Document>(&self, id: &str) -> StorageResult<Option<T>> {
        tracing::debug!(index = T::INDEX, id, "Getting document");
        let response = self
            .client
            .inner()
            .get(GetParts::IndexId(T::INDEX, id))
            .send()
            .await?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            let body = response.text().await.unwrap_or_default();
            return match not_found(T::INDEX, id, &body) {
                StorageError::Document(DocumentError::NotFound { .. }) => Ok(None),
                err => Err(err),
            };
        }

        let body = read_json(response).await?;
        if !body.get("found").and_then(|f| f.as_bool()).unwrap_or(false) {
            return Ok(None);
        }

        let source = body.get("_source").cloned().unwrap_or(Value::Null);
        let mut entity: T = serde_json::from_value(source)?;
        entity.set_id(id.to_string());
        Ok(Some(entity))
    }

    /// Deletes a document by id. A missing document is
    /// [`DocumentError::NotFound`]; a missing index is a store error, as in
    /// [`get`](Self::get).
    pub async fn delete<T: Document>(&self, id: &str) -> StorageResult<()> {
        tracing::debug!(index = T::INDEX, id, "Deleting document");
        let response = self
            .client
            .inner()
            .delete(DeleteParts::IndexId(T::INDEX, id))
            .send()
            .await?;

        if response.status_code().as_u16() == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(not_found(T::INDEX, id, &body));
        }

        read_json(response).await?;
        Ok(())
    }

    /// Deletes every document of the index of `T`. Returns how many were deleted.
    pub async fn delete_all<T: Document>(&self) -> StorageResult<u64> {
        let response = self
            .client
            .inner()
            .delete_by_query(DeleteByQueryParts::Index(&[T::INDEX]))
            .body(json!({ "query": { "match_all": {} } }))
            .conflicts(Conflicts::Proceed)
            .refresh(true)
            .send()
            .await?;

        let body = read_json(response).await?;
        let deleted = body.get("deleted").and_then(|d| d.as_u64()).unwrap_or(0);
        tracing::debug!(index = T::INDEX, deleted, "Deleted all documents");
        Ok(deleted)
    }

    /// Number of documents in the index of `T`.
    pub async fn count<T: Document>(&self) -> StorageResult<u64> {
        let response = self
            .client
            .inner()
            .count(CountParts::Index(&[T::INDEX]))
            .send()
            .await?;
        read_count(response).await
    }

    /// Runs a structured query and returns typed hits.
    pub async fn search<T: Document>(
        &self,
        query: &NativeSearchQuery,
        index: &IndexCoordinates,
    ) -> StorageResult<SearchHits<T>> {
        let body = query.to_body();
        let indices = index.as_strs();
        tracing::debug!(indices = ?indices, body = %body, "Search");

        let response = self
            .client
            .inner()
            .search(SearchParts::Index(&indices))
            .body(body)
            .send()
            .await?;

        let body = read_json(response).await?;
        SearchHits::from_json(&body)
    }

    /// Counts the documents a structured query matches.
    pub async fn count_query<T: Document>(
        &self,
        query: &NativeSearchQuery,
        index: &IndexCoordinates,
    ) -> StorageResult<u64> {
        let body = query.to_count_body();
        let indices = index.as_strs();
        tracing::debug!(indices = ?indices, body = %body, "Count");

        let mut request = self
            .client
            .inner()
            .count(CountParts::Index(&indices))
            .body(body);
        if let Some(min_score) = query.min_score() {
            request = request.min_score(f64::from(min_score));
        }

        let response = request.send().await?;
        read_count(response).await
    }

    /// Runs a search whose body is already-rendered JSON text.
    ///
    /// Used for bound string templates, which are sent as-is so the node is
    /// the only place they are parsed.
    pub async fn search_raw<T: Document>(
        &self,
        body: String,
        index: &IndexCoordinates,
    ) -> StorageResult<SearchHits<T>> {
        let response = self.send_raw("_search", body, index).await?;
        let body = read_json(response).await?;
        SearchHits::from_json(&body)
    }

    /// Counts with an already-rendered `_count` body.
    pub async fn count_raw(&self, body: String, index: &IndexCoordinates) -> StorageResult<u64> {
        let response = self.send_raw("_count", body, index).await?;
        read_count(response).await
    }

    async fn send_raw(
        &self,
        endpoint: &str,
        body: String,
        index: &IndexCoordinates,
    ) -> StorageResult<elasticsearch::http::response::Response> {
        let path = format!("/{}/{}", index.joined(), endpoint);
        tracing::debug!(path = %path, body = %body, "Raw request");

        let response = self
            .client
            .inner()
            .send(
                Method::Post,
                &path,
                HeaderMap::new(),
                Option::<&()>::None,
                Some(body),
                None,
            )
            .await?;
        Ok(response)
    }
}

fn missing_index(body: &str) -> bool {
    body.contains("index_not_found_exception")
}

/// Classifies a 404 on a document request.
///
/// A missing index is a setup error and keeps the store's report; anything
/// else means the document itself is absent.
fn not_found(index: &str, id: &str, body: &str) -> StorageError {
    if missing_index(body) {
        return StorageError::from_response(404, body);
    }
    StorageError::Document(DocumentError::NotFound {
        index: index.to_string(),
        id: id.to_string(),
    })
}

async fn read_count(response: elasticsearch::http::response::Response) -> StorageResult<u64> {
    let body = read_json(response).await?;
    body.get("count").and_then(|c| c.as_u64()).ok_or_else(|| {
        StorageError::Backend(BackendError::Serialization {
            message: "count response has no count".to_string(),
        })
    })
}
