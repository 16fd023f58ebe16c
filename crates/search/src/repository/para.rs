use async_trait::async_trait;

use crate::error::StorageResult;
use crate::model::Para;
use crate::operations::ElasticsearchTemplate;
use crate::query::{DerivedQuery, StringQuery};
use crate::schema::Document;
use crate::types::{Page, PageRequest};

use super::{ElasticsearchRepository, SimpleElasticsearchRepository};

const WRITERS_NAME_QUERY: &str = r#"{"bool": {"must": [{"match": {"writers.name": "?0"}}]}}"#;

const FILTERED_TAG_QUERY: &str =
    r#"{"bool": {"must": {"match_all": {}}, "filter": {"term": {"tags": "?0" }}}}"#;

const WRITERS_NAME_AND_FILTERED_TAG_QUERY: &str =
    r#"{"bool": {"must": {"match": {"writers.name": "?0"}}, "filter": {"term": {"tags": "?1" }}}}"#;

/// Repository of [`Para`] documents in the `blog` index.
///
/// The derived finder is parsed against the `Para` mapping on construction;
/// the template finders are bound and sent on each call.
#[derive(Debug, Clone)]
pub struct ParaRepository {
    inner: SimpleElasticsearchRepository<Para>,
    by_writers_name: DerivedQuery,
    count_by_writers_name: DerivedQuery,
    writers_name: StringQuery,
    filtered_tag: StringQuery,
    writers_name_and_filtered_tag: StringQuery,
}

impl ParaRepository {
    /// Creates the repository.
    pub fn new(template: ElasticsearchTemplate) -> StorageResult<Self> {
        let mapping = Para::mapping();
        Ok(Self {
            inner: SimpleElasticsearchRepository::new(template),
            by_writers_name: DerivedQuery::parse("findByWritersName", &mapping)?,
            count_by_writers_name: DerivedQuery::parse("countByWritersName", &mapping)?,
            writers_name: StringQuery::new(WRITERS_NAME_QUERY),
            filtered_tag: StringQuery::new(FILTERED_TAG_QUERY),
            writers_name_and_filtered_tag: StringQuery::new(WRITERS_NAME_AND_FILTERED_TAG_QUERY),
        })
    }

    /// The generic repository this one wraps, for ad-hoc structured searches.
    pub fn simple(&self) -> &SimpleElasticsearchRepository<Para> {
        &self.inner
    }

    /// Paras with a writer whose name matches all terms of `name`.
    pub async fn find_by_writers_name(
        &self,
        name: &str,
        page: PageRequest,
    ) -> StorageResult<Page<Para>> {
        self.inner
            .find_by_derived(&self.by_writers_name, &[name], page)
            .await
    }

    /// Number of paras [`find_by_writers_name`](Self::find_by_writers_name) would return.
    pub async fn count_by_writers_name(&self, name: &str) -> StorageResult<u64> {
        self.inner
            .count_by_derived(&self.count_by_writers_name, &[name])
            .await
    }

    /// Paras whose writers' names match any term of `name`.
    pub async fn find_by_writers_name_using_custom_query(
        &self,
        name: &str,
        page: PageRequest,
    ) -> StorageResult<Page<Para>> {
        self.inner
            .find_by_template(&self.writers_name, &[name], page)
            .await
    }

    /// Paras carrying exactly the tag `tag`.
    pub async fn find_by_filtered_tag_query(
        &self,
        tag: &str,
        page: PageRequest,
    ) -> StorageResult<Page<Para>> {
        self.inner
            .find_by_template(&self.filtered_tag, &[tag], page)
            .await
    }

    /// Paras matching `name` on writers and carrying the tag `tag`.
    pub async fn find_by_writers_name_and_filtered_tag_query(
        &self,
        name: &str,
        tag: &str,
        page: PageRequest,
    ) -> StorageResult<Page<Para>> {
        self.inner
            .find_by_template(&self.writers_name_and_filtered_tag, &[name, tag], page)
            .await
    }
}

#[async_trait]
impl ElasticsearchRepository<Para> for ParaRepository {
    async fn save(&self, entity: Para) -> StorageResult<Para> {
        self.inner.save(entity).await
    }

    async fn save_all(&self, entities: Vec<Para>) -> StorageResult<Vec<Para>> {
        self.inner.save_all(entities).await
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Para>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self, page: PageRequest) -> StorageResult<Page<Para>> {
        self.inner.find_all(page).await
    }

    async fn count(&self) -> StorageResult<u64> {
        self.inner.count().await
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        self.inner.delete_by_id(id).await
    }

    async fn delete_all(&self) -> StorageResult<()> {
        self.inner.delete_all().await
    }
}
