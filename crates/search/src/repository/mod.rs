//! Typed repositories.
//!
//! [`ElasticsearchRepository`] is the CRUD contract shared by every entity
//! repository. [`SimpleElasticsearchRepository`] implements it over an
//! [`ElasticsearchTemplate`] and adds the two finder styles: derived queries
//! and positional string templates. Entity repositories such as
//! [`ParaRepository`] wrap it and name their finders.
//!
//! Writes refresh the index before returning, so a save is immediately
//! visible to the next search.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::{DocumentError, StorageError, StorageResult};
use crate::operations::ElasticsearchTemplate;
use crate::query::{DerivedQuery, NativeSearchQuery, StringQuery, Subject};
use crate::schema::Document;
use crate::types::{IndexCoordinates, Page, PageRequest, SearchHits};

mod para;

pub use para::ParaRepository;

/// CRUD operations on one document type.
#[async_trait]
pub trait ElasticsearchRepository<T: Document>: Send + Sync {
    /// Indexes `entity`, returning it with its id set.
    async fn save(&self, entity: T) -> StorageResult<T>;

    /// Saves each entity in order.
    async fn save_all(&self, entities: Vec<T>) -> StorageResult<Vec<T>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity).await?);
        }
        Ok(saved)
    }

    /// Reads an entity by id.
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<T>>;

    /// Returns true if an entity with this id exists.
    async fn exists_by_id(&self, id: &str) -> StorageResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Returns one page of all entities.
    async fn find_all(&self, page: PageRequest) -> StorageResult<Page<T>>;

    /// Number of stored entities.
    async fn count(&self) -> StorageResult<u64>;

    /// Deletes `entity` by its id. An entity that was never saved is an error.
    async fn delete(&self, entity: &T) -> StorageResult<()> {
        let id = entity.id().ok_or_else(|| {
            StorageError::Document(DocumentError::MissingId {
                index: T::INDEX.to_string(),
            })
        })?;
        self.delete_by_id(id).await
    }

    /// Deletes the entity with this id.
    async fn delete_by_id(&self, id: &str) -> StorageResult<()>;

    /// Deletes every entity.
    async fn delete_all(&self) -> StorageResult<()>;
}

/// Repository over a template, with derived and template finders.
#[derive(Debug, Clone)]
pub struct SimpleElasticsearchRepository<T> {
    template: ElasticsearchTemplate,
    index: IndexCoordinates,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> SimpleElasticsearchRepository<T> {
    /// Creates a repository for the index of `T`.
    pub fn new(template: ElasticsearchTemplate) -> Self {
        Self {
            template,
            index: IndexCoordinates::of_type::<T>(),
            _marker: PhantomData,
        }
    }

    /// Returns the template.
    pub fn template(&self) -> &ElasticsearchTemplate {
        &self.template
    }

    /// Returns the coordinates of the repository's index.
    pub fn index(&self) -> &IndexCoordinates {
        &self.index
    }

    /// Runs a structured query against the repository's index.
    pub async fn search(&self, query: &NativeSearchQuery) -> StorageResult<SearchHits<T>> {
        self.template.search(query, &self.index).await
    }

    /// Runs a derived `find` query.
    pub async fn find_by_derived(
        &self,
        query: &DerivedQuery,
        args: &[&str],
        page: PageRequest,
    ) -> StorageResult<Page<T>> {
        let native = NativeSearchQuery::builder()
            .with_query(query.bind(args)?)
            .with_pageable(page)
            .build();
        let hits = self.search(&native).await?;
        Ok(hits.into_page(page))
    }

    /// Runs a derived query as a count, whatever its subject.
    pub async fn count_by_derived(&self, query: &DerivedQuery, args: &[&str]) -> StorageResult<u64> {
        let native = NativeSearchQuery::builder()
            .with_query(query.bind(args)?)
            .build();
        self.template.count_query::<T>(&native, &self.index).await
    }

    /// Runs a derived query and reports whether anything matched.
    pub async fn exists_by_derived(&self, query: &DerivedQuery, args: &[&str]) -> StorageResult<bool> {
        Ok(self.count_by_derived(query, args).await? > 0)
    }

    /// Runs a derived query according to its subject (`find`, `count` or `exists`).
    pub async fn execute_derived(
        &self,
        query: &DerivedQuery,
        args: &[&str],
        page: PageRequest,
    ) -> StorageResult<DerivedResult<T>> {
        Ok(match query.subject() {
            Subject::Find => DerivedResult::Page(self.find_by_derived(query, args, page).await?),
            Subject::Count => DerivedResult::Count(self.count_by_derived(query, args).await?),
            Subject::Exists => DerivedResult::Exists(self.exists_by_derived(query, args).await?),
        })
    }

    /// Runs a string-template query with positional arguments.
    pub async fn find_by_template(
        &self,
        query: &StringQuery,
        args: &[&str],
        page: PageRequest,
    ) -> StorageResult<Page<T>> {
        let body = query.to_search_body(args, page)?;
        let hits = self.template.search_raw::<T>(body, &self.index).await?;
        Ok(hits.into_page(page))
    }

    /// Counts the documents a string-template query matches.
    pub async fn count_by_template(&self, query: &StringQuery, args: &[&str]) -> StorageResult<u64> {
        let body = query.to_count_body(args)?;
        self.template.count_raw(body, &self.index).await
    }
}

/// Result of [`SimpleElasticsearchRepository::execute_derived`].
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedResult<T> {
    /// Hits of a `find` query.
    Page(Page<T>),
    /// Match count of a `count` query.
    Count(u64),
    /// Outcome of an `exists` query.
    Exists(bool),
}

#[async_trait]
impl<T: Document> ElasticsearchRepository<T> for SimpleElasticsearchRepository<T> {
    async fn save(&self, entity: T) -> StorageResult<T> {
        let saved = self.template.save(entity).await?;
        self.template.refresh::<T>().await?;
        Ok(saved)
    }

    async fn save_all(&self, entities: Vec<T>) -> StorageResult<Vec<T>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.template.save(entity).await?);
        }
        self.template.refresh::<T>().await?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<T>> {
        self.template.get(id).await
    }

    async fn find_all(&self, page: PageRequest) -> StorageResult<Page<T>> {
        let query = NativeSearchQuery::builder().with_pageable(page).build();
        Ok(self.search(&query).await?.into_page(page))
    }

    async fn count(&self) -> StorageResult<u64> {
        self.template.count::<T>().await
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        self.template.delete::<T>(id).await?;
        self.template.refresh::<T>().await
    }

    async fn delete_all(&self) -> StorageResult<()> {
        self.template.delete_all::<T>().await?;
        Ok(())
    }
}
