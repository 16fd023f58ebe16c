//! Integration tests against a real Elasticsearch node.
//!
//! One Elasticsearch container is started with testcontainers and shared by
//! every test. All tests use the fixed `blog` index, so they take a shared
//! lock, reseed the four sample paragraphs, and run one at a time.
//!
//! Run with: `cargo test -p elastico-search --features integration-tests`

#![cfg(feature = "integration-tests")]

use elastico_search::model::{Para, Writer, fixtures};
use elastico_search::query::{
    BucketOrder, Fuzziness, MultiMatchType, NativeSearchQuery, Operator, ScoreMode, SearchRequest,
    SearchSource, bool_query, fuzzy_query, match_phrase_query, match_query, multi_match_query,
    nested_query, regexp_query, term_query, terms,
};
use elastico_search::{
    Document, ElasticClient, ElasticsearchConfig, ElasticsearchRepository, ElasticsearchTemplate,
    IndexCoordinates, PageRequest, ParaRepository, StorageError,
};

use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::elastic_search::ElasticSearch;
use tokio::sync::{Mutex, MutexGuard, OnceCell};

/// Shared Elasticsearch container reused across all tests.
struct SharedEs {
    host: String,
    port: u16,
    /// Kept alive for the duration of the test binary; dropped at process exit.
    _container: testcontainers::ContainerAsync<ElasticSearch>,
}

static SHARED_ES: OnceCell<SharedEs> = OnceCell::const_new();

/// Serializes tests on the shared `blog` index.
static BLOG_INDEX: Mutex<()> = Mutex::const_new(());

async fn shared_es() -> &'static SharedEs {
    SHARED_ES
        .get_or_init(|| async {
            let container = ElasticSearch::default()
                .with_env_var("ES_JAVA_OPTS", "-Xms256m -Xmx256m")
                .with_startup_timeout(std::time::Duration::from_secs(120))
                .start()
                .await
                .expect("Failed to start Elasticsearch container");

            let port = container
                .get_host_port_ipv4(9200)
                .await
                .expect("Failed to get host port");

            let host = container
                .get_host()
                .await
                .expect("Failed to get host")
                .to_string();

            SharedEs {
                host,
                port,
                _container: container,
            }
        })
        .await
}

/// Everything a test needs, holding the index lock until dropped.
struct Fixture {
    client: ElasticClient,
    template: ElasticsearchTemplate,
    repository: ParaRepository,
    saved: Vec<Para>,
    _guard: MutexGuard<'static, ()>,
}

/// Connects to the shared node, recreates the `blog` contents and seeds the
/// sample paragraphs.
async fn setup() -> Fixture {
    let guard = BLOG_INDEX.lock().await;
    let es = shared_es().await;

    let config = ElasticsearchConfig {
        number_of_replicas: 0, // single node
        ..ElasticsearchConfig::new(es.host.clone(), es.port)
    };
    let client = ElasticClient::connect(config)
        .await
        .expect("Failed to connect to Elasticsearch");
    let template = ElasticsearchTemplate::new(client.clone());
    template
        .create_index::<Para>()
        .await
        .expect("Failed to create blog index");

    let repository = ParaRepository::new(template.clone()).expect("Failed to build repository");
    repository.delete_all().await.expect("Failed to clear index");
    let saved = repository
        .save_all(fixtures::sample_paras())
        .await
        .expect("Failed to seed paragraphs");

    Fixture {
        client,
        template,
        repository,
        saved,
        _guard: guard,
    }
}

fn first_page() -> PageRequest {
    PageRequest::of(0, 10)
}

async fn search(fixture: &Fixture, query: NativeSearchQuery) -> Vec<Para> {
    fixture
        .template
        .search::<Para>(&query, &IndexCoordinates::of_type::<Para>())
        .await
        .unwrap()
        .into_page(first_page())
        .into_content()
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let fixture = setup().await;
    let status = fixture.client.health_check().await.unwrap();
    assert!(status == "green" || status == "yellow", "status: {}", status);
}

#[tokio::test]
async fn test_create_index_is_idempotent() {
    let fixture = setup().await;
    assert!(fixture.template.index_exists::<Para>().await.unwrap());
    assert!(!fixture.template.create_index::<Para>().await.unwrap());
}

// ============================================================================
// Repository
// ============================================================================

#[tokio::test]
async fn test_save_assigns_id() {
    let fixture = setup().await;
    assert!(fixture.saved.iter().all(|p| p.id().is_some_and(|id| !id.is_empty())));

    let para = Para::new("Making Search Elastic")
        .with_writers(vec![Writer::new("Jane Roe")])
        .with_tags(["elasticsearch"]);
    let saved = fixture.repository.save(para).await.unwrap();
    assert!(saved.id().is_some_and(|id| !id.is_empty()));
    assert_eq!(fixture.repository.count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_find_by_writers_name() {
    let fixture = setup().await;

    let page = fixture
        .repository
        .find_by_writers_name("John Smith", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 2);

    let page = fixture
        .repository
        .find_by_writers_name("John Doe", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 3);
    assert!(page.iter().all(|p| p.writers().contains(&fixtures::john_doe())));

    assert_eq!(
        fixture.repository.count_by_writers_name("John Doe").await.unwrap(),
        3
    );
}

#[tokio::test]
async fn test_writer_name_match_stays_within_one_writer() {
    let fixture = setup().await;
    let para = Para::new("Mixed Authorship")
        .with_writers(vec![Writer::new("John Doe"), Writer::new("Jane Smith")])
        .with_tags(["tutorial"]);
    fixture.repository.save(para).await.unwrap();

    // "John" and "Smith" come from different writers here.
    let page = fixture
        .repository
        .find_by_writers_name("John Smith", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 2);
    assert!(page.iter().all(|p| p.writers().contains(&fixtures::john_smith())));

    // The flattened copy of the writers sees "John" and "Smith" together.
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("writers.name", "John Smith").operator(Operator::And))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().any(|p| p.title() == "Mixed Authorship"));

    // Any term matches in the custom query, so every paragraph has a "John".
    let page = fixture
        .repository
        .find_by_writers_name_using_custom_query("John Smith", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 5);
}

#[tokio::test]
async fn test_find_by_writers_name_using_custom_query() {
    let fixture = setup().await;
    let page = fixture
        .repository
        .find_by_writers_name_using_custom_query("Smith", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 2);
}

#[tokio::test]
async fn test_find_by_filtered_tag_query() {
    let fixture = setup().await;
    let page = fixture
        .repository
        .find_by_filtered_tag_query("elasticsearch", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 3);
}

#[tokio::test]
async fn test_find_by_writers_name_and_filtered_tag_query() {
    let fixture = setup().await;
    let page = fixture
        .repository
        .find_by_writers_name_and_filtered_tag_query("Doe", "elasticsearch", first_page())
        .await
        .unwrap();
    assert_eq!(page.total_elements(), 2);
}

#[tokio::test]
async fn test_total_is_reported_beyond_page_size() {
    let fixture = setup().await;
    let page = fixture
        .repository
        .find_by_filtered_tag_query("elasticsearch", PageRequest::of(0, 2))
        .await
        .unwrap();
    assert_eq!(page.number_of_elements(), 2);
    assert_eq!(page.total_elements(), 3);
    assert!(page.has_next());

    let all = fixture.repository.find_all(PageRequest::of(1, 3)).await.unwrap();
    assert_eq!(all.number_of_elements(), 1);
    assert_eq!(all.total_elements(), 4);
}

#[tokio::test]
async fn test_update_title_of_fuzzy_hit() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(fuzzy_query("title", "serch"))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);

    let mut para = hits[0].clone();
    assert_eq!(para.title(), "Search engines");
    para.set_title("Getting started with Search Engines");
    let para = fixture.repository.save(para).await.unwrap();

    let id = para.id().unwrap();
    let found = fixture.repository.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.title(), "Getting started with Search Engines");
    assert_eq!(fixture.repository.count().await.unwrap(), 4);

    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title", "Getting started").operator(Operator::And))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), Some(id));

    // The old exact title is gone; its terms now only match the new title.
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title.verbatim", "Search engines"))
            .build(),
    )
    .await;
    assert!(hits.is_empty());

    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title", "Search engines").operator(Operator::And))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Getting started with Search Engines");
}

#[tokio::test]
async fn test_delete() {
    let fixture = setup().await;
    let para = &fixture.saved[1];
    let count = fixture.repository.count().await.unwrap();

    fixture.repository.delete(para).await.unwrap();

    assert_eq!(fixture.repository.count().await.unwrap(), count - 1);
    let id = para.id().unwrap();
    assert!(fixture.repository.find_by_id(id).await.unwrap().is_none());
    assert!(!fixture.repository.exists_by_id(id).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_document() {
    let fixture = setup().await;
    let err = fixture
        .repository
        .delete_by_id("no-such-para")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = fixture.repository.delete(&Para::new("unsaved")).await.unwrap_err();
    assert!(matches!(err, StorageError::Document(_)));
}

#[tokio::test]
async fn test_malformed_template_is_rejected_by_store() {
    use elastico_search::query::StringQuery;

    let fixture = setup().await;
    let err = fixture
        .repository
        .simple()
        .find_by_template(&StringQuery::new(r#"{"mtch": {"title": "?0"}}"#), &["x"], first_page())
        .await
        .unwrap_err();
    assert!(err.store_error_type().is_some(), "{:?}", err);
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_match_full_title_with_and_operator() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title", "Search engines").operator(Operator::And))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Search engines");
}

#[tokio::test]
async fn test_match_one_term_from_title() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title", "Engines Solutions"))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Search engines");
}

#[tokio::test]
async fn test_match_part_of_title() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title", "elasticsearch data"))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_match_on_verbatim_field() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query(
                "title.verbatim",
                "Second Article About Elasticsearch",
            ))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);

    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_query("title.verbatim", "Second Article About"))
            .build(),
    )
    .await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_nested_query_on_writer_name() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(nested_query(
                "writers",
                match_query("writers.name", "smith"),
                ScoreMode::None,
            ))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 2);
    assert!(
        hits.iter()
            .all(|p| p.writers().contains(&fixtures::john_smith()))
    );
}

#[tokio::test]
async fn test_match_phrase_with_slop() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_phrase_query("title", "spring elasticsearch").slop(1))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);

    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(match_phrase_query("title", "spring elasticsearch"))
            .build(),
    )
    .await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_fuzzy_match() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(
                match_query("title", "spring date elasticserch")
                    .operator(Operator::And)
                    .fuzziness(Fuzziness::One)
                    .prefix_length(3),
            )
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Spring Data Elasticsearch");
}

#[tokio::test]
async fn test_fuzzy_query_on_single_term() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(fuzzy_query("title", "serch"))
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title(), "Search engines");
}

#[tokio::test]
async fn test_regexp_filter() {
    let fixture = setup().await;
    let query = NativeSearchQuery::builder()
        .with_filter(regexp_query("title", ".*data.*"))
        .build();

    let hits = fixture
        .template
        .search::<Para>(&query, &IndexCoordinates::of_type::<Para>())
        .await
        .unwrap();
    assert_eq!(hits.total_hits(), 1);
    assert_eq!(
        hits.search_hit(0).unwrap().content().title(),
        "Spring Data Elasticsearch"
    );

    let count = fixture
        .template
        .count_query::<Para>(&query, &IndexCoordinates::of_type::<Para>())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_count_query_applies_filter() {
    let fixture = setup().await;
    let query = NativeSearchQuery::builder()
        .with_filter(term_query("tags", "tutorial"))
        .build();
    let count = fixture
        .template
        .count_query::<Para>(&query, &IndexCoordinates::of_type::<Para>())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_multi_match_across_fields() {
    let fixture = setup().await;
    let hits = search(
        &fixture,
        NativeSearchQuery::builder()
            .with_query(
                multi_match_query("tutorial")
                    .field("title")
                    .field("tags")
                    .kind(MultiMatchType::BestFields),
            )
            .build(),
    )
    .await;
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_bool_query_with_nested_writer_and_tag_filter() {
    let fixture = setup().await;
    let query = bool_query()
        .must(nested_query(
            "writers",
            bool_query().must(term_query("writers.name", "doe")),
            ScoreMode::None,
        ))
        .filter(term_query("tags", "elasticsearch"));

    let hits = search(&fixture, NativeSearchQuery::builder().with_query(query).build()).await;
    assert_eq!(hits.len(), 2);
}

// ============================================================================
// Aggregations
// ============================================================================

#[tokio::test]
async fn test_aggregation_on_analyzed_field_counts_each_token() {
    let fixture = setup().await;
    let request = SearchRequest::new(Para::INDEX)
        .source(SearchSource::new().aggregation(terms("top_tags").field("title")));

    let response = fixture.client.search(&request).await.unwrap();
    let mut keys = response
        .aggregations()
        .and_then(|a| a.get_terms("top_tags"))
        .unwrap()
        .keys();
    keys.sort();

    assert_eq!(
        keys,
        vec![
            "about",
            "article",
            "data",
            "elasticsearch",
            "engines",
            "search",
            "second",
            "spring",
            "tutorial"
        ]
    );
}

#[tokio::test]
async fn test_aggregation_on_keyword_field_ordered_by_count() {
    let fixture = setup().await;
    let request = SearchRequest::new(Para::INDEX).source(
        SearchSource::new()
            .aggregation(
                terms("top_tags")
                    .field("tags")
                    .order(BucketOrder::count(false)),
            )
            .size(0),
    );

    let response = fixture.client.search(&request).await.unwrap();
    assert!(response.hits().is_empty());
    let top_tags = response
        .aggregations()
        .and_then(|a| a.get_terms("top_tags"))
        .unwrap();

    assert_eq!(
        top_tags.keys(),
        vec!["elasticsearch", "spring data", "search engines", "tutorial"]
    );
    assert_eq!(top_tags.buckets()[0].doc_count(), 3);
}

#[tokio::test]
async fn test_aggregation_through_template() {
    let fixture = setup().await;
    let query = NativeSearchQuery::builder()
        .with_query(nested_query(
            "writers",
            match_query("writers.name", "doe"),
            ScoreMode::None,
        ))
        .with_aggregation(terms("tags").field("tags").order(BucketOrder::key(true)))
        .build();
    let hits = fixture
        .template
        .search::<Para>(&query, &IndexCoordinates::of_type::<Para>())
        .await
        .unwrap();

    assert_eq!(hits.total_hits(), 3);
    let tags = hits.aggregations().and_then(|a| a.get_terms("tags")).unwrap();
    assert_eq!(
        tags.keys(),
        vec!["elasticsearch", "search engines", "spring data", "tutorial"]
    );
}
