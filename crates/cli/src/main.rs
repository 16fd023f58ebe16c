//! Elastico
//!
//! Command line client for the blog paragraph index.

mod config;

use clap::Parser;
use elastico_search::model::{Para, fixtures};
use elastico_search::query::{
    BucketOrder, NativeSearchQuery, Operator, SearchRequest, SearchSource, match_query, terms,
};
use elastico_search::{
    Document, ElasticClient, ElasticsearchRepository, ElasticsearchTemplate, Page, ParaRepository,
};
use tracing::info;

use crate::config::{CliConfig, Command};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("elastico={},elastico_search={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn print_page(page: &Page<Para>) {
    for para in page.iter() {
        let writers: Vec<&str> = para.writers().iter().map(|w| w.name()).collect();
        println!(
            "{}\t{}\t[{}]\t[{}]",
            para.id().unwrap_or("-"),
            para.title(),
            writers.join(", "),
            para.tags().join(", ")
        );
    }
    println!(
        "page {} of {} ({} total)",
        page.number() + 1,
        page.total_pages().max(1),
        page.total_elements()
    );
}

async fn run(command: Command, repository: &ParaRepository) -> anyhow::Result<()> {
    let template = repository.simple().template();

    match command {
        Command::Ping => {
            let status = template.client().health_check().await?;
            println!("cluster status: {}", status);
        }
        Command::Init => {
            if template.create_index::<Para>().await? {
                println!("created index {}", Para::INDEX);
            } else {
                println!("index {} already exists", Para::INDEX);
            }
        }
        Command::Seed => {
            template.create_index::<Para>().await?;
            let saved = repository.save_all(fixtures::sample_paras()).await?;
            for para in &saved {
                println!("{}\t{}", para.id().unwrap_or("-"), para.title());
            }
            info!(count = saved.len(), "Seeded paragraphs");
        }
        Command::FindByWriter { name, page } => {
            let page = repository.find_by_writers_name(&name, page.into()).await?;
            print_page(&page);
        }
        Command::FindByTag { tag, page } => {
            let page = repository
                .find_by_filtered_tag_query(&tag, page.into())
                .await?;
            print_page(&page);
        }
        Command::FindByWriterAndTag { name, tag, page } => {
            let page = repository
                .find_by_writers_name_and_filtered_tag_query(&name, &tag, page.into())
                .await?;
            print_page(&page);
        }
        Command::Search { text, all, page } => {
            let operator = if all { Operator::And } else { Operator::Or };
            let query = NativeSearchQuery::builder()
                .with_query(match_query("title", text).operator(operator))
                .with_pageable(page.into())
                .build();
            let hits = repository.simple().search(&query).await?;
            for hit in hits.search_hits() {
                println!(
                    "{}\t{:.3}\t{}",
                    hit.id(),
                    hit.score().unwrap_or_default(),
                    hit.content().title()
                );
            }
            println!("{} total", hits.total_hits());
        }
        Command::TopTags { size } => {
            let request = SearchRequest::new(Para::INDEX).source(
                SearchSource::new()
                    .aggregation(
                        terms("top_tags")
                            .field("tags")
                            .size(size)
                            .order(BucketOrder::count(false)),
                    )
                    .size(0),
            );
            let response = template.client().search(&request).await?;
            if let Some(tags) = response
                .aggregations()
                .and_then(|aggs| aggs.get_terms("top_tags"))
            {
                for bucket in tags.buckets() {
                    println!("{}\t{}", bucket.doc_count(), bucket.key_as_string());
                }
            }
        }
        Command::Count => {
            println!("{}", repository.count().await?);
        }
        Command::Reset => {
            repository.delete_all().await?;
            println!("deleted all paragraphs from {}", Para::INDEX);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let es_config = config.elasticsearch_config();
    info!(url = %es_config.url(), "Connecting to Elasticsearch");

    let client = ElasticClient::connect(es_config).await?;
    let repository = ParaRepository::new(ElasticsearchTemplate::new(client.clone()))?;

    let result = run(config.command, &repository).await;
    client.close();
    result
}
