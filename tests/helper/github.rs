//! GitHub API test utilities

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use tag_history::history::cache::FileTagStore;
use tag_history::history::ingest::{CacheSettings, TagIngestionClient};
use tag_history::history::sources::GitHubGraphQlSource;

/// A tag node as returned by the GraphQL refs query
pub enum Node<'a> {
    /// Annotated tag: (name, tagger date, tagger login)
    Tag(&'a str, &'a str, Option<&'a str>),
    /// Lightweight tag: (name, committed date, author name)
    Commit(&'a str, &'a str, &'a str),
}

impl Node<'_> {
    fn to_json(&self) -> Value {
        match self {
            Node::Tag(name, date, login) => json!({
                "name": name,
                "target": {
                    "__typename": "Tag",
                    "tagger": {
                        "name": "Tagger Name",
                        "date": date,
                        "user": login.map(|l| json!({ "login": l }))
                    }
                }
            }),
            Node::Commit(name, date, author) => json!({
                "name": name,
                "target": {
                    "__typename": "Commit",
                    "committedDate": date,
                    "author": { "name": author, "user": null }
                }
            }),
        }
    }
}

/// Builds a GraphQL refs page response body
pub fn tags_page(nodes: &[Node], end_cursor: Option<&str>) -> String {
    json!({
        "data": {
            "repository": {
                "refs": {
                    "pageInfo": {
                        "hasNextPage": end_cursor.is_some(),
                        "endCursor": end_cursor
                    },
                    "nodes": nodes.iter().map(Node::to_json).collect::<Vec<_>>()
                }
            }
        }
    })
    .to_string()
}

/// Creates an ingestion client against `api_url` caching into `cache_dir`
pub fn create_ingestion_client(
    api_url: &str,
    cache_dir: &Path,
    cache_enabled: bool,
) -> Arc<TagIngestionClient> {
    let source = GitHubGraphQlSource::new(api_url, Some("test-token".to_string())).unwrap();
    let store = FileTagStore::new(cache_dir);
    Arc::new(TagIngestionClient::new(
        Arc::new(source),
        Arc::new(store),
        CacheSettings {
            enabled: cache_enabled,
            max_age: Duration::from_secs(3600),
        },
    ))
}
