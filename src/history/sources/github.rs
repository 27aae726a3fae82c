//! GitHub GraphQL API tag source

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::history::error::FetchError;
use crate::history::source::{TagPage, TagSource};
use crate::history::sources::http_client;
use crate::history::types::VersionRecord;

/// Lists tag refs newest first, resolving who created each tag and when
const TAGS_QUERY: &str = r#"query ListAllTagsWithCreator($owner: String!, $name: String!, $pageSize: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: "refs/tags/", first: $pageSize, after: $after, orderBy: { field: TAG_COMMIT_DATE, direction: DESC }) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        target {
          __typename
          ... on Tag { tagger { name date user { login } } }
          ... on Commit { committedDate author { name user { login } } }
        }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    owner: &'a str,
    name: &'a str,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    refs: RefConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<RefNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefNode {
    name: String,
    target: Option<RefTarget>,
}

/// Object a tag ref points at
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum RefTarget {
    /// Annotated tag object, created by its tagger
    Tag { tagger: Option<GitActor> },
    /// Lightweight tag pointing straight at a commit
    #[serde(rename_all = "camelCase")]
    Commit {
        committed_date: Option<DateTime<FixedOffset>>,
        author: Option<GitActor>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    name: Option<String>,
    date: Option<DateTime<FixedOffset>>,
    user: Option<GitHubUser>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

impl GitActor {
    /// Linked account login, falling back to the free-text name
    fn identity(self) -> Option<String> {
        self.user.map(|u| u.login).or(self.name)
    }
}

impl RefNode {
    fn into_record(self) -> Option<VersionRecord> {
        let (released_at, author) = match self.target? {
            RefTarget::Tag { tagger } => {
                let tagger = tagger?;
                (tagger.date?, tagger.identity())
            }
            RefTarget::Commit {
                committed_date,
                author,
            } => (committed_date?, author.and_then(GitActor::identity)),
            RefTarget::Other => return None,
        };
        Some(VersionRecord::new(self.name, released_at, author))
    }
}

/// Tag source backed by the GitHub GraphQL API
pub struct GitHubGraphQlSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubGraphQlSource {
    /// Creates a source talking to the API at `base_url`.
    /// Requests are authenticated when `token` is non-empty.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl TagSource for GitHubGraphQlSource {
    async fn fetch_page(
        &self,
        owner: &str,
        name: &str,
        page_size: u32,
        after: Option<String>,
    ) -> Result<TagPage, FetchError> {
        let url = format!("{}/graphql", self.base_url);
        let payload = GraphQlRequest {
            query: TAGS_QUERY,
            variables: Variables {
                owner,
                name,
                page_size,
                after: after.as_deref(),
            },
        };

        let mut request = self.client.post(&url).json(&payload);
        match &self.token {
            Some(token) => request = request.bearer_auth(token),
            None => info!("Querying API without bearer token. You might run into rate limitations."),
        }

        debug!("Fetching tags of {}/{} after {:?}", owner, name, after);
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            warn!("GraphQL API quota exceeded (status {})", status);
            return Err(FetchError::QuotaExceeded {
                status: status.as_u16(),
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await?;

        if !status.is_success() {
            warn!("GraphQL API returned status {}: {}", status, url);
            return Err(FetchError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse GraphQL response: {}", e);
            FetchError::Protocol {
                status: status.as_u16(),
                body: format!("{}: {}", e, body),
            }
        })?;

        if let Some(errors) = parsed.errors {
            return Err(FetchError::Protocol {
                status: status.as_u16(),
                body: format!("GraphQL errors: {}", errors),
            });
        }

        let refs = parsed
            .data
            .and_then(|data| data.repository)
            .map(|repository| repository.refs)
            .ok_or_else(|| FetchError::Protocol {
                status: status.as_u16(),
                body: format!("Repository {}/{} not found", owner, name),
            })?;

        let records = refs
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|node| {
                let tag = node.name.clone();
                let record = node.into_record();
                if record.is_none() {
                    warn!("Skipping tag {}: no tagger or commit date", tag);
                }
                record
            })
            .collect();

        Ok(TagPage {
            records,
            has_next_page: refs.page_info.has_next_page,
            end_cursor: refs.page_info.end_cursor,
        })
    }
}
