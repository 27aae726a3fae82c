//! Source implementations for fetching repository tags

pub mod github;

pub use github::GitHubGraphQlSource;

use crate::config::{CONNECT_TIMEOUT, REQUEST_TIMEOUT};

/// User agent sent with every API request
pub const USER_AGENT: &str = "tag-history";

/// Builds the HTTP client shared by the API callers
pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}
