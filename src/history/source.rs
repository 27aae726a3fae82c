//! Source trait for fetching tag pages from a remote API

#[cfg(test)]
use mockall::automock;

use crate::history::error::FetchError;
use crate::history::types::VersionRecord;

/// One page of tags plus the cursor needed to request the next one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPage {
    pub records: Vec<VersionRecord>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl TagPage {
    /// Cursor of the following page, if there is one
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Trait for fetching tags page by page
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagSource: Send + Sync {
    /// Fetches one page of tags of a repository
    ///
    /// # Arguments
    /// * `owner` - The user or organization owning the repository
    /// * `name` - The repository name
    /// * `page_size` - Maximum number of tags in the page
    /// * `after` - Cursor returned by the previous page, `None` for the first
    async fn fetch_page(
        &self,
        owner: &str,
        name: &str,
        page_size: u32,
        after: Option<String>,
    ) -> Result<TagPage, FetchError>;
}
