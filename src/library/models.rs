//! Wire models for the catalog REST API.
//!
//! Read models mirror what the server returns, including read-only fields
//! (`id`, `url`, timestamps). Write models carry only what a client may set.

use {
    chrono::{DateTime, NaiveDate, Utc},
    serde::{Deserialize, Serialize},
};

/// An author as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    /// Primary key.
    pub id: i64,
    /// Hyperlink to the author detail endpoint.
    #[serde(default)]
    pub url: String,
    pub first_name: String,
    pub last_name: String,
    pub citizenship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Set only for deceased authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Full name as shown in pickers and lists.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A book as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Book {
    /// Primary key.
    pub id: i64,
    /// Hyperlink to the book detail endpoint.
    #[serde(default)]
    pub url: String,
    pub title: String,
    /// Author's display name, read-only.
    #[serde(default)]
    pub author_name: String,
    /// Hyperlink to the author, read-only.
    #[serde(default)]
    pub author_url: String,
    /// Author primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
    pub publication_date: NaiveDate,
    /// Publication year, derived by the server.
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or replacing an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRequest {
    pub first_name: String,
    pub last_name: String,
    pub citizenship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
}

/// Payload for partially updating an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatchedAuthorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
}

/// Payload for creating or replacing a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: String,
    /// Author primary key.
    pub author: i64,
    pub publication_date: NaiveDate,
}

/// Payload for partially updating a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatchedBookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
}

/// Paginated result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Number of records matching the query across all pages.
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub total_pages: u64,
    /// 1-based page number.
    #[serde(default)]
    pub current_page: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            total_records: 0,
            total_pages: 0,
            current_page: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}
