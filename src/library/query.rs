//! List query parameters and column sorting.

use serde::Serialize;

/// Page size the server applies when none is requested.
pub const SERVER_DEFAULT_PAGE_SIZE: u32 = 6;

/// Largest page size the server accepts.
pub const SERVER_MAX_PAGE_SIZE: u32 = 100;

/// Query string for paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: SERVER_DEFAULT_PAGE_SIZE,
            ordering: None,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        let ordering = ordering.into();
        self.ordering = (!ordering.is_empty()).then_some(ordering);
        self
    }

    /// Sets the free-text filter. Blank text clears it.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Keeps the page size within what the server honours.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, SERVER_MAX_PAGE_SIZE);
        self
    }
}

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Sorting cleared; the list falls back to its default order.
    #[default]
    Unsorted,
}

/// Sortable columns of the books table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSortColumn {
    Title,
    AuthorName,
    PublicationDate,
}

impl BookSortColumn {
    /// The API ordering field behind this column.
    pub fn api_field(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::AuthorName => "author",
            Self::PublicationDate => "publication_date",
        }
    }

    /// Parses a table column id (`title`, `author_name`, `publication_date`).
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "title" => Some(Self::Title),
            "author_name" | "author" => Some(Self::AuthorName),
            "publication_date" => Some(Self::PublicationDate),
            _ => None,
        }
    }
}

/// Default ordering of the books list.
pub const DEFAULT_BOOK_ORDERING: &str = "title";

/// Builds the `ordering` parameter for a column sort.
pub fn ordering_for(column: BookSortColumn, direction: SortDirection) -> String {
    // The API reads a leading `-` as descending, so ascending sends the bare
    // field name. Clearing the sort falls back to the default ordering.
    match direction {
        SortDirection::Ascending => column.api_field().to_string(),
        SortDirection::Descending => format!("-{}", column.api_field()),
        SortDirection::Unsorted => DEFAULT_BOOK_ORDERING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, to_value};

    use crate::library::query::{
        BookSortColumn::{AuthorName, PublicationDate, Title},
        ListQuery,
        SortDirection::{Ascending, Descending, Unsorted},
        ordering_for,
    };

    #[test]
    fn test_query_serialization_skips_unset() {
        let query = ListQuery::new().page(2).page_size(10).ordering("title");
        assert_eq!(
            to_value(&query).unwrap(),
            json!({"page": 2, "page_size": 10, "ordering": "title"})
        );
    }

    #[test]
    fn test_blank_search_is_omitted() {
        assert_eq!(ListQuery::new().search("   ").search, None);
        assert_eq!(ListQuery::new().search("lem").search.as_deref(), Some("lem"));
    }

    #[test]
    fn test_page_and_size_bounds() {
        let query = ListQuery::new().page(0).page_size(500).clamped();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 100);
    }

    #[test]
    fn test_ordering_for_columns() {
        assert_eq!(ordering_for(Title, Ascending), "title");
        assert_eq!(ordering_for(AuthorName, Descending), "-author");
        assert_eq!(ordering_for(PublicationDate, Ascending), "publication_date");
        assert_eq!(ordering_for(Title, Descending), "-title");
        assert_eq!(ordering_for(PublicationDate, Unsorted), "title");
    }

    #[test]
    fn test_column_ids() {
        use crate::library::query::BookSortColumn;

        assert_eq!(BookSortColumn::from_column("author_name"), Some(AuthorName));
        assert_eq!(BookSortColumn::from_column("id"), None);
    }
}
