//! Library catalog access.
//!
//! This module provides the wire models of the books/authors API, list
//! query parameters and the HTTP client.

pub mod client;
pub mod models;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CatalogApi, CatalogClient, Resource};
pub use models::{
    Author, AuthorRequest, Book, BookRequest, Paginated, PatchedAuthorRequest, PatchedBookRequest,
};
pub use query::{BookSortColumn, ListQuery, SortDirection, ordering_for};
