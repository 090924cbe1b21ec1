//! Headless view models for the catalog screens.
//!
//! Each view holds what its screen shows and talks to the catalog only
//! through [`CatalogApi`](crate::library::CatalogApi), so any front end can
//! render it.

pub mod author_form;
pub mod book_form;
pub mod books_list;
pub mod form;

pub use {
    author_form::AuthorForm,
    book_form::{AuthorPicker, BookForm},
    books_list::{BooksListController, BooksListView, load_books},
    form::FormField,
};
