//! Form for adding a book, with author autocomplete.

use tracing::{debug, info};

use crate::{
    error::{
        domain::{FieldErrors, FormError},
        operational::ErrorReporter,
    },
    library::{
        client::CatalogApi,
        models::{Author, Book, BookRequest},
        query::ListQuery,
    },
    notification::Notification,
    state::app_state::AppState,
    views::form::{FormField, REQUIRED_MESSAGE, check_date, require},
};

/// Headline of the failure notification.
pub const BOOK_ERROR_HEADLINE: &str = "Error adding book";

/// Message of the success notification.
pub const BOOK_ADDED_MESSAGE: &str = "Book added successfully";

/// Author search for the autocomplete input.
pub struct AuthorPicker;

impl AuthorPicker {
    /// Number of suggestions fetched per keystroke.
    pub const PAGE_SIZE: u32 = 3;

    /// Authors whose name matches `text`.
    ///
    /// A failed lookup yields no suggestions; the user can keep typing.
    pub async fn suggestions(api: &dyn CatalogApi, text: &str) -> Vec<Author> {
        let query = ListQuery::new().page_size(Self::PAGE_SIZE).search(text);
        match api.list_authors(&query).await {
            Ok(page) => page.results,
            Err(lookup_error) => {
                ErrorReporter::warn(&lookup_error, "Author lookup");
                Vec::new()
            }
        }
    }
}

/// Inputs of the add-book form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: FormField,
    /// Text typed into the author input.
    pub author_input: FormField,
    /// Author chosen from the suggestions.
    pub author: Option<Author>,
    pub publication_date: FormField,
}

impl BookForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the author input. Typing discards an earlier selection.
    pub fn type_author(&mut self, text: impl Into<String>) {
        self.author_input.set(text);
        self.author = None;
    }

    /// Picks a suggestion and shows its name in the author input.
    pub fn select_author(&mut self, author: Author) {
        self.author_input.set(author.display_name());
        self.author = Some(author);
    }

    pub fn mark_all_as_touched(&mut self) {
        self.title.touched = true;
        self.author_input.touched = true;
        self.publication_date.touched = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Builds the request payload, or the errors keyed by API field name.
    ///
    /// # Errors
    ///
    /// Returns the field errors when the title or date is blank, the date
    /// is malformed, or no author was selected.
    pub fn validate(&self) -> Result<BookRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "title", &self.title);
        if self.author.is_none() {
            errors.insert("author", REQUIRED_MESSAGE);
        }
        require(&mut errors, "publication_date", &self.publication_date);
        let publication_date = check_date(&mut errors, "publication_date", &self.publication_date);

        match (&self.author, publication_date, errors.is_empty()) {
            (Some(author), Some(publication_date), true) => Ok(BookRequest {
                title: self.title.text().unwrap_or_default().to_string(),
                author: author.id,
                publication_date,
            }),
            _ => Err(errors),
        }
    }

    /// Validates and creates the book.
    ///
    /// Success pushes a success notification, clears the form and emits
    /// the books refresh signal exactly once. Failures are pushed as an
    /// error notification; the refresh signal is not emitted.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` for local validation failures and
    /// `FormError::CatalogError` when the API rejects the request.
    pub async fn submit(&mut self, api: &dyn CatalogApi, state: &AppState) -> Result<Book, FormError> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(fields) => {
                self.mark_all_as_touched();
                debug!(errors = %fields.summary(), "Book form is invalid");
                return Err(FormError::Invalid { fields });
            }
        };

        match api.create_book(&request).await {
            Ok(book) => {
                info!(id = book.id, title = %book.title, "Book added");
                state.notify(Notification::success(BOOK_ADDED_MESSAGE));
                self.reset();
                state.books_refresh.emit();
                Ok(book)
            }
            Err(create_error) => {
                let duration_ms = state.settings.get_settings().notification_duration_ms;
                ErrorReporter::notify_failure(
                    &state.notifications,
                    BOOK_ERROR_HEADLINE,
                    &create_error,
                    duration_ms,
                );
                Err(create_error.into())
            }
        }
    }
}
