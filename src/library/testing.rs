//! In-memory catalog used by view tests.

use {async_trait::async_trait, parking_lot::Mutex};

use crate::{
    error::domain::CatalogError,
    library::{
        client::CatalogApi,
        models::{
            Author, AuthorRequest, Book, BookRequest, Paginated, PatchedAuthorRequest,
            PatchedBookRequest,
        },
        query::ListQuery,
    },
};

#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub books: Mutex<Vec<Book>>,
    pub authors: Mutex<Vec<Author>>,
    pub book_queries: Mutex<Vec<ListQuery>>,
    pub author_queries: Mutex<Vec<ListQuery>>,
    /// Returned, once, by the next call.
    pub fail_next: Mutex<Option<CatalogError>>,
}

impl FakeCatalog {
    pub fn with_books(titles: &[&str]) -> Self {
        let catalog = Self::default();
        *catalog.books.lock() = titles
            .iter()
            .enumerate()
            .map(|(index, title)| Book {
                id: index as i64 + 1,
                title: (*title).to_string(),
                ..Default::default()
            })
            .collect();
        catalog
    }

    pub fn fail_next(&self, error: CatalogError) {
        *self.fail_next.lock() = Some(error);
    }

    fn check(&self) -> Result<(), CatalogError> {
        match self.fail_next.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn page<T: Clone>(items: &[T], query: &ListQuery) -> Paginated<T> {
        let size = query.page_size.max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * size;
        Paginated {
            total_records: items.len() as u64,
            total_pages: items.len().div_ceil(size) as u64,
            current_page: u64::from(query.page),
            results: items.iter().skip(start).take(size).cloned().collect(),
            ..Default::default()
        }
    }

    fn not_found(entity: &str, id: i64) -> CatalogError {
        CatalogError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_books(&self, query: &ListQuery) -> Result<Paginated<Book>, CatalogError> {
        self.book_queries.lock().push(query.clone());
        self.check()?;
        Ok(Self::page(&self.books.lock(), query))
    }

    async fn retrieve_book(&self, id: i64) -> Result<Book, CatalogError> {
        self.check()?;
        let books = self.books.lock();
        books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("book", id))
    }

    async fn create_book(&self, request: &BookRequest) -> Result<Book, CatalogError> {
        self.check()?;
        let mut books = self.books.lock();
        let book = Book {
            id: books.len() as i64 + 1,
            title: request.title.clone(),
            author: Some(request.author),
            publication_date: request.publication_date,
            ..Default::default()
        };
        books.push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Book, CatalogError> {
        self.partial_update_book(
            id,
            &PatchedBookRequest {
                title: Some(request.title.clone()),
                author: Some(request.author),
                publication_date: Some(request.publication_date),
            },
        )
        .await
    }

    async fn partial_update_book(
        &self,
        id: i64,
        request: &PatchedBookRequest,
    ) -> Result<Book, CatalogError> {
        self.check()?;
        let mut books = self.books.lock();
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| Self::not_found("book", id))?;
        if let Some(title) = &request.title {
            book.title = title.clone();
        }
        if let Some(author) = request.author {
            book.author = Some(author);
        }
        if let Some(date) = request.publication_date {
            book.publication_date = date;
        }
        Ok(book.clone())
    }

    async fn destroy_book(&self, id: i64) -> Result<(), CatalogError> {
        self.check()?;
        let mut books = self.books.lock();
        let before = books.len();
        books.retain(|book| book.id != id);
        if books.len() == before {
            return Err(Self::not_found("book", id));
        }
        Ok(())
    }

    async fn list_authors(&self, query: &ListQuery) -> Result<Paginated<Author>, CatalogError> {
        self.author_queries.lock().push(query.clone());
        self.check()?;
        let needle = query.search.clone().unwrap_or_default().to_lowercase();
        let matching: Vec<Author> = self
            .authors
            .lock()
            .iter()
            .filter(|author| author.display_name().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Self::page(&matching, query))
    }

    async fn retrieve_author(&self, id: i64) -> Result<Author, CatalogError> {
        self.check()?;
        self.authors
            .lock()
            .iter()
            .find(|author| author.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("author", id))
    }

    async fn create_author(&self, request: &AuthorRequest) -> Result<Author, CatalogError> {
        self.check()?;
        let mut authors = self.authors.lock();
        let author = Author {
            id: authors.len() as i64 + 1,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            citizenship: request.citizenship.clone(),
            date_of_birth: request.date_of_birth,
            date_of_death: request.date_of_death,
            ..Default::default()
        };
        authors.push(author.clone());
        Ok(author)
    }

    async fn update_author(&self, id: i64, request: &AuthorRequest) -> Result<Author, CatalogError> {
        self.partial_update_author(
            id,
            &PatchedAuthorRequest {
                first_name: Some(request.first_name.clone()),
                last_name: Some(request.last_name.clone()),
                citizenship: Some(request.citizenship.clone()),
                date_of_birth: request.date_of_birth,
                date_of_death: request.date_of_death,
            },
        )
        .await
    }

    async fn partial_update_author(
        &self,
        id: i64,
        request: &PatchedAuthorRequest,
    ) -> Result<Author, CatalogError> {
        self.check()?;
        let mut authors = self.authors.lock();
        let author = authors
            .iter_mut()
            .find(|author| author.id == id)
            .ok_or_else(|| Self::not_found("author", id))?;
        if let Some(first_name) = &request.first_name {
            author.first_name = first_name.clone();
        }
        if let Some(last_name) = &request.last_name {
            author.last_name = last_name.clone();
        }
        if let Some(citizenship) = &request.citizenship {
            author.citizenship = citizenship.clone();
        }
        if request.date_of_birth.is_some() {
            author.date_of_birth = request.date_of_birth;
        }
        if request.date_of_death.is_some() {
            author.date_of_death = request.date_of_death;
        }
        Ok(author.clone())
    }

    async fn destroy_author(&self, id: i64) -> Result<(), CatalogError> {
        self.check()?;
        let mut authors = self.authors.lock();
        let before = authors.len();
        authors.retain(|author| author.id != id);
        if authors.len() == before {
            return Err(Self::not_found("author", id));
        }
        Ok(())
    }
}
