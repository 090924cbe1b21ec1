//! HTTP client for the catalog REST API.
//!
//! [`CatalogApi`] is the seam views program against; [`CatalogClient`]
//! implements it over `reqwest`. Each call is attempted once. Failures are
//! mapped to [`CatalogError`] and left to the caller to report.

use {
    async_trait::async_trait,
    parking_lot::RwLock,
    reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode},
    serde::{Serialize, de::DeserializeOwned},
    serde_json::{Value, from_str},
    tracing::{debug, warn},
};

use crate::{
    config::ClientSettings,
    error::domain::{CatalogError, FieldErrors},
    library::{
        models::{
            Author, AuthorRequest, Book, BookRequest, Paginated, PatchedAuthorRequest,
            PatchedBookRequest,
        },
        query::ListQuery,
    },
};

/// Catalog collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Books,
    Authors,
}

impl Resource {
    /// Collection path, without trailing slash.
    pub fn path(self) -> &'static str {
        match self {
            Self::Books => "/library/books",
            Self::Authors => "/library/authors",
        }
    }

    /// Singular entity name used in errors.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Books => "book",
            Self::Authors => "author",
        }
    }
}

/// Operations offered by the catalog API.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_books(&self, query: &ListQuery) -> Result<Paginated<Book>, CatalogError>;

    async fn retrieve_book(&self, id: i64) -> Result<Book, CatalogError>;

    async fn create_book(&self, request: &BookRequest) -> Result<Book, CatalogError>;

    async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Book, CatalogError>;

    async fn partial_update_book(
        &self,
        id: i64,
        request: &PatchedBookRequest,
    ) -> Result<Book, CatalogError>;

    async fn destroy_book(&self, id: i64) -> Result<(), CatalogError>;

    async fn list_authors(&self, query: &ListQuery) -> Result<Paginated<Author>, CatalogError>;

    async fn retrieve_author(&self, id: i64) -> Result<Author, CatalogError>;

    async fn create_author(&self, request: &AuthorRequest) -> Result<Author, CatalogError>;

    async fn update_author(&self, id: i64, request: &AuthorRequest)
    -> Result<Author, CatalogError>;

    async fn partial_update_author(
        &self,
        id: i64,
        request: &PatchedAuthorRequest,
    ) -> Result<Author, CatalogError>;

    async fn destroy_author(&self, id: i64) -> Result<(), CatalogError>;
}

/// `reqwest`-backed catalog client.
#[derive(Debug)]
pub struct CatalogClient {
    http: Client,
    /// API root without trailing slash.
    base_url: String,
    /// Bearer token attached to every request when present.
    access_token: RwLock<Option<String>>,
}

impl CatalogClient {
    /// Creates a client for the API configured in `settings`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidUrl` when the API URL is not http(s),
    /// or `CatalogError::HttpError` when the HTTP client cannot be built.
    pub fn new(settings: &ClientSettings) -> Result<Self, CatalogError> {
        let base_url = settings.api_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CatalogError::InvalidUrl(settings.api_url.clone()));
        }

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        debug!(base_url = %base_url, "Catalog client ready");
        Ok(Self {
            http,
            base_url,
            access_token: RwLock::new(None),
        })
    }

    /// Replaces the bearer token used for subsequent requests.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds, without sending, the list request for `resource`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::HttpError` if the URL cannot be built.
    pub fn list_request(&self, resource: Resource, query: &ListQuery) -> Result<Request, CatalogError> {
        Ok(self
            .request(Method::GET, resource.path().to_string())
            .query(query)
            .build()?)
    }

    fn request(&self, method: Method, path: String) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.access_token.read().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn item_path(resource: Resource, id: i64) -> String {
        format!("{}/{}", resource.path(), id)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Paginated<T>, CatalogError> {
        let builder = self.request(Method::GET, resource.path().to_string()).query(query);
        self.execute(builder, resource, None).await
    }

    async fn retrieve<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T, CatalogError> {
        let builder = self.request(Method::GET, Self::item_path(resource, id));
        self.execute(builder, resource, Some(id)).await
    }

    async fn write<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        resource: Resource,
        id: Option<i64>,
        body: &B,
    ) -> Result<T, CatalogError> {
        let path = match id {
            Some(id) => Self::item_path(resource, id),
            None => resource.path().to_string(),
        };
        let builder = self.request(method, path).json(body);
        self.execute(builder, resource, id).await
    }

    async fn destroy(&self, resource: Resource, id: i64) -> Result<(), CatalogError> {
        let builder = self.request(Method::DELETE, Self::item_path(resource, id));
        let response = builder.send().await?;
        Self::check(response, resource, Some(id)).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        resource: Resource,
        id: Option<i64>,
    ) -> Result<T, CatalogError> {
        let response = builder.send().await?;
        let body = Self::check(response, resource, id).await?;
        Ok(from_str(&body)?)
    }

    /// Returns the body of a successful response, or the mapped error.
    async fn check(response: Response, resource: Resource, id: Option<i64>) -> Result<String, CatalogError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let error = error_for_status(status, &body, resource, id);
        warn!(status = status.as_u16(), error = %error, "Catalog request rejected");
        Err(error)
    }
}

/// Maps a non-success response to a [`CatalogError`].
pub fn error_for_status(status: StatusCode, body: &str, resource: Resource, id: Option<i64>) -> CatalogError {
    match status {
        StatusCode::BAD_REQUEST => match FieldErrors::from_body(body) {
            Some(fields) if !fields.is_empty() => CatalogError::Validation { fields },
            _ => unexpected(status, body),
        },
        StatusCode::UNAUTHORIZED => CatalogError::Unauthorized,
        StatusCode::FORBIDDEN => CatalogError::Forbidden {
            detail: detail_of(body).unwrap_or_else(|| body.to_string()),
        },
        StatusCode::NOT_FOUND => match id {
            Some(id) => CatalogError::NotFound {
                entity: resource.entity().to_string(),
                id,
            },
            None => unexpected(status, body),
        },
        _ => unexpected(status, body),
    }
}

fn unexpected(status: StatusCode, body: &str) -> CatalogError {
    CatalogError::UnexpectedStatus {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

fn detail_of(body: &str) -> Option<String> {
    let value: Value = from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_owned)
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_books(&self, query: &ListQuery) -> Result<Paginated<Book>, CatalogError> {
        self.list(Resource::Books, query).await
    }

    async fn retrieve_book(&self, id: i64) -> Result<Book, CatalogError> {
        self.retrieve(Resource::Books, id).await
    }

    async fn create_book(&self, request: &BookRequest) -> Result<Book, CatalogError> {
        self.write(Method::POST, Resource::Books, None, request).await
    }

    async fn update_book(&self, id: i64, request: &BookRequest) -> Result<Book, CatalogError> {
        self.write(Method::PUT, Resource::Books, Some(id), request).await
    }

    async fn partial_update_book(
        &self,
        id: i64,
        request: &PatchedBookRequest,
    ) -> Result<Book, CatalogError> {
        self.write(Method::PATCH, Resource::Books, Some(id), request).await
    }

    async fn destroy_book(&self, id: i64) -> Result<(), CatalogError> {
        self.destroy(Resource::Books, id).await
    }

    async fn list_authors(&self, query: &ListQuery) -> Result<Paginated<Author>, CatalogError> {
        self.list(Resource::Authors, query).await
    }

    async fn retrieve_author(&self, id: i64) -> Result<Author, CatalogError> {
        self.retrieve(Resource::Authors, id).await
    }

    async fn create_author(&self, request: &AuthorRequest) -> Result<Author, CatalogError> {
        self.write(Method::POST, Resource::Authors, None, request).await
    }

    async fn update_author(&self, id: i64, request: &AuthorRequest) -> Result<Author, CatalogError> {
        self.write(Method::PUT, Resource::Authors, Some(id), request).await
    }

    async fn partial_update_author(
        &self,
        id: i64,
        request: &PatchedAuthorRequest,
    ) -> Result<Author, CatalogError> {
        self.write(Method::PATCH, Resource::Authors, Some(id), request).await
    }

    async fn destroy_author(&self, id: i64) -> Result<(), CatalogError> {
        self.destroy(Resource::Authors, id).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{StatusCode, header::AUTHORIZATION};

    use crate::{
        config::ClientSettings,
        error::domain::CatalogError,
        library::{
            client::{
                CatalogClient,
                Resource::{Authors, Books},
                error_for_status,
            },
            query::ListQuery,
        },
    };

    fn client() -> CatalogClient {
        let settings = ClientSettings {
            api_url: "http://127.0.0.1:8000/".to_string(),
            ..ClientSettings::default()
        };
        CatalogClient::new(&settings).unwrap()
    }

    #[test]
    fn test_list_request_url() {
        let client = client();
        let query = ListQuery::new()
            .page(2)
            .page_size(5)
            .ordering("-author")
            .search("lem");

        let request = client.list_request(Books, &query).unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:8000/library/books?page=2&page_size=5&ordering=-author&search=lem"
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_token_attached() {
        let client = client();
        client.set_access_token(Some("abc.def.ghi".to_string()));

        let request = client.list_request(Authors, &ListQuery::new()).unwrap();

        assert_eq!(request.url().path(), "/library/authors");
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer abc.def.ghi"
        );
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let settings = ClientSettings {
            api_url: "ftp://books".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            CatalogClient::new(&settings),
            Err(CatalogError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let validation = error_for_status(
            StatusCode::BAD_REQUEST,
            r#"{"title": ["This field is required."]}"#,
            Books,
            None,
        );
        assert!(matches!(validation, CatalogError::Validation { .. }));

        let forbidden = error_for_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "You do not have permission to perform this action."}"#,
            Books,
            None,
        );
        assert_eq!(
            forbidden.to_string(),
            "Forbidden: You do not have permission to perform this action."
        );

        let missing = error_for_status(StatusCode::NOT_FOUND, "", Authors, Some(9));
        assert_eq!(missing.to_string(), "Record not found: author with id 9");

        let bad_page = error_for_status(StatusCode::NOT_FOUND, r#"{"detail": "Invalid page."}"#, Books, None);
        assert!(matches!(bad_page, CatalogError::UnexpectedStatus { status: 404, .. }));

        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, "", Books, None),
            CatalogError::Unauthorized
        ));
    }
}
