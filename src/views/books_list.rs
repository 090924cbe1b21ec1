//! Paginated, sortable and searchable books list.
//!
//! [`BooksListView`] holds what the table shows. [`BooksListController`]
//! drives it: it loads on start, reloads on every books refresh signal and
//! after each page or sort change, and debounces search input so only the
//! last text typed within the quiet period triggers a request.

use std::{future::pending, sync::Arc, time::Duration};

use {
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::RwLock,
    tokio::{
        select, spawn,
        task::JoinHandle,
        time::{Instant, sleep_until},
    },
    tracing::debug,
};

use crate::{
    config::ClientSettings,
    error::{domain::CatalogError, operational::ErrorReporter},
    library::{
        client::CatalogApi,
        models::{Book, Paginated},
        query::{BookSortColumn, DEFAULT_BOOK_ORDERING, ListQuery, SortDirection, ordering_for},
    },
    state::{app_state::AppState, observers::Subscription},
};

/// State of the books table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooksListView {
    /// Rows of the current page.
    pub books: Vec<Book>,
    /// Matching records across all pages.
    pub total_books: u64,
    pub page_size: u32,
    /// 0-based page index, as paginators count.
    pub page_index: u32,
    pub page_size_options: Vec<u32>,
    pub ordering: String,
    pub search_text: String,
}

impl BooksListView {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            books: Vec::new(),
            total_books: 0,
            page_size: settings.page_size,
            page_index: 0,
            page_size_options: settings.page_size_options.clone(),
            ordering: DEFAULT_BOOK_ORDERING.to_string(),
            search_text: String::new(),
        }
    }

    /// Query for the current page; the API counts pages from 1.
    pub fn query(&self) -> ListQuery {
        ListQuery::new()
            .page(self.page_index + 1)
            .page_size(self.page_size)
            .ordering(self.ordering.clone())
            .search(self.search_text.clone())
    }

    pub fn handle_page_event(&mut self, page_index: u32, page_size: u32) {
        self.page_index = page_index;
        self.page_size = page_size.max(1);
    }

    /// Sorts by a table column. Unknown columns fall back to the default
    /// ordering. Always returns to the first page.
    pub fn handle_sort_event(&mut self, column: &str, direction: SortDirection) {
        self.ordering = match BookSortColumn::from_column(column) {
            Some(column) => ordering_for(column, direction),
            None => DEFAULT_BOOK_ORDERING.to_string(),
        };
        self.page_index = 0;
    }

    /// Applies a new search text and returns to the first page.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page_index = 0;
    }

    pub fn clear_filter(&mut self) {
        self.set_search(String::new());
    }

    /// Replaces the rows with a loaded page.
    pub fn apply(&mut self, page: Paginated<Book>) {
        self.books = page.results;
        self.total_books = page.total_records;
    }

    /// Number of pages for the current total.
    pub fn page_count(&self) -> u64 {
        self.total_books.div_ceil(u64::from(self.page_size.max(1)))
    }
}

/// Loads the page described by `view` and stores the result in it.
///
/// Failures are logged and reported as an error notification; the rows
/// shown before the failure stay in place.
///
/// # Errors
///
/// Returns the `CatalogError` of the failed request.
pub async fn load_books(
    view: &RwLock<BooksListView>,
    api: &dyn CatalogApi,
    state: &AppState,
) -> Result<(), CatalogError> {
    let query = view.read().query();
    debug!(page = query.page, ordering = ?query.ordering, search = ?query.search, "Loading books");

    match api.list_books(&query).await {
        Ok(page) => {
            let total = page.total_records;
            view.write().apply(page);
            state.publish_books_loaded(query.page, total);
            Ok(())
        }
        Err(load_error) => {
            let duration_ms = state.settings.get_settings().notification_duration_ms;
            ErrorReporter::notify_failure(&state.notifications, "Error loading books", &load_error, duration_ms);
            Err(load_error)
        }
    }
}

/// User actions that change what the list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Reload,
    Page { index: u32, size: u32 },
    Sort { column: String, direction: SortDirection },
    ClearFilter,
}

/// Keeps a [`BooksListView`] in sync with the catalog.
pub struct BooksListController {
    view: Arc<RwLock<BooksListView>>,
    commands: Sender<Command>,
    searches: Sender<String>,
    task: JoinHandle<()>,
    _refresh: Subscription,
}

impl BooksListController {
    /// Starts the controller and its initial load on the current tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(api: Arc<dyn CatalogApi>, state: AppState) -> Self {
        let (settings_view, debounce) = {
            let settings = state.settings.get_settings();
            (BooksListView::new(&settings), settings.search_debounce())
        };
        let view = Arc::new(RwLock::new(settings_view));
        let (commands_tx, commands_rx) = unbounded();
        let (searches_tx, searches_rx) = unbounded();

        let refresh_tx = commands_tx.clone();
        let refresh = state.books_refresh.subscribe(move || {
            let _ = refresh_tx.try_send(Command::Reload);
        });

        let task = spawn(control_loop(
            view.clone(),
            api,
            state,
            commands_rx,
            searches_rx,
            debounce,
        ));

        Self {
            view,
            commands: commands_tx,
            searches: searches_tx,
            task,
            _refresh: refresh,
        }
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> BooksListView {
        self.view.read().clone()
    }

    /// Feeds one keystroke's worth of search text into the debouncer.
    pub fn on_search_input_change(&self, text: impl Into<String>) {
        let _ = self.searches.try_send(text.into());
    }

    pub fn handle_page_event(&self, page_index: u32, page_size: u32) {
        self.send(Command::Page {
            index: page_index,
            size: page_size,
        });
    }

    pub fn handle_sort_event(&self, column: impl Into<String>, direction: SortDirection) {
        self.send(Command::Sort {
            column: column.into(),
            direction,
        });
    }

    pub fn clear_filter(&self) {
        self.send(Command::ClearFilter);
    }

    pub fn reload(&self) {
        self.send(Command::Reload);
    }

    fn send(&self, command: Command) {
        let _ = self.commands.try_send(command);
    }
}

impl Drop for BooksListController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn control_loop(
    view: Arc<RwLock<BooksListView>>,
    api: Arc<dyn CatalogApi>,
    state: AppState,
    commands: Receiver<Command>,
    searches: Receiver<String>,
    debounce: Duration,
) {
    let _ = load_books(&view, api.as_ref(), &state).await;

    let mut pending_search: Option<(String, Instant)> = None;
    loop {
        let deadline = pending_search.as_ref().map(|(_, deadline)| *deadline);
        let quiet_period = async move {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        select! {
            command = commands.recv() => {
                let Ok(command) = command else {
                    return;
                };
                {
                    let mut view = view.write();
                    match command {
                        Command::Reload => {}
                        Command::Page { index, size } => view.handle_page_event(index, size),
                        Command::Sort { column, direction } => view.handle_sort_event(&column, direction),
                        Command::ClearFilter => view.clear_filter(),
                    }
                }
                let _ = load_books(&view, api.as_ref(), &state).await;
            }
            text = searches.recv() => {
                let Ok(text) = text else {
                    return;
                };
                pending_search = Some((text, Instant::now() + debounce));
            }
            () = quiet_period => {
                if let Some((text, _)) = pending_search.take() {
                    debug!(search = %text, "Search settled");
                    view.write().set_search(text);
                    if let Err(search_error) = load_books(&view, api.as_ref(), &state).await {
                        ErrorReporter::debug(&search_error, "Books search");
                    }
                }
            }
        }
    }
}
