//! Shelfmark - Library Catalog Client
//!
//! Terminal front end for the catalog. Each subcommand checks the signed-in
//! user's roles, runs one catalog operation and prints the notifications it
//! produced.

use std::{env::var, path::PathBuf, sync::Arc};

use {
    anyhow::{Result, bail},
    clap::{Parser, Subcommand},
    parking_lot::{Mutex, RwLock},
    serde_json::to_string_pretty,
    tracing::info,
    tracing_subscriber::EnvFilter,
};

use shelfmark::{
    AccessDecision, AppState, AuthConfig, AuthSession, AuthorForm, AuthorPicker, BookForm,
    BooksListView, CatalogApi, CatalogClient, FormError, ListQuery, Notification,
    NotificationPresenter, Role, RouteGuard, SettingsManager,
    error::{ErrorReporter, ResultExt},
    library::SortDirection,
    notification::{NotificationHandle, NotificationQueue},
    state::Subscription,
    views::load_books,
};

/// Environment variable holding the access token.
const TOKEN_ENV: &str = "SHELFMARK_TOKEN";

/// Origin registered as the Keycloak redirect target.
const REDIRECT_ORIGIN: &str = "http://localhost:4200";

#[derive(Parser)]
#[command(name = "shelfmark", version, about = "Library catalog client")]
struct Cli {
    /// Keycloak access token. Falls back to SHELFMARK_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Settings file to use instead of the XDG location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List books, one page at a time.
    Books {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        /// Free-text filter.
        #[arg(long)]
        search: Option<String>,
        /// Column to sort by: title, author_name or publication_date.
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show one book.
    Book { id: i64 },
    /// List authors.
    Authors {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Add an author.
    AddAuthor {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        citizenship: String,
        /// Birth date, YYYY-MM-DD.
        #[arg(long)]
        born: String,
        /// Death date, YYYY-MM-DD.
        #[arg(long)]
        died: Option<String>,
    },
    /// Add a book by an existing author.
    AddBook {
        #[arg(long)]
        title: String,
        /// Author name, matched against the catalog.
        #[arg(long)]
        author: String,
        /// Publication date, YYYY-MM-DD.
        #[arg(long)]
        published: String,
    },
    /// Delete a book.
    DeleteBook { id: i64 },
    /// Show the signed-in user.
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shelfmark=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(run_error) = run(cli).await {
        ErrorReporter::error(&run_error, "shelfmark");
        return Err(run_error);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match cli.config {
        Some(path) => SettingsManager::with_config_path(path),
        None => SettingsManager::new(),
    }
    .add_context("Failed to load settings")?;

    let state = AppState::new(Arc::new(settings));
    let default_duration = state.settings.get_settings().notification_duration();
    let _presenter = NotificationPresenter::spawn(state.notifications.clone(), default_duration);
    let _printer = print_notifications(&state);

    let client = CatalogClient::new(&state.settings.get_settings())
        .add_context("Failed to create catalog client")?;

    if let Some(token) = cli.token.or_else(|| var(TOKEN_ENV).ok()) {
        let session = AuthSession::from_token(token.clone()).add_context("Invalid access token")?;
        client.set_access_token(Some(token));
        state.set_session(Some(session));
    }

    match cli.command {
        Command::Books {
            page,
            page_size,
            search,
            sort,
            desc,
        } => {
            ensure_access(&state, RouteGuard::requiring(Role::ViewBooks))?;
            list_books(&client, &state, page, page_size, search, sort, desc).await
        }
        Command::Book { id } => {
            ensure_access(&state, RouteGuard::requiring(Role::ViewBooks))?;
            let book = client
                .retrieve_book(id)
                .await
                .add_contextf(format!("Failed to load book {id}"))?;
            println!("{}", to_string_pretty(&book)?);
            Ok(())
        }
        Command::Authors { page, search } => {
            ensure_access(&state, RouteGuard::authenticated())?;
            let query = ListQuery::new()
                .page(page)
                .page_size(state.settings.get_settings().page_size)
                .ordering("last_name")
                .search(search.unwrap_or_default());
            let authors = client
                .list_authors(&query)
                .await
                .add_context("Failed to load authors")?;
            for author in &authors.results {
                println!(
                    "{:>5}  {:<32}  {:<20}  {}",
                    author.id,
                    author.display_name(),
                    author.citizenship,
                    author
                        .date_of_birth
                        .map(|date| date.to_string())
                        .unwrap_or_default()
                );
            }
            println!(
                "Page {} of {} ({} authors)",
                authors.current_page, authors.total_pages, authors.total_records
            );
            Ok(())
        }
        Command::AddAuthor {
            first_name,
            last_name,
            citizenship,
            born,
            died,
        } => {
            ensure_access(&state, RouteGuard::requiring(Role::CreateAuthor))?;
            let mut form = AuthorForm::new();
            form.first_name.set(first_name);
            form.last_name.set(last_name);
            form.citizenship.set(citizenship);
            form.date_of_birth.set(born);
            if let Some(died) = died {
                form.date_of_death.set(died);
            }
            let author = form.submit(&client, &state).await.map_err(form_failure)?;
            info!(id = author.id, "Author created");
            Ok(())
        }
        Command::AddBook {
            title,
            author,
            published,
        } => {
            ensure_access(&state, RouteGuard::requiring(Role::CreateBook))?;
            let suggestions = AuthorPicker::suggestions(&client, &author).await;
            let Some(chosen) = suggestions
                .iter()
                .find(|candidate| candidate.display_name().eq_ignore_ascii_case(&author))
                .or_else(|| suggestions.first())
                .cloned()
            else {
                bail!("No author matches '{author}'");
            };

            let mut form = BookForm::new();
            form.title.set(title);
            form.select_author(chosen);
            form.publication_date.set(published);
            let book = form.submit(&client, &state).await.map_err(form_failure)?;
            info!(id = book.id, "Book created");
            Ok(())
        }
        Command::DeleteBook { id } => {
            ensure_access(&state, RouteGuard::requiring(Role::CreateBook))?;
            if let Err(delete_error) = client.destroy_book(id).await {
                let duration_ms = state.settings.get_settings().notification_duration_ms;
                ErrorReporter::notify_failure(
                    &state.notifications,
                    "Error deleting book",
                    &delete_error,
                    duration_ms,
                );
                return Err::<(), _>(delete_error).add_contextf(format!("Failed to delete book {id}"));
            }
            state.notify(Notification::success("Book deleted successfully"));
            state.books_refresh.emit();
            Ok(())
        }
        Command::Whoami => {
            match state.get_session() {
                Some(session) => {
                    let claims = session.claims();
                    println!("User:    {}", session.username().unwrap_or("unknown"));
                    println!("Email:   {}", claims.email.as_deref().unwrap_or(""));
                    println!("Roles:   {}", claims.roles().join(", "));
                    match session.expires_at() {
                        Some(expiry) => println!(
                            "Expires: {} ({})",
                            expiry.to_rfc3339(),
                            if session.is_expired() { "expired" } else { "valid" }
                        ),
                        None => println!("Expires: never"),
                    }
                }
                None => {
                    println!("Not signed in.");
                    println!("Sign in at {}", login_url(&state)?);
                }
            }
            Ok(())
        }
    }
}

async fn list_books(
    client: &CatalogClient,
    state: &AppState,
    page: u32,
    page_size: Option<u32>,
    search: Option<String>,
    sort: Option<String>,
    desc: bool,
) -> Result<()> {
    let view = RwLock::new(BooksListView::new(&state.settings.get_settings()));
    {
        let mut view = view.write();
        if let Some(column) = sort {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            view.handle_sort_event(&column, direction);
        }
        if let Some(search) = search {
            view.set_search(search);
        }
        let size = page_size.unwrap_or(view.page_size);
        view.handle_page_event(page.saturating_sub(1), size);
    }

    load_books(&view, client, state)
        .await
        .add_context("Failed to load books")?;

    let view = view.read();
    for book in &view.books {
        println!(
            "{:>5}  {:<40}  {:<28}  {}",
            book.id, book.title, book.author_name, book.publication_date
        );
    }
    println!(
        "Page {} of {} ({} books)",
        view.page_index + 1,
        view.page_count().max(1),
        view.total_books
    );
    Ok(())
}

/// Fails with sign-in or permission guidance unless `guard` allows access.
fn ensure_access(state: &AppState, guard: RouteGuard) -> Result<()> {
    match state.check_access(guard) {
        AccessDecision::Allowed => Ok(()),
        AccessDecision::RedirectToLogin => bail!(
            "Sign in required. Get a token at {} and pass it with --token or {TOKEN_ENV}",
            login_url(state)?
        ),
        AccessDecision::Forbidden { role } => bail!("Your account lacks the '{role}' role"),
    }
}

fn login_url(state: &AppState) -> Result<String> {
    let keycloak = state.settings.get_settings().keycloak.clone();
    let config = AuthConfig::from_settings(&keycloak, REDIRECT_ORIGIN)?;
    Ok(config.login_url("shelfmark")?.to_string())
}

fn form_failure(form_error: FormError) -> anyhow::Error {
    match form_error {
        FormError::Invalid { fields } => anyhow::anyhow!("Invalid input:\n{}", fields.summary()),
        other => other.into(),
    }
}

/// Prints each notification once, as soon as it is queued.
fn print_notifications(state: &AppState) -> Subscription {
    let printed: Mutex<Vec<NotificationHandle>> = Mutex::new(Vec::new());
    state
        .notifications
        .subscribe(move |queue: &NotificationQueue| {
            let mut printed = printed.lock();
            printed.retain(|handle| queue.contains(handle));
            for handle in queue.iter() {
                if !printed.contains(handle) {
                    println!("[{}] {}", handle.kind, handle.message);
                    printed.push(handle.clone());
                }
            }
        })
}
