use crate::config::Config;
use crate::models::{
    Author, AuthorName, Book, BookTitle, CreateAuthorError, CreateAuthorRequest, CreateBookError,
    CreateBookRequest, DeleteAuthorError, DeleteAuthorRequest, EmailAddress, FindAllAuthorsError,
    FindAllBooksError, FindAuthorError, FindAuthorRequest, PhoneNumber, PicturePath, Price,
};
use crate::repositories::{AuthorRepository, BookRepository};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        Self::connect(config.database_url(), config.database_max_connections()).await
    }

    /// Opens a pool against `url` and brings the schema up to date.
    ///
    /// An in-memory database (`sqlite::memory:`) lives only as long as its
    /// connection, so callers should pass `max_connections = 1` for it.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .with_context(|| format!("Failed to open database at {url}"))?;

        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::debug!(url, "database migrations applied");

        Ok(Self { pool })
    }

    /// Closes every connection. Subsequent queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let name = row.try_get("name")?;
        let email = row.try_get("email")?;
        let phone = row.try_get("phone")?;
        let picture = row.try_get("picture")?;

        let name = AuthorName::new_unchecked(name);
        let email = EmailAddress::new_unchecked(email);
        let phone = PhoneNumber::new_unchecked(phone);
        let picture = PicturePath::new_unchecked(picture);
        Ok(Self::new(id, name, email, phone, picture))
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let author_id = row.try_get("author_id")?;
        let description = row.try_get("description")?;
        let price_cents = row.try_get("price_cents")?;
        let is_published = row.try_get("is_published")?;

        let title = BookTitle::new_unchecked(title);
        let price = Price::from_cents(price_cents);
        Ok(Self::new(
            id,
            title,
            author_id,
            description,
            price,
            is_published,
        ))
    }
}

#[async_trait]
impl AuthorRepository for Sqlite {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        let author: Author = sqlx::query_as(
            "INSERT INTO author (name, email, phone, picture) VALUES (?, ?, ?, ?) \
             RETURNING id, name, email, phone, picture",
        )
        .bind(req.name().to_string())
        .bind(req.email().to_string())
        .bind(req.phone().to_string())
        .bind(req.picture().to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!(
                r#"Failed to create author with name "{}""#,
                req.name()
            ));
            CreateAuthorError(err)
        })?;

        tracing::debug!(id = author.id(), "author created");
        Ok(author)
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        let author =
            sqlx::query_as("SELECT id, name, email, phone, picture FROM author WHERE id = ?")
                .bind(req.id())
                .fetch_one(&self.pool)
                .await
                .map_err(|err| {
                    if matches!(err, sqlx::Error::RowNotFound) {
                        FindAuthorError::NotFound { id: req.id() }
                    } else {
                        let err = anyhow!(err).context(format!(
                            r#"Failed to retrieve author with id "{}""#,
                            req.id()
                        ));
                        FindAuthorError::Other(err)
                    }
                })?;

        Ok(author)
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors =
            sqlx::query_as("SELECT id, name, email, phone, picture FROM author ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|err| {
                    let err = anyhow!(err).context("Failed to retrieve all authors");
                    FindAllAuthorsError(err)
                })?;

        Ok(authors)
    }

    async fn delete_author(&self, req: &DeleteAuthorRequest) -> Result<(), DeleteAuthorError> {
        let context = || format!(r#"Failed to delete author with id "{}""#, req.id());

        let mut tx = self.pool.begin().await.with_context(context)?;

        // ON DELETE CASCADE only fires while foreign keys are enforced.
        let books = sqlx::query("DELETE FROM book WHERE author_id = ?")
            .bind(req.id())
            .execute(&mut *tx)
            .await
            .with_context(context)?;

        let author = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(req.id())
            .execute(&mut *tx)
            .await
            .with_context(context)?;

        if author.rows_affected() == 0 {
            return Err(DeleteAuthorError::NotFound { id: req.id() });
        }

        tx.commit().await.with_context(context)?;

        tracing::debug!(
            id = req.id(),
            books = books.rows_affected(),
            "author deleted with their books"
        );
        Ok(())
    }
}

#[async_trait]
impl BookRepository for Sqlite {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let book: Book = sqlx::query_as(
            "INSERT INTO book (title, author_id, description, price_cents, is_published) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, title, author_id, description, price_cents, is_published",
        )
        .bind(req.title().to_string())
        .bind(req.author_id())
        .bind(req.description())
        .bind(req.price().cents())
        .bind(req.is_published())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                CreateBookError::AuthorNotFound {
                    author_id: req.author_id(),
                }
            } else {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create book with title "{}""#,
                    req.title()
                ));
                CreateBookError::Other(err)
            }
        })?;

        tracing::debug!(id = book.id(), author_id = book.author_id(), "book created");
        Ok(book)
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        let books = sqlx::query_as(
            "SELECT id, title, author_id, description, price_cents, is_published \
             FROM book ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context("Failed to retrieve all books");
            FindAllBooksError(err)
        })?;

        Ok(books)
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_foreign_key_violation();
    }

    false
}
