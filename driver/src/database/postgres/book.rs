use rust_decimal::Decimal;
use sqlx::{Error, PgConnection};

use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{
    BookModifier, DeleteOutcome, DependOnBookModifier, InsertOutcome, UpdateOutcome,
};
use kernel::prelude::entity::{
    Book, BookAuthor, BookId, BookPrice, BookTitle, NewBook, RecordVersion,
};
use kernel::KernelError;

use crate::database::postgres::{PostgresDatabase, PostgresTransaction};
use crate::error::{ConvertError, DriverError};

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery<PostgresTransaction> for PostgresBookRepository {
    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con.connection()).await.convert_error()
    }

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con.connection(), id)
            .await
            .convert_error()
    }

    async fn exists_with_title_author(
        &self,
        con: &mut PostgresTransaction,
        title: &BookTitle,
        author: &BookAuthor,
        exclude: Option<&BookId>,
    ) -> error_stack::Result<bool, KernelError> {
        PgBookInternal::exists_with_title_author(con.connection(), title, author, exclude)
            .await
            .convert_error()
    }
}

#[async_trait::async_trait]
impl BookModifier<PostgresTransaction> for PostgresBookRepository {
    async fn insert(
        &self,
        con: &mut PostgresTransaction,
        book: &NewBook,
    ) -> error_stack::Result<InsertOutcome, KernelError> {
        PgBookInternal::insert(con.connection(), book)
            .await
            .convert_error()
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<UpdateOutcome, KernelError> {
        PgBookInternal::update(con.connection(), book)
            .await
            .convert_error()
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<DeleteOutcome, KernelError> {
        PgBookInternal::delete(con.connection(), id)
            .await
            .convert_error()
    }
}

impl DependOnBookQuery<PostgresTransaction> for PostgresDatabase {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier<PostgresTransaction> for PostgresDatabase {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    price: Decimal,
    version: i64,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            BookPrice::new(value.price),
            RecordVersion::new(value.version),
        )
    }
}

fn is_unique_violation(error: &Error) -> bool {
    matches!(error, Error::Database(db) if db.is_unique_violation())
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_all(con: &mut PgConnection) -> Result<Vec<Book>, DriverError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, price, version
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(con)
        .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(con: &mut PgConnection, id: &BookId) -> Result<Option<Book>, DriverError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author, price, version
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await?;
        let found = row.map(Book::from);
        Ok(found)
    }

    async fn exists_with_title_author(
        con: &mut PgConnection,
        title: &BookTitle,
        author: &BookAuthor,
        exclude: Option<&BookId>,
    ) -> Result<bool, DriverError> {
        let exists = sqlx::query_scalar::<_, bool>(
            // language=postgresql
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM books
                WHERE title = $1 AND author = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(title.as_str())
        .bind(author.as_str())
        .bind(exclude.map(|id| *id.as_ref()))
        .fetch_one(con)
        .await?;
        Ok(exists)
    }

    async fn insert(con: &mut PgConnection, book: &NewBook) -> Result<InsertOutcome, DriverError> {
        let result = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            INSERT INTO books (title, author, price, version)
            VALUES ($1, $2, $3, 0)
            RETURNING id, title, author, price, version
            "#,
        )
        .bind(book.title().as_str())
        .bind(book.author().as_str())
        .bind(book.price().as_ref())
        .fetch_one(con)
        .await;
        match result {
            Ok(row) => Ok(InsertOutcome::Persisted(Book::from(row))),
            Err(error) if is_unique_violation(&error) => Ok(InsertOutcome::DuplicatePair),
            Err(error) => Err(error.into()),
        }
    }

    async fn update(con: &mut PgConnection, book: &Book) -> Result<UpdateOutcome, DriverError> {
        let result = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, author = $3, price = $4, version = version + 1
            WHERE id = $1 AND version = $5
            RETURNING id, title, author, price, version
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_str())
        .bind(book.author().as_str())
        .bind(book.price().as_ref())
        .bind(book.version().as_ref())
        .fetch_optional(&mut *con)
        .await;
        match result {
            Ok(Some(row)) => Ok(UpdateOutcome::Persisted(Book::from(row))),
            Ok(None) => {
                // No row matched: the record is either gone or carries a
                // newer version. One existence re-check splits the two.
                let exists = sqlx::query_scalar::<_, bool>(
                    // language=postgresql
                    r#"
                    SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)
                    "#,
                )
                .bind(book.id().as_ref())
                .fetch_one(con)
                .await?;
                if exists {
                    Ok(UpdateOutcome::VersionMismatch)
                } else {
                    Ok(UpdateOutcome::Deleted)
                }
            }
            Err(error) if is_unique_violation(&error) => Ok(UpdateOutcome::DuplicatePair),
            Err(error) => Err(error.into()),
        }
    }

    async fn delete(con: &mut PgConnection, id: &BookId) -> Result<DeleteOutcome, DriverError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await?;
        if result.rows_affected() == 0 {
            Ok(DeleteOutcome::AlreadyAbsent)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
