use error_stack::Report;
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::book::*;

mod book;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL).convert_error()?;
        let pool = Pool::connect(&url).await.convert_error()?;
        Ok(Self { pool })
    }

    /// Ensures the books table and its compound unique constraint exist.
    /// The constraint is the authoritative duplicate guard; callers only
    /// pre-check for a friendlier message.
    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id      BIGSERIAL PRIMARY KEY,
                title   VARCHAR(200)   NOT NULL,
                author  VARCHAR(200)   NOT NULL,
                price   NUMERIC(12, 2) NOT NULL,
                version BIGINT         NOT NULL DEFAULT 0,
                CONSTRAINT books_title_author_key UNIQUE (title, author)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .convert_error()?;
        tracing::debug!("books schema ensured");
        Ok(())
    }
}

pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

impl PostgresTransaction {
    pub(in crate::database) fn connection(&mut self) -> &mut PgConnection {
        &mut *self.0
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<PostgresTransaction> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PostgresTransaction, KernelError> {
        let transaction = self.pool.begin().await.convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| match error {
            Error::PoolTimedOut => Report::from(error).change_context(KernelError::Timeout),
            _ => Report::from(error).change_context(KernelError::Internal),
        })
    }
}
