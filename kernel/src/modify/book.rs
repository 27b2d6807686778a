use crate::database::Transaction;
use crate::entity::{Book, BookId, NewBook};
use crate::KernelError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row written; id and initial version assigned by the store.
    Persisted(Book),
    /// The compound (title, author) unique constraint fired.
    DuplicatePair,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Row written; version advanced by the store.
    Persisted(Book),
    /// The compound (title, author) unique constraint fired.
    DuplicatePair,
    /// The row no longer exists.
    Deleted,
    /// The row exists but the supplied version token is stale.
    VersionMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

#[async_trait::async_trait]
pub trait BookModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn insert(
        &self,
        con: &mut Connection,
        book: &NewBook,
    ) -> error_stack::Result<InsertOutcome, KernelError>;

    /// Versioned write: the book's token must equal the stored one.
    async fn update(
        &self,
        con: &mut Connection,
        book: &Book,
    ) -> error_stack::Result<UpdateOutcome, KernelError>;

    async fn delete(
        &self,
        con: &mut Connection,
        id: &BookId,
    ) -> error_stack::Result<DeleteOutcome, KernelError>;
}

pub trait DependOnBookModifier<Connection: Transaction>: 'static + Sync + Send {
    type BookModifier: BookModifier<Connection>;
    fn book_modifier(&self) -> &Self::BookModifier;
}
