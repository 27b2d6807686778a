use error_stack::{Report, ResultExt};

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{
    BookModifier, DeleteOutcome, DependOnBookModifier, InsertOutcome, UpdateOutcome,
};
use kernel::prelude::entity::{BookDraft, BookId, RecordVersion};

use crate::error::{BookError, Conflict, Duplicate};
use crate::transfer::{BookDto, CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto};

#[async_trait::async_trait]
pub trait GetAllBookService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnBookQuery<Connection>
{
    async fn get_all_books(&self) -> error_stack::Result<Vec<BookDto>, BookError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(BookError::Store)?;

        let books = self
            .book_query()
            .find_all(&mut connection)
            .await
            .change_context(BookError::Store)?;

        Ok(books.into_iter().map(BookDto::from).collect())
    }
}

impl<Connection: Transaction + Send, T> GetAllBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBookQuery<Connection>
{
}

#[async_trait::async_trait]
pub trait GetBookService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnBookQuery<Connection>
{
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, BookError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(BookError::Store)?;

        let book = self
            .book_query()
            .find_by_id(&mut connection, &BookId::new(dto.id))
            .await
            .change_context(BookError::Store)?;

        Ok(book.map(BookDto::from))
    }
}

impl<Connection: Transaction + Send, T> GetBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBookQuery<Connection>
{
}

#[async_trait::async_trait]
pub trait CreateBookService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnBookQuery<Connection>
    + DependOnBookModifier<Connection>
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, BookError> {
        let draft = BookDraft {
            title: dto.title,
            author: dto.author,
            price: dto.price,
        };
        let book = draft
            .validate()
            .map_err(|violations| Report::new(BookError::Validation(violations)))?;

        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(BookError::Store)?;

        // Pre-check only; the store's unique constraint stays authoritative.
        let duplicate = self
            .book_query()
            .exists_with_title_author(&mut connection, book.title(), book.author(), None)
            .await
            .change_context(BookError::Store)?;
        if duplicate {
            return Err(Report::new(BookError::Duplicate(Duplicate::OnCreate)));
        }

        match self
            .book_modifier()
            .insert(&mut connection, &book)
            .await
            .change_context(BookError::Store)?
        {
            InsertOutcome::Persisted(book) => {
                connection.commit().await.change_context(BookError::Store)?;
                Ok(BookDto::from(book))
            }
            InsertOutcome::DuplicatePair => {
                Err(Report::new(BookError::Duplicate(Duplicate::OnCreate)))
            }
        }
    }
}

impl<Connection: Transaction + Send, T> CreateBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnBookQuery<Connection>
        + DependOnBookModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait UpdateBookService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnBookQuery<Connection>
    + DependOnBookModifier<Connection>
{
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, BookError> {
        let UpdateBookDto { id, candidate } = dto;
        if id != candidate.id {
            // Externally identical to a missing record; the ids are only
            // kept apart in diagnostics.
            tracing::debug!(id, candidate_id = candidate.id, "update id mismatch");
            return Err(Report::new(BookError::NotFound));
        }

        let draft = BookDraft {
            title: candidate.title,
            author: candidate.author,
            price: candidate.price,
        };
        let fields = draft
            .validate()
            .map_err(|violations| Report::new(BookError::Validation(violations)))?;

        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(BookError::Store)?;

        let book_id = BookId::new(id);
        let duplicate = self
            .book_query()
            .exists_with_title_author(
                &mut connection,
                fields.title(),
                fields.author(),
                Some(&book_id),
            )
            .await
            .change_context(BookError::Store)?;
        if duplicate {
            return Err(Report::new(BookError::Duplicate(Duplicate::OnUpdate)));
        }

        let book = fields.with_identity(book_id, RecordVersion::new(candidate.version));
        match self
            .book_modifier()
            .update(&mut connection, &book)
            .await
            .change_context(BookError::Store)?
        {
            UpdateOutcome::Persisted(book) => {
                connection.commit().await.change_context(BookError::Store)?;
                Ok(BookDto::from(book))
            }
            UpdateOutcome::DuplicatePair => {
                Err(Report::new(BookError::Duplicate(Duplicate::OnUpdate)))
            }
            UpdateOutcome::Deleted => Err(Report::new(BookError::Conflict(Conflict::Deleted))),
            UpdateOutcome::VersionMismatch => {
                Err(Report::new(BookError::Conflict(Conflict::Modified)))
            }
        }
    }
}

impl<Connection: Transaction + Send, T> UpdateBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnBookQuery<Connection>
        + DependOnBookModifier<Connection>
{
}

#[async_trait::async_trait]
pub trait DeleteBookService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnBookModifier<Connection>
{
    /// Idempotent: removing an absent id is still a success.
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), BookError> {
        let mut connection = self
            .database_connection()
            .transact()
            .await
            .change_context(BookError::Store)?;

        let outcome = self
            .book_modifier()
            .delete(&mut connection, &BookId::new(dto.id))
            .await
            .change_context(BookError::Store)?;
        if let DeleteOutcome::AlreadyAbsent = outcome {
            tracing::debug!(id = dto.id, "delete of absent book");
        }

        connection.commit().await.change_context(BookError::Store)?;
        Ok(())
    }
}

impl<Connection: Transaction + Send, T> DeleteBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBookModifier<Connection>
{
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::{BookQuery, DependOnBookQuery};
    use kernel::interface::update::{
        BookModifier, DeleteOutcome, DependOnBookModifier, InsertOutcome, UpdateOutcome,
    };
    use kernel::prelude::entity::{Book, BookAuthor, BookId, BookTitle, NewBook, RecordVersion};
    use kernel::KernelError;

    use crate::error::{BookError, Conflict, Duplicate};
    use crate::service::{
        CreateBookService, DeleteBookService, GetAllBookService, GetBookService, UpdateBookService,
    };
    use crate::transfer::{
        BookCandidateDto, CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto,
    };

    #[derive(Default)]
    struct StoreState {
        rows: BTreeMap<i64, Book>,
        next_id: i64,
    }

    #[derive(Clone, Default)]
    struct MemoryBookStore {
        state: Arc<Mutex<StoreState>>,
    }

    struct MemoryTransaction {
        state: Arc<Mutex<StoreState>>,
    }

    #[async_trait::async_trait]
    impl Transaction for MemoryTransaction {
        async fn commit(self) -> error_stack::Result<(), KernelError> {
            Ok(())
        }

        async fn roll_back(self) -> error_stack::Result<(), KernelError> {
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl DatabaseConnection<MemoryTransaction> for MemoryBookStore {
        async fn transact(&self) -> error_stack::Result<MemoryTransaction, KernelError> {
            Ok(MemoryTransaction {
                state: Arc::clone(&self.state),
            })
        }
    }

    struct MemoryBookRepository;

    fn pair_taken(state: &StoreState, title: &BookTitle, author: &BookAuthor, exclude: Option<&BookId>) -> bool {
        state.rows.values().any(|row| {
            row.title() == title
                && row.author() == author
                && exclude.map_or(true, |id| row.id() != id)
        })
    }

    #[async_trait::async_trait]
    impl BookQuery<MemoryTransaction> for MemoryBookRepository {
        async fn find_all(
            &self,
            con: &mut MemoryTransaction,
        ) -> error_stack::Result<Vec<Book>, KernelError> {
            Ok(con.state.lock().unwrap().rows.values().cloned().collect())
        }

        async fn find_by_id(
            &self,
            con: &mut MemoryTransaction,
            id: &BookId,
        ) -> error_stack::Result<Option<Book>, KernelError> {
            Ok(con.state.lock().unwrap().rows.get(id.as_ref()).cloned())
        }

        async fn exists_with_title_author(
            &self,
            con: &mut MemoryTransaction,
            title: &BookTitle,
            author: &BookAuthor,
            exclude: Option<&BookId>,
        ) -> error_stack::Result<bool, KernelError> {
            let state = con.state.lock().unwrap();
            Ok(pair_taken(&state, title, author, exclude))
        }
    }

    #[async_trait::async_trait]
    impl BookModifier<MemoryTransaction> for MemoryBookRepository {
        async fn insert(
            &self,
            con: &mut MemoryTransaction,
            book: &NewBook,
        ) -> error_stack::Result<InsertOutcome, KernelError> {
            let mut state = con.state.lock().unwrap();
            if pair_taken(&state, book.title(), book.author(), None) {
                return Ok(InsertOutcome::DuplicatePair);
            }
            state.next_id += 1;
            let id = state.next_id;
            let persisted = book
                .clone()
                .with_identity(BookId::new(id), RecordVersion::new(0));
            state.rows.insert(id, persisted.clone());
            Ok(InsertOutcome::Persisted(persisted))
        }

        async fn update(
            &self,
            con: &mut MemoryTransaction,
            book: &Book,
        ) -> error_stack::Result<UpdateOutcome, KernelError> {
            let mut state = con.state.lock().unwrap();
            let id = *book.id().as_ref();
            let current_version = match state.rows.get(&id) {
                None => return Ok(UpdateOutcome::Deleted),
                Some(row) => row.version().clone(),
            };
            if &current_version != book.version() {
                return Ok(UpdateOutcome::VersionMismatch);
            }
            if pair_taken(&state, book.title(), book.author(), Some(book.id())) {
                return Ok(UpdateOutcome::DuplicatePair);
            }
            let next = Book::new(
                book.id().clone(),
                book.title().clone(),
                book.author().clone(),
                book.price().clone(),
                RecordVersion::new(current_version.as_ref() + 1),
            );
            state.rows.insert(id, next.clone());
            Ok(UpdateOutcome::Persisted(next))
        }

        async fn delete(
            &self,
            con: &mut MemoryTransaction,
            id: &BookId,
        ) -> error_stack::Result<DeleteOutcome, KernelError> {
            let mut state = con.state.lock().unwrap();
            Ok(match state.rows.remove(id.as_ref()) {
                Some(_) => DeleteOutcome::Deleted,
                None => DeleteOutcome::AlreadyAbsent,
            })
        }
    }

    impl DependOnBookQuery<MemoryTransaction> for MemoryBookStore {
        type BookQuery = MemoryBookRepository;
        fn book_query(&self) -> &Self::BookQuery {
            &MemoryBookRepository
        }
    }

    impl DependOnBookModifier<MemoryTransaction> for MemoryBookStore {
        type BookModifier = MemoryBookRepository;
        fn book_modifier(&self) -> &Self::BookModifier {
            &MemoryBookRepository
        }
    }

    fn dune() -> CreateBookDto {
        CreateBookDto {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: Decimal::new(1599, 2),
        }
    }

    fn candidate(id: i64, title: &str, author: &str, version: i64) -> BookCandidateDto {
        BookCandidateDto {
            id,
            title: title.to_string(),
            author: author.to_string(),
            price: Decimal::new(1999, 2),
            version,
        }
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty() {
        let store = MemoryBookStore::default();
        assert!(store.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_absent_book_is_none() {
        let store = MemoryBookStore::default();
        let found = store.get_book(GetBookDto { id: 42 }).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn create_assigns_id_and_initial_version() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.title, "Dune");
        assert_eq!(created.author, "Frank Herbert");
        assert_eq!(created.price, Decimal::new(1599, 2));
        assert_eq!(created.version, 0);

        let found = store.get_book(GetBookDto { id: created.id }).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_pair_with_different_price() {
        let store = MemoryBookStore::default();
        store.create_book(dune()).await.unwrap();

        let mut again = dune();
        again.price = Decimal::new(999, 2);
        let error = store.create_book(again).await.unwrap_err();
        assert_eq!(
            error.current_context(),
            &BookError::Duplicate(Duplicate::OnCreate)
        );
        assert_eq!(
            error.current_context().to_string(),
            "This book already exists."
        );
        assert_eq!(store.get_all_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields_without_touching_the_store() {
        let store = MemoryBookStore::default();
        let error = store
            .create_book(CreateBookDto {
                title: "  ".to_string(),
                author: String::new(),
                price: Decimal::from(200_000),
            })
            .await
            .unwrap_err();
        let BookError::Validation(violations) = error.current_context() else {
            panic!("expected a validation rejection");
        };
        assert_eq!(violations.len(), 3);
        assert!(store.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_rejects_id_mismatch_as_not_found() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();

        let error = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id + 1, "Dune Messiah", "Frank Herbert", 0),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &BookError::NotFound);

        let unchanged = store
            .get_book(GetBookDto { id: created.id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.title, "Dune");
        assert_eq!(unchanged.version, 0);
    }

    #[tokio::test]
    async fn update_rejects_invalid_fields() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();

        let error = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "", "Frank Herbert", 0),
            })
            .await
            .unwrap_err();
        let BookError::Validation(violations) = error.current_context() else {
            panic!("expected a validation rejection");
        };
        assert!(violations.contains("title"));
    }

    #[tokio::test]
    async fn update_preserves_id_and_advances_version() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();

        let updated = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "Dune Messiah", "Frank Herbert", created.version),
            })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.version, created.version + 1);
    }

    #[tokio::test]
    async fn update_rejects_duplicate_pair_of_another_record() {
        let store = MemoryBookStore::default();
        store.create_book(dune()).await.unwrap();
        let other = store
            .create_book(CreateBookDto {
                title: "Hyperion".to_string(),
                author: "Dan Simmons".to_string(),
                price: Decimal::new(1250, 2),
            })
            .await
            .unwrap();

        let error = store
            .update_book(UpdateBookDto {
                id: other.id,
                candidate: candidate(other.id, "Dune", "Frank Herbert", other.version),
            })
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &BookError::Duplicate(Duplicate::OnUpdate)
        );
        assert_eq!(
            error.current_context().to_string(),
            "Another book with the same Title and Author already exists."
        );
    }

    #[tokio::test]
    async fn update_keeping_own_pair_is_not_a_duplicate() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();

        let updated = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "Dune", "Frank Herbert", created.version),
            })
            .await
            .unwrap();
        assert_eq!(updated.price, Decimal::new(1999, 2));
    }

    #[tokio::test]
    async fn update_with_stale_token_is_a_modified_conflict() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();
        store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "Dune", "Frank Herbert", created.version),
            })
            .await
            .unwrap();

        let error = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "Dune Messiah", "Frank Herbert", created.version),
            })
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &BookError::Conflict(Conflict::Modified)
        );
        assert_eq!(
            error.current_context().to_string(),
            "This record was modified by another user. Please refresh and try again."
        );
    }

    #[tokio::test]
    async fn update_of_vanished_record_is_a_deleted_conflict() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();
        store
            .delete_book(DeleteBookDto { id: created.id })
            .await
            .unwrap();

        let error = store
            .update_book(UpdateBookDto {
                id: created.id,
                candidate: candidate(created.id, "Dune", "Frank Herbert", created.version),
            })
            .await
            .unwrap_err();
        assert_eq!(
            error.current_context(),
            &BookError::Conflict(Conflict::Deleted)
        );
        assert_eq!(
            error.current_context().to_string(),
            "This record was deleted by another user."
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryBookStore::default();
        let created = store.create_book(dune()).await.unwrap();

        store
            .delete_book(DeleteBookDto { id: created.id })
            .await
            .unwrap();
        store
            .delete_book(DeleteBookDto { id: created.id })
            .await
            .unwrap();
        assert!(store.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_never_existing_id_succeeds() {
        let store = MemoryBookStore::default();
        store.delete_book(DeleteBookDto { id: 99 }).await.unwrap();
        assert!(store.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryBookStore::default();
        let first = store.create_book(dune()).await.unwrap();
        store
            .delete_book(DeleteBookDto { id: first.id })
            .await
            .unwrap();

        let second = store.create_book(dune()).await.unwrap();
        assert!(second.id > first.id);
    }
}
