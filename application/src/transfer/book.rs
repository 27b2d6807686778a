use rust_decimal::Decimal;

use kernel::prelude::entity::{Book, DestructBook};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub version: i64,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            price,
            version,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            price: price.into(),
            version: *version.as_ref(),
        }
    }
}

pub struct GetBookDto {
    pub id: i64,
}

pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub price: Decimal,
}

/// Candidate state for an edit, as loaded by the caller: embedded id plus
/// the version token issued by the read.
pub struct BookCandidateDto {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub version: i64,
}

pub struct UpdateBookDto {
    pub id: i64,
    pub candidate: BookCandidateDto,
}

pub struct DeleteBookDto {
    pub id: i64,
}
