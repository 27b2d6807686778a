mod author;
mod draft;
mod id;
mod price;
mod title;

pub use self::{author::*, draft::*, id::*, price::*, title::*};
use crate::entity::common::RecordVersion;
use destructure::Destructure;

#[derive(Debug, Clone, Eq, PartialEq, Destructure)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: BookAuthor,
    price: BookPrice,
    version: RecordVersion<Book>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        author: BookAuthor,
        price: BookPrice,
        version: RecordVersion<Book>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            price,
            version,
        }
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    pub fn author(&self) -> &BookAuthor {
        &self.author
    }

    pub fn price(&self) -> &BookPrice {
        &self.price
    }

    pub fn version(&self) -> &RecordVersion<Book> {
        &self.version
    }
}
