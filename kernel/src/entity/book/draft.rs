use rust_decimal::Decimal;
use serde::Serialize;

use crate::entity::book::{Book, BookAuthor, BookId, BookPrice, BookTitle};
use crate::entity::common::RecordVersion;

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_MAX_CHARS: usize = 200;
pub const PRICE_MAX: u32 = 100_000;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Field-level validation failures, in field order (title, author, price).
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldViolation> {
        self.0.iter()
    }

    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldViolation { field, message });
    }
}

/// Unvalidated candidate as submitted by a caller.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub price: Decimal,
}

impl BookDraft {
    /// Pure validation, no store access. Blank means empty after trimming;
    /// the stored value keeps its original whitespace.
    pub fn validate(self) -> Result<NewBook, Violations> {
        let mut violations = Violations::default();
        if self.title.trim().is_empty() {
            violations.push("title", "Title is required.");
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            violations.push("title", "Title must be 200 characters or fewer.");
        }
        if self.author.trim().is_empty() {
            violations.push("author", "Author is required.");
        } else if self.author.chars().count() > AUTHOR_MAX_CHARS {
            violations.push("author", "Author must be 200 characters or fewer.");
        }
        if self.price < Decimal::ZERO || self.price > Decimal::from(PRICE_MAX) {
            violations.push("price", "Price must be between 0 and 100000.");
        }
        if !violations.is_empty() {
            return Err(violations);
        }
        Ok(NewBook {
            title: BookTitle::new(self.title),
            author: BookAuthor::new(self.author),
            price: BookPrice::new(self.price),
        })
    }
}

/// A validated book that has not been persisted yet. Only `validate`
/// constructs one; the store assigns id and version at insert time.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewBook {
    title: BookTitle,
    author: BookAuthor,
    price: BookPrice,
}

impl NewBook {
    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    pub fn author(&self) -> &BookAuthor {
        &self.author
    }

    pub fn price(&self) -> &BookPrice {
        &self.price
    }

    pub fn with_identity(self, id: BookId, version: RecordVersion<Book>) -> Book {
        Book::new(id, self.title, self.author, self.price, version)
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::BookDraft;

    fn draft(title: &str, author: &str, price: Decimal) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            price,
        }
    }

    #[test]
    fn accepts_boundary_values() {
        let long = "a".repeat(200);
        assert!(draft(&long, &long, Decimal::ZERO).validate().is_ok());
        assert!(draft("Dune", "Frank Herbert", Decimal::from(100_000))
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_blank_title_and_author() {
        let violations = draft("", "   ", Decimal::ONE).validate().unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains("title"));
        assert!(violations.contains("author"));
    }

    #[test]
    fn rejects_overlong_text() {
        let long = "a".repeat(201);
        let violations = draft(&long, "Frank Herbert", Decimal::ONE)
            .validate()
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations.contains("title"));
    }

    #[test]
    fn rejects_price_outside_range() {
        let below = draft("Dune", "Frank Herbert", Decimal::new(-1, 2))
            .validate()
            .unwrap_err();
        assert!(below.contains("price"));

        let above = draft("Dune", "Frank Herbert", Decimal::new(10_000_001, 2))
            .validate()
            .unwrap_err();
        assert!(above.contains("price"));
    }

    #[test]
    fn accumulates_violations_in_field_order() {
        let violations = draft("", "", Decimal::from(-5)).validate().unwrap_err();
        let fields: Vec<_> = violations.iter().map(|violation| violation.field).collect();
        assert_eq!(fields, ["title", "author", "price"]);
    }

    #[test]
    fn keeps_submitted_whitespace() {
        let book = draft(" Dune ", "Frank Herbert", Decimal::ONE)
            .validate()
            .unwrap();
        assert_eq!(book.title().as_str(), " Dune ");
    }
}
