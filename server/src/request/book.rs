use rust_decimal::Decimal;
use serde::Deserialize;

use application::transfer::{
    BookCandidateDto, CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookDto,
};

use crate::controller::Intake;

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    title: String,
    author: String,
    price: Decimal,
}

/// Edit payload: the id the form was loaded for plus the version token the
/// read handed out. The path id is carried separately.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    id: i64,
    title: String,
    author: String,
    price: Decimal,
    version: i64,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: i64,
}

impl GetBookRequest {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: i64,
}

impl DeleteBookRequest {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

pub struct BookTransformer;

impl Intake<CreateBookRequest> for BookTransformer {
    type To = CreateBookDto;
    fn emit(&self, input: CreateBookRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            author: input.author,
            price: input.price,
        }
    }
}

impl Intake<(i64, UpdateBookRequest)> for BookTransformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (i64, UpdateBookRequest)) -> Self::To {
        let (id, input) = input;
        UpdateBookDto {
            id,
            candidate: BookCandidateDto {
                id: input.id,
                title: input.title,
                author: input.author,
                price: input.price,
                version: input.version,
            },
        }
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}
