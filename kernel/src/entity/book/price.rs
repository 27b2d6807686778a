use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BookPrice(Decimal);

impl BookPrice {
    pub fn new(price: impl Into<Decimal>) -> Self {
        Self(price.into())
    }
}

impl From<BookPrice> for Decimal {
    fn from(value: BookPrice) -> Self {
        value.0
    }
}

impl AsRef<Decimal> for BookPrice {
    fn as_ref(&self) -> &Decimal {
        &self.0
    }
}
