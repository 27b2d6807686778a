use std::marker::PhantomData;

/// Opaque optimistic-concurrency token. The store hands one out with every
/// read and compares it on every versioned write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordVersion<T>(i64, PhantomData<T>);

impl<T> RecordVersion<T> {
    pub fn new(version: impl Into<i64>) -> Self {
        Self(version.into(), PhantomData)
    }
}

impl<T> From<i64> for RecordVersion<T> {
    fn from(version: i64) -> Self {
        Self(version, PhantomData)
    }
}

impl<T> AsRef<i64> for RecordVersion<T> {
    fn as_ref(&self) -> &i64 {
        &self.0
    }
}
