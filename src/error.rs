use crate::store::Ref;
use crate::tag::ExprTag;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Dangling reference: {0}")]
    Dangling(Ref),
    #[error("Expected {expected}, found {found}")]
    KindMismatch { expected: ExprTag, found: ExprTag },
    #[error("Index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
}
