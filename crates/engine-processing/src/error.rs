use model::records::row::RowIndex;
use thiserror::Error;

/// A predictor row that cannot be rendered as a request document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Column '{column}' of row {index} holds a nested value; only scalars can be scored")]
    NonScalar { column: String, index: RowIndex },

    #[error("Column '{column}' of row {index} holds a non-finite number")]
    NonFinite { column: String, index: RowIndex },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("Output column '{0}' already exists among the input columns")]
    OutputCollision(String),

    #[error("Row {0} received more than one scoring result")]
    DuplicateIndex(RowIndex),
}
