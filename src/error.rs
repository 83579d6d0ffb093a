//! Error kinds reported at the boundary of `Gen`/`FullDomainEval`.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("random source failed to deliver requested entropy")]
    InsufficientEntropy,

    #[error("integer overflow: {0}")]
    IntegerOverflow(&'static str),
}
