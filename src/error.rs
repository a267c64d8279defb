use thiserror::Error;

/// Errors raised by the untyped (`Value`) API. Each is reported before the
/// target map is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    /// A map argument is mutably borrowed by the caller for the duration of
    /// the call.
    #[error("map is already borrowed")]
    MapBorrowed,
}

impl Error {
    pub(crate) fn invalid_argument(msg: &str) -> Self {
        Error::InvalidArgument(msg.to_string())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
