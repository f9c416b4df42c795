use thiserror::Error;

use crate::{EMPTY_QUERY_MESSAGE, SHAPE_ERROR_MESSAGE};

/// Every way a submission can fail.
///
/// The `Display` output of each variant is exactly what the user sees in the
/// error block of the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResearchError {
    /// The query was empty after trimming. Never reaches the network.
    #[error("{}", EMPTY_QUERY_MESSAGE)]
    EmptyQuery,

    /// The agent answered with a non-2xx status.
    #[error("Server returned {status}")]
    Status { status: u16 },

    /// Well-formed JSON without a non-empty `topic` and `summary`.
    #[error("{}", SHAPE_ERROR_MESSAGE)]
    Shape,

    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("{0}")]
    Transport(String),

    /// The body could not be read or was not valid JSON.
    #[error("{0}")]
    Decode(String),
}
