use thiserror::Error as ThisError;

/// Terminal failures of a single lookup or refresh run.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("no coin listed under symbol {0:?}")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{field} is not a usable number: {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("symbol index error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(ThisError, Debug)]
pub enum FetchError {
    #[error("refusing to fetch a ticker with an empty id")]
    EmptyId,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider returned no ticker for id {0:?}")]
    Empty(String),
}

pub type Result<T> = std::result::Result<T, Error>;
