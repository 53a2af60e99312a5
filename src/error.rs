use thiserror::Error;

/// Errors surfaced by [`Client::call`](crate::Client::call).
///
/// Every variant is fatal to the current call. The only recovery the client
/// performs on its own is the bounded retry of a single request URL.
#[derive(Debug, Error)]
pub enum AcsError {
    /// The table identifier does not start with `D`, `B` or `S`.
    #[error(
        "table `{table}` does not follow the Data Profile (D), Detailed (B) or Subject (S) naming convention"
    )]
    UnrecognizedTableFamily { table: String },

    /// The API serves at most 8 variables per request. Duplicates are removed
    /// while grouping, so `count` is the number of distinct variables.
    #[error(
        "table `{table}` requests {count} variables but the API allows at most {max} per call; request the whole table or split the variables"
    )]
    TooManyVariables {
        table: String,
        count: usize,
        max: usize,
    },

    /// Every attempt for one URL failed. The URL is kept in the call log.
    #[error("request failed after {attempts} attempts: {url} (see Client::calls)")]
    RequestExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    /// A fetched table could not be joined onto the rows gathered so far.
    #[error("could not merge the response of {url}")]
    Merge {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unrecognized geography `{0}`; expected state, county, place, tract, blockgroup or zip")]
    InvalidGeography(String),

    #[error("unrecognized ACS survey `{0}`; expected 1 or 5")]
    InvalidSurvey(String),

    #[error("invalid variable identifier `{0}`")]
    InvalidVariable(String),

    /// The underlying HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}
