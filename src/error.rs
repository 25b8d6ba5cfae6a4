use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Page count must be at least 1, got: {0}")]
    InvalidPageCount(usize),

    #[error("The selector you are trying to scrape with is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("Gave up on {url} after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid header: {0}")]
    Header(String),

    #[error("Url Error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
}
