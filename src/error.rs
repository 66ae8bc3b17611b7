use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrillError {
    #[error("letter pool is empty: select at least one letter to drill")]
    InvalidPool,

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stats Database Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DrillResult<T> = Result<T, DrillError>;
