use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record validation failed: {0}")]
    Validation(#[from] crate::validation::MissingFieldError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Failed to connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Failed to run migrations: {0}")]
    Migration(String),

    #[error("Stored record {id} has an unreadable timestamp")]
    CorruptTimestamp { id: i32 },

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// True when the caller supplied bad data, as opposed to a storage fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
