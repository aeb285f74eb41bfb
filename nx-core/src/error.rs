use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Unknown key kind: {0}")]
    UnknownKeyKind(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider HTTP error: {0}")]
    ProviderHttp(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            // Map unique constraint violations to AlreadyExists
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => Error::AlreadyExists(db_err.message().to_string()),
                    // PostgreSQL foreign_key_violation
                    "23503" => Error::NotFound("Referenced resource not found".to_string()),
                    // PostgreSQL check_violation
                    "23514" => Error::InvalidInput("Constraint check failed".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Error::InvalidInput("Required field is missing".to_string()),
                    // PostgreSQL serialization_failure / deadlock_detected: a
                    // concurrent transaction touched the same rows (§7
                    // `PersistenceConflict` — the caller retries the upsert
                    // once before bubbling up as an `Error` status).
                    "40001" | "40P01" => {
                        Error::PersistenceConflict(db_err.message().to_string())
                    }
                    _ => Error::Database(err),
                }
            }
            _ => Error::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
