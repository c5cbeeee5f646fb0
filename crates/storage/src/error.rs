use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        self.has_pg_code("23505")
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.has_pg_code("23503")
    }

    /// Translate a failed INSERT/UPDATE: a duplicate key becomes `ConstraintViolation`
    /// carrying `duplicate_message`, a dangling reference becomes `NotFound`.
    pub fn from_write(error: sqlx::Error, duplicate_message: &str) -> Self {
        let error = Self::from(error);
        if error.is_unique_violation() {
            Self::ConstraintViolation(duplicate_message.to_string())
        } else if error.is_foreign_key_violation() {
            Self::NotFound
        } else {
            error
        }
    }

    fn has_pg_code(&self, code: &str) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some(code)
        )
    }
}
