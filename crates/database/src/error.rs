use thiserror::Error;

/// The driver error wrapped by [`DbError::QueryError`].
pub use sqlx::Error as SqlxError;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A record with this NIM already exists.")]
    DuplicateNim,

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl DbError {
    /// Classifies a driver error, lifting unique-constraint violations
    /// (SQLSTATE 23505) out of the generic query failure.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::DuplicateNim;
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return DbError::NotFound;
        }
        DbError::QueryError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;
    use std::fmt;

    /// A driver-level constraint error, as Postgres reports it.
    #[derive(Debug)]
    struct ConstraintError {
        unique: bool,
    }

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("constraint violated")
        }
    }

    impl StdError for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            if self.unique {
                "duplicate key value violates unique constraint \"mahasiswa_nim_key\""
            } else {
                "null value in column \"nama\" violates not-null constraint"
            }
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::NotNullViolation
            }
        }
    }

    fn database_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError { unique }))
    }

    #[test]
    fn classifies_driver_errors() {
        assert!(matches!(DbError::from_query(sqlx::Error::RowNotFound), DbError::NotFound));
        assert!(matches!(
            DbError::from_query(sqlx::Error::PoolTimedOut),
            DbError::QueryError(sqlx::Error::PoolTimedOut)
        ));
    }

    #[test]
    fn unique_violation_is_a_duplicate_nim() {
        let err = DbError::from_query(database_error(true));
        assert!(matches!(err, DbError::DuplicateNim));
    }

    #[test]
    fn other_constraint_violations_stay_query_errors() {
        let err = DbError::from_query(database_error(false));
        assert!(matches!(err, DbError::QueryError(sqlx::Error::Database(_))));
    }
}
