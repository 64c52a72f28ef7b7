use crate::DbError;
use async_trait::async_trait;
use core_types::{Mahasiswa, NewMahasiswa};
use sqlx::postgres::PgPool;

/// Name of the counter incremented once per store operation.
pub const DB_QUERIES_TOTAL: &str = "db_queries_total";

/// The kind of statement issued against the store, used as the
/// `operation` label on [`DB_QUERIES_TOTAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "select",
            QueryKind::Insert => "insert",
            QueryKind::Update => "update",
            QueryKind::Delete => "delete",
        }
    }
}

pub(crate) fn record_query(kind: QueryKind) {
    metrics::counter!(DB_QUERIES_TOTAL, "operation" => kind.as_str()).increment(1);
}

/// The data access contract for student records.
///
/// Every method maps to exactly one statement against the store. Missing rows
/// surface as [`DbError::NotFound`] and `nim` collisions as
/// [`DbError::DuplicateNim`].
#[async_trait]
pub trait MahasiswaRepository: Send + Sync {
    /// Fetches every record, ordered by ascending id.
    async fn list_mahasiswa(&self) -> Result<Vec<Mahasiswa>, DbError>;

    async fn get_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError>;

    /// Inserts a record and returns it with its assigned id.
    async fn create_mahasiswa(&self, new: &NewMahasiswa) -> Result<Mahasiswa, DbError>;

    /// Replaces all four business fields of an existing record.
    async fn update_mahasiswa(&self, id: i32, update: &NewMahasiswa) -> Result<Mahasiswa, DbError>;

    /// Removes a record and returns what was deleted.
    async fn delete_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError>;
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MahasiswaRepository for DbRepository {
    async fn list_mahasiswa(&self) -> Result<Vec<Mahasiswa>, DbError> {
        record_query(QueryKind::Select);
        let rows = sqlx::query_as::<_, Mahasiswa>(
            "SELECT id, nim, nama, jurusan, angkatan FROM mahasiswa ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from_query)?;
        Ok(rows)
    }

    async fn get_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Select);
        sqlx::query_as::<_, Mahasiswa>(
            "SELECT id, nim, nama, jurusan, angkatan FROM mahasiswa WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from_query)?
        .ok_or(DbError::NotFound)
    }

    async fn create_mahasiswa(&self, new: &NewMahasiswa) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Insert);
        let row = sqlx::query_as::<_, Mahasiswa>(
            r#"
            INSERT INTO mahasiswa (nim, nama, jurusan, angkatan)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nim, nama, jurusan, angkatan
            "#,
        )
        .bind(&new.nim)
        .bind(&new.nama)
        .bind(&new.jurusan)
        .bind(&new.angkatan)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_query)?;

        tracing::debug!(id = row.id, nim = %row.nim, "Inserted mahasiswa.");
        Ok(row)
    }

    async fn update_mahasiswa(&self, id: i32, update: &NewMahasiswa) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Update);
        sqlx::query_as::<_, Mahasiswa>(
            r#"
            UPDATE mahasiswa
            SET nim = $1, nama = $2, jurusan = $3, angkatan = $4
            WHERE id = $5
            RETURNING id, nim, nama, jurusan, angkatan
            "#,
        )
        .bind(&update.nim)
        .bind(&update.nama)
        .bind(&update.jurusan)
        .bind(&update.angkatan)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from_query)?
        .ok_or(DbError::NotFound)
    }

    async fn delete_mahasiswa(&self, id: i32) -> Result<Mahasiswa, DbError> {
        record_query(QueryKind::Delete);
        sqlx::query_as::<_, Mahasiswa>(
            "DELETE FROM mahasiswa WHERE id = $1 RETURNING id, nim, nama, jurusan, angkatan",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from_query)?
        .ok_or(DbError::NotFound)
    }
}
