use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

/// Builds the shared PostgreSQL connection pool.
///
/// The pool is created lazily: no connection is opened until the first query,
/// so the server can start even while the database is still coming up. Each
/// query checks out one connection and returns it when the statement finishes.
pub fn connect(settings: &DatabaseSettings) -> PgPool {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.user)
        .password(&settings.password);

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect_lazy_with(options)
}

/// Runs a trivial round trip to confirm the database is reachable.
pub async fn test_connection(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT NOW()").execute(pool).await?;
    Ok(())
}

/// A utility function to run database migrations automatically.
///
/// Creates the `mahasiswa` table if it does not exist yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
