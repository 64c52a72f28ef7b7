//! # Mahasiswa Database Crate
//!
//! This crate acts as the data access layer for student records. It is the
//! only place that knows the `mahasiswa` table exists.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application talks to the
//!   [`MahasiswaRepository`] trait and never sees a query string.
//! - **Parameterized:** Every value reaches PostgreSQL through positional binds.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   bounded connection pool (`PgPool`); one statement per checkout.
//!
//! ## Public API
//!
//! - `connect`: Builds the connection pool from [`configuration::DatabaseSettings`].
//! - `test_connection`: A `SELECT NOW()` round trip used as a startup connectivity check.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `DbRepository`: The PostgreSQL implementation of [`MahasiswaRepository`].
//! - `MemoryRepository`: An in-process implementation with identical semantics.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations, test_connection};
pub use error::DbError;
pub use memory::MemoryRepository;
pub use repository::{DB_QUERIES_TOTAL, DbRepository, MahasiswaRepository, QueryKind};
