//! # labsys DB
//!
//! Persistence for the labsys API.
//!
//! - [`init_db_pool`] and [`MIGRATOR`]: PostgreSQL pool and schema migrations
//! - [`admins`]: the [`AdminRepository`] seam with Postgres and in-memory
//!   implementations
//! - [`classes`]: the same for [`ClassRepository`]
//! - [`users`]: the same for [`UserRepository`]
//!
//! # Example
//!
//! ```ignore
//! use labsys_db::{init_db_pool, PgAdminRepository, MIGRATOR};
//!
//! let pool = init_db_pool(&database_config).await?;
//! MIGRATOR.run(&pool).await?;
//! let admins = PgAdminRepository::new(pool.clone());
//! ```

pub mod admins;
pub mod classes;
pub mod users;

use labsys_config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub use admins::{AdminFilter, AdminRepository, MemoryAdminRepository, PgAdminRepository};
pub use classes::{ClassRepository, MemoryClassRepository, PgClassRepository};
pub use users::{MemoryUserRepository, PgUserRepository, UserRepository};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Failure of a repository call.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A unique key (nickname, class number, user number) is already taken
    #[error("unique constraint violated")]
    Conflict,
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
    /// A stored row no longer satisfies the model's invariants
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl RepoError {
    /// Maps unique violations to [`RepoError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Conflict;
        }
        RepoError::Backend(err)
    }
}

/// Connects a PostgreSQL pool.
///
/// # Errors
///
/// Fails when the URL is malformed or the database is unreachable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}
