use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use labsys_models::{AdminId, NewUser, User, UserId};

use crate::RepoError;

/// Storage of teacher and student accounts. Listings are ordered by id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), RepoError>;

    /// Fails with [`RepoError::Conflict`] when the user number is taken.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// Removes the listed accounts and returns how many existed.
    async fn delete_many(&self, ids: &[UserId]) -> Result<u64, RepoError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    user_no: String,
    real_name: String,
    password_hash: String,
    class_no: Option<String>,
    created_by: AdminId,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            user_no: row.user_no,
            real_name: row.real_name,
            password_hash: row.password_hash,
            class_no: row.class_no,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, user_no, real_name, password_hash, class_no, created_by, created_at";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    #[instrument(skip(self, user), fields(user_no = %user.user_no))]
    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (user_no, real_name, password_hash, class_no, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.user_no)
        .bind(&user.real_name)
        .bind(&user.password_hash)
        .bind(&user.class_no)
        .bind(user.created_by)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_insert)?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[UserId]) -> Result<u64, RepoError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
    /// Ids are never reused after a delete
    next_id: RwLock<i64>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<User>, i64), RepoError> {
        let users = self.users.read().await;
        let page = users
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, users.len() as i64))
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user_no == user.user_no) {
            return Err(RepoError::Conflict);
        }

        let mut next_id = self.next_id.write().await;
        *next_id += 1;
        let stored = User {
            id: UserId(*next_id),
            user_no: user.user_no,
            real_name: user.real_name,
            password_hash: user.password_hash,
            class_no: user.class_no,
            created_by: user.created_by,
            created_at: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn delete_many(&self, ids: &[UserId]) -> Result<u64, RepoError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| !ids.contains(&u.id));
        Ok((before - users.len()) as u64)
    }
}
