use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use labsys_models::{AdminId, Class, ClassId, NewClass};

use crate::RepoError;

#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// One page of classes ordered by id, plus the total count.
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<Class>, i64), RepoError>;

    async fn find_by_class_no(&self, class_no: &str) -> Result<Option<Class>, RepoError>;

    /// Fails with [`RepoError::Conflict`] when the class number exists.
    async fn insert(&self, class: NewClass) -> Result<Class, RepoError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ClassRow {
    id: ClassId,
    class_no: String,
    created_by: AdminId,
    created_at: DateTime<Utc>,
}

impl From<ClassRow> for Class {
    fn from(row: ClassRow) -> Self {
        Class {
            id: row.id,
            class_no: row.class_no,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgClassRepository {
    db: PgPool,
}

impl PgClassRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClassRepository for PgClassRepository {
    #[instrument(skip(self))]
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<Class>, i64), RepoError> {
        let rows = sqlx::query_as::<_, ClassRow>(
            r#"
            SELECT id, class_no, created_by, created_at
            FROM classes
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes")
            .fetch_one(&self.db)
            .await?;

        Ok((rows.into_iter().map(Class::from).collect(), total))
    }

    #[instrument(skip(self))]
    async fn find_by_class_no(&self, class_no: &str) -> Result<Option<Class>, RepoError> {
        let row = sqlx::query_as::<_, ClassRow>(
            "SELECT id, class_no, created_by, created_at FROM classes WHERE class_no = $1",
        )
        .bind(class_no)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Class::from))
    }

    #[instrument(skip(self, class), fields(class_no = %class.class_no))]
    async fn insert(&self, class: NewClass) -> Result<Class, RepoError> {
        let row = sqlx::query_as::<_, ClassRow>(
            r#"
            INSERT INTO classes (class_no, created_by)
            VALUES ($1, $2)
            RETURNING id, class_no, created_by, created_at
            "#,
        )
        .bind(&class.class_no)
        .bind(class.created_by)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_insert)?;

        Ok(row.into())
    }
}

#[derive(Debug, Default)]
pub struct MemoryClassRepository {
    classes: RwLock<Vec<Class>>,
}

impl MemoryClassRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassRepository for MemoryClassRepository {
    async fn find_page(&self, offset: i64, limit: i64) -> Result<(Vec<Class>, i64), RepoError> {
        let classes = self.classes.read().await;
        let page = classes
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, classes.len() as i64))
    }

    async fn find_by_class_no(&self, class_no: &str) -> Result<Option<Class>, RepoError> {
        let classes = self.classes.read().await;
        Ok(classes.iter().find(|c| c.class_no == class_no).cloned())
    }

    async fn insert(&self, class: NewClass) -> Result<Class, RepoError> {
        let mut classes = self.classes.write().await;
        if classes.iter().any(|c| c.class_no == class.class_no) {
            return Err(RepoError::Conflict);
        }

        let stored = Class {
            id: ClassId(classes.last().map_or(1, |c| c.id.0 + 1)),
            class_no: class.class_no,
            created_by: class.created_by,
            created_at: Utc::now(),
        };
        classes.push(stored.clone());
        Ok(stored)
    }
}
